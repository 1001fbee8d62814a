//! Rule source adapter error types.

use leadrouter_domain::error::{LeadRouterError, SourceValidationError};

/// Errors specific to reading the feed sheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// The configured endpoint could not be turned into a request URL.
    #[error("invalid sheets endpoint: {0}")]
    InvalidUrl(String),

    /// Connecting to or talking with the Sheets API failed.
    #[error("sheets request failed")]
    Network(#[source] reqwest::Error),

    /// The Sheets API answered with a non-success status.
    #[error("sheets API error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A values file could not be read.
    #[error("could not read values file")]
    Io(#[source] std::io::Error),

    /// A values payload did not have the expected shape.
    #[error("invalid values payload")]
    Decode(#[source] serde_json::Error),

    /// The sheet was read but failed validation.
    #[error("sheet failed validation")]
    Validation(#[source] SourceValidationError),
}

impl SheetsError {
    /// Convert into a [`LeadRouterError`] for propagation across the port
    /// boundary. Validation failures keep their issue list.
    pub fn into_domain(self) -> LeadRouterError {
        match self {
            Self::Validation(err) => LeadRouterError::Validation(err),
            other => LeadRouterError::Source(Box::new(other)),
        }
    }
}

impl From<SheetsError> for LeadRouterError {
    fn from(err: SheetsError) -> Self {
        err.into_domain()
    }
}

impl From<SourceValidationError> for SheetsError {
    fn from(err: SourceValidationError) -> Self {
        Self::Validation(err)
    }
}
