//! WebDriver adapter error types.

use leadrouter_domain::error::SurfaceError;

/// Errors specific to the WebDriver adapter.
#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    /// The driver could not be reached.
    #[error("webdriver transport error")]
    Http(#[source] reqwest::Error),

    /// The driver answered with something that is not a W3C envelope.
    #[error("invalid webdriver response")]
    Decode(#[source] serde_json::Error),

    /// The driver rejected a command.
    #[error("webdriver error '{error}' ({status}): {message}")]
    Command {
        status: u16,
        error: String,
        message: String,
    },

    /// A polled condition did not hold before the timeout.
    #[error("timed out waiting for {0}")]
    WaitTimeout(String),

    /// None of a locator chain's alternatives matched.
    #[error("no element matches {0}")]
    NotFound(String),

    /// A select control has no option with the requested text.
    #[error("no option '{option}' in {control}")]
    MissingOption { control: String, option: String },
}

impl WebDriverError {
    /// Whether the browser session is gone.
    ///
    /// A command that timed out leaves the session in place; the page is
    /// only unresponsive.
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::Http(err) => !err.is_timeout(),
            Self::Command { error, .. } => matches!(
                error.as_str(),
                "invalid session id" | "no such window" | "session not created"
            ),
            _ => false,
        }
    }

    /// Convert into the engine's [`SurfaceError`] classification.
    pub fn into_surface(self) -> SurfaceError {
        if self.is_session_lost() {
            return SurfaceError::Unavailable(Box::new(self));
        }
        match self {
            Self::WaitTimeout(what) | Self::NotFound(what) => SurfaceError::ElementNotFound(what),
            Self::MissingOption { .. } => SurfaceError::ElementNotFound(self.to_string()),
            Self::Command { ref error, .. }
                if matches!(error.as_str(), "no such element" | "stale element reference") =>
            {
                SurfaceError::ElementNotFound(self.to_string())
            }
            other => SurfaceError::Unresponsive(other.to_string()),
        }
    }
}

impl From<WebDriverError> for SurfaceError {
    fn from(err: WebDriverError) -> Self {
        err.into_surface()
    }
}
