//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LeadRouterError`] via `#[from]` (or an adapter-level `into_domain`).
//! Only two kinds end a run: source validation failures (before any UI
//! interaction) and an automation surface that stays unreachable after one
//! recovery attempt. Everything else is scoped down to a rule, a
//! notification, or a form by the engine.

use std::fmt;

/// Top-level error for the leadrouter workspace.
#[derive(Debug, thiserror::Error)]
pub enum LeadRouterError {
    /// The rule source contained missing or empty required values.
    #[error("rule source failed validation")]
    Validation(#[from] SourceValidationError),

    /// The rule source was valid but contained no rows.
    #[error("rule source contains no rows")]
    NoRules,

    /// An automation surface operation failed.
    #[error("automation surface error")]
    Surface(#[from] SurfaceError),

    /// The rule source could not be read (network, file, decoding).
    #[error("rule source error")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors reported by the form automation surface.
///
/// `ElementNotFound` and `Unresponsive` are structural: the engine converts
/// them into the smallest-scope result (skipped rule, failed notification,
/// failed form). `Unavailable` means the surface itself is gone.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// An expected control or page was not present.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A control was present but did not respond in time.
    #[error("surface unresponsive while {0}")]
    Unresponsive(String),

    /// The surface cannot be driven any more (session closed, driver gone).
    #[error("automation surface unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SurfaceError {
    /// Whether the error means the whole surface is unusable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Every issue found while validating the rule source.
///
/// Validation never stops at the first problem so that the operator gets a
/// complete list of offending rows in one pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} missing or empty value(s) in rule source", issues.len())]
pub struct SourceValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl SourceValidationError {
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }
}

/// A single validation problem in the rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The header row does not contain a required column.
    MissingColumn { column: String },
    /// A cell in a required column is missing or blank.
    EmptyCell { row: usize, column: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { column } => {
                write!(f, "Required column '{column}' not found in header")
            }
            Self::EmptyCell { row, column } => {
                write!(f, "Row {row}, Column '{column}' is missing or empty")
            }
        }
    }
}
