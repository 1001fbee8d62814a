//! Virtual console error types.

use leadrouter_domain::error::SurfaceError;

/// Errors raised while setting up a virtual console.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// The fixture file could not be read.
    #[error("could not read console fixture")]
    Io(#[from] std::io::Error),

    /// The fixture file is not a valid console description.
    #[error("invalid console fixture")]
    Decode(#[from] serde_json::Error),

    /// Two fixture forms share an id.
    #[error("duplicate form id '{0}' in console fixture")]
    DuplicateForm(String),
}

/// Error returned by every operation once the console has been closed.
pub(crate) fn closed() -> SurfaceError {
    SurfaceError::Unavailable(Box::new(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "virtual console closed",
    )))
}
