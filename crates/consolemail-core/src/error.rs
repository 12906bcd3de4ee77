//! Error types for the core library.

use consolemail_mapi::MapiError;
use thiserror::Error;

/// Errors that can occur in session operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The messaging provider failed or rejected the call.
    #[error(transparent)]
    Provider(#[from] consolemail_mapi::Error),

    /// I/O error on the operator console or a settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed or written.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No messaging provider is registered on this machine.
    #[error("MAPI is not installed")]
    NotInstalled,

    /// The operator closed the input stream.
    #[error("No input available")]
    NoInput,

    /// Input text exceeds the configured limit.
    #[error("Text is {length} bytes; the limit is {limit}")]
    TextTooLong {
        /// Configured maximum.
        limit: usize,
        /// Actual length.
        length: usize,
    },

    /// An attachment path exceeds the configured limit.
    #[error("Path is {length} bytes; the limit is {limit}")]
    PathTooLong {
        /// Configured maximum.
        limit: usize,
        /// Actual length.
        length: usize,
    },

    /// More attachments than the configured maximum.
    #[error("{requested} attachments requested; the limit is {limit}")]
    TooManyAttachments {
        /// Configured maximum.
        limit: usize,
        /// Number requested.
        requested: usize,
    },
}

impl Error {
    /// The error returned by operations that need a session when none is active.
    #[must_use]
    pub const fn not_logged_on() -> Self {
        Self::Provider(consolemail_mapi::Error::Mapi(MapiError::InvalidSession))
    }

    /// Returns the provider result code, if this error carries one.
    #[must_use]
    pub const fn mapi(&self) -> Option<MapiError> {
        match self {
            Self::Provider(err) => err.mapi(),
            _ => None,
        }
    }

    /// Returns true for the "not implemented" pseudo-outcome.
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            Self::Provider(consolemail_mapi::Error::NotImplemented(_))
        )
    }
}

impl From<MapiError> for Error {
    fn from(err: MapiError) -> Self {
        Self::Provider(err.into())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_logged_on_is_invalid_session() {
        assert_eq!(Error::not_logged_on().mapi(), Some(MapiError::InvalidSession));
    }

    #[test]
    fn test_not_implemented_is_recognised() {
        let err = Error::from(consolemail_mapi::Error::NotImplemented("MAPISendDocuments"));
        assert!(err.is_not_implemented());
        assert!(!Error::NoInput.is_not_implemented());
        assert_eq!(err.mapi(), None);
    }
}
