//! Error types for the core library.

use std::fmt;

use thiserror::Error;

/// Why one of the configured SMTP endpoints could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    /// The authenticated external server failed at connect, TLS, or login.
    ExternalSessionFailed(String),
    /// The internal relay failed at connect or greeting.
    InternalSessionFailed(String),
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternalSessionFailed(reason) => write!(f, "external server: {reason}"),
            Self::InternalSessionFailed(reason) => write!(f, "internal relay: {reason}"),
        }
    }
}

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value has an unsupported shape or type.
    #[error("Invalid argument type: {0}")]
    InvalidArgumentType(String),

    /// I/O error reading assets or attachments.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The message template is unusable.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Building the MIME message failed.
    #[error("MIME error: {0}")]
    Mime(#[from] phonehome_mime::Error),

    /// A single transmission failed.
    #[error("SMTP error: {0}")]
    Smtp(#[from] phonehome_smtp::Error),

    /// Neither the external server nor the internal relay accepted a session.
    #[error("No SMTP session available ({})", join_failures(.0))]
    SessionUnavailable(Vec<SessionFailure>),
}

fn join_failures(failures: &[SessionFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
