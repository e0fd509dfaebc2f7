//! Completion Error Types
//!
//! Every failure of the completion endpoint ends up here. Callers are not
//! expected to tell them apart beyond "the service is unavailable", but the
//! kinds are kept distinct for logs.

use derive_more::{Display, Error};

/// A completion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for completion operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration lacks a credential; raised when the client is built.
    #[display("missing credential: {_0}")]
    MissingCredential(#[error(not(source))] &'static str),
    /// The HTTP client could not be constructed.
    #[display("invalid client configuration")]
    Client,
    /// Connection, TLS or protocol failure.
    #[display("completion request failed")]
    Transport,
    #[display("completion request timed out")]
    Timeout,
    /// The endpoint answered with a non-success status.
    #[display("completion endpoint returned status {_0}")]
    Status(#[error(not(source))] u16),
    /// The body was not the expected JSON shape.
    #[display("malformed completion response")]
    MalformedResponse,
    /// The body parsed, but contained no answer text.
    #[display("empty completion response")]
    EmptyAnswer,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed. Nothing in this workspace
    /// retries automatically; this is for callers deciding whether to offer
    /// the user another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport | Self::Timeout => true,
            Self::Status(status) => *status == 429 || *status >= 500,
            Self::MissingCredential(_) | Self::Client | Self::MalformedResponse | Self::EmptyAnswer => false,
        }
    }
}
