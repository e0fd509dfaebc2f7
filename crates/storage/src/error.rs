//! Storage Error Types
//!
//! Lookups of a single path report [`ErrorKind::NotFound`] for anything that
//! is not a regular file, so a stale catalog entry is always told apart from
//! a broken library.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No regular file at this library path.
    #[display("no such book file: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("not allowed to read {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    #[display("library I/O failed: {_0}")]
    Io(IoError),
    /// Rejected before touching the filesystem: traversal, NUL bytes, empty.
    #[display("unsafe library path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// The walk produced a path outside the library root (a symlinked
    /// directory, or a root that moved mid-walk).
    #[display("{} escaped the library root", _0.display())]
    OutsideRoot(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Only raw I/O failures are worth another attempt; everything else
    /// describes the library as it is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
