//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, a read-only interface to
//! wherever the book files live. The catalog only ever stores paths relative
//! to the backend root; turning them into something deliverable is the
//! backend's job.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::models::FileInfo;
use async_trait::async_trait;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified, read-only interface to the book library.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations
/// enforce this themselves, so callers may pass paths straight from the
/// catalog database.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shelf_storage::{backend::StorageBackend, error::Result};
///
/// async fn deliverable(backend: &dyn StorageBackend, path: &Path) -> Result<(std::path::PathBuf, u64)> {
///     let size = backend.stat(path).await?.size;
///     Ok((backend.resolve(path).await?, size))
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, for logging only.
    fn name(&self) -> &str;

    /// Stream file metadata under an optional prefix.
    ///
    /// Files are yielded as they are discovered, in no particular order.
    /// A prefix that does not exist yields nothing rather than an error.
    /// Per-entry failures are yielded in place, so one unreadable directory
    /// does not end the walk.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use shelf_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Some(Path::new("fantasy")));
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Location the transport layer can deliver the file from.
    ///
    /// For [`LocalBackend`] this is the absolute filesystem path. Returns
    /// [`NotFound`](crate::error::ErrorKind::NotFound) if the file does not
    /// exist, so a stale catalog entry is detected before delivery.
    async fn resolve(&self, path: &Path) -> Result<PathBuf>;
}
