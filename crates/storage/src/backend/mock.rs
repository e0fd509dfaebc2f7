//! In-memory storage backend for testing.

use super::FileInfoStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::models::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Root that [`MockBackend::resolve`] pretends files live under.
const MOCK_ROOT: &str = "/mock";

/// In-memory storage backend for testing.
///
/// Files live in a map behind a [`RwLock`], so tests can add or remove files
/// while a service holds the backend. Listing order is the path order.
///
/// # Examples
///
/// ```
/// use shelf_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("fantasy/Hobbit - Tolkien.fb2", b"..."),
/// ]);
/// assert_eq!(backend.stat(Path::new("fantasy/Hobbit - Tolkien.fb2")).await?.size, 3);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    storage: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation: broken test setup should not
    /// produce a passing test.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let storage = files
            .into_iter()
            .map(|(path, data)| (Self::validated(path.into()), data.into()))
            .collect();
        Self {
            storage: RwLock::new(storage),
        }
    }

    /// Adds (or replaces) a file. Panics on an invalid path.
    pub async fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        let path = Self::validated(path.into());
        self.storage.write().await.insert(path, data.into());
    }

    /// Removes a file, returning whether it existed.
    pub async fn remove(&self, path: impl AsRef<Path>) -> bool {
        match validate_path(path) {
            Ok(path) => self.storage.write().await.remove(&path).is_some(),
            Err(_) => false,
        }
    }

    fn validated(path: PathBuf) -> PathBuf {
        let Ok(validated) = validate_path(&path) else {
            panic!("MockBackend: invalid path {}", path.display());
        };
        validated
    }

    async fn entry(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        match guard.get(&path) {
            Some(data) => Ok(FileInfo::new(path, data.len() as u64)),
            None => exn::bail!(ErrorKind::NotFound(path)),
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(prefix) => prefix,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot under the read lock, so that the lock isn't held
            // across yield points.
            let entries: Vec<FileInfo> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| validated_prefix.as_ref().is_none_or(|prefix| path.starts_with(prefix)))
                    .map(|(path, data)| FileInfo::new(path.clone(), data.len() as u64))
                    .collect()
            };
            for info in entries {
                yield Ok(info);
            }
        })
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.entry(path).await
    }

    async fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let info = self.entry(path).await?;
        Ok(Path::new(MOCK_ROOT).join(info.path))
    }
}
