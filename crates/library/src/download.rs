//! File variants of a book and where to deliver them from.

use crate::error::{ErrorKind, NotFound, Result};
use exn::ResultExt;
use shelf_catalog::{BookFile, Repository};
use shelf_storage::BackendHandle;
use shelf_storage::error::ErrorKind as StorageErrorKind;
use std::path::PathBuf;
use tracing::instrument;

/// Display name used when a book record has disappeared.
pub const UNKNOWN_BOOK: &str = "Неизвестная книга";

/// A file ready to be handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub book_id: i64,
    pub format: String,
    /// `"{title} — {author}"`, for the caption.
    pub book_name: String,
    /// File name to present to the user.
    pub file_name: String,
    /// Path inside the library, as stored in the catalog.
    pub path: PathBuf,
    /// Where the backend says the file can be read from.
    pub location: PathBuf,
    pub size: u64,
}

#[derive(Clone)]
pub struct Downloads {
    repo: Repository,
    backend: BackendHandle,
}

impl Downloads {
    pub fn new(repo: Repository, backend: BackendHandle) -> Self {
        Self { repo, backend }
    }

    /// Available formats of a book, by format. Unknown books have none.
    pub async fn files(&self, book_id: i64) -> Result<Vec<BookFile>> {
        self.repo.list_files(book_id).await.or_raise(|| ErrorKind::Catalog)
    }

    /// Finds one format of a book in storage.
    ///
    /// # Errors
    ///
    /// - [`NotFound::Record`] when the catalog has no such (book, format).
    /// - [`NotFound::File`] when the catalog does, but storage no longer has
    ///   the file. The catalog is only as fresh as the last sync.
    #[instrument(skip(self))]
    pub async fn locate(&self, book_id: i64, format: &str) -> Result<Download> {
        let path = self
            .repo
            .get_file_path(book_id, format)
            .await
            .or_raise(|| ErrorKind::Catalog)?
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(NotFound::Record)))?;

        let info = match self.backend.stat(&path).await {
            Ok(info) => info,
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
                tracing::warn!(path = %path.display(), backend = self.backend.name(), "catalog entry has no file");
                exn::bail!(ErrorKind::NotFound(NotFound::File));
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        };
        let location = self.backend.resolve(&path).await.or_raise(|| ErrorKind::Storage)?;

        let book_name = self
            .repo
            .book_display_name(book_id)
            .await
            .or_raise(|| ErrorKind::Catalog)?
            .unwrap_or_else(|| UNKNOWN_BOOK.to_string());
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{book_name}.{format}"));

        Ok(Download {
            book_id,
            format: format.to_lowercase(),
            book_name,
            file_name,
            path,
            location,
            size: info.size,
        })
    }
}
