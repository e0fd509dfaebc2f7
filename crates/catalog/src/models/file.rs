use crate::error::{Error, ErrorKind};
use exn::OptionExt;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One downloadable format of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookFile {
    pub id: i64,
    pub book_id: i64,
    /// Lowercase file extension, e.g. `fb2` or `epub`.
    pub format: String,
    /// Relative to the storage root.
    pub path: PathBuf,
}

#[derive(sqlx::FromRow)]
pub(crate) struct FileRow {
    id: i64,
    book_id: i64,
    format: String,
    path: String,
}
impl From<FileRow> for BookFile {
    fn from(row: FileRow) -> Self {
        Self {
            id: row.id,
            book_id: row.book_id,
            format: row.format,
            path: PathBuf::from(row.path),
        }
    }
}

/// Stored paths always use `/`, regardless of platform.
pub(crate) fn path_to_row(path: &Path) -> Result<String, Error> {
    let path = path.to_str().ok_or_raise(|| ErrorKind::InvalidData("non UTF-8 path"))?;
    Ok(path.replace('\\', "/"))
}
