//! Storage models.

use std::path::{Path, PathBuf};

/// File metadata returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Lowercased final extension (`fb2`, `epub`, ...), if there is one.
    pub format: Option<String>,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let format = format_of(&path);
        Self { path, size, format }
    }
}

/// Lowercased final extension of a path.
///
/// Only the last extension counts: `Book.fb2.zip` is a `zip`. Hidden files
/// without an extension (`.keep`) have no format.
///
/// ```
/// use shelf_storage::format_of;
/// use std::path::Path;
///
/// assert_eq!(format_of(Path::new("fantasy/Hobbit - Tolkien.FB2")).as_deref(), Some("fb2"));
/// assert_eq!(format_of(Path::new("fantasy/README")), None);
/// ```
pub fn format_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        let info = FileInfo::new("classic/Emma - Jane Austen.EPUB", 10);
        assert_eq!(info.format.as_deref(), Some("epub"));
        assert_eq!(format_of(Path::new("a/Book.fb2.zip")).as_deref(), Some("zip"));
        assert_eq!(format_of(Path::new(".keep")), None);
        assert_eq!(format_of(Path::new("a/trailing.")), None);
    }
}
