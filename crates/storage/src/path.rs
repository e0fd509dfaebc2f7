//! Path validation.
//!
//! Every path a backend touches comes from somewhere we don't control: the
//! catalog database, a directory listing, or a user's request. They are all
//! normalized and confined to the library root here first.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalizes a relative library path, rejecting anything that would leave
/// the library root.
///
/// `.` components and repeated or trailing separators disappear, `..` is
/// resolved lexically and fails if it climbs above the root. Leading `/` is
/// treated as the library root, not the filesystem root. Empty results and
/// NUL bytes are rejected.
///
/// Backslashes are *not* separators on Unix; stored paths are normalized to
/// forward slashes before they get here.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shelf_storage::validate_path;
///
/// assert!(validate_path("fantasy/Hobbit - Tolkien.fb2").is_ok());
/// assert!(validate_path("fantasy/../classic/Emma - Jane Austen.epub").is_ok());
///
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("fantasy/../../etc/passwd").is_err());
/// assert!(validate_path("fantasy/Hobbit\0.fb2").is_err());
///
/// assert_eq!(
///     validate_path("/fantasy//./Hobbit - Tolkien.fb2").unwrap(),
///     Path::new("fantasy/Hobbit - Tolkien.fb2"),
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut normalized = Vec::new();
    for component in original.components() {
        match component {
            // C-based syscalls would silently truncate at the NUL.
            Component::Normal(part) if part.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(part) => normalized.push(part),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if normalized.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if normalized.is_empty() {
        exn::bail!(invalid());
    }
    Ok(normalized.into_iter().collect())
}
