use derive_more::Display;
use shelf_storage::FileInfo;
use std::collections::BTreeMap;
use std::path::{Component, PathBuf};

/// Separates title from author in a file name.
const AUTHOR_SEPARATOR: &str = " - ";

/// A book file, as described by its location in the library.
///
/// The layout is `<genre>/<Title> - <Author>.<ext>`. Anything between the
/// genre directory and the file name is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Display name of the genre.
    pub genre: String,
    pub title: String,
    pub author: String,
    /// Lowercased extension.
    pub format: String,
    /// The path the entry was parsed from, relative to the library root.
    pub path: PathBuf,
}

/// Why a file was left out of the catalog.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[display("not inside a genre directory")]
    NoGenre,
    #[display("path is not valid UTF-8")]
    NotUtf8,
    #[display("file name has no extension")]
    NoExtension,
    #[display("file name does not separate title and author with \" - \"")]
    NoAuthor,
    #[display("title or author is blank")]
    Blank,
}

impl ParsedEntry {
    /// Parses a listed file by its library-relative path. `genres` maps
    /// directory names to display names; unmapped directories are displayed
    /// as-is.
    pub fn parse(file: &FileInfo, genres: &BTreeMap<String, String>) -> Result<Self, SkipReason> {
        let path = file.path.as_path();
        let mut parts = Vec::new();
        for component in path.components() {
            if let Component::Normal(part) = component {
                parts.push(part.to_str().ok_or(SkipReason::NotUtf8)?);
            }
        }
        let slug = match parts.as_slice() {
            [slug, .., _file_name] => *slug,
            _ => return Err(SkipReason::NoGenre),
        };

        let format = file.format.clone().ok_or(SkipReason::NoExtension)?;
        let stem = path.file_stem().and_then(|stem| stem.to_str()).ok_or(SkipReason::NoExtension)?;
        let (title, author) = stem.split_once(AUTHOR_SEPARATOR).ok_or(SkipReason::NoAuthor)?;
        let (title, author) = (title.trim(), author.trim());
        if title.is_empty() || author.is_empty() {
            return Err(SkipReason::Blank);
        }

        Ok(Self {
            genre: genres.get(slug).cloned().unwrap_or_else(|| slug.to_string()),
            title: title.to_string(),
            author: author.to_string(),
            format,
            path: path.to_path_buf(),
        })
    }
}
