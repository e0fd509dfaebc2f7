use serde::Serialize;
use shelf_search::Entry;
use std::fmt;

/// A catalog entry: one title by one author, within one genre.
///
/// The same title may exist in several genres; each is its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub genre_id: i64,
    pub title: String,
    pub author: String,
}

impl Entry for Book {
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> &str {
        &self.author
    }
}

/// Renders as `"{title} — {author}"`, which is also the name handed to the
/// completion endpoint.
impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.title, self.author)
    }
}
