//! Fixtures shared by the service tests.

use shelf_catalog::{Database, Repository};
use std::path::Path;

/// (genre, title, author, format, path)
pub(crate) const BOOKS: &[(&str, &str, &str, &str, &str)] = &[
    ("Фантастика", "Hobbit", "Tolkien", "fb2", "fantasy/Hobbit - Tolkien.fb2"),
    ("Фантастика", "Hobbit", "Tolkien", "epub", "fantasy/Hobbit - Tolkien.epub"),
    ("Фантастика", "Silmarillion", "Tolkien", "fb2", "fantasy/Silmarillion - Tolkien.fb2"),
    ("Классика", "Emma", "Jane Austen", "pdf", "classic/Emma - Jane Austen.pdf"),
];

/// In-memory catalog holding [`BOOKS`].
pub(crate) async fn catalog() -> (Database, Repository) {
    let db = Database::connect_in_memory().await.unwrap();
    let repo = Repository::from(&db);
    for (genre, title, author, format, path) in BOOKS {
        repo.sync_entry(genre, title, author, format, Path::new(path)).await.unwrap();
    }
    (db, repo)
}

pub(crate) async fn book_id(repo: &Repository, title: &str) -> i64 {
    repo.search_candidates(&shelf_search::Retrieval::Phrase(title.to_lowercase()), 0, 100)
        .await
        .unwrap()
        .into_iter()
        .find(|book| book.title == title)
        .unwrap()
        .id
}
