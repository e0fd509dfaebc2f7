//! Repository for genres, books and their file variants.
//!
//! Books belong to exactly one genre and own any number of file variants
//! (one per format). Deleting a genre cascades to its books, deleting a book
//! cascades to its files.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Book, BookFile, FileRow, Genre, path_to_row};
use async_trait::async_trait;
use exn::ResultExt;
use shelf_search::{CandidateSource, Pagination, Retrieval};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// One page of a genre listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

/// Identifiers produced by [`Repository::sync_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncedIds {
    pub genre_id: i64,
    pub book_id: i64,
    pub file_id: i64,
}

/// Read and write access to the catalog tables.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Genres
    // =========================================================================

    /// All genres, ordered by name.
    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        sqlx::query_as(include_str!("../queries/list_genres.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    pub async fn get_genre(&self, id: i64) -> Result<Option<Genre>> {
        sqlx::query_as(include_str!("../queries/get_genre.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    // =========================================================================
    // Books
    // =========================================================================

    pub async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        sqlx::query_as(include_str!("../queries/get_book.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// `"{title} — {author}"`, or `None` for an unknown book.
    pub async fn book_display_name(&self, id: i64) -> Result<Option<String>> {
        Ok(self.get_book(id).await?.map(|book| book.to_string()))
    }

    pub async fn count_books_in_genre(&self, genre_id: i64) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_books_in_genre.sql"))
            .bind(genre_id)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("book count"))
    }

    /// One page of a genre, ordered by title (then id, so that duplicate
    /// titles still page deterministically).
    ///
    /// The requested page is clamped into range; an empty genre yields no
    /// books and zero pages whatever page was asked for.
    #[instrument(skip(self))]
    pub async fn books_page_by_genre(&self, genre_id: i64, page: i64, page_size: u64) -> Result<BookPage> {
        let total = self.count_books_in_genre(genre_id).await?;
        let pagination = Pagination::compute(total, page, page_size);
        if pagination.is_empty() {
            return Ok(BookPage { books: Vec::new(), pagination });
        }
        let limit = i64::try_from(pagination.limit).or_raise(|| ErrorKind::InvalidData("page size"))?;
        let offset = i64::try_from(pagination.offset).or_raise(|| ErrorKind::InvalidData("page offset"))?;
        let books = sqlx::query_as(include_str!("../queries/books_page_by_genre.sql"))
            .bind(genre_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(BookPage { books, pagination })
    }

    /// Candidate retrieval for search: books whose title or author contains
    /// any of the retrieval patterns, case-insensitively, in id order.
    #[instrument(skip(self), fields(found = tracing::field::Empty))]
    pub async fn search_candidates(&self, retrieval: &Retrieval, offset: usize, limit: usize) -> Result<Vec<Book>> {
        let limit = i64::try_from(limit).or_raise(|| ErrorKind::InvalidData("candidate limit"))?;
        let offset = i64::try_from(offset).or_raise(|| ErrorKind::InvalidData("candidate offset"))?;
        if retrieval.patterns().is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, genre_id, title, author FROM books WHERE ");
        let mut any = builder.separated(" OR ");
        for pattern in retrieval.patterns() {
            let like = format!("%{}%", escape_like(&pattern.to_lowercase()));
            any.push("title_folded LIKE ")
                .push_bind_unseparated(like.clone())
                .push_unseparated(" ESCAPE '\\'");
            any.push("author_folded LIKE ")
                .push_bind_unseparated(like)
                .push_unseparated(" ESCAPE '\\'");
        }
        builder.push(" ORDER BY id LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
        let books: Vec<Book> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::Span::current().record("found", books.len());
        Ok(books)
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// All formats of a book, ordered by format.
    pub async fn list_files(&self, book_id: i64) -> Result<Vec<BookFile>> {
        let rows: Vec<FileRow> = sqlx::query_as(include_str!("../queries/list_files.sql"))
            .bind(book_id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(rows.into_iter().map(BookFile::from).collect())
    }

    /// Stored path (relative to the storage root) of one format of a book.
    pub async fn get_file_path(&self, book_id: i64, format: &str) -> Result<Option<PathBuf>> {
        let path: Option<String> = sqlx::query_scalar(include_str!("../queries/get_file_path.sql"))
            .bind(book_id)
            .bind(format.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(path.map(PathBuf::from))
    }

    // =========================================================================
    // Upserts
    // =========================================================================

    /// Returns the id of the genre with this display name, creating it if
    /// needed.
    pub async fn upsert_genre(&self, name: &str) -> Result<i64> {
        upsert_genre(&self.pool, name).await
    }

    /// Returns the id of the (genre, title, author) entry, creating it if
    /// needed.
    pub async fn upsert_book(&self, genre_id: i64, title: &str, author: &str) -> Result<i64> {
        upsert_book(&self.pool, genre_id, title, author).await
    }

    /// Records `path` as the location of `format` for a book. An existing
    /// (book, format) pair keeps its id and has its path updated, which is
    /// what happens when a file is moved on disk.
    pub async fn upsert_file(&self, book_id: i64, format: &str, path: &Path) -> Result<i64> {
        upsert_file(&self.pool, book_id, format, path).await
    }

    /// Genre, book and file upserts for one file on disk, in one transaction.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn sync_entry(
        &self,
        genre: &str,
        title: &str,
        author: &str,
        format: &str,
        path: &Path,
    ) -> Result<SyncedIds> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let genre_id = upsert_genre(&mut *tx, genre).await?;
        let book_id = upsert_book(&mut *tx, genre_id, title, author).await?;
        let file_id = upsert_file(&mut *tx, book_id, format, path).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(SyncedIds { genre_id, book_id, file_id })
    }
}

#[async_trait]
impl CandidateSource for Repository {
    type Entry = Book;

    async fn candidates(
        &self,
        retrieval: &Retrieval,
        offset: usize,
        limit: usize,
    ) -> shelf_search::error::Result<Vec<Book>> {
        self.search_candidates(retrieval, offset, limit)
            .await
            .or_raise(|| shelf_search::error::ErrorKind::Retrieval)
    }
}

async fn upsert_genre<'e>(executor: impl SqliteExecutor<'e>, name: &str) -> Result<i64> {
    sqlx::query_scalar(include_str!("../queries/upsert_genre.sql"))
        .bind(name)
        .fetch_one(executor)
        .await
        .or_raise(|| ErrorKind::Database)
}

async fn upsert_book<'e>(executor: impl SqliteExecutor<'e>, genre_id: i64, title: &str, author: &str) -> Result<i64> {
    sqlx::query_scalar(include_str!("../queries/upsert_book.sql"))
        .bind(genre_id)
        .bind(title)
        .bind(author)
        .bind(title.to_lowercase())
        .bind(author.to_lowercase())
        .fetch_one(executor)
        .await
        .or_raise(|| ErrorKind::Database)
}

async fn upsert_file<'e>(executor: impl SqliteExecutor<'e>, book_id: i64, format: &str, path: &Path) -> Result<i64> {
    sqlx::query_scalar(include_str!("../queries/upsert_file.sql"))
        .bind(book_id)
        .bind(format.to_lowercase())
        .bind(path_to_row(path)?)
        .fetch_one(executor)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
