//! Genre listing and paging.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::{Book, BookPage, CatalogConfig, Genre, Repository};
use tracing::instrument;

/// One page of books in a genre, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenrePage {
    pub books: Vec<Book>,
    /// 1-based page actually shown; 0 when the genre is empty.
    pub page: u64,
    pub total_pages: u64,
}

impl GenrePage {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl From<BookPage> for GenrePage {
    fn from(page: BookPage) -> Self {
        Self {
            books: page.books,
            page: page.pagination.page,
            total_pages: page.pagination.total_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Browser {
    repo: Repository,
    page_size: u64,
}

impl Browser {
    pub fn new(repo: Repository, config: &CatalogConfig) -> Self {
        Self {
            repo,
            page_size: config.page_size,
        }
    }

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.repo.list_genres().await.or_raise(|| ErrorKind::Catalog)
    }

    /// Books of a genre, by title. Out-of-range pages land on the nearest
    /// existing page; an unknown or empty genre has no pages at all.
    #[instrument(skip(self))]
    pub async fn genre_page(&self, genre_id: i64, page: i64) -> Result<GenrePage> {
        let page = self
            .repo
            .books_page_by_genre(genre_id, page, self.page_size)
            .await
            .or_raise(|| ErrorKind::Catalog)?;
        Ok(GenrePage::from(page))
    }
}
