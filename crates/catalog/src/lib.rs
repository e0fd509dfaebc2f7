//! SQLite catalog store for the book library.
//!
//! The catalog is rebuilt from the storage root by the sync service; the
//! files on disk are the source of truth for genres, books and formats. The
//! quota table is the only state that exists nowhere else.
//!
//! # Tables
//! - **genres**: display names, unique.
//! - **books**: (genre, title, author), unique within a genre. Also holds
//!   Unicode-folded copies of title and author for case-insensitive search.
//! - **book_files**: one stored path per (book, format).
//! - **user_daily_limits**: one counter per (user, day).

mod config;
mod db;
pub mod error;
mod models;
mod quota;
mod repo;

pub use crate::config::{CatalogConfig, DatabaseConfig, QuotaConfig};
pub use crate::db::{DEFAULT_MAX_CONNECTIONS, Database};
pub use crate::models::{Book, BookFile, Genre};
pub use crate::quota::{Increment, QuotaRepository};
pub use crate::repo::{BookPage, Repository, SyncedIds};
