//! Access to the book library on disk.
//!
//! The library is a directory tree of `<genre>/<Title> - <Author>.<ext>`
//! files. This crate only reads it: listing for catalog sync, and resolving
//! stored relative paths for delivery.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::{FileInfo, format_of};
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
