//! Services on top of the catalog, storage and completion crates.
//!
//! These are what a chat front end calls. Each returns plain data, or an
//! error whose [`MessageCategory`] says what to show the user.
//!
//! - [`sync`]: rebuild the catalog from the storage backend.
//! - [`Browser`]: genres and paged genre listings.
//! - [`Searcher`]: fuzzy search with configured defaults.
//! - [`Downloads`]: formats of a book and where to deliver them from.
//! - [`QaService`]: quota-metered questions about a book.

mod browse;
mod download;
pub mod error;
mod qa;
mod search;
pub mod sync;
#[cfg(test)]
mod testing;

pub use crate::browse::{Browser, GenrePage};
pub use crate::download::{Download, Downloads, UNKNOWN_BOOK};
pub use crate::error::{MessageCategory, NotFound};
pub use crate::qa::{Answer, Begin, QaService, QaState, Reply, Sessions};
pub use crate::search::Searcher;
