//! Catalog synchronisation from the storage backend.
//!
//! The files are the source of truth; the catalog is derived from their
//! paths alone and file contents are never read.

mod parse;
mod stream;

pub use self::parse::{ParsedEntry, SkipReason};
pub use self::stream::{SyncEvent, SyncReport, sync, sync_library};
