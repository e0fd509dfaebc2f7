use crate::error::{ErrorKind, Result};
use crate::sync::parse::{ParsedEntry, SkipReason};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use shelf_catalog::{Repository, SyncedIds};
use shelf_storage::StorageBackend;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Progress events emitted by [`sync`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. [`Synced`](Self::Synced) or [`Skipped`](Self::Skipped) once per file
///    found, in listing order.
/// 3. [`Complete`](Self::Complete) exactly once, with the totals.
///
/// A catalog failure ends the stream with an `Err` item; `Complete` is then
/// never emitted.
#[derive(Debug)]
pub enum SyncEvent {
    Started,
    Synced { entry: ParsedEntry, ids: SyncedIds },
    Skipped { path: PathBuf, reason: SkipReason },
    Complete(SyncReport),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: u64,
    /// Files that could not be parsed, plus entries the backend failed to
    /// list.
    pub skipped: u64,
}

/// Walks the whole backend and upserts every parseable file into the
/// catalog.
///
/// Re-running is harmless: genres, books and files are upserted on their
/// natural keys, and a file that moved keeps its id with the new path.
/// Nothing is ever deleted.
pub fn sync<'a>(
    backend: &'a dyn StorageBackend,
    repo: &'a Repository,
    genres: &'a BTreeMap<String, String>,
) -> impl Stream<Item = Result<SyncEvent>> + 'a {
    stream! {
        yield Ok(SyncEvent::Started);
        let mut report = SyncReport::default();
        let mut files = backend.list_stream(None);
        while let Some(file) = files.next().await {
            let file = match file {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = ?e, "could not list library entry");
                    report.skipped += 1;
                    continue;
                },
            };
            let entry = match ParsedEntry::parse(&file, genres) {
                Ok(entry) => entry,
                Err(reason) => {
                    tracing::warn!(path = %file.path.display(), %reason, "skipping file");
                    report.skipped += 1;
                    yield Ok(SyncEvent::Skipped { path: file.path, reason });
                    continue;
                },
            };
            let ids = repo
                .sync_entry(&entry.genre, &entry.title, &entry.author, &entry.format, &entry.path)
                .await
                .or_raise(|| ErrorKind::Catalog);
            match ids {
                Ok(ids) => {
                    report.synced += 1;
                    yield Ok(SyncEvent::Synced { entry, ids });
                },
                Err(e) => {
                    yield Err(e);
                    return;
                },
            }
        }
        tracing::info!(synced = report.synced, skipped = report.skipped, "sync complete");
        yield Ok(SyncEvent::Complete(report));
    }
}

/// Runs [`sync`] to completion, returning only the totals.
pub async fn sync_library(
    backend: &dyn StorageBackend,
    repo: &Repository,
    genres: &BTreeMap<String, String>,
) -> Result<SyncReport> {
    let mut events = std::pin::pin!(sync(backend, repo, genres));
    let mut report = SyncReport::default();
    while let Some(event) = events.next().await {
        match event? {
            SyncEvent::Synced { entry, .. } => {
                tracing::debug!(title = %entry.title, author = %entry.author, format = %entry.format, "synced");
            },
            SyncEvent::Complete(totals) => report = totals,
            SyncEvent::Started | SyncEvent::Skipped { .. } => {},
        }
    }
    Ok(report)
}
