//! Per-user daily quota.
//!
//! Every (user, day) pair has a counter that can only go up to the configured
//! ceiling. The day is always supplied by the caller so that tests (and
//! callers in other time zones) decide what "today" is.

use crate::Database;
use crate::config::QuotaConfig;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqlitePool;
use time::Date;
use tracing::instrument;

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Outcome of [`QuotaRepository::increment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Increment {
    /// Count after the call: the new value when accepted, the unchanged
    /// current value when rejected.
    pub count: u32,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: SqlitePool,
    daily_limit: u32,
}
impl QuotaRepository {
    pub fn new(db: &Database, config: &QuotaConfig) -> Self {
        Self {
            pool: db.pool().clone(),
            daily_limit: config.daily_limit,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Usage so far; a missing record counts as zero.
    pub async fn count(&self, user_id: i64, date: Date) -> Result<u32> {
        let count: Option<i64> = sqlx::query_scalar(include_str!("../queries/quota_count.sql"))
            .bind(user_id)
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u32::try_from(count.unwrap_or(0)).or_raise(|| ErrorKind::InvalidData("quota count"))
    }

    /// Whether the user has at least one use left on `date`.
    pub async fn check(&self, user_id: i64, date: Date) -> Result<bool> {
        Ok(self.count(user_id, date).await? < self.daily_limit)
    }

    /// Uses one slot if any is left.
    ///
    /// Check and increment happen in a single statement, so concurrent calls
    /// for the same user and day can never push the count past the ceiling.
    /// A rejected call does not modify anything.
    #[instrument(skip(self), fields(limit = self.daily_limit))]
    pub async fn increment(&self, user_id: i64, date: Date) -> Result<Increment> {
        if self.daily_limit == 0 {
            return Ok(Increment {
                count: self.count(user_id, date).await?,
                accepted: false,
            });
        }
        let updated = match self.try_increment(user_id, date).await {
            Err(e) if is_busy(&e) => {
                tracing::debug!("quota store busy, retrying once");
                self.try_increment(user_id, date).await
            },
            result => result,
        };
        let updated = match updated {
            Ok(updated) => updated,
            Err(e) if is_busy(&e) => return Err(e).or_raise(|| ErrorKind::Conflict),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Database),
        };
        match updated {
            Some(count) => Ok(Increment {
                count: u32::try_from(count).or_raise(|| ErrorKind::InvalidData("quota count"))?,
                accepted: true,
            }),
            None => {
                let count = self.count(user_id, date).await?;
                tracing::warn!(count, "daily limit reached");
                Ok(Increment { count, accepted: false })
            },
        }
    }

    /// Returns the new count, or `None` when the ceiling was already reached.
    async fn try_increment(&self, user_id: i64, date: Date) -> sqlx::Result<Option<i64>> {
        sqlx::query_scalar(include_str!("../queries/quota_increment.sql"))
            .bind(user_id)
            .bind(date.to_string())
            .bind(i64::from(self.daily_limit))
            .fetch_optional(&self.pool)
            .await
    }
}

/// `SQLITE_BUSY` or `SQLITE_LOCKED`, including their extended codes.
fn is_busy(error: &sqlx::Error) -> bool {
    let sqlx::Error::Database(error) = error else {
        return false;
    };
    error
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use futures::future::join_all;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 03 - 14);
    const TOMORROW: Date = date!(2025 - 03 - 15);

    fn file_config(dir: &std::path::Path) -> DatabaseConfig {
        DatabaseConfig {
            path: dir.join("quota.sqlite"),
            ..DatabaseConfig::default()
        }
    }

    async fn quota(daily_limit: u32) -> QuotaRepository {
        let db = Database::connect_in_memory().await.unwrap();
        QuotaRepository::new(&db, &QuotaConfig { daily_limit })
    }

    #[tokio::test]
    async fn test_fresh_user_has_quota() {
        let quota = quota(10).await;
        assert_eq!(quota.count(1, TODAY).await.unwrap(), 0);
        assert!(quota.check(1, TODAY).await.unwrap());
    }

    #[tokio::test]
    async fn test_sequential_increments_up_to_ceiling() {
        let quota = quota(10).await;
        for expected in 1..=10 {
            let increment = quota.increment(42, TODAY).await.unwrap();
            assert_eq!(increment, Increment { count: expected, accepted: true });
        }
        assert!(!quota.check(42, TODAY).await.unwrap());

        let rejected = quota.increment(42, TODAY).await.unwrap();
        assert_eq!(rejected, Increment { count: 10, accepted: false });
        assert_eq!(quota.count(42, TODAY).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_quota_is_per_user_and_per_day() {
        let quota = quota(1).await;
        assert!(quota.increment(1, TODAY).await.unwrap().accepted);
        assert!(!quota.increment(1, TODAY).await.unwrap().accepted);
        assert!(quota.increment(2, TODAY).await.unwrap().accepted);
        assert!(quota.increment(1, TOMORROW).await.unwrap().accepted);
        assert_eq!(quota.count(1, TODAY).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_ceiling_rejects_everything() {
        let quota = quota(0).await;
        assert!(!quota.check(1, TODAY).await.unwrap());
        assert_eq!(quota.increment(1, TODAY).await.unwrap(), Increment { count: 0, accepted: false });
    }

    #[tokio::test]
    async fn test_concurrent_increments_never_exceed_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&file_config(dir.path())).await.unwrap();
        let quota = QuotaRepository::new(&db, &QuotaConfig { daily_limit: 10 });

        let results = join_all((0..25).map(|_| quota.increment(7, TODAY))).await;
        let results: Vec<Increment> = results.into_iter().map(|r| r.unwrap()).collect();

        let mut accepted: Vec<u32> = results.iter().filter(|r| r.accepted).map(|r| r.count).collect();
        accepted.sort_unstable();
        assert_eq!(accepted, (1..=10).collect::<Vec<_>>());
        assert!(results.iter().filter(|r| !r.accepted).all(|r| r.count == 10));
        assert_eq!(quota.count(7, TODAY).await.unwrap(), 10);
        db.close().await;
    }

    #[tokio::test]
    async fn test_last_slot_goes_to_exactly_one_caller() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&file_config(dir.path())).await.unwrap();
        let quota = QuotaRepository::new(&db, &QuotaConfig { daily_limit: 3 });
        for _ in 0..2 {
            quota.increment(9, TODAY).await.unwrap();
        }
        let (a, b) = tokio::join!(quota.increment(9, TODAY), quota.increment(9, TODAY));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(a.accepted ^ b.accepted, "{a:?} / {b:?}");
        assert_eq!(quota.count(9, TODAY).await.unwrap(), 3);
        db.close().await;
    }

    #[tokio::test]
    async fn test_locked_store_is_a_conflict_and_changes_nothing() {
        use sqlx::Connection;
        use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("quota.sqlite"),
            max_connections: 2,
            busy_timeout_ms: 50,
        };
        let db = Database::open(&config).await.unwrap();
        let quota = QuotaRepository::new(&db, &QuotaConfig { daily_limit: 10 });
        quota.increment(3, TODAY).await.unwrap();

        // Another writer holds the lock for the whole attempt and its retry.
        let mut writer = SqliteConnection::connect_with(&SqliteConnectOptions::new().filename(&config.path))
            .await
            .unwrap();
        sqlx::query("BEGIN IMMEDIATE").execute(&mut writer).await.unwrap();

        let err = quota.increment(3, TODAY).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict), "{err:?}");
        assert!(err.is_retryable());
        assert_eq!(quota.count(3, TODAY).await.unwrap(), 1);

        sqlx::query("ROLLBACK").execute(&mut writer).await.unwrap();
        writer.close().await.unwrap();
        assert_eq!(quota.increment(3, TODAY).await.unwrap(), Increment { count: 2, accepted: true });
        db.close().await;
    }
}
