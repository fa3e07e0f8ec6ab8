//! # Transaction Scope
//!
//! Runs a unit of work on one transaction and guarantees it either commits
//! fully or rolls back fully.
//!
//! ## Exit Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE ─✗─► DbError::TransactionFailed { stage: "begin" }     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  work(&mut conn)                                                        │
//! │       │                                                                 │
//! │       ├── Ok(value) ──► commit ──✓──► Ok(value)                         │
//! │       │                   └────✗──► TransactionFailed { "commit" }      │
//! │       │                             (value is discarded)                │
//! │       │                                                                 │
//! │       ├── Err(cause) ─► rollback ─✓──► Err(cause)   (unchanged)         │
//! │       │                   └─────✗──► RollbackFailed { cause, source }   │
//! │       │                                                                 │
//! │       └── future dropped / panic ──► sqlx::Transaction dropped          │
//! │                                       → rollback, nothing committed     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The work closure only ever sees the transaction's connection, never the
//! pool, so it has no way to open a second transaction for the same write.
//!
//! Every unit of work reads before it writes (existence checks, merge on
//! update). A deferred `BEGIN` would take the write lock only at the first
//! write, and under WAL SQLite refuses that upgrade with `SQLITE_BUSY`
//! without waiting once another writer has committed. `BEGIN IMMEDIATE`
//! takes the write lock up front, so concurrent writers queue on the busy
//! timeout instead.
//!
//! ## Usage
//! ```rust,ignore
//! let project = run_in_transaction(&pool, move |conn| {
//!     Box::pin(async move {
//!         let stamp = queries::insert(&mut *conn, &project).await?;
//!         // ... more statements on the same connection
//!         Ok(project)
//!     })
//! })
//! .await?;
//! ```

use std::future::Future;
use std::pin::Pin;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Boxed future returned by a unit of work, borrowing the transaction's
/// connection for `'c`.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = DbResult<T>> + Send + 'c>>;

/// Runs `work` inside a single transaction on `pool`.
///
/// Safe to call concurrently: each call acquires its own connection and
/// its own transaction.
pub async fn run_in_transaction<T, F>(pool: &SqlitePool, work: F) -> DbResult<T>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> TxFuture<'c, T>,
{
    let mut tx = pool
        .begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|source| DbError::TransactionFailed {
            stage: "begin",
            source,
        })?;

    let outcome = work(&mut *tx).await;

    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|source| DbError::TransactionFailed {
                    stage: "commit",
                    source,
                })?;
            Ok(value)
        }
        Err(cause) => match tx.rollback().await {
            Ok(()) => {
                debug!(error = ?cause, "Transaction rolled back");
                Err(cause)
            }
            Err(source) => {
                warn!(error = ?cause, rollback_error = ?source, "Rollback failed");
                Err(DbError::RollbackFailed {
                    cause: Box::new(cause),
                    source,
                })
            }
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use ilm_core::ValidationError;

    async fn scratch_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE scratch (id INTEGER PRIMARY KEY, note TEXT NOT NULL)")
            .execute(db.pool())
            .await
            .unwrap();
        db
    }

    async fn count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM scratch")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_commit_on_success() {
        let db = scratch_db().await;

        let inserted = run_in_transaction(db.pool(), |conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO scratch (note) VALUES ('a'), ('b')")
                    .execute(&mut *conn)
                    .await?;
                Ok(2)
            })
        })
        .await
        .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(count(&db).await, 2);
    }

    #[tokio::test]
    async fn test_rollback_returns_original_error() {
        let db = scratch_db().await;

        let err = run_in_transaction(db.pool(), |conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO scratch (note) VALUES ('a')")
                    .execute(&mut *conn)
                    .await?;
                Err::<(), _>(DbError::from(ValidationError::required("note")))
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::Validation(ValidationError::Required { .. })));
        assert_eq!(count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_begin_failure_on_closed_pool() {
        let db = scratch_db().await;
        db.close().await;

        let err = run_in_transaction(db.pool(), |_conn| Box::pin(async move { Ok(()) }))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::TransactionFailed { stage: "begin", .. }));
    }

    #[tokio::test]
    async fn test_commit_failure_discards_value() {
        let db = scratch_db().await;
        sqlx::query(
            "CREATE TABLE scratch_child (id INTEGER PRIMARY KEY, \
             parent_id INTEGER NOT NULL REFERENCES scratch(id))",
        )
        .execute(db.pool())
        .await
        .unwrap();

        // Deferred foreign keys let the orphan insert succeed and make COMMIT
        // the statement that fails.
        let err = run_in_transaction(db.pool(), |conn| {
            Box::pin(async move {
                sqlx::query("PRAGMA defer_foreign_keys = ON")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("INSERT INTO scratch_child (parent_id) VALUES (4242)")
                    .execute(&mut *conn)
                    .await?;
                Ok("written")
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::TransactionFailed { stage: "commit", .. }));
        assert_eq!(err.class(), crate::error::ErrorClass::Internal);

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scratch_child")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);

        // The connection went back to the pool usable.
        let inserted = run_in_transaction(db.pool(), |conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO scratch (note) VALUES ('after')")
                    .execute(&mut *conn)
                    .await?;
                Ok(1)
            })
        })
        .await
        .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_dropped_work_commits_nothing() {
        let db = scratch_db().await;

        let pending = run_in_transaction(db.pool(), |conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO scratch (note) VALUES ('a')")
                    .execute(&mut *conn)
                    .await?;
                std::future::pending::<()>().await;
                Ok(())
            })
        });
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(50), pending).await;

        assert!(timed_out.is_err());
        assert_eq!(count(&db).await, 0);
    }
}
