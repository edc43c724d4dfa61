//! Database transaction utilities
//!
//! A grouping or scheduling run is a single read-modify-write cycle; this
//! module provides the guard that spans it and the error mapping that turns
//! concurrent-run collisions into retryable `TransactionConflict`s.

use postflow_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};

/// SQLSTATEs raised when two runs collide on the same rows: serialization
/// failure, deadlock detected, lock not available.
const CONFLICT_SQLSTATES: &[&str] = &["40001", "40P01", "55P03"];

/// Map a sqlx error to the engine's error model. Conflict SQLSTATEs become
/// `TransactionConflict` so callers retry with backoff instead of treating the
/// collision as a storage fault.
pub fn map_db_err(err: sqlx::Error, operation: &str) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if let Some(code) = db_err.code() {
            if CONFLICT_SQLSTATES.contains(&code.as_ref()) {
                return AppError::TransactionConflict(format!(
                    "{} collided with a concurrent run",
                    operation
                ));
            }
        }
    }
    AppError::Database(err)
}

/// A database transaction wrapper holding one run's read-modify-write cycle.
///
/// Repository functions that participate in a run take `&mut Transaction`;
/// the owning service begins the guard, passes it through each step, and
/// commits once everything is assigned. Dropping the guard without an
/// explicit commit discards the run.
pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Postgres>>,
}

impl<'a> TransactionGuard<'a> {
    /// Begin a new database transaction
    pub async fn begin(pool: &'a PgPool) -> Result<Self, AppError> {
        let transaction = pool
            .begin()
            .await
            .map_err(|e| map_db_err(e, "begin transaction"))?;

        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Commit the transaction
    ///
    /// After calling this, the transaction is consumed and cannot be used
    /// further. Serialization failures surfacing at commit time map to
    /// `TransactionConflict` like any other collision.
    pub async fn commit(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.commit()
                .await
                .map_err(|e| map_db_err(e, "commit transaction"))?;
        }
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await.map_err(AppError::Database)?;
        }
        Ok(())
    }
}

impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Postgres>;

    fn deref(&self) -> &Self::Target {
        self.transaction
            .as_ref()
            .expect("Transaction was already committed or rolled back")
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.transaction
            .as_mut()
            .expect("Transaction was already committed or rolled back")
    }
}

impl<'a> Drop for TransactionGuard<'a> {
    fn drop(&mut self) {
        // A guard dropped mid-run means the run failed; the connection pool
        // rolls the open transaction back when the connection is returned.
        if self.transaction.is_some() {
            tracing::warn!("Transaction dropped without explicit commit - run discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postflow_core::ErrorMetadata;

    #[test]
    fn test_non_conflict_errors_stay_database_errors() {
        let err = map_db_err(sqlx::Error::PoolClosed, "apply schedule");
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
