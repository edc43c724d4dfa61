//! User repository. The engine reads only identity and plan.

use postflow_core::models::User;
use postflow_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::transaction::map_db_err;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %user_id))]
    pub async fn get(&self, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<Postgres, User>(
            "SELECT id, email, company_name, plan, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "get user"))?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Take the per-user exclusive lock that serializes scheduling runs, and
    /// read the plan under it. Two runs for the same user queue here; runs
    /// for different users never contend.
    pub async fn lock_plan(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<String, AppError> {
        sqlx::query_scalar::<Postgres, String>("SELECT plan FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_db_err(e, "lock user"))?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }
}
