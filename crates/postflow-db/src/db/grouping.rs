//! Media grouping repository: the committed side of the grouping selector.

use chrono::Utc;
use postflow_core::models::MediaGrouping;
use postflow_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::transaction::map_db_err;

#[derive(Clone)]
pub struct GroupingRepository {
    pool: PgPool,
}

impl GroupingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_groupings", db.operation = "select", db.record_id = %grouping_id))]
    pub async fn get(&self, grouping_id: Uuid) -> Result<MediaGrouping, AppError> {
        sqlx::query_as::<Postgres, MediaGrouping>(
            "SELECT id, jobsite_id, caption, created_at FROM media_groupings WHERE id = $1",
        )
        .bind(grouping_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "get grouping"))?
        .ok_or_else(|| AppError::NotFound(format!("Grouping {} not found", grouping_id)))
    }

    /// Store the caption produced by the upstream captioning collaborator.
    /// The scheduler never reads this; posts schedule with or without it.
    #[tracing::instrument(skip(self, caption), fields(db.table = "media_groupings", db.operation = "update", db.record_id = %grouping_id))]
    pub async fn set_caption(&self, grouping_id: Uuid, caption: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE media_groupings SET caption = $1 WHERE id = $2")
            .bind(caption)
            .bind(grouping_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "set grouping caption"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Grouping {} not found",
                grouping_id
            )));
        }
        Ok(())
    }

    /// Take the per-jobsite exclusive lock that serializes grouping runs,
    /// and read the owner under it. Concurrent runs over the same jobsite
    /// queue here; runs for different jobsites never contend.
    pub async fn lock_jobsite(
        tx: &mut Transaction<'_, Postgres>,
        jobsite_id: Uuid,
    ) -> Result<Uuid, AppError> {
        sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT user_id FROM jobsites WHERE id = $1 FOR UPDATE",
        )
        .bind(jobsite_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_db_err(e, "lock jobsite"))?
        .ok_or_else(|| AppError::NotFound(format!("Jobsite {} not found", jobsite_id)))
    }

    /// Insert the grouping row. Callers assign members in the same
    /// transaction; a grouping must never be visible with zero members.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        jobsite_id: Uuid,
    ) -> Result<MediaGrouping, AppError> {
        let grouping = MediaGrouping {
            id: Uuid::new_v4(),
            jobsite_id,
            caption: None,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO media_groupings (id, jobsite_id, created_at) VALUES ($1, $2, $3)")
            .bind(grouping.id)
            .bind(grouping.jobsite_id)
            .bind(grouping.created_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_db_err(e, "insert grouping"))?;

        Ok(grouping)
    }

    /// Tag every selected item with the grouping id, guarded by
    /// `grouping_id IS NULL` so an item is consumed at most once, ever.
    /// A row count short of the selection means another run grabbed some of
    /// the items; the whole run must roll back and be retried.
    pub async fn assign_members(
        tx: &mut Transaction<'_, Postgres>,
        grouping_id: Uuid,
        jobsite_id: Uuid,
        media_ids: &[Uuid],
    ) -> Result<(), AppError> {
        if media_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "Cannot create a grouping with no members".to_string(),
            ));
        }

        let result = sqlx::query(
            "UPDATE media SET grouping_id = $1 \
             WHERE id = ANY($2) AND jobsite_id = $3 AND grouping_id IS NULL",
        )
        .bind(grouping_id)
        .bind(media_ids)
        .bind(jobsite_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_db_err(e, "assign grouping members"))?;

        if result.rows_affected() != media_ids.len() as u64 {
            return Err(AppError::TransactionConflict(format!(
                "Only {} of {} selected media items were still ungrouped",
                result.rows_affected(),
                media_ids.len()
            )));
        }
        Ok(())
    }
}
