//! Post repository: creation, scheduling mutations, and the publisher's
//! polling surface.

use chrono::{DateTime, Utc};
use postflow_core::models::{Post, PostStatus, ScheduleAssignment};
use postflow_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::transaction::map_db_err;

const POST_COLUMNS: &str =
    "id, user_id, jobsite_id, grouping_id, platform, status, scheduled_for, created_at";

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Users that currently have posts waiting for a slot. Drives the
    /// recurring scheduling trigger; an empty result makes the sweep a no-op.
    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select"))]
    pub async fn users_with_pending(&self) -> Result<Vec<Uuid>, AppError> {
        sqlx::query_scalar::<Postgres, Uuid>(
            "SELECT DISTINCT user_id FROM posts WHERE status = 'not_scheduled'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "list users with pending posts"))
    }

    /// Scheduled posts whose slot has arrived. This is the downstream
    /// publisher's polling query; the engine itself never publishes.
    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select"))]
    pub async fn list_due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<Post>, AppError> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE status = 'scheduled' AND scheduled_for <= $1 \
             ORDER BY scheduled_for ASC"
        );
        sqlx::query_as::<Postgres, Post>(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "list due posts"))
    }

    /// Flip a post to `published` after the external platform publish.
    /// Guarded on `scheduled` so a double poll cannot regress state.
    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "update", db.record_id = %post_id))]
    pub async fn mark_published(&self, post_id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE posts SET status = 'published' WHERE id = $1 AND status = 'scheduled'")
                .bind(post_id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_db_err(e, "mark post published"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Post {} not found in scheduled state",
                post_id
            )));
        }
        Ok(())
    }

    /// Create the post for a freshly committed grouping, in `not_scheduled`
    /// state with no slot. The unique constraint on `grouping_id` keeps the
    /// grouping-post relationship 1:1 forever.
    pub async fn insert_for_grouping(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        jobsite_id: Uuid,
        grouping_id: Uuid,
        platform: &str,
    ) -> Result<Post, AppError> {
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            jobsite_id,
            grouping_id,
            platform: platform.to_string(),
            status: PostStatus::NotScheduled,
            scheduled_for: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO posts (id, user_id, jobsite_id, grouping_id, platform, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, 'not_scheduled', $6)",
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(post.jobsite_id)
        .bind(post.grouping_id)
        .bind(&post.platform)
        .bind(post.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_db_err(e, "insert post"))?;

        Ok(post)
    }

    /// Timestamp of the user's last scheduled post, the point the schedule
    /// cursor resumes from.
    pub async fn latest_scheduled_at(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        sqlx::query_scalar::<Postgres, Option<DateTime<Utc>>>(
            "SELECT MAX(scheduled_for) FROM posts WHERE user_id = $1 AND status = 'scheduled'",
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_db_err(e, "read schedule cursor"))
    }

    /// Not-yet-scheduled posts in creation order; earlier-created posts get
    /// earlier slots.
    pub async fn list_not_scheduled(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<Post>, AppError> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE user_id = $1 AND status = 'not_scheduled' \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<Postgres, Post>(&query)
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| map_db_err(e, "list not scheduled posts"))
    }

    /// Apply one run's slot assignments. Each update is guarded on
    /// `not_scheduled`; any miss aborts the batch so the persisted schedule
    /// never diverges from the cursor bookkeeping that produced it.
    pub async fn apply_assignments(
        tx: &mut Transaction<'_, Postgres>,
        assignments: &[ScheduleAssignment],
    ) -> Result<(), AppError> {
        for assignment in assignments {
            let result = sqlx::query(
                "UPDATE posts SET scheduled_for = $1, status = 'scheduled' \
                 WHERE id = $2 AND status = 'not_scheduled'",
            )
            .bind(assignment.scheduled_for)
            .bind(assignment.post_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_db_err(e, "apply schedule assignment"))?;

            if result.rows_affected() != 1 {
                return Err(AppError::TransactionConflict(format!(
                    "Post {} was no longer in not_scheduled state",
                    assignment.post_id
                )));
            }
        }
        Ok(())
    }
}
