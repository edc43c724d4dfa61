//! Scheduling run orchestration.

use chrono::Utc;
use postflow_core::models::{max_publish_floor, SubscriptionPlan};
use postflow_core::AppError;
use postflow_db::{MediaRepository, PostRepository, TransactionGuard, UserRepository};
use sqlx::PgPool;
use uuid::Uuid;

use super::cursor::{plan_assignments, PostWithFloor, ScheduleCursor};

/// Runs the post scheduler for one user: lock, resume cursor, plan slots,
/// apply all assignments in one transaction.
#[derive(Clone)]
pub struct SchedulerService {
    pool: PgPool,
}

impl SchedulerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The scheduling trigger. Assigns a slot to every `not_scheduled` post
    /// of the user and returns how many were scheduled; zero pending posts is
    /// a no-op, not an error, so re-running is idempotent.
    ///
    /// The user row lock spans the whole read-modify-write cycle: the cursor,
    /// the plan, and the pending set are all read under it, so concurrent
    /// runs for the same user cannot interleave and assign colliding slots.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn schedule_for_user(&self, user_id: Uuid) -> Result<usize, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let plan = SubscriptionPlan::from_plan_str(&UserRepository::lock_plan(&mut tx, user_id).await?);

        let last_scheduled = PostRepository::latest_scheduled_at(&mut tx, user_id).await?;
        let pending = PostRepository::list_not_scheduled(&mut tx, user_id).await?;
        if pending.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        // One reference clock for the run: every floor is relative to it.
        let now = Utc::now();
        let mut cursor = ScheduleCursor::resume(last_scheduled, now, plan);

        let mut with_floors = Vec::with_capacity(pending.len());
        for post in &pending {
            let tags = MediaRepository::earliest_publish_tags(&mut tx, post.grouping_id).await?;
            with_floors.push(PostWithFloor {
                post_id: post.id,
                floor: max_publish_floor(tags, now),
            });
        }

        let assignments = plan_assignments(&mut cursor, &with_floors);
        PostRepository::apply_assignments(&mut tx, &assignments).await?;

        tx.commit().await?;

        tracing::info!(
            scheduled = assignments.len(),
            plan = ?plan,
            "Scheduled pending posts"
        );

        Ok(assignments.len())
    }
}
