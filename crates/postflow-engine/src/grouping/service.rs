//! Grouping run orchestration.

use postflow_core::models::GroupingOutcome;
use postflow_core::AppError;
use postflow_db::{GroupingRepository, MediaRepository, PostRepository, TransactionGuard};
use sqlx::PgPool;
use uuid::Uuid;

use super::policy::{select_media, GroupingPolicy};

/// Runs the grouping selector for a jobsite: lock, read pool, apply policy,
/// commit grouping + member tags + post in one transaction.
#[derive(Clone)]
pub struct GroupingService {
    pool: PgPool,
    /// Platform tag stamped on the created post.
    platform: String,
}

impl GroupingService {
    pub fn new(pool: PgPool, platform: String) -> Self {
        Self { pool, platform }
    }

    /// The grouping trigger. Returns the committed grouping and post ids, or
    /// `NoCandidateMedia` when the pool yields nothing under the policy.
    ///
    /// The jobsite row lock spans the whole read-modify-write cycle, so two
    /// runs over the same pool cannot both consume an item; a stale selection
    /// surfaces as `TransactionConflict` for the caller to retry.
    #[tracing::instrument(skip(self), fields(jobsite_id = %jobsite_id, policy = ?policy))]
    pub async fn run_for_jobsite(
        &self,
        jobsite_id: Uuid,
        policy: GroupingPolicy,
    ) -> Result<GroupingOutcome, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let owner_id = GroupingRepository::lock_jobsite(&mut tx, jobsite_id).await?;

        let pool_items = MediaRepository::list_ungrouped_in_run(&mut tx, jobsite_id).await?;
        if pool_items.is_empty() {
            tx.rollback().await?;
            return Err(AppError::NoCandidateMedia(format!(
                "No ungrouped media for jobsite {}",
                jobsite_id
            )));
        }

        let selected = select_media(policy, &pool_items);
        if selected.is_empty() {
            // Only FirstMatch can get here: no before/after pair in the pool.
            tx.rollback().await?;
            return Err(AppError::NoCandidateMedia(format!(
                "No combinable media for jobsite {}",
                jobsite_id
            )));
        }

        let grouping = GroupingRepository::insert(&mut tx, jobsite_id).await?;
        GroupingRepository::assign_members(&mut tx, grouping.id, jobsite_id, &selected).await?;

        let post = PostRepository::insert_for_grouping(
            &mut tx,
            owner_id,
            jobsite_id,
            grouping.id,
            &self.platform,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            grouping_id = %grouping.id,
            post_id = %post.id,
            media_count = selected.len(),
            "Committed media grouping"
        );

        Ok(GroupingOutcome {
            grouping_id: grouping.id,
            post_id: post.id,
            media_count: selected.len(),
        })
    }
}
