//! Scheduling sweep: finds users with pending posts and runs the scheduler
//! for each, retrying transaction conflicts with capped exponential backoff.

use std::time::Duration;

use postflow_core::AppError;
use postflow_db::PostRepository;
use postflow_engine::SchedulerService;
use tokio::time::sleep;
use uuid::Uuid;

/// Maximum delay in seconds before retrying a conflicted run. Caps the
/// exponential backoff so high retry counts stay bounded.
pub const MAX_RETRY_BACKOFF_SECS: u64 = 300;

/// Backoff in seconds for a given retry count (exponential with cap).
#[inline]
pub fn conflict_backoff_seconds(retry_count: u32) -> u64 {
    2_u64.saturating_pow(retry_count).min(MAX_RETRY_BACKOFF_SECS)
}

/// One sweep over every user with `not_scheduled` posts. Per-user failures
/// are logged and skipped so one bad timeline cannot stall the rest; the
/// total number of scheduled posts is returned.
pub async fn run_scheduling_sweep(
    scheduler: &SchedulerService,
    posts: &PostRepository,
    max_conflict_retries: u32,
) -> Result<usize, AppError> {
    let user_ids = posts.users_with_pending().await?;
    if user_ids.is_empty() {
        tracing::debug!("No users with pending posts, sweep is a no-op");
        return Ok(0);
    }

    let mut total = 0;
    for user_id in user_ids {
        match schedule_with_retry(scheduler, user_id, max_conflict_retries).await {
            Ok(count) => total += count,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Scheduling run failed for user");
            }
        }
    }
    Ok(total)
}

/// Run the scheduler for one user, retrying only `TransactionConflict`; any
/// other error aborts immediately.
async fn schedule_with_retry(
    scheduler: &SchedulerService,
    user_id: Uuid,
    max_retries: u32,
) -> Result<usize, AppError> {
    let mut retry = 0;
    loop {
        match scheduler.schedule_for_user(user_id).await {
            Err(AppError::TransactionConflict(reason)) if retry < max_retries => {
                let backoff = conflict_backoff_seconds(retry);
                retry += 1;
                tracing::warn!(
                    user_id = %user_id,
                    retry,
                    backoff_secs = backoff,
                    %reason,
                    "Scheduling run conflicted, retrying"
                );
                sleep(Duration::from_secs(backoff)).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        assert_eq!(conflict_backoff_seconds(0), 1);
        assert_eq!(conflict_backoff_seconds(1), 2);
        assert_eq!(conflict_backoff_seconds(3), 8);
        assert_eq!(conflict_backoff_seconds(20), MAX_RETRY_BACKOFF_SECS);
        assert_eq!(conflict_backoff_seconds(u32::MAX), MAX_RETRY_BACKOFF_SECS);
    }
}
