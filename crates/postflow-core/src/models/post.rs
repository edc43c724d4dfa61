use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post lifecycle. The engine transitions only `NotScheduled -> Scheduled`;
/// `Draft` and `Published` belong to the surrounding layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "post_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    NotScheduled,
    Scheduled,
    Published,
}

/// The unit the scheduler operates on. Tied 1:1 to a grouping once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub jobsite_id: Uuid,
    pub grouping_id: Uuid,
    pub platform: String,
    pub status: PostStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One computed slot assignment, applied atomically with the rest of its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleAssignment {
    pub post_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
}
