use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed, immutable bundle of media items destined for one post.
/// Created atomically with its first member assignment; never exists empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MediaGrouping {
    pub id: Uuid,
    pub jobsite_id: Uuid,
    /// Filled asynchronously by the captioning collaborator.
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a grouping run: the committed grouping and the post created for
/// it, in `not_scheduled` state.
#[derive(Debug, Clone, Serialize)]
pub struct GroupingOutcome {
    pub grouping_id: Uuid,
    pub post_id: Uuid,
    pub media_count: usize,
}
