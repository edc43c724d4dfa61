use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Jobsite entity. The grouping run serializes on this row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Jobsite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub created_at: DateTime<Utc>,
}
