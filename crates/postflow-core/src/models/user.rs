use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

/// Subscription tier driving posting cadence.
///
/// Stored as free text in `users.plan`; parsing fails open to `FreeTrial` so
/// an unrecognized plan value degrades to the slowest cadence instead of
/// blocking a user's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    FreeTrial,
    Starter,
    Premium,
}

impl SubscriptionPlan {
    pub fn from_plan_str(plan: &str) -> SubscriptionPlan {
        match plan {
            "starter" => SubscriptionPlan::Starter,
            "premium" => SubscriptionPlan::Premium,
            // Everything else, including "free_trial", falls open to the
            // slowest cadence rather than blocking a user's schedule.
            _ => SubscriptionPlan::FreeTrial,
        }
    }

    /// Target posts per week for this tier.
    pub fn posts_per_week(&self) -> i64 {
        match self {
            SubscriptionPlan::FreeTrial => 2,
            SubscriptionPlan::Starter => 4,
            SubscriptionPlan::Premium => 7,
        }
    }

    /// Interval between consecutive posts. Computed in whole seconds so
    /// fractional-day cadences (starter: 1.75 days) stay exact.
    pub fn posting_interval(&self) -> Duration {
        Duration::seconds(SECONDS_PER_WEEK / self.posts_per_week())
    }
}

/// User entity, reduced to what the engine reads. The scheduling run
/// serializes on this row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub company_name: Option<String>,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn subscription_plan(&self) -> SubscriptionPlan {
        SubscriptionPlan::from_plan_str(&self.plan)
    }
}
