//! The per-user schedule cursor and the pure slot planner.
//!
//! The cursor is explicit data recomputed from persisted state at the start
//! of every run; nothing is retained in process memory between runs, which is
//! what makes the per-user locking requirement explicit rather than
//! incidental.

use chrono::{DateTime, Duration, Utc};
use postflow_core::models::{ScheduleAssignment, SubscriptionPlan};
use uuid::Uuid;

/// The next available publish slot for a user plus the cadence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCursor {
    next_slot: DateTime<Utc>,
    interval: Duration,
}

impl ScheduleCursor {
    /// Resume from the latest scheduled post, or from `now` when the user has
    /// none. The first pending post lands one interval after that point.
    pub fn resume(
        last_scheduled: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        plan: SubscriptionPlan,
    ) -> Self {
        let interval = plan.posting_interval();
        Self {
            next_slot: last_scheduled.unwrap_or(now) + interval,
            interval,
        }
    }

    /// Assign the next slot, honoring an optional earliest-publish floor: the
    /// slot is pulled forward to the floor when the cadence would land too
    /// early, never pulled back. The cursor then advances one interval past
    /// whatever was assigned, so a bump propagates to every later post.
    pub fn place(&mut self, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
        if let Some(floor) = floor {
            if self.next_slot < floor {
                self.next_slot = floor;
            }
        }
        let assigned = self.next_slot;
        self.next_slot = assigned + self.interval;
        assigned
    }

    pub fn next_slot(&self) -> DateTime<Utc> {
        self.next_slot
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// One pending post with its strictest media floor already computed.
#[derive(Debug, Clone, Copy)]
pub struct PostWithFloor {
    pub post_id: Uuid,
    pub floor: Option<DateTime<Utc>>,
}

/// Plan one run's assignments in creation order. Pure; the caller applies
/// the result atomically or not at all.
pub fn plan_assignments(
    cursor: &mut ScheduleCursor,
    pending: &[PostWithFloor],
) -> Vec<ScheduleAssignment> {
    pending
        .iter()
        .map(|post| ScheduleAssignment {
            post_id: post.post_id,
            scheduled_for: cursor.place(post.floor),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(n: usize) -> Vec<PostWithFloor> {
        (0..n)
            .map(|_| PostWithFloor {
                post_id: Uuid::new_v4(),
                floor: None,
            })
            .collect()
    }

    #[test]
    fn test_starter_plan_spacing() {
        // Starter (4/week, 1.75 days): one scheduled post at day 0, two
        // pending with no constraints land at day 1.75 and day 3.5.
        let day0 = Utc::now();
        let mut cursor = ScheduleCursor::resume(Some(day0), day0, SubscriptionPlan::Starter);
        let posts = pending(2);
        let assigned = plan_assignments(&mut cursor, &posts);

        let interval = Duration::seconds(151_200);
        assert_eq!(assigned[0].scheduled_for, day0 + interval);
        assert_eq!(assigned[1].scheduled_for, day0 + interval + interval);
    }

    #[test]
    fn test_floor_bumps_slot_and_following_posts_ride_the_bump() {
        // A 1-month floor where cadence would land at day 2: the post moves
        // to day 30 and the next slot is 30 + interval, not 2 + interval.
        let now = Utc::now();
        let day0 = now - Duration::seconds(302_400) + Duration::days(2);
        let mut cursor = ScheduleCursor::resume(Some(day0), now, SubscriptionPlan::FreeTrial);
        assert_eq!(cursor.next_slot(), now + Duration::days(2));

        let posts = vec![
            PostWithFloor {
                post_id: Uuid::new_v4(),
                floor: Some(now + Duration::days(30)),
            },
            PostWithFloor {
                post_id: Uuid::new_v4(),
                floor: None,
            },
        ];
        let assigned = plan_assignments(&mut cursor, &posts);
        assert_eq!(assigned[0].scheduled_for, now + Duration::days(30));
        assert_eq!(
            assigned[1].scheduled_for,
            now + Duration::days(30) + Duration::seconds(302_400)
        );
    }

    #[test]
    fn test_floor_never_pulls_a_slot_earlier() {
        let now = Utc::now();
        let mut cursor = ScheduleCursor::resume(Some(now), now, SubscriptionPlan::Premium);
        // An ASAP floor (= now) is below the cadence slot; cadence wins.
        let assigned = cursor.place(Some(now));
        assert_eq!(assigned, now + Duration::days(1));
    }

    #[test]
    fn test_resume_without_history_starts_from_now() {
        let now = Utc::now();
        let cursor = ScheduleCursor::resume(None, now, SubscriptionPlan::Premium);
        assert_eq!(cursor.next_slot(), now + Duration::days(1));
    }

    #[test]
    fn test_strictly_increasing_by_interval() {
        let now = Utc::now();
        let mut cursor = ScheduleCursor::resume(None, now, SubscriptionPlan::FreeTrial);
        let posts = pending(5);
        let assigned = plan_assignments(&mut cursor, &posts);
        for pair in assigned.windows(2) {
            assert_eq!(
                pair[1].scheduled_for - pair[0].scheduled_for,
                SubscriptionPlan::FreeTrial.posting_interval()
            );
        }
    }

    #[test]
    fn test_no_pending_is_a_noop() {
        let now = Utc::now();
        let mut cursor = ScheduleCursor::resume(None, now, SubscriptionPlan::Starter);
        let before = cursor.next_slot();
        assert!(plan_assignments(&mut cursor, &[]).is_empty());
        assert_eq!(cursor.next_slot(), before);
    }
}
