//! Selection policies over a jobsite's ungrouped media pool.
//!
//! Both policies are deterministic pure functions: the pool arrives in
//! insertion order (`created_at, id`), all sorts are stable, and equal
//! ratings keep that order.

use postflow_core::models::{MediaItem, MediaStatus, MediaType};
use uuid::Uuid;

/// A grouping holds at most this many items.
const MAX_GROUPING_ITEMS: usize = 5;

/// Per-partition caps: 2 before, 2 after, 1 in-progress, 1 video.
const MAX_BEFORE: usize = 2;
const MAX_AFTER: usize = 2;
const MAX_IN_PROGRESS: usize = 1;
const MAX_VIDEO: usize = 1;

/// Quality thresholds for the primary policy.
const MIN_RATING_BEFORE_AFTER: i32 = 3;
const MIN_RATING_IN_PROGRESS: i32 = 4;

/// When no item meets its threshold, take the best of the whole pool.
const FALLBACK_TAKE: usize = 3;

/// How to pick the items of a grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingPolicy {
    /// Partition by status with quality thresholds, best-rated first.
    #[default]
    RatingThreshold,
    /// Batch mode: first before/after pair plus the first video. No scoring
    /// ranks the combinations.
    FirstMatch,
}

/// Apply a policy to the pool. An empty result means no grouping is possible
/// under that policy; the caller surfaces this, it is not retried.
pub fn select_media(policy: GroupingPolicy, pool: &[MediaItem]) -> Vec<Uuid> {
    match policy {
        GroupingPolicy::RatingThreshold => rating_threshold(pool),
        GroupingPolicy::FirstMatch => first_match(pool),
    }
}

/// Primary policy: images partitioned by status with quality floors, videos
/// at any rating, each partition best-rated first, capped per partition and
/// concatenated before/after/in-progress/video.
fn rating_threshold(pool: &[MediaItem]) -> Vec<Uuid> {
    let before = partition_images(pool, MediaStatus::Before, MIN_RATING_BEFORE_AFTER);
    let after = partition_images(pool, MediaStatus::After, MIN_RATING_BEFORE_AFTER);
    let in_progress = partition_images(pool, MediaStatus::InProgress, MIN_RATING_IN_PROGRESS);
    let videos = {
        let mut v: Vec<&MediaItem> = pool
            .iter()
            .filter(|m| m.media_type() == MediaType::Video)
            .collect();
        sort_by_rating_desc(&mut v);
        v
    };

    let mut selected: Vec<Uuid> = Vec::new();
    selected.extend(before.iter().take(MAX_BEFORE).map(|m| m.id));
    selected.extend(after.iter().take(MAX_AFTER).map(|m| m.id));
    selected.extend(in_progress.iter().take(MAX_IN_PROGRESS).map(|m| m.id));
    selected.extend(videos.iter().take(MAX_VIDEO).map(|m| m.id));

    // The partition caps can add up past the grouping limit.
    selected.truncate(MAX_GROUPING_ITEMS);

    if selected.is_empty() {
        // Nothing met its threshold: take the best of the whole pool,
        // ignoring status and type.
        let mut all: Vec<&MediaItem> = pool.iter().collect();
        sort_by_rating_desc(&mut all);
        selected = all.iter().take(FALLBACK_TAKE).map(|m| m.id).collect();
    }

    selected
}

/// Batch policy: the cross-product of before x after pairs (any rating, any
/// type), first available video appended, first generated combination wins.
fn first_match(pool: &[MediaItem]) -> Vec<Uuid> {
    // Cross-product order makes the first before with the first after the
    // first combination, so only the heads matter.
    let first_before = pool.iter().find(|m| m.status == MediaStatus::Before);
    let first_after = pool.iter().find(|m| m.status == MediaStatus::After);

    let (before, after) = match (first_before, first_after) {
        (Some(b), Some(a)) => (b, a),
        _ => return Vec::new(),
    };

    let mut combo = vec![before.id, after.id];
    // A before or after item with a video extension already sits in the
    // pair; appending it again would tag the same row twice and the run
    // would abort on the member count. Skip ids already picked.
    if let Some(video) = pool
        .iter()
        .find(|m| m.media_type() == MediaType::Video && !combo.contains(&m.id))
    {
        combo.push(video.id);
    }
    combo
}

fn partition_images<'a>(
    pool: &'a [MediaItem],
    status: MediaStatus,
    min_rating: i32,
) -> Vec<&'a MediaItem> {
    let mut items: Vec<&MediaItem> = pool
        .iter()
        .filter(|m| {
            m.status == status
                && m.media_type() == MediaType::Image
                && m.quality_rating >= min_rating
        })
        .collect();
    sort_by_rating_desc(&mut items);
    items
}

/// Stable: equal ratings keep pool (insertion) order.
fn sort_by_rating_desc(items: &mut [&MediaItem]) {
    items.sort_by(|a, b| b.quality_rating.cmp(&a.quality_rating));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn item(n: i64, status: MediaStatus, rating: i32, ext: &str) -> MediaItem {
        MediaItem {
            id: Uuid::new_v4(),
            jobsite_id: Uuid::nil(),
            owner_id: Uuid::nil(),
            file_url: format!("/api/media/files/{}.{}", n, ext),
            description: None,
            notes: None,
            quality_rating: rating,
            earliest_publish: None,
            status,
            grouping_id: None,
            created_at: Utc::now() + Duration::seconds(n),
        }
    }

    #[test]
    fn test_threshold_partition_selection() {
        // 3 before (5, 4, 2) and 2 after (5, 3), no video: the rating-2
        // before is excluded by the threshold, everything else qualifies.
        let pool = vec![
            item(1, MediaStatus::Before, 5, "jpg"),
            item(2, MediaStatus::Before, 4, "jpg"),
            item(3, MediaStatus::Before, 2, "jpg"),
            item(4, MediaStatus::After, 5, "jpg"),
            item(5, MediaStatus::After, 3, "jpg"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        assert_eq!(
            selected,
            vec![pool[0].id, pool[1].id, pool[3].id, pool[4].id]
        );
    }

    #[test]
    fn test_fallback_on_low_rated_pool() {
        // Nothing meets a threshold; fallback takes the whole 2-item pool,
        // best rating first.
        let pool = vec![
            item(1, MediaStatus::Before, 1, "jpg"),
            item(2, MediaStatus::After, 2, "jpg"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        assert_eq!(selected, vec![pool[1].id, pool[0].id]);
    }

    #[test]
    fn test_fallback_caps_at_three() {
        let pool = vec![
            item(1, MediaStatus::Before, 2, "jpg"),
            item(2, MediaStatus::Before, 1, "jpg"),
            item(3, MediaStatus::After, 2, "jpg"),
            item(4, MediaStatus::After, 1, "jpg"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        assert_eq!(selected.len(), 3);
        // Stable: among equal ratings, earlier pool entries win.
        assert_eq!(selected, vec![pool[0].id, pool[2].id, pool[1].id]);
    }

    #[test]
    fn test_grouping_cap_drops_video_slot() {
        // 2 + 2 + 1 qualifying images fill the grouping; the video slot is
        // truncated by the 5-item cap.
        let pool = vec![
            item(1, MediaStatus::Before, 5, "jpg"),
            item(2, MediaStatus::Before, 4, "jpg"),
            item(3, MediaStatus::After, 5, "jpg"),
            item(4, MediaStatus::After, 4, "jpg"),
            item(5, MediaStatus::InProgress, 4, "jpg"),
            item(6, MediaStatus::InProgress, 5, "mp4"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        assert_eq!(selected.len(), 5);
        assert!(!selected.contains(&pool[5].id));
    }

    #[test]
    fn test_video_included_when_room() {
        let pool = vec![
            item(1, MediaStatus::Before, 5, "jpg"),
            item(2, MediaStatus::After, 5, "jpg"),
            item(3, MediaStatus::InProgress, 1, "mov"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        // Video joins at any rating.
        assert_eq!(selected, vec![pool[0].id, pool[1].id, pool[2].id]);
    }

    #[test]
    fn test_partition_caps() {
        let pool = vec![
            item(1, MediaStatus::Before, 3, "jpg"),
            item(2, MediaStatus::Before, 5, "jpg"),
            item(3, MediaStatus::Before, 4, "jpg"),
            item(4, MediaStatus::After, 3, "jpg"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        // Two best befores in rating order, then the after.
        assert_eq!(selected, vec![pool[1].id, pool[2].id, pool[3].id]);
    }

    #[test]
    fn test_in_progress_needs_rating_four() {
        let pool = vec![
            item(1, MediaStatus::InProgress, 3, "jpg"),
            item(2, MediaStatus::InProgress, 4, "jpg"),
        ];
        let selected = select_media(GroupingPolicy::RatingThreshold, &pool);
        assert_eq!(selected, vec![pool[1].id]);
    }

    #[test]
    fn test_first_match_picks_first_pair_not_best() {
        let pool = vec![
            item(1, MediaStatus::Before, 1, "jpg"),
            item(2, MediaStatus::Before, 5, "jpg"),
            item(3, MediaStatus::After, 1, "jpg"),
            item(4, MediaStatus::After, 5, "jpg"),
            item(5, MediaStatus::InProgress, 2, "webm"),
        ];
        let selected = select_media(GroupingPolicy::FirstMatch, &pool);
        // First before, first after, first video; ratings are ignored.
        assert_eq!(selected, vec![pool[0].id, pool[2].id, pool[4].id]);
    }

    #[test]
    fn test_first_match_video_pair_head_is_not_picked_twice() {
        // The before item is itself a video: it fills the pair slot and must
        // not come back as the appended video.
        let pool = vec![
            item(1, MediaStatus::Before, 4, "mp4"),
            item(2, MediaStatus::After, 3, "jpg"),
        ];
        let selected = select_media(GroupingPolicy::FirstMatch, &pool);
        assert_eq!(selected, vec![pool[0].id, pool[1].id]);
    }

    #[test]
    fn test_first_match_appends_next_video_past_the_pair() {
        // First video in pool order is the pair head; the appended video is
        // the next one.
        let pool = vec![
            item(1, MediaStatus::Before, 4, "mov"),
            item(2, MediaStatus::After, 3, "jpg"),
            item(3, MediaStatus::InProgress, 2, "mp4"),
        ];
        let selected = select_media(GroupingPolicy::FirstMatch, &pool);
        assert_eq!(selected, vec![pool[0].id, pool[1].id, pool[2].id]);
    }

    #[test]
    fn test_first_match_requires_a_pair() {
        let pool = vec![
            item(1, MediaStatus::Before, 5, "jpg"),
            item(2, MediaStatus::InProgress, 5, "jpg"),
        ];
        assert!(select_media(GroupingPolicy::FirstMatch, &pool).is_empty());
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        assert!(select_media(GroupingPolicy::RatingThreshold, &[]).is_empty());
        assert!(select_media(GroupingPolicy::FirstMatch, &[]).is_empty());
    }
}
