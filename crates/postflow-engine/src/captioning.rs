//! Caption manifest: the numbered media payload handed to the upstream
//! captioning collaborator. The collaborator fills `MediaGrouping.caption`
//! asynchronously; the scheduler never waits for it.

use postflow_core::models::{MediaGrouping, MediaItem, MediaStatus, MediaType};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// One media reference in the manifest, numbered from 1 in presentation
/// order: befores, afters, progress shot, video, best-rated first.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionMediaRef {
    pub file_number: usize,
    pub file_url: String,
    pub status: MediaStatus,
    pub description: String,
    pub notes: String,
    pub quality_rating: i32,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptionManifest {
    pub grouping_id: Uuid,
    pub media: Vec<CaptionMediaRef>,
}

impl CaptionManifest {
    pub fn to_json_value(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Build the manifest from a grouping's members: up to 2 before and 2 after
/// images, 1 progress image, 1 video, each slot best-rated first.
pub fn caption_manifest(grouping: &MediaGrouping, members: &[MediaItem]) -> CaptionManifest {
    let mut ordered: Vec<&MediaItem> = Vec::new();
    ordered.extend(images_by_rating(members, MediaStatus::Before).into_iter().take(2));
    ordered.extend(images_by_rating(members, MediaStatus::After).into_iter().take(2));
    ordered.extend(
        images_by_rating(members, MediaStatus::InProgress)
            .into_iter()
            .take(1),
    );
    if let Some(video) = members
        .iter()
        .filter(|m| m.media_type() == MediaType::Video)
        .max_by_key(|m| m.quality_rating)
    {
        ordered.push(video);
    }

    let media = ordered
        .into_iter()
        .enumerate()
        .map(|(index, item)| CaptionMediaRef {
            file_number: index + 1,
            file_url: item.file_url.clone(),
            status: item.status,
            description: item.description.clone().unwrap_or_default(),
            notes: item.notes.clone().unwrap_or_default(),
            quality_rating: item.quality_rating,
            media_type: item.media_type(),
        })
        .collect();

    CaptionManifest {
        grouping_id: grouping.id,
        media,
    }
}

fn images_by_rating(members: &[MediaItem], status: MediaStatus) -> Vec<&MediaItem> {
    let mut items: Vec<&MediaItem> = members
        .iter()
        .filter(|m| m.status == status && m.media_type() == MediaType::Image)
        .collect();
    items.sort_by(|a, b| b.quality_rating.cmp(&a.quality_rating));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(status: MediaStatus, rating: i32, ext: &str) -> MediaItem {
        MediaItem {
            id: Uuid::new_v4(),
            jobsite_id: Uuid::nil(),
            owner_id: Uuid::nil(),
            file_url: format!("/api/media/files/{}.{}", Uuid::new_v4(), ext),
            description: Some("kitchen remodel".to_string()),
            notes: None,
            quality_rating: rating,
            earliest_publish: None,
            status,
            grouping_id: None,
            created_at: Utc::now(),
        }
    }

    fn grouping() -> MediaGrouping {
        MediaGrouping {
            id: Uuid::new_v4(),
            jobsite_id: Uuid::nil(),
            caption: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_manifest_numbering_and_order() {
        let members = vec![
            member(MediaStatus::After, 5, "jpg"),
            member(MediaStatus::Before, 4, "jpg"),
            member(MediaStatus::Before, 5, "jpg"),
            member(MediaStatus::InProgress, 3, "mp4"),
        ];
        let manifest = caption_manifest(&grouping(), &members);

        assert_eq!(manifest.media.len(), 4);
        // Numbered from 1, befores first (best rating leading), then after,
        // then the video.
        assert_eq!(manifest.media[0].file_number, 1);
        assert_eq!(manifest.media[0].status, MediaStatus::Before);
        assert_eq!(manifest.media[0].quality_rating, 5);
        assert_eq!(manifest.media[1].quality_rating, 4);
        assert_eq!(manifest.media[2].status, MediaStatus::After);
        assert_eq!(manifest.media[3].media_type, MediaType::Video);
        assert_eq!(manifest.media[3].file_number, 4);
    }

    #[test]
    fn test_manifest_serializes_wire_tags() {
        let members = vec![member(MediaStatus::InProgress, 4, "jpg")];
        let manifest = caption_manifest(&grouping(), &members);
        let json = manifest.to_json_value();
        assert_eq!(json["media"][0]["status"], "in_progress");
        assert_eq!(json["media"][0]["media_type"], "image");
        assert_eq!(json["media"][0]["description"], "kitchen remodel");
    }
}
