use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Extensions treated as video; everything else uploaded is an image.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Jobsite progression stage a media item documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    Before,
    InProgress,
    After,
}

/// Media type, derived from the file extension rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify a stored file URL by its extension (case-insensitive).
    pub fn from_file_url(file_url: &str) -> MediaType {
        let ext = file_url
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }
}

/// Symbolic earliest-publish constraint: no post containing this item may be
/// published before now + offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "earliest_publish"))]
pub enum EarliestPublish {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ASAP"))]
    #[serde(rename = "ASAP")]
    Asap,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "1_week"))]
    #[serde(rename = "1_week")]
    OneWeek,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "2_weeks"))]
    #[serde(rename = "2_weeks")]
    TwoWeeks,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "1_month"))]
    #[serde(rename = "1_month")]
    OneMonth,
}

impl EarliestPublish {
    /// Concrete floor for this tag relative to the run's reference clock.
    pub fn floor(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            EarliestPublish::Asap => now,
            EarliestPublish::OneWeek => now + Duration::days(7),
            EarliestPublish::TwoWeeks => now + Duration::days(14),
            EarliestPublish::OneMonth => now + Duration::days(30),
        }
    }
}

/// Compute the strictest publish floor across a set of tags. Items without a
/// tag impose no floor, so an empty set yields `None`.
pub fn max_publish_floor(
    tags: impl IntoIterator<Item = EarliestPublish>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    tags.into_iter().map(|tag| tag.floor(now)).max()
}

/// One uploaded media item; immutable after creation except for the
/// set-exactly-once `grouping_id` back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaItem {
    pub id: Uuid,
    pub jobsite_id: Uuid,
    pub owner_id: Uuid,
    pub file_url: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Always 1-5 inclusive; enforced at ingestion, not here.
    pub quality_rating: i32,
    pub earliest_publish: Option<EarliestPublish>,
    pub status: MediaStatus,
    pub grouping_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    pub fn media_type(&self) -> MediaType {
        MediaType::from_file_url(&self.file_url)
    }
}
