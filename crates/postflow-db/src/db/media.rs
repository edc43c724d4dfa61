//! Media catalog: read-only views over stored media metadata.

use postflow_core::models::{EarliestPublish, MediaItem};
use postflow_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::transaction::map_db_err;

const MEDIA_COLUMNS: &str = "id, jobsite_id, owner_id, file_url, description, notes, \
     quality_rating, earliest_publish, status, grouping_id, created_at";

#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ungrouped media for a jobsite in insertion order (`created_at, id`).
    /// This ordering is the tie-break for equal ratings downstream.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    pub async fn list_ungrouped(&self, jobsite_id: Uuid) -> Result<Vec<MediaItem>, AppError> {
        let query = format!(
            "SELECT {MEDIA_COLUMNS} FROM media \
             WHERE jobsite_id = $1 AND grouping_id IS NULL \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<Postgres, MediaItem>(&query)
            .bind(jobsite_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "list ungrouped media"))
    }

    /// Members of a grouping in insertion order.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %grouping_id))]
    pub async fn list_for_grouping(&self, grouping_id: Uuid) -> Result<Vec<MediaItem>, AppError> {
        let query = format!(
            "SELECT {MEDIA_COLUMNS} FROM media \
             WHERE grouping_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<Postgres, MediaItem>(&query)
            .bind(grouping_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "list grouping media"))
    }

    /// Ungrouped pool read inside a grouping run, after the jobsite lock is
    /// held. Same ordering contract as [`Self::list_ungrouped`].
    pub async fn list_ungrouped_in_run(
        tx: &mut Transaction<'_, Postgres>,
        jobsite_id: Uuid,
    ) -> Result<Vec<MediaItem>, AppError> {
        let query = format!(
            "SELECT {MEDIA_COLUMNS} FROM media \
             WHERE jobsite_id = $1 AND grouping_id IS NULL \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<Postgres, MediaItem>(&query)
            .bind(jobsite_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| map_db_err(e, "list ungrouped media"))
    }

    /// Earliest-publish tags for a grouping's members. Items without a tag
    /// impose no floor and are filtered out here.
    pub async fn earliest_publish_tags(
        tx: &mut Transaction<'_, Postgres>,
        grouping_id: Uuid,
    ) -> Result<Vec<EarliestPublish>, AppError> {
        sqlx::query_scalar::<Postgres, EarliestPublish>(
            "SELECT earliest_publish FROM media \
             WHERE grouping_id = $1 AND earliest_publish IS NOT NULL",
        )
        .bind(grouping_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_db_err(e, "load earliest publish tags"))
    }
}
