use async_trait::async_trait;
use career_core::model::{RoadmapId, UserId};
use sqlx::Row;

use crate::repository::{NewRoadmap, RoadmapRecord, RoadmapRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, from_json_text, ser, to_json_text};

#[async_trait]
impl RoadmapRepository for SqliteRepository {
    async fn append_roadmap(
        &self,
        user: &UserId,
        roadmap: &NewRoadmap,
    ) -> Result<RoadmapId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO roadmaps (user_id, stream, roadmap, source, generated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user.as_str())
        .bind(&roadmap.stream)
        .bind(to_json_text(&roadmap.roadmap)?)
        .bind(&roadmap.source)
        .bind(roadmap.generated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(result.last_insert_rowid())
    }

    async fn recent_roadmaps(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<RoadmapRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, stream, roadmap, source, generated_at
            FROM roadmaps
            WHERE user_id = ?1
            ORDER BY generated_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(user.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let roadmap: String = row.try_get("roadmap").map_err(ser)?;
                Ok(RoadmapRecord {
                    id: row.try_get("id").map_err(ser)?,
                    stream: row.try_get("stream").map_err(ser)?,
                    roadmap: from_json_text(&roadmap)?,
                    source: row.try_get("source").map_err(ser)?,
                    generated_at: row.try_get("generated_at").map_err(ser)?,
                })
            })
            .collect()
    }
}
