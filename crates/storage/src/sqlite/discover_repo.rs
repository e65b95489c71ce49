use async_trait::async_trait;
use career_core::model::UserId;
use sqlx::Row;

use crate::repository::{DiscoverRecord, DiscoverRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, from_json_text, ser, to_json_text};

#[async_trait]
impl DiscoverRepository for SqliteRepository {
    async fn save_latest_discover(
        &self,
        user: &UserId,
        record: &DiscoverRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO discover_results (user_id, result, answers, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                result = excluded.result,
                answers = excluded.answers,
                saved_at = excluded.saved_at
            ",
        )
        .bind(user.as_str())
        .bind(to_json_text(&record.result)?)
        .bind(to_json_text(&record.answers)?)
        .bind(record.saved_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn latest_discover(&self, user: &UserId) -> Result<Option<DiscoverRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT result, answers, saved_at
            FROM discover_results
            WHERE user_id = ?1
            ",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let result: String = row.try_get("result").map_err(ser)?;
        let answers: String = row.try_get("answers").map_err(ser)?;
        Ok(Some(DiscoverRecord {
            result: from_json_text(&result)?,
            answers: from_json_text(&answers)?,
            saved_at: row.try_get("saved_at").map_err(ser)?,
        }))
    }
}
