use async_trait::async_trait;
use career_core::model::{CompletionMap, TaskId, UserId};
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{ProgressRecord, SprintPlanRecord, SprintRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, done_from_i64, done_to_i64, from_json_text, ser, to_json_text};

impl SqliteRepository {
    async fn upsert_progress_rows(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        for (task_id, done) in completed.iter() {
            sqlx::query(
                r"
                INSERT INTO sprint_progress (user_id, task_id, done, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, task_id) DO UPDATE SET
                    done = excluded.done,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(user.as_str())
            .bind(task_id.as_str())
            .bind(done_to_i64(done))
            .bind(updated_at)
            .execute(&mut **tx)
            .await
            .map_err(conn)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SprintRepository for SqliteRepository {
    async fn save_sprint_plan(
        &self,
        user: &UserId,
        record: &SprintPlanRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sprint_plans (user_id, stream, plan, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                stream = excluded.stream,
                plan = excluded.plan,
                created_at = excluded.created_at
            ",
        )
        .bind(user.as_str())
        .bind(&record.stream)
        .bind(to_json_text(&record.plan)?)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn latest_sprint_plan(
        &self,
        user: &UserId,
    ) -> Result<Option<SprintPlanRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT stream, plan, created_at
            FROM sprint_plans
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

        let plan: String = row.try_get("plan").map_err(ser)?;
        Ok(Some(SprintPlanRecord {
            stream: row.try_get("stream").map_err(ser)?,
            plan: from_json_text(&plan)?,
            created_at: row.try_get("created_at").map_err(ser)?,
        }))
    }

    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT task_id, done, updated_at
            FROM sprint_progress
            WHERE user_id = ?1
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut completed = CompletionMap::new();
        let mut updated_at: Option<DateTime<Utc>> = None;
        for row in &rows {
            let task_id: String = row.try_get("task_id").map_err(ser)?;
            let done: i64 = row.try_get("done").map_err(ser)?;
            let row_updated: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;
            completed.set(TaskId::new(task_id), done_from_i64(done)?);
            updated_at = Some(updated_at.map_or(row_updated, |at| at.max(row_updated)));
        }

        Ok(updated_at.map(|updated_at| ProgressRecord {
            completed,
            updated_at,
        }))
    }

    async fn merge_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        Self::upsert_progress_rows(&mut tx, user, completed, updated_at).await?;
        tx.commit().await.map_err(conn)
    }

    async fn replace_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        sqlx::query("DELETE FROM sprint_progress WHERE user_id = ?1")
            .bind(user.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        Self::upsert_progress_rows(&mut tx, user, completed, updated_at).await?;
        tx.commit().await.map_err(conn)
    }
}
