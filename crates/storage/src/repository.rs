use async_trait::async_trait;
use career_core::model::{CompletionMap, QuestionId, RoadmapId, UserId};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Latest discovery outcome for a user. Overwritten on every successful quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverRecord {
    /// Normalized discover profile.
    pub result: Value,
    pub answers: BTreeMap<QuestionId, String>,
    pub saved_at: DateTime<Utc>,
}

/// A roadmap about to be appended; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoadmap {
    pub stream: String,
    /// Normalized roadmap (`{"phases": [...]}`).
    pub roadmap: Value,
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapRecord {
    pub id: RoadmapId,
    pub stream: String,
    pub roadmap: Value,
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

/// Latest sprint plan for a user. Overwritten on regeneration.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintPlanRecord {
    pub stream: String,
    /// Normalized sprint plan (`{"weeks": [...]}`).
    pub plan: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub completed: CompletionMap,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait DiscoverRepository: Send + Sync {
    /// Replace the user's latest discover result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_latest_discover(
        &self,
        user: &UserId,
        record: &DiscoverRecord,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read or decoding failures.
    async fn latest_discover(&self, user: &UserId) -> Result<Option<DiscoverRecord>, StorageError>;
}

#[async_trait]
pub trait RoadmapRepository: Send + Sync {
    /// Append a roadmap to the user's history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the roadmap cannot be stored.
    async fn append_roadmap(
        &self,
        user: &UserId,
        roadmap: &NewRoadmap,
    ) -> Result<RoadmapId, StorageError>;

    /// Newest first, at most `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decoding failures.
    async fn recent_roadmaps(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<RoadmapRecord>, StorageError>;
}

/// Sprint plan and checklist progress.
///
/// Progress writes come in two flavors: `merge_progress` upserts only the
/// entries it is given and leaves every other stored entry alone, while
/// `replace_progress` discards what was stored.
#[async_trait]
pub trait SprintRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the plan cannot be stored.
    async fn save_sprint_plan(
        &self,
        user: &UserId,
        record: &SprintPlanRecord,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on read or decoding failures.
    async fn latest_sprint_plan(
        &self,
        user: &UserId,
    ) -> Result<Option<SprintPlanRecord>, StorageError>;

    /// `None` when nothing was ever persisted for the user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decoding failures.
    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn merge_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn replace_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    discover: Arc<Mutex<HashMap<UserId, DiscoverRecord>>>,
    roadmaps: Arc<Mutex<HashMap<UserId, Vec<RoadmapRecord>>>>,
    next_roadmap_id: Arc<Mutex<RoadmapId>>,
    plans: Arc<Mutex<HashMap<UserId, SprintPlanRecord>>>,
    progress: Arc<Mutex<HashMap<UserId, ProgressRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl DiscoverRepository for InMemoryRepository {
    async fn save_latest_discover(
        &self,
        user: &UserId,
        record: &DiscoverRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self.discover.lock().map_err(poisoned)?;
        guard.insert(user.clone(), record.clone());
        Ok(())
    }

    async fn latest_discover(&self, user: &UserId) -> Result<Option<DiscoverRecord>, StorageError> {
        let guard = self.discover.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned())
    }
}

#[async_trait]
impl RoadmapRepository for InMemoryRepository {
    async fn append_roadmap(
        &self,
        user: &UserId,
        roadmap: &NewRoadmap,
    ) -> Result<RoadmapId, StorageError> {
        let id = {
            let mut next = self.next_roadmap_id.lock().map_err(poisoned)?;
            *next += 1;
            *next
        };
        let mut guard = self.roadmaps.lock().map_err(poisoned)?;
        guard.entry(user.clone()).or_default().push(RoadmapRecord {
            id,
            stream: roadmap.stream.clone(),
            roadmap: roadmap.roadmap.clone(),
            source: roadmap.source.clone(),
            generated_at: roadmap.generated_at,
        });
        Ok(id)
    }

    async fn recent_roadmaps(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<RoadmapRecord>, StorageError> {
        let guard = self.roadmaps.lock().map_err(poisoned)?;
        let mut records = guard.get(user).cloned().unwrap_or_default();
        records.sort_by(|a, b| {
            b.generated_at
                .cmp(&a.generated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }
}

#[async_trait]
impl SprintRepository for InMemoryRepository {
    async fn save_sprint_plan(
        &self,
        user: &UserId,
        record: &SprintPlanRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self.plans.lock().map_err(poisoned)?;
        guard.insert(user.clone(), record.clone());
        Ok(())
    }

    async fn latest_sprint_plan(
        &self,
        user: &UserId,
    ) -> Result<Option<SprintPlanRecord>, StorageError> {
        let guard = self.plans.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned())
    }

    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned())
    }

    async fn merge_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        let entry = guard.entry(user.clone()).or_insert_with(|| ProgressRecord {
            completed: CompletionMap::new(),
            updated_at,
        });
        entry.completed.merge_from(completed);
        entry.updated_at = updated_at;
        Ok(())
    }

    async fn replace_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert(
            user.clone(),
            ProgressRecord {
                completed: completed.clone(),
                updated_at,
            },
        );
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub discover: Arc<dyn DiscoverRepository>,
    pub roadmaps: Arc<dyn RoadmapRepository>,
    pub sprints: Arc<dyn SprintRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let discover: Arc<dyn DiscoverRepository> = Arc::new(repo.clone());
        let roadmaps: Arc<dyn RoadmapRepository> = Arc::new(repo.clone());
        let sprints: Arc<dyn SprintRepository> = Arc::new(repo);
        Self {
            discover,
            roadmaps,
            sprints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_core::model::TaskId;
    use career_core::time::fixed_now;
    use serde_json::json;

    fn user() -> UserId {
        UserId::new("user-1")
    }

    #[tokio::test]
    async fn discover_result_is_overwritten() {
        let repo = InMemoryRepository::new();
        for insight in ["first", "second"] {
            let record = DiscoverRecord {
                result: json!({ "core_personality_insight": insight }),
                answers: BTreeMap::new(),
                saved_at: fixed_now(),
            };
            repo.save_latest_discover(&user(), &record).await.unwrap();
        }

        let latest = repo.latest_discover(&user()).await.unwrap().unwrap();
        assert_eq!(latest.result["core_personality_insight"], "second");
        assert!(
            repo.latest_discover(&UserId::new("other"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn recent_roadmaps_are_newest_first_and_capped() {
        let repo = InMemoryRepository::new();
        for day in 0..4 {
            let draft = NewRoadmap {
                stream: format!("Stream {day}"),
                roadmap: json!({ "phases": [] }),
                source: "discover".into(),
                generated_at: fixed_now() + chrono::Duration::days(day),
            };
            repo.append_roadmap(&user(), &draft).await.unwrap();
        }

        let recent = repo.recent_roadmaps(&user(), 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].stream, "Stream 3");
        assert_eq!(recent[1].stream, "Stream 2");
    }

    #[tokio::test]
    async fn merge_keeps_entries_not_in_the_write() {
        let repo = InMemoryRepository::new();
        let legacy: CompletionMap = [(TaskId::new("legacy"), true)].into_iter().collect();
        repo.replace_progress(&user(), &legacy, fixed_now())
            .await
            .unwrap();

        let write: CompletionMap = [(TaskId::new("w1-t1"), true)].into_iter().collect();
        repo.merge_progress(&user(), &write, fixed_now())
            .await
            .unwrap();

        let stored = repo.get_progress(&user()).await.unwrap().unwrap();
        assert!(stored.completed.is_done(&TaskId::new("legacy")));
        assert!(stored.completed.is_done(&TaskId::new("w1-t1")));

        repo.replace_progress(&user(), &CompletionMap::new(), fixed_now())
            .await
            .unwrap();
        let stored = repo.get_progress(&user()).await.unwrap().unwrap();
        assert!(stored.completed.is_empty());
    }
}
