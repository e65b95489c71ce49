#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use career_core::model::{CompletionMap, UserId};
use services::ai::{
    DiscoverRequest, GuidanceBackend, HealthStatus, RoadmapRequest, SprintRequest,
    StreamAnalysisRequest,
};
use services::AiClientError;
use storage::repository::{
    InMemoryRepository, ProgressRecord, SprintPlanRecord, SprintRepository, StorageError,
};

/// Scripted backend: each call pops the next reply and records the request body.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<Result<Value, AiClientError>>>,
    pub requests: Mutex<Vec<(&'static str, Value)>>,
}

impl FakeBackend {
    pub fn replying(replies: Vec<Result<Value, AiClientError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(&'static str, Value)> {
        self.requests.lock().unwrap().clone()
    }

    fn reply(&self, endpoint: &'static str, body: Value) -> Result<Value, AiClientError> {
        self.requests.lock().unwrap().push((endpoint, body));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AiClientError::UnexpectedPayload))
    }
}

#[async_trait]
impl GuidanceBackend for FakeBackend {
    async fn generate_discover(&self, request: &DiscoverRequest) -> Result<Value, AiClientError> {
        self.reply("generate-discover", serde_json::to_value(request).unwrap())
    }

    async fn analyze_stream(
        &self,
        request: &StreamAnalysisRequest,
    ) -> Result<Value, AiClientError> {
        self.reply("generate-stream-analysis", serde_json::to_value(request).unwrap())
    }

    async fn generate_roadmap(&self, request: &RoadmapRequest) -> Result<Value, AiClientError> {
        self.reply("generate-roadmap", serde_json::to_value(request).unwrap())
    }

    async fn generate_sprint(&self, request: &SprintRequest) -> Result<Value, AiClientError> {
        self.reply("generate-sprint", serde_json::to_value(request).unwrap())
    }

    async fn health(&self) -> Result<HealthStatus, AiClientError> {
        Ok(HealthStatus {
            status: "OK".into(),
        })
    }
}

pub fn backend_down() -> AiClientError {
    AiClientError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY)
}

pub fn discover_reply() -> Value {
    json!({
        "core_personality_insight": "Steady under pressure, prefers planning.",
        "honest_reality_check": "You avoid the spotlight.",
        "suitable_career_streams": ["Engineering & Technology", {"name": "Design & Creative Arts", "avgSalaryRange": "6-12 LPA"}],
        "ideal_career_roles": [{"role": "Backend Developer"}, "UX Researcher"],
        "career_types_to_avoid": ["Sales"],
        "skill_gaps": ["Public speaking"],
    })
}

pub fn roadmap_reply() -> Value {
    json!({
        "phases": [
            {"id": "phase_1", "title": "Foundation", "focus": ["Python", "Git"], "avoid": ["Tutorial hell"]},
            {"id": "phase_2", "title": "Projects", "focus": ["Build an API"]}
        ]
    })
}

/// A full 12-week, 3-tasks-per-week plan in the backend's shape.
pub fn sprint_reply() -> Value {
    let weeks: Vec<Value> = (1..=12)
        .map(|w| {
            json!({
                "week": w,
                "theme": format!("Week {w}"),
                "tasks": (1..=3).map(|t| json!({
                    "id": format!("w{w}-t{t}"),
                    "task": format!("Task {t} of week {w}"),
                    "estimatedTime": "1h",
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "weeks": weeks })
}

/// Sprint repository whose progress writes take a scripted amount of time each.
#[derive(Clone)]
pub struct DelayedWrites {
    pub inner: InMemoryRepository,
    delays: Arc<Mutex<VecDeque<Duration>>>,
    pub landed: Arc<Mutex<Vec<CompletionMap>>>,
}

impl DelayedWrites {
    pub fn new(inner: InMemoryRepository, delays: Vec<Duration>) -> Self {
        Self {
            inner,
            delays: Arc::new(Mutex::new(delays.into())),
            landed: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl SprintRepository for DelayedWrites {
    async fn save_sprint_plan(
        &self,
        user: &UserId,
        record: &SprintPlanRecord,
    ) -> Result<(), StorageError> {
        self.inner.save_sprint_plan(user, record).await
    }

    async fn latest_sprint_plan(
        &self,
        user: &UserId,
    ) -> Result<Option<SprintPlanRecord>, StorageError> {
        self.inner.latest_sprint_plan(user).await
    }

    async fn get_progress(&self, user: &UserId) -> Result<Option<ProgressRecord>, StorageError> {
        self.inner.get_progress(user).await
    }

    async fn merge_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
        tokio::time::sleep(delay).await;
        self.landed.lock().unwrap().push(completed.clone());
        self.inner.merge_progress(user, completed, updated_at).await
    }

    async fn replace_progress(
        &self,
        user: &UserId,
        completed: &CompletionMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.inner.replace_progress(user, completed, updated_at).await
    }
}

/// Sprint repository that fails every progress write.
pub struct BrokenProgress(pub InMemoryRepository);

#[async_trait]
impl SprintRepository for BrokenProgress {
    async fn save_sprint_plan(
        &self,
        user: &UserId,
        record: &SprintPlanRecord,
    ) -> Result<(), StorageError> {
        self.0.save_sprint_plan(user, record).await
    }

    async fn latest_sprint_plan(
        &self,
        user: &UserId,
    ) -> Result<Option<SprintPlanRecord>, StorageError> {
        self.0.latest_sprint_plan(user).await
    }

    async fn get_progress(&self, _user: &UserId) -> Result<Option<ProgressRecord>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn merge_progress(
        &self,
        _user: &UserId,
        _completed: &CompletionMap,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn replace_progress(
        &self,
        _user: &UserId,
        _completed: &CompletionMap,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}
