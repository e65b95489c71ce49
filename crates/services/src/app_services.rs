use std::sync::Arc;

use storage::repository::Storage;
use storage::sqlite::SqliteOptions;

use crate::Clock;
use crate::ai::{GuidanceBackend, HealthStatus, HttpGuidanceClient};
use crate::checklist::PersistPolicy;
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::error::{AiClientError, AppServicesError, RoadmapError};
use crate::quiz_flow::{DiscoverService, GoalFitService};
use crate::roadmap_service::RoadmapService;
use crate::sprint_service::SprintService;
use crate::user_session::UserSession;

/// Assembles app-facing services over one backend and one storage.
#[derive(Clone)]
pub struct AppServices {
    roadmap_limit: u32,
    backend: Arc<dyn GuidanceBackend>,
    discover: Arc<DiscoverService>,
    goal_fit: Arc<GoalFitService>,
    roadmaps: Arc<RoadmapService>,
    sprints: Arc<SprintService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the HTTP
    /// client setup fails.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let options = SqliteOptions {
            busy_timeout: config.db_busy_timeout,
            ..SqliteOptions::default()
        };
        let storage = Storage::sqlite_with(&config.db_url, &options).await?;
        let backend: Arc<dyn GuidanceBackend> =
            Arc::new(HttpGuidanceClient::new(config.ai.clone())?);
        Ok(Self::assemble(storage, backend, clock, config.roadmap_limit))
    }

    /// Build services over any backend and storage, e.g. in-memory for tests.
    #[must_use]
    pub fn assemble(
        storage: Storage,
        backend: Arc<dyn GuidanceBackend>,
        clock: Clock,
        roadmap_limit: u32,
    ) -> Self {
        let discover = Arc::new(DiscoverService::new(
            clock,
            Arc::clone(&backend),
            Arc::clone(&storage.discover),
        ));
        let goal_fit = Arc::new(GoalFitService::new(clock, Arc::clone(&backend)));
        let roadmaps = Arc::new(RoadmapService::new(
            clock,
            Arc::clone(&backend),
            Arc::clone(&storage.roadmaps),
        ));
        let sprints = Arc::new(SprintService::new(
            clock,
            Arc::clone(&backend),
            Arc::clone(&storage.sprints),
        ));

        Self {
            roadmap_limit,
            backend,
            discover,
            goal_fit,
            roadmaps,
            sprints,
        }
    }

    /// Switch checklist persistence to a single ordered writer.
    #[must_use]
    pub fn with_persist_policy(mut self, policy: PersistPolicy) -> Self {
        self.sprints = Arc::new((*self.sprints).clone().with_policy(policy));
        self
    }

    #[must_use]
    pub fn roadmap_limit(&self) -> u32 {
        self.roadmap_limit
    }

    #[must_use]
    pub fn discover(&self) -> Arc<DiscoverService> {
        Arc::clone(&self.discover)
    }

    #[must_use]
    pub fn goal_fit(&self) -> Arc<GoalFitService> {
        Arc::clone(&self.goal_fit)
    }

    #[must_use]
    pub fn roadmaps(&self) -> Arc<RoadmapService> {
        Arc::clone(&self.roadmaps)
    }

    #[must_use]
    pub fn sprints(&self) -> Arc<SprintService> {
        Arc::clone(&self.sprints)
    }

    /// # Errors
    ///
    /// Returns `RoadmapError::Storage` if stored results cannot be read.
    pub async fn dashboard(&self, user: &UserSession) -> Result<Dashboard, RoadmapError> {
        Dashboard::load(
            user,
            &self.discover,
            &self.roadmaps,
            &self.sprints,
            self.roadmap_limit,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `AiClientError` when the backend is unreachable.
    pub async fn health(&self) -> Result<HealthStatus, AiClientError> {
        self.backend.health().await
    }
}
