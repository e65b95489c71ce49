//! Shared error types for the services crate.

use thiserror::Error;

use career_core::CoreError;
use career_core::model::{Blocked, SprintPlanError, TaskId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Message shown to the user whenever the guidance backend cannot be used.
pub const GENERIC_BACKEND_MESSAGE: &str = "Unable to reach the guidance service. Please try again.";

/// Errors emitted by the AI backend client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiClientError {
    #[error("guidance backend returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("guidance backend returned a non-object payload")]
    UnexpectedPayload,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AiClientError {
    /// The text to surface to the user. Details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        GENERIC_BACKEND_MESSAGE
    }
}

/// Input problems caught before any external call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("select a career stream first")]
    NoStreamSelected,
    #[error("stream `{0}` was not suggested for this profile")]
    StreamNotSuggested(String),
    #[error("unknown goal stream `{0}`")]
    UnknownGoalStream(String),
    #[error("take the discovery quiz first")]
    NoDiscoverResult,
    #[error("generate a roadmap first")]
    NoRoadmap,
    #[error("task `{0}` is not part of the sprint plan")]
    UnknownTask(TaskId),
}

/// Errors emitted while loading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors emitted by the quiz flows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error(transparent)]
    Blocked(#[from] Blocked),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] AiClientError),
}

/// Errors emitted by `RoadmapService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoadmapError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] AiClientError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("roadmap could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors emitted by `SprintService` and the checklist tracker.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SprintError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] AiClientError),
    #[error("sprint plan is unusable: {0}")]
    Plan(#[from] SprintPlanError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Backend(#[from] AiClientError),
}
