#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod checklist;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod quiz_flow;
pub mod roadmap_service;
pub mod sprint_service;
pub mod user_session;

pub use career_core::Clock;

pub use ai::{GuidanceBackend, HealthStatus, HttpGuidanceClient};
pub use app_services::AppServices;
pub use checklist::{
    ChecklistTracker, ChecklistView, LoadState, PendingWrite, PersistPolicy, WeekProgress,
};
pub use config::{AiBackendConfig, AppConfig};
pub use dashboard::Dashboard;
pub use error::{
    AiClientError, AppServicesError, ConfigError, GENERIC_BACKEND_MESSAGE, QuizFlowError,
    RoadmapError, SprintError, ValidationError,
};
pub use quiz_flow::{
    DiscoverRun, DiscoverService, GoalFitRun, GoalFitService, QuizRun, SavedDiscover, StepOutcome,
};
pub use roadmap_service::{GeneratedRoadmap, RoadmapService, SavedRoadmap};
pub use sprint_service::SprintService;
pub use user_session::UserSession;
