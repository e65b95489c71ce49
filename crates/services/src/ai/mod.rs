//! Outbound calls to the AI guidance backend.

mod client;
mod requests;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AiClientError;

pub use client::HttpGuidanceClient;
pub use requests::{
    DiscoverRequest, HealthStatus, RoadmapRequest, SprintRequest, StreamAnalysisRequest,
};

/// The AI backend seen from the services. Each call is one request and one
/// response; payloads come back untyped and are hydrated by the caller.
#[async_trait]
pub trait GuidanceBackend: Send + Sync {
    /// `POST /generate-discover`
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` on network failures or non-success statuses.
    async fn generate_discover(&self, request: &DiscoverRequest) -> Result<Value, AiClientError>;

    /// `POST /generate-stream-analysis`
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` on network failures or non-success statuses.
    async fn analyze_stream(&self, request: &StreamAnalysisRequest)
    -> Result<Value, AiClientError>;

    /// `POST /generate-roadmap`
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` on network failures or non-success statuses.
    async fn generate_roadmap(&self, request: &RoadmapRequest) -> Result<Value, AiClientError>;

    /// `POST /generate-sprint`
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` on network failures or non-success statuses.
    async fn generate_sprint(&self, request: &SprintRequest) -> Result<Value, AiClientError>;

    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` when the backend is unreachable.
    async fn health(&self) -> Result<HealthStatus, AiClientError>;
}
