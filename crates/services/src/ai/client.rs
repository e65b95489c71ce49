use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    DiscoverRequest, GuidanceBackend, HealthStatus, RoadmapRequest, SprintRequest,
    StreamAnalysisRequest,
};
use crate::config::AiBackendConfig;
use crate::error::AiClientError;

/// `reqwest` implementation of [`GuidanceBackend`].
#[derive(Clone)]
pub struct HttpGuidanceClient {
    client: Client,
    config: AiBackendConfig,
}

impl HttpGuidanceClient {
    /// # Errors
    ///
    /// Returns `AiClientError` if the HTTP client cannot be built.
    pub fn new(config: AiBackendConfig) -> Result<Self, AiClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AiBackendConfig {
        &self.config
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Value, AiClientError> {
        let url = self.config.endpoint(path);
        let request_id = Uuid::new_v4();
        debug!(%request_id, %url, "calling guidance backend");

        let response = self
            .client
            .post(&url)
            .header("x-request-id", request_id.to_string())
            .json(payload)
            .send()
            .await
            .inspect_err(|err| warn!(%request_id, %url, error = %err, "guidance backend unreachable"))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%request_id, %url, %status, "guidance backend rejected request");
            return Err(AiClientError::HttpStatus(status));
        }

        let body: Value = response.json().await?;
        if !body.is_object() {
            warn!(%request_id, %url, "guidance backend returned a non-object payload");
            return Err(AiClientError::UnexpectedPayload);
        }
        Ok(body)
    }
}

#[async_trait]
impl GuidanceBackend for HttpGuidanceClient {
    async fn generate_discover(&self, request: &DiscoverRequest) -> Result<Value, AiClientError> {
        self.post_json("generate-discover", request).await
    }

    async fn analyze_stream(
        &self,
        request: &StreamAnalysisRequest,
    ) -> Result<Value, AiClientError> {
        self.post_json("generate-stream-analysis", request).await
    }

    async fn generate_roadmap(&self, request: &RoadmapRequest) -> Result<Value, AiClientError> {
        self.post_json("generate-roadmap", request).await
    }

    async fn generate_sprint(&self, request: &SprintRequest) -> Result<Value, AiClientError> {
        self.post_json("generate-sprint", request).await
    }

    async fn health(&self) -> Result<HealthStatus, AiClientError> {
        let url = self.config.endpoint("health");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AiClientError::HttpStatus(status));
        }
        Ok(response.json().await?)
    }
}
