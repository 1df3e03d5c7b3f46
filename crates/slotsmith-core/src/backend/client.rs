//! HTTP client for the orchestration backend

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pipeline::{Credentials, OrchestrationService, PipelineResult, ResultStatus};

const SERVICE: &str = "backend";

/// Request body for `POST /optimize`
#[derive(Clone, Serialize)]
pub struct OptimizeRequest {
    pub calendar_text: String,
    pub preferences_text: String,
    /// Compression API key (empty when absent)
    pub api_key: String,
    /// Generation API key (empty when absent)
    pub gemini_api_key: String,
    pub gemini_model: String,
}

impl OptimizeRequest {
    pub fn new(calendar_text: &str, preferences_text: &str, credentials: &Credentials) -> Self {
        Self {
            calendar_text: calendar_text.to_string(),
            preferences_text: preferences_text.to_string(),
            api_key: credentials.compression_key().unwrap_or_default().to_string(),
            gemini_api_key: credentials.generation_key().unwrap_or_default().to_string(),
            gemini_model: credentials.generation_model.clone(),
        }
    }
}

impl std::fmt::Debug for OptimizeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizeRequest")
            .field("calendar_chars", &self.calendar_text.chars().count())
            .field("preferences_chars", &self.preferences_text.chars().count())
            .field("api_key", &!self.api_key.is_empty())
            .field("gemini_api_key", &!self.gemini_api_key.is_empty())
            .field("gemini_model", &self.gemini_model)
            .finish()
    }
}

/// Orchestration backend client
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: HttpClient,
    base_url: String,
}

impl BackendClient {
    pub fn new(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/optimize", self.base_url)
    }

    /// Run the full pipeline remotely. Not retried.
    pub async fn optimize(&self, request: &OptimizeRequest) -> Result<PipelineResult> {
        debug!(url = %self.endpoint(), ?request, "Sending optimize request");

        let response = self
            .http_client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ServiceError {
                service: SERVICE,
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }

        let body = response.text().await?;
        decode_backend_result(&body)
    }
}

/// Decode a backend answer; a body reporting `"status": "error"` counts as a
/// failed attempt.
pub(crate) fn decode_backend_result(body: &str) -> Result<PipelineResult> {
    let result: PipelineResult = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(SERVICE, e.to_string()))?;

    if result.status == ResultStatus::Error {
        return Err(Error::MalformedResponse(
            SERVICE,
            "backend reported status \"error\"".to_string(),
        ));
    }
    Ok(result)
}

#[async_trait]
impl OrchestrationService for BackendClient {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<PipelineResult> {
        BackendClient::optimize(self, request).await
    }
}
