//! Gemini-compatible schedule generation client
//!
//! Sends the compressed calendar context with a fixed instruction template and
//! returns the model's answer as JSON text, repaired when the model ran out of
//! output tokens mid-answer.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::pipeline::GenerationService;

use super::prompt::build_schedule_prompt;
use super::repair::{Repair, repair_json, strip_code_fences};
use super::types::{
    GenerateContentRequest, GenerationParameters, ThinkingConfig, extract_error_message,
    extract_generated_text,
};

const SERVICE: &str = "generation";

/// Schedule generation client
#[derive(Clone)]
pub struct GenerationClient {
    http_client: HttpClient,
    base_url: String,
    config: GenerationConfig,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("base_url", &self.base_url)
            .field("default_model", &self.config.default_model)
            .finish()
    }
}

impl GenerationClient {
    pub fn new(http_client: HttpClient, base_url: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        }
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_request(&self, compressed_text: &str, preferences: &str) -> GenerateContentRequest {
        GenerateContentRequest::new(
            build_schedule_prompt(compressed_text, preferences),
            GenerationParameters {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                thinking_config: ThinkingConfig {
                    thinking_budget: self.config.thinking_budget,
                },
            },
        )
    }

    /// Ask the model for schedule candidates.
    ///
    /// Returns JSON text (an array of candidates). Fails when the service is
    /// unreachable, answers with a non-2xx status or empty text, or when the
    /// answer is not JSON and the tail repair cannot fix it.
    pub async fn generate(
        &self,
        compressed_text: &str,
        preferences: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        let model = if model.trim().is_empty() {
            self.config.default_model.as_str()
        } else {
            model.trim()
        };
        let request = self.build_request(compressed_text, preferences);

        debug!(model = %model, context_chars = compressed_text.chars().count(), "Sending generation request");

        let response = self
            .http_client
            .post(self.endpoint(model))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(Error::ServiceError {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(SERVICE, format!("Failed to parse response: {}", e)))?;

        let text = extract_generated_text(&body).ok_or(Error::EmptyResponse(SERVICE))?;
        finish_schedule_text(text)
    }
}

/// Strip fences and repair; fails only when the text is unrecoverable
pub(crate) fn finish_schedule_text(text: &str) -> Result<String> {
    let cleaned = strip_code_fences(text);
    match repair_json(&cleaned) {
        Repair::Valid(json) => Ok(json),
        Repair::Repaired(json) => {
            info!("Generated schedule was truncated; closed the JSON tail");
            Ok(json)
        }
        Repair::Unrecoverable(raw) => {
            warn!(chars = raw.chars().count(), "Generated schedule is not repairable JSON");
            Err(Error::RepairFailure { raw })
        }
    }
}

#[async_trait]
impl GenerationService for GenerationClient {
    async fn generate(
        &self,
        compressed_text: &str,
        preferences: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        GenerationClient::generate(self, compressed_text, preferences, api_key, model).await
    }
}
