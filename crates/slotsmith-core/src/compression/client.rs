//! Context compression client (ScaleDown-compatible API)

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::debug;

use crate::config::CompressionConfig;
use crate::error::{Error, Result};
use crate::pipeline::CompressionService;

use super::extract::extract_compressed_text;
use super::types::{CompressionRequest, CompressionResult, raw_input_size};

const SERVICE: &str = "compression";

/// Longest slice of an error body kept in the error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Compression service client
#[derive(Clone)]
pub struct CompressionClient {
    http_client: HttpClient,
    url: String,
    config: CompressionConfig,
}

impl std::fmt::Debug for CompressionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressionClient")
            .field("url", &self.url)
            .field("target_model", &self.config.target_model)
            .finish()
    }
}

impl CompressionClient {
    pub fn new(http_client: HttpClient, url: impl Into<String>, config: CompressionConfig) -> Self {
        Self {
            http_client,
            url: url.into(),
            config,
        }
    }

    /// Compress the calendar against the preferences.
    ///
    /// Latency covers the HTTP round trip only.
    pub async fn compress(
        &self,
        calendar_text: &str,
        preferences_text: &str,
        api_key: &str,
    ) -> Result<CompressionResult> {
        let raw_size = raw_input_size(calendar_text, preferences_text);
        let request = CompressionRequest::new(
            calendar_text,
            preferences_text,
            &self.config.target_model,
            &self.config.rate,
        );

        debug!(url = %self.url, raw_size, "Sending compression request");

        let started = Instant::now();
        let response = self
            .http_client
            .post(&self.url)
            .header("x-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(Error::NetworkError)?;
        let latency = started.elapsed();

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.chars().take(MAX_ERROR_BODY_CHARS).collect()
            };
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

        let (strategy, compressed_text) = extract_compressed_text(&body);
        let result = CompressionResult::new(compressed_text, raw_size, latency);

        debug!(
            ?strategy,
            compressed_size = result.compressed_size,
            ratio = result.ratio,
            latency_ms = latency.as_millis() as u64,
            "Compression succeeded"
        );

        Ok(result)
    }
}

#[async_trait]
impl CompressionService for CompressionClient {
    async fn compress(
        &self,
        calendar_text: &str,
        preferences_text: &str,
        api_key: &str,
    ) -> Result<CompressionResult> {
        CompressionClient::compress(self, calendar_text, preferences_text, api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_client_debug() {
        let client = CompressionClient::new(
            HttpClient::new(),
            "https://example.com/compress/raw/",
            Config::default().compression,
        );
        let debug = format!("{:?}", client);
        assert!(debug.contains("CompressionClient"));
        assert!(debug.contains("gpt-4o"));
    }

    #[test]
    fn test_client_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompressionClient>();
    }
}
