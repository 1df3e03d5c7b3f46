//! Tiered fallback pipeline
//!
//! Stages are tried in the order given by [`PipelineStage::next`]. Each stage
//! either produces a result or fails; a failure is logged and the next stage
//! is attempted. The final stage runs entirely locally and cannot fail, so
//! [`Pipeline::run`] always returns an outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::backend::{BackendClient, OptimizeRequest};
use crate::compression::{CompressionClient, CompressionResult};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::generation::GenerationClient;
use crate::metrics::{Latencies, compute_metrics};
use crate::schedule::{MAX_CANDIDATES, ScheduleCandidate, SlotFinder};

use super::offline::offline_result;
use super::stage::PipelineStage;
use super::traits::{CompressionService, GenerationService, OrchestrationService};
use super::types::{Credentials, PipelineOutcome, PipelineResult};

/// Speedup label when the generation service produced the schedule
pub const GENERATED_SPEEDUP_LABEL: &str = "Real AI";
/// Speedup label when generation was attempted and failed
pub const GENERATION_FAILED_LABEL: &str = "N/A (Generation Failed)";
/// Speedup label when no generation key was supplied
pub const NO_GENERATION_KEY_LABEL: &str = "N/A (No Generation Key)";

/// The orchestrator. Holds one client per remote tier.
pub struct Pipeline {
    backend: Arc<dyn OrchestrationService>,
    compressor: Arc<dyn CompressionService>,
    generator: Arc<dyn GenerationService>,
    default_model: String,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn OrchestrationService>,
        compressor: Arc<dyn CompressionService>,
        generator: Arc<dyn GenerationService>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            compressor,
            generator,
            default_model: default_model.into(),
        }
    }

    /// Build the HTTP-backed pipeline. All clients share one transport, which
    /// carries the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.services.timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(Self::new(
            Arc::new(BackendClient::new(
                http_client.clone(),
                &config.services.backend_url,
            )),
            Arc::new(CompressionClient::new(
                http_client.clone(),
                &config.services.compression_url,
                config.compression.clone(),
            )),
            Arc::new(GenerationClient::new(
                http_client,
                &config.services.generation_base_url,
                config.generation.clone(),
            )),
            &config.generation.default_model,
        ))
    }

    /// Run the fallback chain to completion
    pub async fn run(
        &self,
        calendar_text: &str,
        preferences_text: &str,
        credentials: &Credentials,
    ) -> PipelineOutcome {
        let span = info_span!("pipeline", run_id = %Uuid::new_v4());

        async move {
            let mut stage = PipelineStage::FIRST;
            // Every stage with a fallback is remote; the last one is local
            // and cannot fail.
            while let Some(fallback) = stage.next() {
                debug!(stage = %stage, "Attempting stage");
                let attempt = match stage {
                    PipelineStage::Backend => self
                        .run_backend(calendar_text, preferences_text, credentials)
                        .await
                        .map(|result| PipelineOutcome::new(result, PipelineStage::Backend)),
                    _ => {
                        self.run_direct(calendar_text, preferences_text, credentials)
                            .await
                    }
                };

                match attempt {
                    Ok(outcome) => {
                        info!(stage = %outcome.stage, "Pipeline finished");
                        return outcome;
                    }
                    Err(e) => {
                        warn!(
                            stage = %stage,
                            kind = ?e.kind(),
                            code = e.code(),
                            error = %e,
                            hint = ?e.suggestion(),
                            "Stage failed"
                        );
                        stage = fallback;
                    }
                }
            }

            info!(stage = %stage, "Pipeline finished");
            PipelineOutcome::new(offline_result(calendar_text, preferences_text), stage)
        }
        .instrument(span)
        .await
    }

    async fn run_backend(
        &self,
        calendar_text: &str,
        preferences_text: &str,
        credentials: &Credentials,
    ) -> Result<PipelineResult> {
        let request = OptimizeRequest::new(calendar_text, preferences_text, credentials);
        self.backend.optimize(&request).await
    }

    async fn run_direct(
        &self,
        calendar_text: &str,
        preferences_text: &str,
        credentials: &Credentials,
    ) -> Result<PipelineOutcome> {
        let compression_key = credentials
            .compression_key()
            .ok_or(Error::CredentialMissing("compression"))?;

        let compressed = self
            .compressor
            .compress(calendar_text, preferences_text, compression_key)
            .await?;

        let Some(generation_key) = credentials.generation_key() else {
            debug!("No generation key; using heuristic on compressed context");
            return Ok(heuristic_outcome(compressed, NO_GENERATION_KEY_LABEL));
        };

        let model = match credentials.generation_model.trim() {
            "" => self.default_model.as_str(),
            model => model,
        };

        let started = Instant::now();
        match self
            .generator
            .generate(
                &compressed.compressed_text,
                preferences_text,
                generation_key,
                model,
            )
            .await
        {
            Ok(schedule) => {
                let schedule = cap_candidates(schedule);
                let latencies = Latencies::new(compressed.latency, started.elapsed());
                let metrics = compute_metrics(
                    compressed.raw_size,
                    compressed.compressed_size,
                    latencies,
                )
                .with_speedup_factor(GENERATED_SPEEDUP_LABEL);
                Ok(PipelineOutcome::new(
                    PipelineResult::success(schedule, compressed.compressed_text, metrics),
                    PipelineStage::DirectGeneration,
                ))
            }
            Err(e) => {
                warn!(
                    kind = ?e.kind(),
                    code = e.code(),
                    error = %e,
                    "Generation failed; using heuristic"
                );
                Ok(heuristic_outcome(compressed, GENERATION_FAILED_LABEL))
            }
        }
    }
}

/// Keep at most [`MAX_CANDIDATES`] when the answer is a candidate array.
/// Anything else passes through for plain-text display.
fn cap_candidates(schedule: String) -> String {
    match ScheduleCandidate::decode_all(&schedule) {
        Some(candidates) if candidates.len() > MAX_CANDIDATES => {
            debug!(proposed = candidates.len(), "Dropping surplus generated candidates");
            ScheduleCandidate::encode_all(&candidates[..MAX_CANDIDATES])
        }
        _ => schedule,
    }
}

/// Heuristic candidates over the compressed context, with compression metrics
fn heuristic_outcome(compressed: CompressionResult, speedup_label: &str) -> PipelineOutcome {
    let candidates = SlotFinder::new()
        .with_compression_ratio(compressed.ratio)
        .find(&compressed.compressed_text);

    let metrics = compute_metrics(
        compressed.raw_size,
        compressed.compressed_size,
        Latencies::new(compressed.latency, Duration::ZERO),
    )
    .with_speedup_factor(speedup_label);

    PipelineOutcome::new(
        PipelineResult::success(
            ScheduleCandidate::encode_all(&candidates),
            compressed.compressed_text,
            metrics,
        ),
        PipelineStage::DirectCompression,
    )
}
