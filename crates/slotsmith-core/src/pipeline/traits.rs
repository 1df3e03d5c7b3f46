//! Service seams for the remote tiers

use async_trait::async_trait;

use crate::backend::OptimizeRequest;
use crate::compression::CompressionResult;
use crate::error::Result;

use super::types::PipelineResult;

/// Runs the whole pipeline remotely
#[async_trait]
pub trait OrchestrationService: Send + Sync {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<PipelineResult>;
}

/// Compresses calendar context against the preferences
#[async_trait]
pub trait CompressionService: Send + Sync {
    async fn compress(
        &self,
        calendar_text: &str,
        preferences_text: &str,
        api_key: &str,
    ) -> Result<CompressionResult>;
}

/// Produces schedule candidates as JSON text
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        compressed_text: &str,
        preferences_text: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String>;
}
