//! Tiered scheduling pipeline
//!
//! ```text
//! Backend ──fail──▶ DirectCompression ──fail──▶ HeuristicFallback
//!                   (└▶ DirectGeneration when a generation key is present)
//! ```

mod offline;
mod orchestrator;
mod stage;
mod traits;
mod types;

pub use offline::{
    MAX_CONTEXT_LINES, OFFLINE_SPEEDUP_LABEL, PREFERENCE_PREVIEW_CHARS, offline_result,
    synthesize_compressed_text,
};
pub use orchestrator::{
    GENERATED_SPEEDUP_LABEL, GENERATION_FAILED_LABEL, NO_GENERATION_KEY_LABEL, Pipeline,
};
pub use stage::PipelineStage;
pub use traits::{CompressionService, GenerationService, OrchestrationService};
pub use types::{Credentials, PipelineOutcome, PipelineResult, ResultStatus};
