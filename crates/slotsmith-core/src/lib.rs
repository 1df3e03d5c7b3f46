//! Slotsmith Core Library
//!
//! This crate provides the core functionality for Slotsmith, including:
//! - Tiered fallback pipeline (orchestration service, direct compression,
//!   direct generation, local heuristic)
//! - Context compression client (ScaleDown-compatible API)
//! - Schedule generation client (Gemini-compatible API)
//! - Repair of truncated JSON from generative models
//! - Local slot-finding heuristic over free-text calendars
//! - Size, ratio and latency metrics

pub mod backend;
pub mod compression;
pub mod config;
pub mod error;
pub mod generation;
pub mod metrics;
pub mod pipeline;
pub mod schedule;

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{Credentials, Pipeline, PipelineOutcome, PipelineResult, PipelineStage};
    pub use crate::schedule::{ScheduleCandidate, find_slots};
}
