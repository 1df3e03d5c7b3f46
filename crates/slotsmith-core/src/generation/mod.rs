//! Schedule generation - Gemini-compatible API
//!
//! This module provides:
//! - HTTP client for `generateContent` with reasoning disabled
//! - The schedule instruction template
//! - Code-fence stripping and tail repair for truncated JSON answers

mod client;
mod prompt;
mod repair;
mod types;

pub use client::GenerationClient;
pub use prompt::{REQUESTED_OPTIONS, build_schedule_prompt};
pub use repair::{Repair, repair_json, strip_code_fences};
pub use types::{
    Content, GenerateContentRequest, GenerationParameters, Part, ThinkingConfig,
    extract_error_message, extract_generated_text,
};
