//! Context compression - ScaleDown-compatible API
//!
//! This module provides:
//! - HTTP client that compresses calendar text against the preferences
//! - Ordered extraction strategies for the service's response shapes
//! - [`CompressionResult`] with size, ratio and latency

mod client;
mod extract;
mod types;

pub use client::CompressionClient;
pub use extract::{ExtractionStrategy, extract_compressed_text};
pub use types::{CompressionRequest, CompressionResult, CompressionSettings, raw_input_size};
