//! Compression request/result types

use std::time::Duration;

use serde::Serialize;

use crate::metrics::compression_ratio;

/// Compression settings sent with every request
#[derive(Debug, Clone, Serialize)]
pub struct CompressionSettings {
    pub rate: String,
}

/// Request body for the compression endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CompressionRequest {
    /// Calendar text used as context
    pub context: String,
    /// Synthesized instruction embedding the preferences
    pub prompt: String,
    /// Model the compressed prompt is tuned for
    pub model: String,
    pub scaledown: CompressionSettings,
}

impl CompressionRequest {
    pub fn new(
        calendar_text: &str,
        preferences_text: &str,
        model: impl Into<String>,
        rate: impl Into<String>,
    ) -> Self {
        Self {
            context: calendar_text.to_string(),
            prompt: format!(
                "Based on the context, schedule a meeting with these constraints: {}",
                preferences_text
            ),
            model: model.into(),
            scaledown: CompressionSettings { rate: rate.into() },
        }
    }
}

/// Output of the compression tier
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub compressed_text: String,
    /// Characters of calendar plus preferences
    pub raw_size: usize,
    /// Characters of the compressed text
    pub compressed_size: usize,
    /// Percentage saved; negative if the text grew
    pub ratio: f64,
    /// Wall-clock time of the compression call
    pub latency: Duration,
}

impl CompressionResult {
    pub fn new(compressed_text: impl Into<String>, raw_size: usize, latency: Duration) -> Self {
        let compressed_text = compressed_text.into();
        let compressed_size = compressed_text.chars().count();
        Self {
            ratio: compression_ratio(raw_size, compressed_size),
            compressed_text,
            raw_size,
            compressed_size,
            latency,
        }
    }
}

/// Input size as measured by every tier
pub fn raw_input_size(calendar_text: &str, preferences_text: &str) -> usize {
    calendar_text.chars().count() + preferences_text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = CompressionRequest::new("MONDAY", "30 min", "gpt-4o", "auto");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["context"], "MONDAY");
        assert_eq!(
            value["prompt"],
            "Based on the context, schedule a meeting with these constraints: 30 min"
        );
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["scaledown"]["rate"], "auto");
    }

    #[test]
    fn test_result_computes_ratio() {
        let result = CompressionResult::new("abcde", 20, Duration::from_millis(5));
        assert_eq!(result.compressed_size, 5);
        assert_eq!(result.ratio, 75.0);
    }

    #[test]
    fn test_raw_input_size_counts_chars() {
        assert_eq!(raw_input_size("ab", "c"), 3);
        assert_eq!(raw_input_size("é–", ""), 2);
    }
}
