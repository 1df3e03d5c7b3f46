//! Size, ratio and latency metrics for a pipeline run
//!
//! Everything here is pure. Latencies are carried as [`Duration`]s and only
//! rounded to whole milliseconds when they are reported.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Speedup label when no generation call contributed to the result
pub const SPEEDUP_NOT_APPLICABLE: &str = "N/A";

/// Wall-clock time spent in each remote stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Latencies {
    pub compression: Duration,
    pub generation: Duration,
}

impl Latencies {
    pub fn new(compression: Duration, generation: Duration) -> Self {
        Self {
            compression,
            generation,
        }
    }

    pub fn total(&self) -> Duration {
        self.compression + self.generation
    }
}

/// Metrics reported alongside every pipeline result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub raw_input_size: usize,
    #[serde(default)]
    pub compressed_input_size: usize,
    /// Percentage string with one decimal, e.g. `"42.3%"`
    #[serde(default, deserialize_with = "deserialize_ratio")]
    pub compression_ratio: String,
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub compression_latency_ms: u64,
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub generation_latency_ms: u64,
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub total_pipeline_ms: u64,
    #[serde(default = "default_speedup")]
    pub speedup_factor: String,
}

impl Metrics {
    /// Set the display label describing which generation path was used
    pub fn with_speedup_factor(mut self, label: impl Into<String>) -> Self {
        self.speedup_factor = label.into();
        self
    }
}

/// `100 * (1 - compressed / max(raw, 1))`
///
/// Negative when the "compressed" text is longer than the input.
pub fn compression_ratio(raw_size: usize, compressed_size: usize) -> f64 {
    let divisor = raw_size.max(1) as f64;
    100.0 * (1.0 - compressed_size as f64 / divisor)
}

/// Format a percentage with one decimal place
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.1}%", ratio)
}

/// Round a duration to the nearest whole millisecond
pub fn round_millis(duration: Duration) -> u64 {
    (duration.as_secs_f64() * 1000.0).round() as u64
}

/// Compute the reported metrics for a run
pub fn compute_metrics(raw_size: usize, compressed_size: usize, latencies: Latencies) -> Metrics {
    Metrics {
        raw_input_size: raw_size,
        compressed_input_size: compressed_size,
        compression_ratio: format_ratio(compression_ratio(raw_size, compressed_size)),
        compression_latency_ms: round_millis(latencies.compression),
        generation_latency_ms: round_millis(latencies.generation),
        total_pipeline_ms: round_millis(latencies.total()),
        speedup_factor: default_speedup(),
    }
}

/// Normalize a ratio reported by a remote service.
///
/// Strings pass through; numbers in `[-1, 1]` are treated as fractions.
pub fn normalize_ratio(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            let ratio = n.as_f64().unwrap_or_default();
            if ratio.abs() <= 1.0 {
                format_ratio(ratio * 100.0)
            } else {
                format_ratio(ratio)
            }
        }
        _ => String::new(),
    }
}

fn default_speedup() -> String {
    SPEEDUP_NOT_APPLICABLE.to_string()
}

fn deserialize_ratio<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_ratio(&value))
}

// Remote services report latencies either as numbers or as numeric strings.
fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let millis = match &value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or_default(),
        _ => 0.0,
    };
    Ok(millis.max(0.0).round() as u64)
}
