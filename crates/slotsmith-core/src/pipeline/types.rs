//! Pipeline input and output types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::metrics::Metrics;
use crate::schedule::ScheduleCandidate;

use super::stage::PipelineStage;

/// API keys and model choice for one run.
///
/// Empty keys are treated as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub compression_api_key: Option<String>,
    pub generation_api_key: Option<String>,
    pub generation_model: String,
}

impl Credentials {
    pub fn new(generation_model: impl Into<String>) -> Self {
        Self {
            compression_api_key: None,
            generation_api_key: None,
            generation_model: generation_model.into(),
        }
    }

    pub fn with_compression_key(mut self, key: impl Into<String>) -> Self {
        self.compression_api_key = Some(key.into());
        self
    }

    pub fn with_generation_key(mut self, key: impl Into<String>) -> Self {
        self.generation_api_key = Some(key.into());
        self
    }

    /// Compression key, if non-empty
    pub fn compression_key(&self) -> Option<&str> {
        non_empty(self.compression_api_key.as_deref())
    }

    /// Generation key, if non-empty
    pub fn generation_key(&self) -> Option<&str> {
        non_empty(self.generation_api_key.as_deref())
    }
}

fn non_empty(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("compression_api_key", &self.compression_key().map(|_| "***"))
            .field("generation_api_key", &self.generation_key().map(|_| "***"))
            .field("generation_model", &self.generation_model)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// The single value every tier produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: ResultStatus,
    /// JSON-encoded candidate array. Remote tiers may hand back text that is
    /// not valid JSON; callers should then show it as plain text.
    #[serde(default, deserialize_with = "deserialize_schedule")]
    pub schedule: String,
    #[serde(default)]
    pub compressed_text: String,
    pub metrics: Metrics,
}

impl PipelineResult {
    pub fn success(schedule: impl Into<String>, compressed_text: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            status: ResultStatus::Success,
            schedule: schedule.into(),
            compressed_text: compressed_text.into(),
            metrics,
        }
    }

    /// Decoded candidates, or `None` when the payload is not a candidate array
    pub fn candidates(&self) -> Option<Vec<ScheduleCandidate>> {
        ScheduleCandidate::decode_all(&self.schedule)
    }
}

// Accept the schedule as a string or as an already-decoded JSON value.
fn deserialize_schedule<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A result together with the stage that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    #[serde(flatten)]
    pub result: PipelineResult,
    pub stage: PipelineStage,
}

impl PipelineOutcome {
    pub fn new(result: PipelineResult, stage: PipelineStage) -> Self {
        Self { result, stage }
    }

    /// Banner describing degraded modes
    pub fn banner(&self) -> Option<&'static str> {
        self.stage.banner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Latencies, compute_metrics};

    #[test]
    fn test_credentials_treat_blank_as_absent() {
        let credentials = Credentials::new("m")
            .with_compression_key("  ")
            .with_generation_key("g-key");
        assert_eq!(credentials.compression_key(), None);
        assert_eq!(credentials.generation_key(), Some("g-key"));
        assert_eq!(Credentials::default().generation_key(), None);
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let credentials = Credentials::new("m").with_generation_key("very-secret");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_schedule_accepts_array_value() {
        let result: PipelineResult = serde_json::from_str(
            r#"{"status":"success","schedule":[{"title":"A","date":"Monday","time":"9:00 AM - 9:30 AM","duration":30,"reasoning":"Free"}],"compressed_text":"x","metrics":{}}"#,
        )
        .unwrap();
        let candidates = result.candidates().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].duration_minutes, 30);
    }

    #[test]
    fn test_candidates_none_for_plain_text() {
        let result = PipelineResult::success(
            "Monday at 11 looks good",
            "",
            compute_metrics(0, 0, Latencies::default()),
        );
        assert!(result.candidates().is_none());
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let outcome = PipelineOutcome::new(
            PipelineResult::success("[]", "ctx", compute_metrics(10, 5, Latencies::default())),
            PipelineStage::DirectCompression,
        );
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["stage"], "direct-compression");
        assert_eq!(value["metrics"]["compression_ratio"], "50.0%");
    }
}
