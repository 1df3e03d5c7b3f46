//! Locating the compressed text in a compression response
//!
//! The service has returned several response shapes over time. Strategies are
//! tried in a fixed order and the first non-empty string wins; the last one
//! re-serializes the whole response so success always yields text.

use serde_json::Value;

/// One way of finding the compressed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `results.compressed_prompt`
    NestedResults,
    /// Top-level `compressed_prompt`
    CompressedPrompt,
    /// Top-level `compressed_text`
    CompressedText,
    /// Top-level `text`
    Text,
    /// The entire response as JSON
    WholeResponse,
}

impl ExtractionStrategy {
    /// Priority order
    pub const ORDER: [ExtractionStrategy; 5] = [
        ExtractionStrategy::NestedResults,
        ExtractionStrategy::CompressedPrompt,
        ExtractionStrategy::CompressedText,
        ExtractionStrategy::Text,
        ExtractionStrategy::WholeResponse,
    ];

    pub fn apply(&self, response: &Value) -> Option<String> {
        let field = match self {
            ExtractionStrategy::NestedResults => response.pointer("/results/compressed_prompt"),
            ExtractionStrategy::CompressedPrompt => response.get("compressed_prompt"),
            ExtractionStrategy::CompressedText => response.get("compressed_text"),
            ExtractionStrategy::Text => response.get("text"),
            ExtractionStrategy::WholeResponse => return Some(response.to_string()),
        };
        field
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

/// Apply the strategies in order; returns the winning strategy and its text
pub fn extract_compressed_text(response: &Value) -> (ExtractionStrategy, String) {
    ExtractionStrategy::ORDER
        .into_iter()
        .find_map(|strategy| strategy.apply(response).map(|text| (strategy, text)))
        .unwrap_or_else(|| (ExtractionStrategy::WholeResponse, response.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_results_win() {
        let response = json!({
            "results": {"compressed_prompt": "nested"},
            "compressed_prompt": "top",
            "text": "plain"
        });
        assert_eq!(
            extract_compressed_text(&response),
            (ExtractionStrategy::NestedResults, "nested".to_string())
        );
    }

    #[test]
    fn test_priority_order() {
        let response = json!({"compressed_text": "ct", "text": "plain"});
        assert_eq!(
            extract_compressed_text(&response),
            (ExtractionStrategy::CompressedText, "ct".to_string())
        );

        let response = json!({"text": "plain"});
        assert_eq!(extract_compressed_text(&response).0, ExtractionStrategy::Text);
    }

    #[test]
    fn test_empty_and_non_string_fields_skipped() {
        let response = json!({
            "results": {"compressed_prompt": ""},
            "compressed_prompt": 42,
            "compressed_text": "fallback"
        });
        assert_eq!(
            extract_compressed_text(&response),
            (ExtractionStrategy::CompressedText, "fallback".to_string())
        );
    }

    #[test]
    fn test_whole_response_fallback() {
        let response = json!({"status": "ok", "tokens": 12});
        let (strategy, text) = extract_compressed_text(&response);
        assert_eq!(strategy, ExtractionStrategy::WholeResponse);
        assert!(text.contains("\"status\":\"ok\""));

        let (_, text) = extract_compressed_text(&json!({}));
        assert_eq!(text, "{}");
    }
}
