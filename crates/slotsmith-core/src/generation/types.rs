//! Request/response types for the Gemini-compatible `generateContent` API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A text part of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// A content block (one user turn)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    /// Single-part text content
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Controls the model's intermediate reasoning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Zero disables extended reasoning so every output token goes to the answer
    pub thinking_budget: u32,
}

/// Sampling and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub thinking_config: ThinkingConfig,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationParameters,
}

impl GenerateContentRequest {
    /// Create a single-prompt request
    pub fn new(prompt: impl Into<String>, generation_config: GenerationParameters) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            generation_config,
        }
    }
}

/// Pull the generated text from `candidates[0].content.parts[0].text`
pub fn extract_generated_text(response: &Value) -> Option<&str> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

/// Pull a provider error message from `error.message`
pub fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest::new(
            "propose slots",
            GenerationParameters {
                temperature: 0.7,
                max_output_tokens: 8192,
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "propose slots");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(
            value["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            0
        );
    }

    #[test]
    fn test_extract_generated_text() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "[{\"title\": \"A\"}]"}]}}]
        });
        assert_eq!(
            extract_generated_text(&response),
            Some("[{\"title\": \"A\"}]")
        );

        assert_eq!(extract_generated_text(&json!({"candidates": []})), None);
        let blank = json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]});
        assert_eq!(extract_generated_text(&blank), None);
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid."}}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("API key not valid.")
        );
        assert_eq!(extract_error_message("<html>"), None);
    }
}
