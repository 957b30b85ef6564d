// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completions request/response types for OpenAI-compatible endpoints.

use serde::{Deserialize, Serialize};

/// A request to an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,

    /// Conversation messages, system prompt first.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature. Extraction runs near-deterministic (0.1).
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Structured-output mode request (strict JSON). Not every provider
    /// behind an OpenAI-compatible URL honors this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A single message in the chat conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Plain-text content.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Structured-output mode selector.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    /// Format type (e.g., "json_object").
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// Requests strict JSON-object output.
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// A full response from a chat-completions endpoint.
///
/// Only the fields the extractor consumes are modeled; aggregator endpoints
/// are uneven about the rest, so everything else is tolerated and dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion choices; the extractor reads the first.
    pub choices: Vec<ChatChoice>,
    /// Token usage statistics, when the provider reports them.
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// One completion choice within a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The generated assistant message.
    pub message: ChatMessage,
    /// Reason the generation stopped, when reported.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Error payload returned by the API on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type identifier, when the provider supplies one.
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    /// Human-readable error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request_with_json_mode() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![
                ChatMessage::system("You extract things."),
                ChatMessage::user("MC trips for June"),
            ],
            temperature: 0.1,
            max_tokens: 250,
            response_format: Some(ResponseFormat::json_object()),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "MC trips for June");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn serialize_request_omits_absent_response_format() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![ChatMessage::user("hello")],
            temperature: 0.1,
            max_tokens: 150,
            response_format: None,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn deserialize_minimal_response() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{}"}}]
        }"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.choices[0].message.content, "{}");
        assert!(resp.usage.is_none());
        assert!(resp.choices[0].finish_reason.is_none());
    }

    #[test]
    fn deserialize_full_response_with_usage() {
        let body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "done"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 4, "total_tokens": 24}
        }"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, 24);
    }

    #[test]
    fn deserialize_error_body_without_type() {
        let body = r#"{"error": {"message": "model not found"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.error.message, "model not found");
        assert!(err.error.type_.is_none());
    }
}
