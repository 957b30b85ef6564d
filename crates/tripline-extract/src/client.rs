// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completion endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};
use tripline_core::error::TriplineError;
use tripline_core::traits::ExtractionBackend;

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// Sampling temperature for extraction calls. Low on purpose: the prompts
/// ask for structured slot values, not prose.
const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Appended to the system prompt when the structured-output retry fires.
const JSON_ONLY_SUFFIX: &str = "\n\nIMPORTANT: Return ONLY valid JSON with no markdown formatting, no code fences, and no explanatory text.";

/// HTTP client for an OpenAI-compatible chat-completions API.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 502, 503, 504). Every call is tried
/// first in strict JSON-object mode; providers that reject that mode get
/// one more call with the JSON requirement spelled out in the prompt
/// instead, since aggregator endpoints are uneven about `response_format`.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    model: String,
    max_retries: u32,
    base_url: String,
}

impl LlmClient {
    /// Creates a new extraction client.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token for the endpoint
    /// * `base_url` - API root (e.g., "https://api.llm7.io/v1")
    /// * `model` - Model identifier (e.g., "gpt-4o")
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, TriplineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                TriplineError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| TriplineError::Extract {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: model.to_string(),
            max_retries: 2,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Sends one completion request and returns the assistant text.
    ///
    /// On transient errors, retries after a 1-second delay, up to
    /// `max_retries` times.
    async fn complete(&self, request: &ChatRequest) -> Result<String, TriplineError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying extraction request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| TriplineError::Extract {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "extraction response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| TriplineError::Extract {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let chat: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| TriplineError::Extract {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return chat
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| TriplineError::Extract {
                        message: "API response contained no choices".into(),
                        source: None,
                    });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(TriplineError::Extract {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let error_msg = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                match api_err.error.type_ {
                    Some(type_) => {
                        format!("extraction API error ({type_}): {}", api_err.error.message)
                    }
                    None => format!("extraction API error: {}", api_err.error.message),
                }
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(TriplineError::Extract {
                message: error_msg,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| TriplineError::Extract {
            message: "extraction request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl ExtractionBackend for LlmClient {
    async fn extract_json(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, TriplineError> {
        let strict = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: EXTRACTION_TEMPERATURE,
            max_tokens,
            response_format: Some(ResponseFormat::json_object()),
        };

        match self.complete(&strict).await {
            Ok(content) => Ok(content),
            Err(err) => {
                debug!("structured output mode failed, retrying as plain completion: {err}");
                let plain = ChatRequest {
                    messages: vec![
                        ChatMessage::system(format!("{system}{JSON_ONLY_SUFFIX}")),
                        ChatMessage::user(user),
                    ],
                    response_format: None,
                    ..strict
                };
                self.complete(&plain).await
            }
        }
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}
