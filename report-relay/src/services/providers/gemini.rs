//! Gemini provider implementation.
//!
//! Sends one non-streaming `generateContent` request carrying the report
//! image inline plus the instruction text.

use super::{Extraction, InlineImage, ProviderError, ReportAnalyzer};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    /// `None` leaves the request unbounded.
    pub request_timeout: Option<Duration>,
}

/// Report analyzer backed by the Gemini REST API.
pub struct GeminiAnalyzer {
    config: GeminiConfig,
    client: Client,
}

impl GeminiAnalyzer {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method,
            self.config.api_key.expose_secret()
        )
    }
}

/// Build the two-part request body: inline image first, instruction second.
fn build_request(image: &InlineImage, prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                ContentPart::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
                ContentPart::Text {
                    text: prompt.to_string(),
                },
            ],
        }],
    }
}

/// Classify a decoded response body.
///
/// Only `candidates[0].content.parts[0].text` is inspected. Anything else in
/// the body, including other candidates and usage metadata, cannot turn a
/// present caption into a malformed one.
pub fn extract_caption(body: serde_json::Value) -> Extraction {
    log_usage(&body);

    match caption_text(&body) {
        Ok(text) => Extraction::from_text(text.map(str::to_string)),
        Err(expected) => {
            tracing::warn!(expected, "Gemini response did not match the expected shape");
            Extraction::Malformed
        }
    }
}

/// Walk the caption path. `Ok(None)` when a step is absent, `Err` naming the
/// step whose value has the wrong type.
fn caption_text(body: &Value) -> Result<Option<&str>, &'static str> {
    let Some(candidates) = field(body, "candidates")? else {
        return Ok(None);
    };
    let Some(candidate) = first(candidates, "candidates")? else {
        return Ok(None);
    };
    if let Some(reason) = candidate.get("finishReason").and_then(Value::as_str) {
        tracing::debug!(finish_reason = %reason, "Gemini candidate finished");
    }
    let Some(content) = field(candidate, "content")? else {
        return Ok(None);
    };
    let Some(parts) = field(content, "parts")? else {
        return Ok(None);
    };
    let Some(part) = first(parts, "parts")? else {
        return Ok(None);
    };
    let Some(text) = field(part, "text")? else {
        return Ok(None);
    };

    text.as_str().map(Some).ok_or("text")
}

/// A non-null member of `value`, which must itself be an object.
fn field<'a>(value: &'a Value, key: &'static str) -> Result<Option<&'a Value>, &'static str> {
    let object = value.as_object().ok_or(key)?;
    Ok(object.get(key).filter(|v| !v.is_null()))
}

/// First element of `value`, which must be an array.
fn first<'a>(value: &'a Value, key: &'static str) -> Result<Option<&'a Value>, &'static str> {
    Ok(value.as_array().ok_or(key)?.first())
}

fn log_usage(body: &Value) {
    if let Some(usage) = body.get("usageMetadata") {
        tracing::debug!(
            input_tokens = usage.get("promptTokenCount").and_then(serde_json::Value::as_u64),
            output_tokens = usage.get("candidatesTokenCount").and_then(serde_json::Value::as_u64),
            "Gemini token usage"
        );
    }
}

#[async_trait]
impl ReportAnalyzer for GeminiAnalyzer {
    async fn analyze(
        &self,
        image: &InlineImage,
        prompt: &str,
    ) -> Result<Extraction, ProviderError> {
        let request = build_request(image, prompt);
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            mime_type = %image.mime_type,
            image_len = image.data.len(),
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))?;

        Ok(extract_caption(body))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}
