//! Model provider abstractions and implementations.
//!
//! The relay talks to the model service through [`ReportAnalyzer`], so the
//! HTTP layer can be exercised against [`mock::MockAnalyzer`] without network
//! access.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Caption returned when the model answered but produced no usable text.
pub const FALLBACK_CAPTION: &str = "No caption generated";

/// MIME type declared for inline images when the caller does not provide one.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Base64 image attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Raw base64, without a data-URL prefix.
    pub data: String,
}

/// Outcome of pulling the caption text out of a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// First text part of the first candidate.
    Text(String),
    /// Well-formed response without candidates, parts or text.
    Empty,
    /// JSON that does not have the candidate/content/parts shape.
    Malformed,
}

impl Extraction {
    /// Builds an extraction from optional text, treating `""` as empty.
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.is_empty() => Extraction::Text(text),
            _ => Extraction::Empty,
        }
    }

    /// The caption to hand back to the client.
    ///
    /// Text passes through untouched; both `Empty` and `Malformed` collapse
    /// to [`FALLBACK_CAPTION`].
    pub fn into_caption(self) -> String {
        match self {
            Extraction::Text(text) => text,
            Extraction::Empty | Extraction::Malformed => FALLBACK_CAPTION.to_string(),
        }
    }
}

/// A multimodal model that turns a report image and an instruction into text.
#[async_trait]
pub trait ReportAnalyzer: Send + Sync {
    /// Perform exactly one generation call.
    async fn analyze(
        &self,
        image: &InlineImage,
        prompt: &str,
    ) -> Result<Extraction, ProviderError>;

    /// Cheap readiness check; must not call the model.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Provider name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}
