use crate::services::{InlineImage, DEFAULT_IMAGE_MIME_TYPE};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /caption`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    /// Raw base64 image bytes, no data-URL prefix.
    #[serde(default)]
    #[validate(
        required(message = "Image data is required"),
        length(min = 1, message = "Image data is required")
    )]
    pub image_base64: Option<String>,

    /// Declared type of the uploaded file. Only `image/*` values are honoured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl CaptionRequest {
    /// MIME type to declare upstream, `image/jpeg` unless the client sent an
    /// image type.
    pub fn declared_mime_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .map(str::trim)
            .filter(|m| m.starts_with("image/") && m.len() > "image/".len())
            .unwrap_or(DEFAULT_IMAGE_MIME_TYPE)
    }

    /// Consume a validated request into the upstream attachment.
    pub fn into_inline_image(self) -> InlineImage {
        let mime_type = self.declared_mime_type().to_string();
        InlineImage {
            mime_type,
            data: self.image_base64.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CaptionResponse {
    pub caption: String,
}
