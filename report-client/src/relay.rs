use crate::error::ClientError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Body sent to `POST /caption`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub image_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionBody {
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    endpoint: String,
}

impl RelayClient {
    /// `endpoint` is the full URL of the caption route.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Submit one image. Returns the caption, `None` when the relay sent none.
    pub async fn submit(&self, request: &AnalysisRequest) -> Result<Option<String>, ClientError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            payload_len = request.image_base64.len(),
            "Submitting report for analysis"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to reach the relay: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error);

            let message = match detail {
                Some(detail) => format!("Analysis failed: {} ({})", status.as_u16(), detail),
                None => format!("Analysis failed: {}", status.as_u16()),
            };
            tracing::warn!(status = status.as_u16(), "Relay rejected analysis request");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: CaptionBody = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("Invalid response from relay: {}", e)))?;

        Ok(body.caption)
    }
}
