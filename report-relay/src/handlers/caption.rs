use crate::models::{CaptionRequest, CaptionResponse};
use crate::prompt::MEDICAL_REPORT_PROMPT;
use crate::services::Extraction;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

/// `POST /caption`: validate, call the model once, return its text.
pub async fn create_caption(
    State(state): State<AppState>,
    payload: Result<Json<CaptionRequest>, JsonRejection>,
) -> Result<Json<CaptionResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest {
                message: "Invalid request body".to_string(),
                details: Some(rejection.body_text()),
            }
        }
    })?;

    request.validate()?;

    let image = request.into_inline_image();
    tracing::info!(
        provider = state.analyzer.name(),
        mime_type = %image.mime_type,
        image_len = image.data.len(),
        "Analyzing report image"
    );

    let extraction = state
        .analyzer
        .analyze(&image, MEDICAL_REPORT_PROMPT)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error generating caption");
            AppError::UpstreamFailure(anyhow::Error::new(e))
        })?;

    match &extraction {
        Extraction::Text(text) => tracing::info!(caption_len = text.len(), "Caption generated"),
        Extraction::Empty => tracing::warn!("Model returned no text, using fallback caption"),
        Extraction::Malformed => {
            tracing::warn!("Model response was malformed, using fallback caption")
        }
    }

    Ok(Json(CaptionResponse {
        caption: extraction.into_caption(),
    }))
}

/// `OPTIONS /caption` without CORS preflight headers.
pub async fn caption_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, OPTIONS"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, X-Requested-With"),
            ),
        ],
    )
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
