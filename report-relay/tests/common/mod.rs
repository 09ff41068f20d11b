#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use report_relay::config::RelayOptions;
use report_relay::services::providers::mock::{MockAnalyzer, MockOutcome};
use report_relay::startup::{build_router, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router backed by a mock analyzer, plus a handle to inspect its calls.
pub fn mock_app(outcome: MockOutcome) -> (Router, Arc<MockAnalyzer>) {
    mock_app_with(outcome, &RelayOptions::default())
}

pub fn mock_app_with(outcome: MockOutcome, options: &RelayOptions) -> (Router, Arc<MockAnalyzer>) {
    let analyzer = Arc::new(MockAnalyzer::new(outcome));
    let router = build_router(AppState::new(analyzer.clone()), options);
    (router, analyzer)
}

pub async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.expect("router is infallible")
}

pub async fn post_caption(router: Router, body: impl Into<Body>) -> Response {
    send(
        router,
        Request::builder()
            .method(Method::POST)
            .uri("/caption")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

pub async fn assert_json_error(response: Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"], message);
}
