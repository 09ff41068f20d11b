mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{assert_json_error, body_bytes, body_json, mock_app, mock_app_with, post_caption, send};
use report_relay::config::RelayOptions;
use report_relay::services::providers::mock::MockOutcome;
use report_relay::services::FALLBACK_CAPTION;
use serde_json::json;
use service_core::error::UPSTREAM_FAILURE_MESSAGE;

#[tokio::test]
async fn returns_model_caption_verbatim() {
    let (app, analyzer) = mock_app(MockOutcome::Caption("## Tests Performed\n- CBC".to_string()));

    let response =
        post_caption(app, json!({ "imageBase64": "/9j/4AAQSkZJRg==" }).to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r###"{"caption":"## Tests Performed\n- CBC"}"###
    );
    assert_eq!(analyzer.calls(), 1);
}

#[tokio::test]
async fn caption_is_not_reformatted() {
    let caption = "  # Title  \n\n* item one\n* item two\n\n**bold**\t<b>raw</b>\n\n";
    let (app, _) = mock_app(MockOutcome::Caption(caption.to_string()));

    let response = post_caption(app, json!({ "imageBase64": "aGk=" }).to_string()).await;

    assert_eq!(body_json(response).await["caption"], caption);
}

#[tokio::test]
async fn missing_image_is_rejected_without_calling_the_model() {
    for body in [
        json!({}),
        json!({ "imageBase64": "" }),
        json!({ "imageBase64": null }),
        json!({ "mimeType": "image/png" }),
    ] {
        let (app, analyzer) = mock_app(MockOutcome::Caption("unused".to_string()));

        let response = post_caption(app, body.to_string()).await;

        assert_json_error(response, StatusCode::BAD_REQUEST, "Image data is required").await;
        assert_eq!(analyzer.calls(), 0, "model called for body {}", body);
    }
}

#[tokio::test]
async fn unparseable_body_is_a_bad_request() {
    let (app, analyzer) = mock_app(MockOutcome::Caption("unused".to_string()));

    let response = post_caption(app, "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn empty_and_malformed_model_output_fall_back() {
    for outcome in [MockOutcome::Empty, MockOutcome::Malformed] {
        let (app, _) = mock_app(outcome);

        let response = post_caption(app, json!({ "imageBase64": "aGk=" }).to_string()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "caption": FALLBACK_CAPTION }));
    }
}

#[tokio::test]
async fn upstream_failure_is_a_generic_500() {
    for cause in ["connection reset", "API error 403: API key not valid"] {
        let (app, analyzer) = mock_app(MockOutcome::Fail(cause.to_string()));

        let response = post_caption(app, json!({ "imageBase64": "aGk=" }).to_string()).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": UPSTREAM_FAILURE_MESSAGE }));
        assert_eq!(analyzer.calls(), 1);
    }
}

#[tokio::test]
async fn declares_jpeg_unless_told_otherwise() {
    let (app, analyzer) = mock_app(MockOutcome::Caption("ok".to_string()));
    post_caption(app, json!({ "imageBase64": "aGk=" }).to_string()).await;
    let image = analyzer.last_image().expect("model was called");
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.data, "aGk=");

    let (app, analyzer) = mock_app(MockOutcome::Caption("ok".to_string()));
    post_caption(
        app,
        json!({ "imageBase64": "iVBORw0KGgo=", "mimeType": "image/png" }).to_string(),
    )
    .await;
    assert_eq!(analyzer.last_image().unwrap().mime_type, "image/png");
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let (app, analyzer) = mock_app(MockOutcome::Caption("unused".to_string()));

        let response = send(
            app,
            Request::builder()
                .method(method.clone())
                .uri("/caption")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_json_error(response, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").await;
        assert_eq!(analyzer.calls(), 0);
    }
}

#[tokio::test]
async fn plain_options_returns_empty_ok() {
    let (app, _) = mock_app(MockOutcome::Caption("unused".to_string()));

    let response = send(
        app,
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/caption")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (app, analyzer) = mock_app(MockOutcome::Caption("unused".to_string()));

    let response = send(
        app,
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/caption")
            .header(header::ORIGIN, "https://reports.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-requested-with")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_uppercase();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
    let headers = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(headers.contains("x-requested-with"));
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn restricted_cors_only_echoes_listed_origins() {
    let options = RelayOptions {
        cors_origin: report_relay::config::CorsOrigin::List(vec![
            "https://reports.example".to_string(),
        ]),
        ..RelayOptions::default()
    };

    let request = |origin: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/caption")
            .header(header::ORIGIN, origin)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "imageBase64": "aGk=" }).to_string()))
            .unwrap()
    };

    let (app, _) = mock_app_with(MockOutcome::Caption("ok".to_string()), &options);
    let allowed = send(app, request("https://reports.example")).await;
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://reports.example"
    );

    let (app, _) = mock_app_with(MockOutcome::Caption("ok".to_string()), &options);
    let denied = send(app, request("https://evil.example")).await;
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let options = RelayOptions {
        max_body_bytes: 64,
        ..RelayOptions::default()
    };
    let (app, analyzer) = mock_app_with(MockOutcome::Caption("unused".to_string()), &options);

    let response = post_caption(
        app,
        json!({ "imageBase64": "A".repeat(1024) }).to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (app, _) = mock_app(MockOutcome::Caption("ok".to_string()));

    let response = send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri("/caption")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", "req-42")
            .body(Body::from(json!({ "imageBase64": "aGk=" }).to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn health_reports_provider() {
    let (app, _) = mock_app(MockOutcome::Empty);

    let response = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn unknown_paths_are_404_without_static_dir() {
    let (app, _) = mock_app(MockOutcome::Empty);

    let response = send(
        app,
        Request::builder().uri("/reports/42").body(Body::empty()).unwrap(),
    )
    .await;

    assert_json_error(response, StatusCode::NOT_FOUND, "Not found").await;
}
