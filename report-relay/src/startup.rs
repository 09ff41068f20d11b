//! Application startup and lifecycle management.
//!
//! One router serves every deployment shape; [`RelayOptions`] decides the
//! CORS policy and whether the client build is hosted alongside the API.

use crate::config::{CorsOrigin, ProviderKind, RelayConfig, RelayOptions};
use crate::handlers;
use crate::services::providers::gemini::{GeminiAnalyzer, GeminiConfig};
use crate::services::providers::mock::MockAnalyzer;
use crate::services::ReportAnalyzer;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn ReportAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn ReportAnalyzer>) -> Self {
        Self { analyzer }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

fn cors_layer(origin: &CorsOrigin) -> CorsLayer {
    let allow_origin = match origin {
        CorsOrigin::Any => AllowOrigin::any(),
        CorsOrigin::List(origins) => AllowOrigin::list(origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Build the relay router for the given deployment options.
pub fn build_router(state: AppState, options: &RelayOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/caption",
            post(handlers::create_caption)
                .options(handlers::caption_preflight)
                .fallback(handlers::method_not_allowed),
        );

    router = match &options.static_dir {
        Some(dir) if options.spa_fallback => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    router
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(&options.cors_origin))
        .with_state(state)
}

/// Construct the analyzer selected by configuration.
pub fn build_analyzer(config: &RelayConfig) -> Result<Arc<dyn ReportAnalyzer>, AppError> {
    match config.models.provider {
        ProviderKind::Gemini => {
            let api_key = config.google.api_key.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY is required but not set"))
            })?;
            let analyzer = GeminiAnalyzer::new(GeminiConfig {
                api_key,
                model: config.models.model.clone(),
                api_base: config.models.api_base.clone(),
                request_timeout: config.models.request_timeout,
            })
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

            tracing::info!(model = %config.models.model, "Initialized Gemini analyzer");
            Ok(Arc::new(analyzer))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock analyzer, no model calls will be made");
            Ok(Arc::new(MockAnalyzer::sample()))
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let analyzer = build_analyzer(&config)?;
        Self::build_with_analyzer(config, analyzer).await
    }

    pub async fn build_with_analyzer(
        config: RelayConfig,
        analyzer: Arc<dyn ReportAnalyzer>,
    ) -> Result<Self, AppError> {
        let mut options = config.relay.clone();
        if let Some(dir) = &options.static_dir {
            if !dir.join("index.html").is_file() {
                tracing::warn!(
                    static_dir = %dir.display(),
                    "Static directory has no index.html, serving the API only"
                );
                options.static_dir = None;
            }
        }

        let router = build_router(AppState::new(analyzer), &options);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    pub async fn run_until_signal<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
