//! HTTP transport module for reframe-mind
//!
//! Axum-based JSON API over the four reframing operations, plus health and
//! info endpoints. Each request runs under a request-id span and an overall
//! deadline.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reframe_mind::{
    error::ReframeError,
    metrics::ScoreVector,
    server::{ClassifyParams, ControlOutcome, ControlParams, ReframeOutcome, ReframeParams, ReframeServer, ScoreParams},
};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::Instrument;

/// Error wrapper mapping domain errors onto HTTP status codes
pub struct ApiError(ReframeError);

impl From<ReframeError> for ApiError {
    fn from(err: ReframeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Info endpoint
pub async fn info_handler(State(server): State<ReframeServer>) -> impl IntoResponse {
    let config = &server.config;
    Json(json!({
        "model": server.model(),
        "embedding": {
            "provider": config.system.embedding_provider,
            "model": config.system.embedding_model,
            "dim": config.system.embedding_dimensions
        },
        "corpus": {
            "path": config.system.dataset_path,
            "cases": server.dataset().len()
        },
        "defaults": {
            "top_k": config.retrieval.top_k,
            "candidates": config.retrieval.candidates
        }
    }))
}

pub async fn classify_handler(
    State(server): State<ReframeServer>,
    Json(params): Json<ClassifyParams>,
) -> ApiResult<Value> {
    let result = server.classify(params).await?;
    Ok(Json(json!({
        "thinking_trap": result.label_with_confidence,
        "label": result.label(),
        "confidence_percent": result.confidence_percent(),
    })))
}

pub async fn reframe_handler(
    State(server): State<ReframeServer>,
    Json(params): Json<ReframeParams>,
) -> ApiResult<ReframeOutcome> {
    Ok(Json(server.reframe(params).await?))
}

pub async fn measure_handler(
    State(server): State<ReframeServer>,
    Json(params): Json<ScoreParams>,
) -> ApiResult<ScoreVector> {
    Ok(Json(server.score(params).await?))
}

pub async fn control_handler(
    State(server): State<ReframeServer>,
    Json(params): Json<ControlParams>,
) -> ApiResult<ControlOutcome> {
    Ok(Json(server.control(params).await?))
}

/// Wrap each request in a span carrying a fresh request id
async fn request_span(req: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        id = %uuid::Uuid::new_v4(),
        method = %req.method(),
        path = %req.uri().path()
    );
    async move {
        let start = Instant::now();
        let resp = next.run(req).await;
        tracing::info!(
            status = resp.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request completed"
        );
        resp
    }
    .instrument(span)
    .await
}

pub fn router(server: ReframeServer) -> Router {
    let deadline = Duration::from_millis(server.config.runtime.request_timeout_ms);
    Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/api/classify", post(classify_handler))
        .route("/api/reframe", post(reframe_handler))
        .route("/api/measure", post(measure_handler))
        .route("/api/control", post(control_handler))
        .layer(TimeoutLayer::new(deadline))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn(request_span))
        .with_state(server)
}

/// Start the HTTP server
pub async fn start_http_server(server: ReframeServer) -> anyhow::Result<()> {
    let bind = server.config.runtime.http_bind;
    let app = router(server);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
