//! HTTP daemon/server mode for `hnjobs`.
//!
//! This module exposes a small HTTP+JSON API that mirrors the core
//! `run_parse` and `run_filter` functions, so a browser front end can
//! hand over a raw query and receive tokens or filtered postings:
//!
//! - `POST /v1/parse` – accepts `{ "query": "..." }` and returns a
//!   `ParseResult`.
//! - `POST /v1/filter` – accepts a JSON-encoded `FilterConfig` and
//!   returns a `FilterResult`.
//! - `GET /v1/health` – simple health check endpoint.
//!
//! The server is intentionally thin: it performs JSON
//! (de)serialization, delegates to the core engine, and converts
//! errors into JSON HTTP responses.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::warn;

use crate::models::{FilterConfig, FilterResult, ParseRequest, ParseResult};
use crate::search::engine;

/// Simple health-check response payload.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON error body returned by the API.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Error type used by HTTP handlers to map engine failures into JSON
/// error responses.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Engine errors come from the request (missing paths, bad
        // globs, unreadable dumps), so they are reported as 400s.
        ApiError::bad_request(format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, "request failed: {}", self.message);
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Build the Axum router for the hnjobs HTTP API.
pub fn router() -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/parse", post(parse))
        .route("/v1/filter", post(filter))
}

/// Run the HTTP server bound to the provided socket address.
///
/// This is used by the CLI `hnjobs serve` subcommand.
pub async fn run(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener).await
}

/// Run the HTTP server using an existing `TcpListener`.
///
/// This is primarily used in tests to bind to an ephemeral port.
pub async fn serve_with_listener(listener: TcpListener) -> Result<()> {
    let app = router();
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn parse(Json(request): Json<ParseRequest>) -> Json<ParseResult> {
    Json(engine::run_parse(&request.query))
}

async fn filter(Json(config): Json<FilterConfig>) -> Result<Json<FilterResult>, ApiError> {
    let result = engine::run_filter(config).map_err(ApiError::from)?;
    Ok(Json(result))
}
