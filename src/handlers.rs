// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the WebFinger service host.
//!
//! These sit behind the WebFinger layer and are only reached for requests
//! the layer lets through.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

/// Shared application state.
pub struct AppState {
    pub registry: Registry,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "webfinger-middleware",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus text exposition of the registered metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&state.registry.gather(), &mut buffer) {
        error!(error = %err, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Backend for everything the WebFinger layer does not answer.
pub async fn fallback(request: axum::extract::Request) -> Response {
    warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "No backend route for request"
    );
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ResolverMetrics;
    use crate::resolver::Outcome;

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "webfinger-middleware");
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let registry = Registry::new();
        let counters = ResolverMetrics::register(&registry).unwrap();
        counters.record(Outcome::Served);

        let response = metrics(State(Arc::new(AppState { registry }))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(r#"webfinger_requests_total{outcome="served"} 1"#));
    }
}
