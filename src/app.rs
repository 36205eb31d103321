// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly for the WebFinger service.

use crate::config::Config;
use crate::error::StartupError;
use crate::handlers::{fallback, health, metrics, AppState};
use crate::metrics::ResolverMetrics;
use crate::middleware::WebFingerLayer;
use crate::resolver::WEBFINGER_PATH;
use axum::{http::Method, routing::get, Router};
use prometheus::Registry;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const HEALTH_PATHS: [&str; 2] = ["/health", "/healthz"];

/// Build the service router from `config`.
///
/// Fails if the WebFinger configuration is invalid, in which case the
/// service must not start.
pub fn build_router(config: Config) -> Result<Router, StartupError> {
    let registry = Registry::new();
    let mut layer = WebFingerLayer::new(config.webfinger)?;

    let mut app = Router::new();
    for path in HEALTH_PATHS {
        app = app.route(path, get(health));
    }

    if config.metrics.enabled {
        check_metrics_path(&config.metrics.path)?;
        layer = layer.with_metrics(ResolverMetrics::register(&registry)?);
        app = app.route(&config.metrics.path, get(metrics));
    }

    let state = Arc::new(AppState { registry });

    // Covers the backend routes only. The WebFinger layer sits outside it, so
    // discovery requests of any method other than GET (preflight included)
    // get 405; its own replies carry Access-Control-Allow-Origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Ok(app
        .fallback(fallback)
        .with_state(state)
        .layer(cors)
        .layer(layer)
        .layer(TraceLayer::new_for_http()))
}

/// Reject metrics paths axum would panic on or that another route owns.
fn check_metrics_path(path: &str) -> Result<(), StartupError> {
    if !path.starts_with('/') || HEALTH_PATHS.contains(&path) || path.starts_with(WEBFINGER_PATH) {
        return Err(StartupError::MetricsPath(path.to_string()));
    }
    Ok(())
}
