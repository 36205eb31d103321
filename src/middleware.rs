// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tower middleware answering WebFinger queries in front of another service.
//!
//! ```ignore
//! let layer = WebFingerLayer::new(config.webfinger)?;
//! let app = Router::new().fallback(backend).layer(layer);
//! ```
//!
//! Requests outside `/.well-known/webfinger`, and discovery requests left to
//! the backend by the passthrough policy, reach the inner service exactly as
//! they arrived. Its response is returned unchanged.

use crate::config::WebFingerConfig;
use crate::error::ConfigError;
use crate::metrics::ResolverMetrics;
use crate::resolver::{Outcome, Resolution, Resolver};
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

const DEFAULT_NAME: &str = "webfinger";

/// Layer that wraps a service with WebFinger resolution.
#[derive(Clone)]
pub struct WebFingerLayer {
    resolver: Arc<Resolver>,
    metrics: Option<ResolverMetrics>,
    name: Arc<str>,
}

impl WebFingerLayer {
    /// Validate `config` and build the layer.
    pub fn new(config: WebFingerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            resolver: Arc::new(Resolver::new(config)?),
            metrics: None,
            name: Arc::from(DEFAULT_NAME),
        })
    }

    /// Name this instance in logs.
    pub fn named(mut self, name: impl AsRef<str>) -> Self {
        self.name = Arc::from(name.as_ref());
        self
    }

    /// Count resolution outcomes in `metrics`.
    pub fn with_metrics(mut self, metrics: ResolverMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

impl<S> Layer<S> for WebFingerLayer {
    type Service = WebFinger<S>;

    fn layer(&self, inner: S) -> Self::Service {
        WebFinger {
            inner,
            resolver: Arc::clone(&self.resolver),
            metrics: self.metrics.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

/// Service produced by [`WebFingerLayer`].
#[derive(Clone)]
pub struct WebFinger<S> {
    inner: S,
    resolver: Arc<Resolver>,
    metrics: Option<ResolverMetrics>,
    name: Arc<str>,
}

impl<S> WebFinger<S> {
    fn record(&self, outcome: Outcome) {
        debug!(name = %self.name, outcome = %outcome, "WebFinger request resolved");
        if let Some(metrics) = &self.metrics {
            metrics.record(outcome);
        }
    }
}

impl<S> Service<Request<Body>> for WebFinger<S>
where
    S: Service<Request<Body>, Response = Response>,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<Response, S::Error>>;

    // Readiness is always delegated, even though replies answered here never
    // call the inner service. A reserved slot in a buffered inner service is
    // held until the next forwarded request.
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let (outcome, response) = match self.resolver.resolve(request.method(), request.uri()) {
            Resolution::Bypass => return Box::pin(self.inner.call(request)),
            Resolution::Forward => {
                self.record(Outcome::Forwarded);
                return Box::pin(self.inner.call(request));
            }
            Resolution::Respond(reply) => reply.render(),
        };

        self.record(outcome);
        Box::pin(async move { Ok(response) })
    }
}
