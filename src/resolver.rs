// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! WebFinger request resolution.
//!
//! The [`Resolver`] decides, for each inbound request, whether to answer it
//! from the static resource table, reject it, or let the next handler see
//! it. It performs no I/O; rendering a [`Reply`] into an HTTP response is
//! the only place a body is produced.

use crate::config::WebFingerConfig;
use crate::error::ConfigError;
use crate::jrd::{ResourceDescriptor, JRD_CONTENT_TYPE};
use crate::resource::belongs_to_domain;
use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Well-known discovery path (RFC 7033 section 10.1).
pub const WEBFINGER_PATH: &str = "/.well-known/webfinger";

/// Query parameter carrying the resource identifier.
const RESOURCE_PARAM: &str = "resource";

/// What to do with a request.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Not a discovery request; hand it to the next handler untouched.
    Bypass,
    /// Discovery request left to the next handler by the passthrough policy.
    Forward,
    /// Answer the request directly.
    Respond(Reply<'a>),
}

/// A response produced by the resolver itself.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply<'a> {
    Descriptor(&'a ResourceDescriptor),
    MethodNotAllowed,
    MissingResource,
    NotFound,
}

/// Resolution outcome, as counted in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served,
    Forwarded,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Served => "served",
            Self::Forwarded => "forwarded",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, immutable WebFinger resolution state.
#[derive(Debug)]
pub struct Resolver {
    domain: String,
    resources: HashMap<String, ResourceDescriptor>,
    passthrough: bool,
}

impl Resolver {
    /// Validate `config` and build a resolver from it.
    pub fn new(config: WebFingerConfig) -> Result<Self, ConfigError> {
        if let Err(err) = validate(&config) {
            warn!(domain = %config.domain, error = %err, "Rejected WebFinger configuration");
            return Err(err);
        }

        info!(
            domain = %config.domain,
            resources = config.resources.len(),
            passthrough = config.passthrough,
            "WebFinger resolver configured"
        );

        Ok(Self {
            domain: config.domain,
            resources: config.resources,
            passthrough: config.passthrough,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn passthrough(&self) -> bool {
        self.passthrough
    }

    /// Decide how to handle a request with the given method and URI.
    pub fn resolve(&self, method: &Method, uri: &Uri) -> Resolution<'_> {
        if !uri.path().starts_with(WEBFINGER_PATH) {
            return Resolution::Bypass;
        }

        if *method != Method::GET {
            debug!(method = %method, "WebFinger request with unsupported method");
            return Resolution::Respond(Reply::MethodNotAllowed);
        }

        let resource = match resource_param(uri) {
            Some(resource) if !resource.is_empty() => resource,
            _ => {
                debug!("WebFinger request without resource parameter");
                return Resolution::Respond(Reply::MissingResource);
            }
        };

        if !belongs_to_domain(&resource, &self.domain) {
            debug!(resource = %resource, domain = %self.domain, "Resource outside configured domain");
            return self.unmatched();
        }

        match self.resources.get(resource.as_str()) {
            Some(descriptor) => {
                debug!(resource = %resource, "Serving configured resource");
                Resolution::Respond(Reply::Descriptor(descriptor))
            }
            None => {
                debug!(resource = %resource, "Resource not configured");
                self.unmatched()
            }
        }
    }

    fn unmatched(&self) -> Resolution<'_> {
        if self.passthrough {
            Resolution::Forward
        } else {
            Resolution::Respond(Reply::NotFound)
        }
    }
}

/// Check the configuration rules the resolver depends on.
///
/// Resources are checked in key order so the reported error is stable.
fn validate(config: &WebFingerConfig) -> Result<(), ConfigError> {
    if config.domain.is_empty() {
        return Err(ConfigError::MissingDomain);
    }

    let mut entries: Vec<_> = config.resources.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (resource, descriptor) in entries {
        if !belongs_to_domain(resource, &config.domain) {
            return Err(ConfigError::ResourceDomainMismatch {
                resource: resource.clone(),
                domain: config.domain.clone(),
            });
        }

        if descriptor.subject.is_empty() {
            return Err(ConfigError::MissingSubject(resource.clone()));
        }

        if descriptor.links.iter().any(|link| link.rel.is_empty()) {
            return Err(ConfigError::MissingRel(resource.clone()));
        }
    }

    Ok(())
}

/// First `resource` value in the query string, percent-decoded.
fn resource_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RESOURCE_PARAM)
        .map(|(_, value)| value.into_owned())
}

impl Reply<'_> {
    /// Render the reply, reporting which outcome it produced.
    ///
    /// Every reply is readable cross-origin (RFC 7033 section 5).
    pub fn render(self) -> (Outcome, Response) {
        let (outcome, mut response) = self.render_body();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        (outcome, response)
    }

    fn render_body(self) -> (Outcome, Response) {
        match self {
            Reply::Descriptor(descriptor) => match descriptor.to_jrd() {
                Ok(body) => (
                    Outcome::Served,
                    (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, JRD_CONTENT_TYPE)],
                        body,
                    )
                        .into_response(),
                ),
                Err(err) => {
                    error!(subject = %descriptor.subject, error = %err, "Failed to encode JRD");
                    (
                        Outcome::InternalError,
                        (StatusCode::INTERNAL_SERVER_ERROR, "Error encoding response")
                            .into_response(),
                    )
                }
            },
            Reply::MethodNotAllowed => (
                Outcome::MethodNotAllowed,
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response(),
            ),
            Reply::MissingResource => (
                Outcome::BadRequest,
                (StatusCode::BAD_REQUEST, "Resource parameter is required").into_response(),
            ),
            Reply::NotFound => (
                Outcome::NotFound,
                (StatusCode::NOT_FOUND, "Resource not found").into_response(),
            ),
        }
    }
}

impl IntoResponse for Reply<'_> {
    fn into_response(self) -> Response {
        self.render().1
    }
}
