// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the WebFinger middleware.

use thiserror::Error;

/// Rejected WebFinger configuration.
///
/// Any of these must stop the host from activating the middleware.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("domain must be specified")]
    MissingDomain,

    #[error("resource does not match configured domain: {resource} for domain {domain}")]
    ResourceDomainMismatch { resource: String, domain: String },

    #[error("subject is required for resource: {0}")]
    MissingSubject(String),

    #[error("rel is required for links in resource: {0}")]
    MissingRel(String),
}

/// Failure while starting the service.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Invalid metrics path {0:?}: must start with '/' and not clash with another route")]
    MetricsPath(String),
}
