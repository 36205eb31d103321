// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the WebFinger middleware service.
//!
//! Configuration is read from a JSON file named by `WEBFINGER_CONFIG`, then
//! overridden by environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `WEBFINGER_DOMAIN`: Domain this instance answers for
//! - `WEBFINGER_PASSTHROUGH`: Forward unmatched queries (`true`/`false`)
//! - `METRICS_ENABLED`: Expose the Prometheus endpoint (`true`/`false`)

use crate::error::StartupError;
use crate::jrd::ResourceDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "WEBFINGER_CONFIG";

/// Configuration for the WebFinger service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// WebFinger resolution configuration
    #[serde(default)]
    pub webfinger: WebFingerConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Static WebFinger resolution table.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebFingerConfig {
    /// The domain this service is responsible for
    #[serde(default)]
    pub domain: String,

    /// Configured resources keyed by resource identifier
    #[serde(default)]
    pub resources: HashMap<String, ResourceDescriptor>,

    /// Forward unmatched queries to the next handler instead of returning 404
    #[serde(default)]
    pub passthrough: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            webfinger: WebFingerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl WebFingerConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Add a static resource keyed by `identifier`.
    pub fn with_resource(
        mut self,
        identifier: impl Into<String>,
        descriptor: ResourceDescriptor,
    ) -> Self {
        self.resources.insert(identifier.into(), descriptor);
        self
    }

    pub fn with_passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }
}

impl Config {
    /// Load configuration from `WEBFINGER_CONFIG` and the process environment.
    pub fn load() -> Result<Self, StartupError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| StartupError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StartupError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Unparsable boolean values leave the current setting unchanged.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(domain) = lookup("WEBFINGER_DOMAIN") {
            self.webfinger.domain = domain;
        }
        if let Some(passthrough) = lookup("WEBFINGER_PASSTHROUGH").and_then(|v| parse_bool(&v)) {
            self.webfinger.passthrough = passthrough;
        }
        if let Some(enabled) = lookup("METRICS_ENABLED").and_then(|v| parse_bool(&v)) {
            self.metrics.enabled = enabled;
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
