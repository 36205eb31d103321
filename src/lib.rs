// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! WebFinger Middleware
//!
//! This crate answers WebFinger (RFC 7033) queries in front of another HTTP
//! service, from a static table of resources:
//!
//! - Only `/.well-known/webfinger` is intercepted; other paths pass through
//! - `GET` only, with a required `resource` parameter
//! - Resources are checked against the configured domain
//! - Configured resources are served as `application/jrd+json`
//! - Unknown resources are rejected with 404, or forwarded when passthrough
//!   is enabled

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod jrd;
pub mod metrics;
pub mod middleware;
pub mod resolver;
pub mod resource;

pub use app::build_router;
pub use config::{Config, WebFingerConfig};
pub use error::{ConfigError, StartupError};
pub use jrd::{Link, ResourceDescriptor, JRD_CONTENT_TYPE};
pub use metrics::ResolverMetrics;
pub use middleware::{WebFinger, WebFingerLayer};
pub use resolver::{Outcome, Reply, Resolution, Resolver, WEBFINGER_PATH};
pub use resource::belongs_to_domain;
