// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! WebFinger Service
//!
//! Answers WebFinger (RFC 7033) queries for a single domain from a static
//! resource table, in front of a fallback backend.
//!
//! ## Configuration
//!
//! Configuration is loaded from the JSON file named by `WEBFINGER_CONFIG`,
//! then overridden by environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `WEBFINGER_DOMAIN`: Domain this instance answers for (required)
//! - `WEBFINGER_PASSTHROUGH`: Forward unmatched queries to the backend
//! - `METRICS_ENABLED`: Expose Prometheus metrics (default: true)

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webfinger_middleware::{app::build_router, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    info!(
        bind_addr = %config.bind_addr,
        domain = %config.webfinger.domain,
        resources = config.webfinger.resources.len(),
        passthrough = config.webfinger.passthrough,
        metrics = config.metrics.enabled,
        "Starting WebFinger service"
    );

    let addr: SocketAddr = config.bind_addr.parse()?;

    // Refuses to start on an invalid resource table
    let app = build_router(config)?;

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
