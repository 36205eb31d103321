// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for WebFinger resolution outcomes.

use crate::resolver::Outcome;
use prometheus::{IntCounterVec, Opts, Registry};

/// Per-outcome request counters.
#[derive(Clone)]
pub struct ResolverMetrics {
    requests: IntCounterVec,
}

impl ResolverMetrics {
    /// Create the counters and register them with `registry`.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new(
                "webfinger_requests_total",
                "WebFinger discovery requests by resolution outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        Ok(Self { requests })
    }

    pub fn record(&self, outcome: Outcome) {
        self.requests.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Current count for `outcome`.
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.requests.with_label_values(&[outcome.as_str()]).get()
    }
}
