//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Provider probing and selection (probe outcomes, fallback notices)
//! - Message dispatch (outcomes and latency per provider)
//! - Mention resolution (resolved mentions per pass, degraded resolutions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Providers
// =============================================================================

/// Status probes by outcome.
pub static PROBES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hirewire_provider_probes_total", "Total provider status probes"),
        &["result"], // "available", "unavailable", "failed"
    )
    .unwrap()
});

/// Self-contradictory status payloads that were corrected.
pub static PROBE_CORRECTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hirewire_provider_probe_corrections_total",
        "Status payloads reporting unavailable while a provider flag was set",
    )
    .unwrap()
});

/// Fallback notices surfaced to users.
pub static FALLBACK_NOTICES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hirewire_provider_fallback_notices_total",
            "Active provider changes surfaced to users",
        ),
        &["reason", "to"], // reason: "probe_changed", "backend_reported"
    )
    .unwrap()
});

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatched messages by provider hint and outcome.
pub static DISPATCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hirewire_dispatch_total", "Total chat messages dispatched"),
        &["provider", "result"], // result: "ok", "error"
    )
    .unwrap()
});

/// Dispatch round-trip duration in seconds.
pub static DISPATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hirewire_dispatch_duration_seconds",
            "Duration of chat message round trips",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["provider"],
    )
    .unwrap()
});

/// Replies whose sequence number was older than the last applied one.
pub static STALE_REPLIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hirewire_stale_replies_total",
        "Replies that arrived after a newer reply had been applied",
    )
    .unwrap()
});

// =============================================================================
// Mentions
// =============================================================================

/// Resolved mentions by matcher pass.
pub static MENTIONS_RESOLVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hirewire_mentions_resolved_total", "Total resolved mentions"),
        &["pass"], // "tag", "legacy_id", "contextual_name"
    )
    .unwrap()
});

/// Resolutions that returned plain text because the catalog failed to load.
pub static MENTION_RESOLUTION_DEGRADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hirewire_mention_resolution_degraded_total",
        "Mention resolutions skipped because the catalog was unavailable",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Providers
        Box::new(PROBES_TOTAL.clone()),
        Box::new(PROBE_CORRECTIONS.clone()),
        Box::new(FALLBACK_NOTICES.clone()),
        // Dispatch
        Box::new(DISPATCH_TOTAL.clone()),
        Box::new(DISPATCH_DURATION.clone()),
        Box::new(STALE_REPLIES.clone()),
        // Mentions
        Box::new(MENTIONS_RESOLVED.clone()),
        Box::new(MENTION_RESOLUTION_DEGRADED.clone()),
    ]
}
