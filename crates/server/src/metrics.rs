//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the HireWire server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Chat session counts (collected dynamically)
//! - Core assistant metrics (probes, dispatches, notices, mentions)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hirewire_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hirewire_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hirewire_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Session Metrics
// =============================================================================

/// Chat sessions held in memory (collected dynamically).
pub static CHAT_SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hirewire_chat_sessions_active",
        "Number of chat sessions held by the server",
    )
    .unwrap()
});

/// Chat sessions created total.
pub static CHAT_SESSIONS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hirewire_chat_sessions_created_total",
        "Total chat sessions created since startup",
    )
    .unwrap()
});

/// Chat sessions dropped after sitting idle.
pub static CHAT_SESSIONS_EVICTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hirewire_chat_sessions_evicted_total",
        "Total chat sessions evicted for inactivity",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Sessions
    registry
        .register(Box::new(CHAT_SESSIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(CHAT_SESSIONS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(CHAT_SESSIONS_EVICTED_TOTAL.clone()))
        .unwrap();

    // Core metrics (providers, dispatch, mentions)
    for metric in hirewire_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    CHAT_SESSIONS_ACTIVE.set(state.session_count().await as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = uuid_regex.replace_all(path, "{id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_session_uuid() {
        let path = "/api/v1/chat/sessions/550e8400-e29b-41d4-a716-446655440000/messages";
        assert_eq!(normalize_path(path), "/api/v1/chat/sessions/{id}/messages");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/chat/sessions/12345";
        assert_eq!(normalize_path(path), "/api/v1/chat/sessions/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_registry_contains_http_and_core_metrics() {
        // Prometheus only outputs vector metrics that have been touched.
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        CHAT_SESSIONS_ACTIVE.set(0);
        hirewire_core::metrics::PROBES_TOTAL
            .with_label_values(&["available"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
        assert!(output.contains("hirewire_http_requests_total"));
        assert!(output.contains("hirewire_http_request_duration_seconds"));
        assert!(output.contains("hirewire_chat_sessions_active"));
        assert!(output.contains("hirewire_provider_probes_total"));
        assert!(output.contains("hirewire_stale_replies_total"));
    }
}
