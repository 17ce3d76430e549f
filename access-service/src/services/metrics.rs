//! Prometheus metrics for access-service.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec, TextEncoder};

/// Tier change requests by outcome.
pub static TIER_CHANGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "access_tier_changes_total",
        "Total number of privilege tier change requests",
        &["outcome"] // approved, approval_required, insufficient_approver_privilege, ...
    )
    .expect("Failed to register access_tier_changes_total")
});

/// Feature dispatches by resolved tier.
pub static FEATURE_DISPATCH_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "access_feature_dispatch_total",
        "Total number of feature set dispatches",
        &["tier"]
    )
    .expect("Failed to register access_feature_dispatch_total")
});

/// Outbound API calls by method and status class.
pub static API_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "access_api_calls_total",
        "Total number of outbound API calls",
        &["method", "status"]
    )
    .expect("Failed to register access_api_calls_total")
});

/// Register every collector up front.
pub fn init_metrics() {
    Lazy::force(&TIER_CHANGES_TOTAL);
    Lazy::force(&FEATURE_DISPATCH_TOTAL);
    Lazy::force(&API_CALLS_TOTAL);
}

pub fn record_tier_change(outcome: &str) {
    TIER_CHANGES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_feature_dispatch(tier: &str) {
    FEATURE_DISPATCH_TOTAL.with_label_values(&[tier]).inc();
}

pub fn record_api_call(method: &str, status: &str) {
    API_CALLS_TOTAL.with_label_values(&[method, status]).inc();
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            format!("# Failed to encode metrics: {}\n", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_appear_in_exposition() {
        record_tier_change("approved");
        record_feature_dispatch("admin");
        record_api_call("GET", "2xx");

        let output = gather_metrics();
        assert!(output.contains("access_tier_changes_total"));
        assert!(output.contains("access_feature_dispatch_total"));
        assert!(output.contains("access_api_calls_total"));
    }
}
