//! Observability utilities for the pricing resolution engine.
//!
//! This crate provides:
//! - Prometheus metrics recorder installation and text export
//! - Pricing-specific metrics: lookup latency, index sizes, engine init
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, render_metrics, PricingMetrics};
//!
//! init_metrics();
//! PricingMetrics::set_index_size("compute", 812);
//! println!("{}", render_metrics());
//! ```
//!
//! Without an installed recorder every metric call is a no-op, so library
//! code can record unconditionally.

pub mod pricing;

pub use pricing::PricingMetrics;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Installs at most once per process. Returns `None` when another recorder
/// was installed first.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE
        .get_or_try_init(|| -> Result<PrometheusHandle, BuildError> {
            let handle = PrometheusBuilder::new().install_recorder()?;
            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();
            Ok(handle)
        })
        .map_err(|e| warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render the Prometheus exposition text
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    describe_counter!(
        "pricing_lookups_total",
        "Price lookups by service, dimension and outcome"
    );
    describe_histogram!(
        "pricing_lookup_duration_seconds",
        "Price lookup latency in seconds"
    );
    describe_counter!(
        "pricing_slow_lookups_total",
        "Lookups that exceeded the latency warning threshold"
    );
    describe_gauge!(
        "pricing_index_entries",
        "Records held by each service index"
    );
    describe_counter!(
        "pricing_engine_init_total",
        "Engine initialization runs by terminal status"
    );
    describe_histogram!(
        "pricing_engine_init_duration_seconds",
        "Catalog parse and index build duration"
    );
    describe_counter!(
        "pricing_catalog_failures_total",
        "Catalog documents that failed to parse"
    );
    describe_counter!(
        "pricing_missing_price_points_total",
        "Optional price points absent after index build"
    );
}
