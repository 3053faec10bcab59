//! Pricing engine metrics.

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Pricing metrics recorder
pub struct PricingMetrics;

impl PricingMetrics {
    // =========================================================================
    // Lookup Metrics
    // =========================================================================

    /// Record a completed lookup
    pub fn record_lookup(service: &'static str, dimension: &'static str, found: bool, elapsed: Duration) {
        let outcome = if found { "found" } else { "not_found" };
        counter!(
            "pricing_lookups_total",
            "service" => service,
            "dimension" => dimension,
            "outcome" => outcome
        )
        .increment(1);
        histogram!("pricing_lookup_duration_seconds", "service" => service)
            .record(elapsed.as_secs_f64());
    }

    /// Record a lookup that crossed the latency warning threshold
    pub fn record_slow_lookup(service: &'static str, dimension: &'static str) {
        counter!(
            "pricing_slow_lookups_total",
            "service" => service,
            "dimension" => dimension
        )
        .increment(1);
    }

    // =========================================================================
    // Index Build Metrics
    // =========================================================================

    /// Record the terminal status of an engine initialization
    pub fn record_engine_init(status: &'static str, elapsed: Duration) {
        counter!("pricing_engine_init_total", "status" => status).increment(1);
        histogram!("pricing_engine_init_duration_seconds").record(elapsed.as_secs_f64());

        tracing::debug!(
            status = status,
            duration_ms = elapsed.as_millis() as u64,
            "Recorded engine initialization"
        );
    }

    /// Set the record count of one service index
    pub fn set_index_size(service: &str, count: usize) {
        gauge!("pricing_index_entries", "service" => service.to_string()).set(count as f64);
    }

    /// Record a catalog that failed to load or parse
    pub fn record_catalog_failure(service: &str) {
        counter!("pricing_catalog_failures_total", "service" => service.to_string()).increment(1);
    }

    /// Record an optional price point left unset after the build
    pub fn record_missing_price_point(service: &str, field: &'static str) {
        counter!(
            "pricing_missing_price_points_total",
            "service" => service.to_string(),
            "field" => field
        )
        .increment(1);
    }
}

/// Latency guard for a single lookup.
pub struct LookupTimer {
    start: Instant,
    service: &'static str,
    dimension: &'static str,
}

impl LookupTimer {
    pub fn start(service: &'static str, dimension: &'static str) -> Self {
        Self {
            start: Instant::now(),
            service,
            dimension,
        }
    }

    /// Stop the timer, record the outcome, and return the elapsed time.
    pub fn finish(self, found: bool) -> Duration {
        let elapsed = self.start.elapsed();
        PricingMetrics::record_lookup(self.service, self.dimension, found, elapsed);
        elapsed
    }
}
