//! Command handlers and their JSON output

use domain_pricing::{
    tiered_cost, CatalogMetadata, CatalogSource, Currency, EngineState, PricingEngine, Service, Tier,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Billing month used by AWS cost estimates
const HOURS_PER_MONTH: f64 = 730.0;

/// Engine diagnostics printed by `status`
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub state: EngineState,
    pub mode: String,
    pub region: Option<String>,
    pub currency: Currency,
    pub indices: BTreeMap<Service, usize>,
    pub catalogs: BTreeMap<Service, CatalogMetadata>,
    /// Services deployed without a catalog
    pub absent: Vec<Service>,
    pub error: Option<String>,
}

impl StatusReport {
    pub fn collect<S: CatalogSource>(engine: &PricingEngine<S>) -> Self {
        // Status reports failures instead of propagating them
        let _ = engine.ensure_initialized();

        let catalogs = engine
            .index_summary()
            .keys()
            .filter_map(|service| engine.catalog_metadata(*service).map(|m| (*service, m.clone())))
            .collect();

        Self {
            state: engine.state(),
            mode: engine.mode().to_string(),
            region: engine.region().map(str::to_string),
            currency: engine.currency(),
            indices: engine.index_summary(),
            catalogs,
            absent: engine.absent_catalogs().to_vec(),
            error: engine.init_error().map(ToString::to_string),
        }
    }
}

/// One resolved price point. A missing price is reported as a zero rate
/// with `found: false` so callers can tell it apart from a free one.
#[derive(Debug, Serialize, PartialEq)]
pub struct Quote {
    pub service: Service,
    pub dimension: &'static str,
    pub key: String,
    pub rate: f64,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly: Option<f64>,
}

impl Quote {
    pub fn new(service: Service, dimension: &'static str, key: impl Into<String>, rate: Option<f64>) -> Self {
        Self {
            service,
            dimension,
            key: key.into(),
            rate: rate.unwrap_or(0.0),
            found: rate.is_some(),
            monthly: None,
        }
    }

    /// Attach a 730-hour monthly estimate to an hourly quote
    pub fn with_monthly_estimate(mut self) -> Self {
        self.monthly = Some(self.rate * HOURS_PER_MONTH);
        self
    }
}

pub fn ec2<S: CatalogSource>(engine: &PricingEngine<S>, instance_type: &str, os: &str, tenancy: &str) -> Vec<Quote> {
    let key = format!("{instance_type}/{os}/{tenancy}");
    vec![
        Quote::new(Service::Compute, "instance_hourly", key, engine.ec2_hourly(instance_type, os, tenancy))
            .with_monthly_estimate(),
    ]
}

pub fn ebs<S: CatalogSource>(engine: &PricingEngine<S>, volume_type: &str) -> Vec<Quote> {
    vec![
        Quote::new(Service::Storage, "volume_gb_month", volume_type, engine.ebs_gb_month(volume_type)),
        Quote::new(Service::Storage, "iops_month", volume_type, engine.ebs_iops_month(volume_type)),
        Quote::new(Service::Storage, "throughput_month", volume_type, engine.ebs_throughput_month(volume_type)),
        Quote::new(Service::Storage, "snapshot_gb_month", "snapshot", engine.ebs_snapshot_gb_month()),
    ]
}

pub fn rds<S: CatalogSource>(engine: &PricingEngine<S>, instance_class: &str, db_engine: &str, storage: &str) -> Vec<Quote> {
    let key = format!("{instance_class}/{db_engine}");
    vec![
        Quote::new(
            Service::ManagedDatabase,
            "instance_hourly",
            key,
            engine.rds_hourly(instance_class, db_engine),
        )
        .with_monthly_estimate(),
        Quote::new(
            Service::ManagedDatabase,
            "storage_gb_month",
            storage,
            engine.rds_storage_gb_month(storage),
        ),
    ]
}

pub fn lambda<S: CatalogSource>(engine: &PricingEngine<S>, arch: &str) -> Vec<Quote> {
    vec![
        Quote::new(Service::FunctionCompute, "request", arch, engine.lambda_request_price(arch)),
        Quote::new(Service::FunctionCompute, "duration", arch, engine.lambda_duration_price(arch)),
        Quote::new(
            Service::FunctionCompute,
            "ephemeral_storage_gb_second",
            arch,
            engine.lambda_ephemeral_storage_gb_second(),
        ),
    ]
}

/// Output of the `tiered` command
#[derive(Debug, Serialize)]
pub struct TieredEstimate {
    pub quantity: f64,
    pub tiers: Vec<Tier>,
    pub cost: f64,
}

pub fn tiered(quantity: f64, tiers: Vec<Tier>) -> TieredEstimate {
    let cost = tiered_cost(quantity, &tiers);
    TieredEstimate { quantity, tiers, cost }
}

/// Parse `upper:rate`; `inf` marks the unbounded band
pub fn parse_tier(raw: &str) -> Result<Tier, String> {
    let (upper, rate) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected <upper>:<rate>, got '{raw}'"))?;

    let upper = match upper.trim() {
        u if u.eq_ignore_ascii_case("inf") => f64::INFINITY,
        u => u.parse::<f64>().map_err(|e| format!("invalid upper bound '{u}': {e}"))?,
    };
    let rate = rate
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid rate '{}': {e}", rate.trim()))?;

    if upper.is_nan() || upper <= 0.0 || rate.is_nan() || rate < 0.0 {
        return Err(format!("tier bounds must be positive and rates non-negative, got '{raw}'"));
    }
    Ok(Tier::new(upper, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_pricing::{CatalogMode, StaticCatalogSource};
    use test_utils::catalogs;

    fn engine() -> PricingEngine<StaticCatalogSource> {
        let source = catalogs::all()
            .into_iter()
            .fold(StaticCatalogSource::new(), |source, (name, bytes)| {
                source.with_document(name.parse().unwrap(), bytes)
            });
        PricingEngine::new(source, CatalogMode::Complete)
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!(parse_tier("10000:0.30").unwrap(), Tier::new(10_000.0, 0.30));
        assert_eq!(parse_tier("Inf:0.05").unwrap(), Tier::unbounded(0.05));
        assert!(parse_tier("10000").is_err());
        assert!(parse_tier("ten:0.3").is_err());
        assert!(parse_tier("100:-1").is_err());
    }

    #[test]
    fn test_tiered_estimate() {
        let estimate = tiered(
            300_000.0,
            vec![Tier::new(10_000.0, 0.30), Tier::new(250_000.0, 0.10), Tier::unbounded(0.05)],
        );
        assert!((estimate.cost - 29_500.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_price_is_annotated_zero() {
        let quotes = ec2(&engine(), "x9.huge", "linux", "shared");
        assert_eq!(quotes[0].rate, 0.0);
        assert!(!quotes[0].found);
        assert_eq!(quotes[0].monthly, Some(0.0));
    }

    #[test]
    fn test_found_price_carries_monthly_estimate() {
        let quotes = ec2(&engine(), "t3.micro", "linux", "shared");
        assert!(quotes[0].found);
        assert!((quotes[0].monthly.unwrap() - 7.592).abs() < 1e-9);
    }

    #[test]
    fn test_status_report_for_failed_engine() {
        let engine = PricingEngine::new(StaticCatalogSource::new(), CatalogMode::Complete);
        let report = StatusReport::collect(&engine);

        assert_eq!(report.state, EngineState::Failed);
        assert!(report.error.unwrap().contains("compute"));
        assert!(report.indices.is_empty());
    }

    #[test]
    fn test_status_report_serializes() {
        let report = StatusReport::collect(&engine());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["state"], "ready");
        assert_eq!(value["mode"], "complete");
        assert_eq!(value["region"], "us-east-1");
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["indices"]["compute"], 8);
        assert_eq!(value["catalogs"]["gateway"]["offer_code"], "AmazonApiGateway");
        assert_eq!(value["absent"], serde_json::json!([]));
    }

    #[test]
    fn test_status_report_lists_absent_catalogs() {
        let source = StaticCatalogSource::new()
            .with_document(Service::Compute, catalogs::ec2_compute().to_bytes())
            .with_document(Service::Storage, catalogs::ec2_storage().to_bytes());
        let engine = PricingEngine::new(source, CatalogMode::Complete);
        let report = StatusReport::collect(&engine);

        assert_eq!(report.state, EngineState::Ready);
        assert_eq!(report.absent.len(), 6);
        assert!(report.absent.contains(&Service::Gateway));
        assert!(!report.absent.contains(&Service::Compute));
    }
}
