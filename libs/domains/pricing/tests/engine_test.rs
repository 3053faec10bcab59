//! Integration tests for the pricing engine
//!
//! These tests drive the public API over in-memory catalogs to verify:
//! - Initialization runs exactly once under concurrent first access
//! - Terminal states are sticky and never trigger a re-parse
//! - Mandatory-index validation and fallback mode
//! - Consistent answers from many concurrent readers

use domain_pricing::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use test_utils::assertions::*;
use test_utils::{catalogs, CatalogBuilder};

/// Catalog source that counts reads per service
#[derive(Default)]
struct CountingSource {
    documents: HashMap<Service, Vec<u8>>,
    reads: HashMap<Service, AtomicUsize>,
    delay: Duration,
}

impl CountingSource {
    fn new(documents: Vec<(Service, Vec<u8>)>) -> Self {
        Self {
            reads: documents.iter().map(|(s, _)| (*s, AtomicUsize::new(0))).collect(),
            documents: documents.into_iter().collect(),
            delay: Duration::ZERO,
        }
    }

    fn full() -> Self {
        Self::new(
            catalogs::all()
                .into_iter()
                .map(|(name, bytes)| (name.parse().unwrap(), bytes))
                .collect(),
        )
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn reads(&self, service: Service) -> usize {
        self.reads.get(&service).map_or(0, |c| c.load(Ordering::SeqCst))
    }

    fn total_reads(&self) -> usize {
        self.reads.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }
}

impl CatalogSource for CountingSource {
    fn read(&self, service: Service) -> CatalogResult<Option<Vec<u8>>> {
        if let Some(counter) = self.reads.get(&service) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(self.delay);
        Ok(self.documents.get(&service).cloned())
    }
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_concurrent_first_access_builds_once() {
    let source = Arc::new(CountingSource::full().with_delay(Duration::from_millis(20)));
    let engine = Arc::new(PricingEngine::new(Arc::clone(&source), CatalogMode::Complete));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    engine.ensure_initialized().is_ok()
                } else {
                    engine.ec2_hourly("t3.micro", "linux", "shared").is_some()
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(engine.state(), EngineState::Ready);
    for service in [Service::Compute, Service::Storage, Service::Gateway, Service::FunctionCompute] {
        assert_eq!(source.reads(service), 1, "{service} read once");
    }
    assert_eq!(source.total_reads(), 8);
}

#[test]
fn test_repeated_initialization_is_a_no_op() {
    let source = Arc::new(CountingSource::full());
    let engine = PricingEngine::new(Arc::clone(&source), CatalogMode::Complete);

    for _ in 0..5 {
        engine.ensure_initialized().unwrap();
    }
    assert_eq!(source.total_reads(), 8);
}

#[test]
fn test_empty_compute_fails_without_reparse() {
    let empty_compute = CatalogBuilder::new("AmazonEC2").to_bytes();
    let source = Arc::new(CountingSource::new(vec![
        (Service::Compute, empty_compute),
        (Service::Storage, catalogs::ec2_storage().to_bytes()),
    ]));
    let engine = PricingEngine::new(Arc::clone(&source), CatalogMode::Complete);

    let err = engine.ensure_initialized().unwrap_err();
    assert_eq!(err, PricingError::MandatoryIndexEmpty(vec![Service::Compute]));

    assert_eq!(engine.ebs_gb_month("gp3"), None);
    assert_eq!(engine.ec2_hourly("t3.micro", "linux", "shared"), None);
    assert_eq!(engine.ensure_initialized().unwrap_err(), err);

    assert_eq!(engine.state(), EngineState::Failed);
    assert_eq!(source.reads(Service::Compute), 1);
    assert_eq!(source.reads(Service::Storage), 1);
}

#[test]
fn test_fallback_mode_serves_partial_catalogs() {
    let source = CountingSource::new(vec![(Service::FunctionCompute, catalogs::lambda().to_bytes())]);
    let engine = PricingEngine::new(source, CatalogMode::Fallback);

    engine.ensure_initialized().unwrap();
    assert_eq!(engine.ec2_hourly("t3.micro", "linux", "shared"), None);
    assert_rate_eq(assert_some(engine.lambda_request_price("x86_64"), "requests"), 0.0000002, "requests");
    assert_eq!(engine.index_summary()[&Service::Compute], 0);
}

#[test]
fn test_malformed_catalogs_are_aggregated() {
    let bad_tiers = CatalogBuilder::new("AmazonApiGateway")
        .tiered_product(
            "API Calls",
            &[("operation", "ApiGatewayRequest")],
            "Requests",
            &[("0", "a lot", "0.0000035")],
        )
        .to_bytes();

    let mut documents: Vec<(Service, Vec<u8>)> = catalogs::all()
        .into_iter()
        .map(|(name, bytes)| (name.parse().unwrap(), bytes))
        .collect();
    for (service, bytes) in documents.iter_mut() {
        match service {
            Service::Gateway => *bytes = bad_tiers.clone(),
            Service::ManagedCluster => *bytes = b"{\"products\": {".to_vec(),
            _ => {}
        }
    }

    let engine = PricingEngine::new(CountingSource::new(documents), CatalogMode::Complete);
    let err = engine.ensure_initialized().unwrap_err();

    match &err {
        PricingError::Initialization(failures) => {
            assert_eq!(failures.len(), 2);
            assert!(matches!(failures[0].error, CatalogError::Malformed { service: Service::ManagedCluster, .. }));
            assert!(matches!(failures[1].error, CatalogError::InvalidRange { .. }));
        }
        other => panic!("expected initialization failure, got {other:?}"),
    }
    assert!(err.to_string().contains("managed_cluster"));
    assert!(err.to_string().contains("gateway"));
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn test_lambda_duration_falls_back_to_x86() {
    let engine = PricingEngine::new(
        CountingSource::new(vec![
            (Service::Compute, catalogs::ec2_compute().to_bytes()),
            (Service::Storage, catalogs::ec2_storage().to_bytes()),
            (Service::FunctionCompute, catalogs::lambda_x86_only().to_bytes()),
        ]),
        CatalogMode::Complete,
    );

    let x86 = assert_some(engine.lambda_duration_price("x86_64"), "x86 duration");
    let arm = assert_some(engine.lambda_duration_price("arm64"), "arm duration");
    assert_rate_eq(arm, x86, "arm uses x86 baseline");
    assert_eq!(engine.lambda_duration_tiers("arm64"), engine.lambda_duration_tiers("x86_64"));
}

#[test]
fn test_concurrent_readers_agree() {
    let engine = Arc::new(PricingEngine::new(CountingSource::full(), CatalogMode::Complete));
    let barrier = Arc::new(Barrier::new(128));

    let handles: Vec<_> = (0..128)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (
                    engine.ec2_hourly("m5.large", "linux", "shared"),
                    engine.rds_hourly("db.t3.micro", "mysql"),
                    engine.dynamodb_storage_tiers().map(<[Tier]>::to_vec),
                    engine.region().map(str::to_string),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &results[0];
    assert_eq!(first.0, Some(0.096));
    assert_eq!(first.1, Some(0.017));
    assert_eq!(first.3.as_deref(), Some("us-east-1"));
    assert!(results.iter().all(|r| r == first));
}

#[test]
fn test_missing_price_is_none_and_zero_quantity_is_free() {
    let engine = PricingEngine::new(CountingSource::full(), CatalogMode::Complete);

    assert_eq!(engine.ec2_hourly("t3.micro", "suse", "shared"), None);
    let tiers = assert_some(engine.api_gateway_request_tiers("rest"), "rest tiers");
    assert_eq!(tiered_cost(0.0, tiers), 0.0);
    assert_eq!(tiered_cost(-5.0, tiers), 0.0);
    assert_rate_eq(tiered_cost(1_000_000.0, tiers), 3.5, "first million requests");
}

#[test]
fn test_directory_source_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("AmazonEC2.json"), catalogs::ec2_compute().to_bytes()).unwrap();

    let mut config = PricingConfig::new(dir.path(), CatalogMode::Complete);
    config.slow_lookup_threshold = Duration::from_millis(1);
    let engine = PricingEngine::from_config(&config);

    // Compute and storage share one offer file; this one has no volumes
    let err = engine.ensure_initialized().unwrap_err();
    assert_eq!(err.services(), vec![Service::Storage]);
}
