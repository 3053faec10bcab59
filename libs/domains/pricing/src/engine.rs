//! Pricing engine core: one-time index build and engine state.
//!
//! The first call that needs prices runs every parser on its own scoped
//! thread, each writing into a disjoint field of [`Indices`]. The outcome
//! (ready indices or the initialization error) is published once through a
//! `OnceCell`; every later read is a lock-free `get`.

use core_config::pricing::{CatalogMode, PricingConfig};
use observability::PricingMetrics;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};
use strum::Display;
use tracing::{error, info, info_span, warn};

use crate::catalog::{CatalogSource, DirectoryCatalogSource};
use crate::error::{CatalogError, CatalogResult, PricingError, PricingResult, ServiceFailure};
use crate::models::{CatalogMetadata, Currency, Service};
use crate::parsers::{
    parse_catalog, CatalogParser, ClusterIndex, ClusterParser, ComputeIndex, ComputeParser, DatabaseIndex,
    DatabaseParser, FunctionIndex, FunctionParser, GatewayIndex, GatewayParser, LoadBalancerIndex,
    LoadBalancerParser, ParsedCatalog, PriceIndex, StorageIndex, StorageParser, TableIndex, TableParser,
};

const NOT_STARTED: u8 = 0;
const BUILDING: u8 = 1;
const READY: u8 = 2;
const FAILED: u8 = 3;

/// Lifecycle of the index build. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EngineState {
    NotStarted,
    Building,
    Ready,
    Failed,
}

/// Every service index plus what the catalogs said about themselves
#[derive(Debug, Default)]
pub struct Indices {
    pub compute: ComputeIndex,
    pub storage: StorageIndex,
    pub database: DatabaseIndex,
    pub cluster: ClusterIndex,
    pub function: FunctionIndex,
    pub table: TableIndex,
    pub load_balancer: LoadBalancerIndex,
    pub gateway: GatewayIndex,
    pub region: Option<String>,
    pub metadata: HashMap<Service, CatalogMetadata>,
    /// Services whose source had no document
    pub absent: Vec<Service>,
}

impl Indices {
    /// Record count and unset optional fields per service
    fn summary(&self) -> [(Service, usize, Vec<&'static str>); 8] {
        [
            (Service::Compute, self.compute.len(), self.compute.missing_fields()),
            (Service::Storage, self.storage.len(), self.storage.missing_fields()),
            (Service::ManagedDatabase, self.database.len(), self.database.missing_fields()),
            (Service::ManagedCluster, self.cluster.len(), self.cluster.missing_fields()),
            (Service::FunctionCompute, self.function.len(), self.function.missing_fields()),
            (Service::TableStore, self.table.len(), self.table.missing_fields()),
            (Service::LoadBalancer, self.load_balancer.len(), self.load_balancer.missing_fields()),
            (Service::Gateway, self.gateway.len(), self.gateway.missing_fields()),
        ]
    }

    /// Whether the records a service cannot do without were produced
    fn has_primary_records(&self, service: Service) -> bool {
        match service {
            Service::Compute => !self.compute.instances.is_empty(),
            Service::Storage => !self.storage.volumes.is_empty(),
            Service::ManagedDatabase => !self.database.instances.is_empty(),
            Service::ManagedCluster => !self.cluster.is_empty(),
            Service::FunctionCompute => !self.function.is_empty(),
            Service::TableStore => !self.table.is_empty(),
            Service::LoadBalancer => !self.load_balancer.hourly.is_empty(),
            Service::Gateway => !self.gateway.is_empty(),
        }
    }

    /// Mandatory indices that came out empty
    fn empty_mandatory(&self) -> Vec<Service> {
        Service::MANDATORY
            .into_iter()
            .filter(|service| !self.has_primary_records(*service))
            .collect()
    }
}

/// Read-only price resolver over a set of offer files.
///
/// Construction is cheap; catalogs are read on first use. Cloning is not
/// supported; share the engine behind an `Arc` instead.
pub struct PricingEngine<S: CatalogSource = DirectoryCatalogSource> {
    source: S,
    mode: CatalogMode,
    pub(crate) slow_lookup_threshold: Duration,
    phase: AtomicU8,
    built: OnceCell<PricingResult<Indices>>,
}

impl PricingEngine<DirectoryCatalogSource> {
    /// Engine over the catalog directory named in `config`
    pub fn from_config(config: &PricingConfig) -> Self {
        PricingEngine::new(DirectoryCatalogSource::new(&config.catalog_dir), config.mode)
            .with_slow_lookup_threshold(config.slow_lookup_threshold)
    }
}

impl<S: CatalogSource> PricingEngine<S> {
    pub fn new(source: S, mode: CatalogMode) -> Self {
        Self {
            source,
            mode,
            slow_lookup_threshold: Duration::from_millis(PricingConfig::DEFAULT_SLOW_LOOKUP_MS),
            phase: AtomicU8::new(NOT_STARTED),
            built: OnceCell::new(),
        }
    }

    pub fn with_slow_lookup_threshold(mut self, threshold: Duration) -> Self {
        self.slow_lookup_threshold = threshold;
        self
    }

    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build the indices if no build has happened yet.
    ///
    /// Safe to call from any number of threads: exactly one build runs and
    /// concurrent callers wait for it. A failed build is final.
    pub fn ensure_initialized(&self) -> PricingResult<()> {
        match self.built() {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }

    pub fn state(&self) -> EngineState {
        match self.built.get() {
            Some(Ok(_)) => EngineState::Ready,
            Some(Err(_)) => EngineState::Failed,
            None if self.phase.load(Ordering::Acquire) == BUILDING => EngineState::Building,
            None => EngineState::NotStarted,
        }
    }

    /// The stored initialization error, if the build failed
    pub fn init_error(&self) -> Option<&PricingError> {
        self.built.get().and_then(|result| result.as_ref().err())
    }

    /// Region reported by the catalogs; `None` before init, on failure, or
    /// when no qualifying product carried a region code
    pub fn region(&self) -> Option<&str> {
        self.indices().and_then(|indices| indices.region.as_deref())
    }

    pub fn currency(&self) -> Currency {
        Currency::Usd
    }

    pub fn catalog_metadata(&self, service: Service) -> Option<&CatalogMetadata> {
        self.indices().and_then(|indices| indices.metadata.get(&service))
    }

    /// Services that had no catalog document, empty when the engine failed
    pub fn absent_catalogs(&self) -> &[Service] {
        self.indices().map(|indices| indices.absent.as_slice()).unwrap_or_default()
    }

    /// Record counts per service, empty when the engine failed
    pub fn index_summary(&self) -> BTreeMap<Service, usize> {
        self.indices()
            .map(|indices| {
                indices
                    .summary()
                    .into_iter()
                    .map(|(service, count, _)| (service, count))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Built indices, triggering the build on first use
    pub(crate) fn indices(&self) -> Option<&Indices> {
        self.built().ok()
    }

    fn built(&self) -> Result<&Indices, &PricingError> {
        self.built.get_or_init(|| self.build()).as_ref()
    }

    fn build(&self) -> PricingResult<Indices> {
        self.phase.store(BUILDING, Ordering::Release);
        let started = Instant::now();
        info!(mode = %self.mode, "Building pricing indices");

        let mut indices = Indices::default();
        let outcomes = run_parsers(&self.source, &mut indices);
        let result = self.validate(indices, outcomes);
        let elapsed = started.elapsed();

        match &result {
            Ok(indices) => {
                self.phase.store(READY, Ordering::Release);
                PricingMetrics::record_engine_init("ready", elapsed);
                info!(
                    duration_ms = elapsed.as_millis() as u64,
                    region = indices.region.as_deref().unwrap_or("unknown"),
                    "Pricing indices ready"
                );
            }
            Err(e) => {
                self.phase.store(FAILED, Ordering::Release);
                PricingMetrics::record_engine_init("failed", elapsed);
                error!(duration_ms = elapsed.as_millis() as u64, error = %e, "Pricing engine initialization failed");
            }
        }

        result
    }

    fn validate(
        &self,
        mut indices: Indices,
        outcomes: Vec<(Service, CatalogResult<ParsedCatalog>)>,
    ) -> PricingResult<Indices> {
        let mut failures = Vec::new();

        for (service, outcome) in outcomes {
            match outcome {
                Ok(parsed) => {
                    if !parsed.loaded {
                        indices.absent.push(service);
                    }
                    if indices.region.is_none() {
                        indices.region = parsed.region;
                    }
                    if let Some(metadata) = parsed.metadata {
                        info!(
                            service = %service,
                            offer_code = metadata.offer_code.as_deref().unwrap_or("unknown"),
                            version = metadata.version.as_deref().unwrap_or("unknown"),
                            published_at = ?metadata.published_at,
                            "Loaded pricing catalog"
                        );
                        indices.metadata.insert(service, metadata);
                    }
                }
                Err(error) => {
                    error!(service = %service, error = %error, "Pricing catalog failed to parse");
                    PricingMetrics::record_catalog_failure(service.as_str());
                    failures.push(ServiceFailure { service, error });
                }
            }
        }

        if !failures.is_empty() {
            return Err(PricingError::Initialization(failures));
        }

        if !indices.absent.is_empty() {
            let absent: Vec<&str> = indices.absent.iter().map(Service::as_str).collect();
            info!(services = ?absent, "Pricing catalogs not deployed");
        }

        let empty = indices.empty_mandatory();
        if !empty.is_empty() {
            if !self.mode.is_fallback() {
                return Err(PricingError::MandatoryIndexEmpty(empty));
            }
            for service in &empty {
                warn!(service = %service, "Mandatory pricing index empty, continuing in fallback mode");
            }
        }

        for (service, count, missing) in indices.summary() {
            PricingMetrics::set_index_size(service.as_str(), count);
            for field in missing {
                warn!(service = %service, field = field, "Optional price point missing from catalog");
                PricingMetrics::record_missing_price_point(service.as_str(), field);
            }
        }

        Ok(indices)
    }
}

/// Run every parser concurrently, each into its own index
fn run_parsers(source: &dyn CatalogSource, indices: &mut Indices) -> Vec<(Service, CatalogResult<ParsedCatalog>)> {
    let Indices {
        compute,
        storage,
        database,
        cluster,
        function,
        table,
        load_balancer,
        gateway,
        ..
    } = indices;

    thread::scope(|scope| {
        let workers = [
            spawn_parser(scope, ComputeParser, source, compute),
            spawn_parser(scope, StorageParser, source, storage),
            spawn_parser(scope, DatabaseParser, source, database),
            spawn_parser(scope, ClusterParser, source, cluster),
            spawn_parser(scope, FunctionParser, source, function),
            spawn_parser(scope, TableParser, source, table),
            spawn_parser(scope, LoadBalancerParser, source, load_balancer),
            spawn_parser(scope, GatewayParser, source, gateway),
        ];

        workers
            .into_iter()
            .map(|(service, worker)| {
                let outcome = worker.join().unwrap_or_else(|_| {
                    Err(CatalogError::Malformed {
                        service,
                        details: "parser panicked".to_string(),
                    })
                });
                (service, outcome)
            })
            .collect()
    })
}

fn spawn_parser<'scope, 'env, P>(
    scope: &'scope Scope<'scope, 'env>,
    parser: P,
    source: &'scope dyn CatalogSource,
    index: &'scope mut P::Index,
) -> (Service, ScopedJoinHandle<'scope, CatalogResult<ParsedCatalog>>)
where
    P: CatalogParser + Send + 'scope,
{
    let service = parser.service();
    let worker = scope.spawn(move || {
        let _span = info_span!("parse_catalog", service = %service).entered();
        parse_catalog(&parser, source, index)
    });
    (service, worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MockCatalogSource, StaticCatalogSource};
    use test_utils::catalogs;

    fn full_source() -> StaticCatalogSource {
        catalogs::all()
            .into_iter()
            .fold(StaticCatalogSource::new(), |source, (name, bytes)| {
                source.with_document(name.parse().unwrap(), bytes)
            })
    }

    #[test]
    fn test_new_engine_is_lazy() {
        let mut source = MockCatalogSource::new();
        source.expect_read().never();

        let engine = PricingEngine::new(source, CatalogMode::Complete);
        assert_eq!(engine.state(), EngineState::NotStarted);
        assert!(engine.init_error().is_none());
    }

    #[test]
    fn test_full_build_is_ready() {
        let engine = PricingEngine::new(full_source(), CatalogMode::Complete);

        engine.ensure_initialized().unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.region(), Some("us-east-1"));
        assert_eq!(engine.currency(), Currency::Usd);

        let summary = engine.index_summary();
        assert_eq!(summary.len(), 8);
        assert_eq!(summary[&Service::Compute], 8);
        assert_eq!(summary[&Service::TableStore], 5);

        let metadata = engine.catalog_metadata(Service::LoadBalancer).unwrap();
        assert_eq!(metadata.offer_code.as_deref(), Some("AWSELB"));
        assert!(metadata.published_at.is_some());
    }

    #[test]
    fn test_every_parse_failure_is_reported() {
        let source = full_source()
            .with_document(Service::Gateway, b"{\"products\": 42}".to_vec())
            .with_document(Service::TableStore, b"not json".to_vec());
        let engine = PricingEngine::new(source, CatalogMode::Fallback);

        let err = engine.ensure_initialized().unwrap_err();
        assert_eq!(err.services(), vec![Service::TableStore, Service::Gateway]);
        assert_eq!(engine.state(), EngineState::Failed);
        assert_eq!(engine.init_error(), Some(&err));
    }

    #[test]
    fn test_missing_mandatory_catalog_fails_complete_mode() {
        let source = StaticCatalogSource::new()
            .with_document(Service::ManagedDatabase, catalogs::rds().to_bytes());
        let engine = PricingEngine::new(source, CatalogMode::Complete);

        let err = engine.ensure_initialized().unwrap_err();
        assert_eq!(err, PricingError::MandatoryIndexEmpty(vec![Service::Compute, Service::Storage]));
        assert!(engine.region().is_none());
        assert!(engine.index_summary().is_empty());
    }

    #[test]
    fn test_fallback_mode_tolerates_missing_catalogs() {
        let source = StaticCatalogSource::new()
            .with_document(Service::ManagedDatabase, catalogs::rds().to_bytes());
        let engine = PricingEngine::new(source, CatalogMode::Fallback);

        engine.ensure_initialized().unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.index_summary()[&Service::Compute], 0);
        assert!(engine.catalog_metadata(Service::Compute).is_none());
        assert!(engine.catalog_metadata(Service::ManagedDatabase).is_some());

        let absent = engine.absent_catalogs();
        assert_eq!(absent.len(), 7);
        assert!(absent.contains(&Service::Compute));
        assert!(!absent.contains(&Service::ManagedDatabase));
    }

    #[test]
    fn test_full_build_has_no_absent_catalogs() {
        let engine = PricingEngine::new(full_source(), CatalogMode::Complete);
        engine.ensure_initialized().unwrap();
        assert!(engine.absent_catalogs().is_empty());
    }

    #[test]
    fn test_compute_without_instances_is_empty_mandatory() {
        // NAT gateway and IPv4 records alone do not satisfy the compute index
        let compute_extras = test_utils::CatalogBuilder::new("AmazonEC2").product(
            "NAT Gateway",
            &[("usagetype", "NatGateway-Hours"), ("regionCode", "us-east-1")],
            "Hrs",
            "0.045",
        );
        let source = full_source().with_document(Service::Compute, compute_extras.to_bytes());
        let engine = PricingEngine::new(source, CatalogMode::Complete);

        let err = engine.ensure_initialized().unwrap_err();
        assert_eq!(err, PricingError::MandatoryIndexEmpty(vec![Service::Compute]));
    }

    #[test]
    fn test_from_config_uses_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PricingConfig::new(dir.path(), CatalogMode::Fallback);
        config.slow_lookup_threshold = Duration::from_millis(5);

        let engine = PricingEngine::from_config(&config);
        assert_eq!(engine.source().dir(), dir.path());
        assert_eq!(engine.slow_lookup_threshold, Duration::from_millis(5));
        assert!(engine.mode().is_fallback());
    }
}
