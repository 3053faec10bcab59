//! Typed price getters.
//!
//! Every getter builds the indices on first use, then answers from memory.
//! `None` means the price point is not in the catalogs (or the engine failed
//! to initialize); it is never an error.

use observability::pricing::{LookupTimer, PricingMetrics};
use tracing::warn;

use crate::catalog::CatalogSource;
use crate::engine::{Indices, PricingEngine};
use crate::models::{Service, Tier};
use crate::parsers::compute::ComputeIndex;
use crate::parsers::database::DatabaseIndex;
use crate::parsers::function::{ARM64, X86_64};

/// Catalog spelling of an operating system
pub fn normalize_os(os: &str) -> String {
    match os.trim().to_ascii_lowercase().as_str() {
        "linux" | "amazon linux" | "al2" | "al2023" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "rhel" | "red hat enterprise linux" => "RHEL".to_string(),
        "suse" | "sles" => "SUSE".to_string(),
        "ubuntu pro" => "Ubuntu Pro".to_string(),
        _ => os.trim().to_string(),
    }
}

/// Catalog spelling of a tenancy
pub fn normalize_tenancy(tenancy: &str) -> String {
    match tenancy.trim().to_ascii_lowercase().as_str() {
        "" | "default" | "shared" => "Shared".to_string(),
        "dedicated" => "Dedicated".to_string(),
        "host" => "Host".to_string(),
        _ => tenancy.trim().to_string(),
    }
}

/// Catalog spelling of an RDS engine identifier (`postgres`, `aurora-mysql`, ...)
pub fn normalize_engine(engine: &str) -> String {
    match engine.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => "PostgreSQL".to_string(),
        "mysql" => "MySQL".to_string(),
        "mariadb" => "MariaDB".to_string(),
        "aurora" | "aurora-mysql" => "Aurora MySQL".to_string(),
        "aurora-postgresql" => "Aurora PostgreSQL".to_string(),
        e if e.starts_with("oracle") => "Oracle".to_string(),
        e if e.starts_with("sqlserver") => "SQL Server".to_string(),
        e if e.starts_with("db2") => "Db2".to_string(),
        _ => engine.trim().to_string(),
    }
}

/// Canonical architecture name, `None` for anything unrecognized
pub fn normalize_arch(arch: &str) -> Option<&'static str> {
    match arch.trim().to_ascii_lowercase().as_str() {
        "x86_64" | "x86" | "amd64" | "x86-64" => Some(X86_64),
        "arm64" | "arm" | "aarch64" | "graviton" => Some(ARM64),
        _ => None,
    }
}

/// Load balancer kind as indexed (`application`, `network`, `gateway`, `classic`)
pub fn normalize_lb_kind(kind: &str) -> String {
    let kind = kind.trim().to_ascii_lowercase();
    match kind.as_str() {
        "alb" => "application".to_string(),
        "nlb" => "network".to_string(),
        "gwlb" => "gateway".to_string(),
        "elb" | "clb" => "classic".to_string(),
        _ => kind,
    }
}

/// API Gateway kind as indexed (`rest`, `http`, `websocket`)
pub fn normalize_api_kind(api: &str) -> String {
    let api = api.trim().to_ascii_lowercase();
    match api.as_str() {
        "http_api" | "http-api" | "httpapi" => "http".to_string(),
        "rest_api" | "rest-api" | "restapi" => "rest".to_string(),
        "ws" | "web_socket" | "web-socket" => "websocket".to_string(),
        _ => api,
    }
}

impl<S: CatalogSource> PricingEngine<S> {
    /// Resolve one price point, timing the index read
    fn lookup<'a, T>(
        &'a self,
        service: Service,
        dimension: &'static str,
        read: impl FnOnce(&'a Indices) -> Option<T>,
    ) -> Option<T> {
        let indices = self.indices()?;

        let timer = LookupTimer::start(service.as_str(), dimension);
        let value = read(indices);
        let elapsed = timer.finish(value.is_some());

        if elapsed > self.slow_lookup_threshold {
            warn!(
                service = %service,
                dimension = dimension,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.slow_lookup_threshold.as_millis() as u64,
                "Slow pricing lookup"
            );
            PricingMetrics::record_slow_lookup(service.as_str(), dimension);
        }
        value
    }

    // =========================================================================
    // Compute
    // =========================================================================

    /// On-demand hourly rate of an EC2 instance
    pub fn ec2_hourly(&self, instance_type: &str, os: &str, tenancy: &str) -> Option<f64> {
        let key = ComputeIndex::instance_key(instance_type.trim(), &normalize_os(os), &normalize_tenancy(tenancy));
        self.lookup(Service::Compute, "instance_hourly", |i| {
            i.compute.instances.get(&key).map(|r| r.rate)
        })
    }

    pub fn nat_gateway_hourly(&self) -> Option<f64> {
        self.lookup(Service::Compute, "nat_gateway_hourly", |i| {
            i.compute.nat_gateway_hourly.as_ref().map(|r| r.rate)
        })
    }

    /// Data processed through a NAT gateway, per GB
    pub fn nat_gateway_per_gb(&self) -> Option<f64> {
        self.lookup(Service::Compute, "nat_gateway_per_gb", |i| {
            i.compute.nat_gateway_per_gb.as_ref().map(|r| r.rate)
        })
    }

    pub fn public_ipv4_hourly(&self) -> Option<f64> {
        self.lookup(Service::Compute, "public_ipv4_hourly", |i| {
            i.compute.public_ipv4_hourly.as_ref().map(|r| r.rate)
        })
    }

    // =========================================================================
    // Block storage
    // =========================================================================

    pub fn ebs_gb_month(&self, volume_type: &str) -> Option<f64> {
        let key = volume_type.trim().to_ascii_lowercase();
        self.lookup(Service::Storage, "volume_gb_month", |i| {
            i.storage.volumes.get(&key).map(|r| r.rate)
        })
    }

    pub fn ebs_iops_month(&self, volume_type: &str) -> Option<f64> {
        let key = volume_type.trim().to_ascii_lowercase();
        self.lookup(Service::Storage, "iops_month", |i| i.storage.iops.get(&key).map(|r| r.rate))
    }

    /// Provisioned throughput, per MiBps-month
    pub fn ebs_throughput_month(&self, volume_type: &str) -> Option<f64> {
        let key = volume_type.trim().to_ascii_lowercase();
        self.lookup(Service::Storage, "throughput_month", |i| {
            i.storage.throughput.get(&key).map(|r| r.rate)
        })
    }

    pub fn ebs_snapshot_gb_month(&self) -> Option<f64> {
        self.lookup(Service::Storage, "snapshot_gb_month", |i| {
            i.storage.snapshot_gb_month.as_ref().map(|r| r.rate)
        })
    }

    // =========================================================================
    // Managed database
    // =========================================================================

    /// Single-AZ hourly rate of an RDS instance class for an engine
    pub fn rds_hourly(&self, instance_class: &str, engine: &str) -> Option<f64> {
        let key = DatabaseIndex::instance_key(instance_class.trim(), &normalize_engine(engine));
        self.lookup(Service::ManagedDatabase, "instance_hourly", |i| {
            i.database.instances.get(&key).map(|r| r.rate)
        })
    }

    pub fn rds_storage_gb_month(&self, storage_type: &str) -> Option<f64> {
        let key = storage_type.trim().to_ascii_lowercase();
        self.lookup(Service::ManagedDatabase, "storage_gb_month", |i| {
            i.database.storage.get(&key).map(|r| r.rate)
        })
    }

    pub fn rds_iops_month(&self, storage_type: &str) -> Option<f64> {
        let key = storage_type.trim().to_ascii_lowercase();
        self.lookup(Service::ManagedDatabase, "iops_month", |i| {
            i.database.iops.get(&key).map(|r| r.rate)
        })
    }

    // =========================================================================
    // Managed cluster
    // =========================================================================

    pub fn eks_cluster_hourly(&self) -> Option<f64> {
        self.lookup(Service::ManagedCluster, "cluster_hourly", |i| {
            i.cluster.cluster_hourly.as_ref().map(|r| r.rate)
        })
    }

    pub fn eks_fargate_vcpu_hourly(&self) -> Option<f64> {
        self.lookup(Service::ManagedCluster, "fargate_vcpu_hourly", |i| {
            i.cluster.fargate_vcpu_hourly.as_ref().map(|r| r.rate)
        })
    }

    pub fn eks_fargate_memory_gb_hourly(&self) -> Option<f64> {
        self.lookup(Service::ManagedCluster, "fargate_memory_gb_hourly", |i| {
            i.cluster.fargate_memory_gb_hourly.as_ref().map(|r| r.rate)
        })
    }

    // =========================================================================
    // Function compute
    //
    // Architectures without their own price resolve to the x86_64 baseline.
    // =========================================================================

    pub fn lambda_request_price(&self, arch: &str) -> Option<f64> {
        let arch = normalize_arch(arch);
        self.lookup(Service::FunctionCompute, "request", |i| {
            with_arch_fallback(arch, |a| i.function.requests.get(a)).map(|r| r.rate)
        })
    }

    /// Rate of the first paid duration band, per GB-second
    pub fn lambda_duration_price(&self, arch: &str) -> Option<f64> {
        let arch = normalize_arch(arch);
        self.lookup(Service::FunctionCompute, "duration", |i| {
            with_arch_fallback(arch, |a| i.function.duration.get(a)).and_then(|p| p.first_paid_rate())
        })
    }

    pub fn lambda_duration_tiers(&self, arch: &str) -> Option<&[Tier]> {
        let arch = normalize_arch(arch);
        self.lookup(Service::FunctionCompute, "duration_tiers", |i| {
            with_arch_fallback(arch, |a| i.function.duration.get(a)).map(|p| p.tiers.as_slice())
        })
    }

    pub fn lambda_ephemeral_storage_gb_second(&self) -> Option<f64> {
        self.lookup(Service::FunctionCompute, "ephemeral_storage_gb_second", |i| {
            i.function.ephemeral_storage_gb_second.as_ref().map(|r| r.rate)
        })
    }

    // =========================================================================
    // Table store
    // =========================================================================

    /// On-demand price per read request unit
    pub fn dynamodb_read_request_price(&self) -> Option<f64> {
        self.lookup(Service::TableStore, "read_request_unit", |i| {
            i.table.read_request_unit.as_ref().map(|r| r.rate)
        })
    }

    pub fn dynamodb_write_request_price(&self) -> Option<f64> {
        self.lookup(Service::TableStore, "write_request_unit", |i| {
            i.table.write_request_unit.as_ref().map(|r| r.rate)
        })
    }

    pub fn dynamodb_provisioned_rcu_hourly(&self) -> Option<f64> {
        self.lookup(Service::TableStore, "provisioned_rcu_hourly", |i| {
            i.table.provisioned_rcu_hourly.as_ref().map(|r| r.rate)
        })
    }

    pub fn dynamodb_provisioned_wcu_hourly(&self) -> Option<f64> {
        self.lookup(Service::TableStore, "provisioned_wcu_hourly", |i| {
            i.table.provisioned_wcu_hourly.as_ref().map(|r| r.rate)
        })
    }

    /// Storage GB-month tiers, first band free
    pub fn dynamodb_storage_tiers(&self) -> Option<&[Tier]> {
        self.lookup(Service::TableStore, "storage_tiers", |i| {
            i.table.storage.as_ref().map(|p| p.tiers.as_slice())
        })
    }

    // =========================================================================
    // Load balancing
    // =========================================================================

    pub fn lb_hourly(&self, kind: &str) -> Option<f64> {
        let key = normalize_lb_kind(kind);
        self.lookup(Service::LoadBalancer, "hourly", |i| {
            i.load_balancer.hourly.get(&key).map(|r| r.rate)
        })
    }

    /// LCU-hour (ALB), NLCU-hour (NLB), GLCU-hour (GWLB) or per-GB (classic)
    pub fn lb_capacity_unit_price(&self, kind: &str) -> Option<f64> {
        let key = normalize_lb_kind(kind);
        self.lookup(Service::LoadBalancer, "capacity_unit", |i| {
            i.load_balancer.capacity_units.get(&key).map(|r| r.rate)
        })
    }

    // =========================================================================
    // API gateway
    // =========================================================================

    pub fn api_gateway_request_tiers(&self, api: &str) -> Option<&[Tier]> {
        let key = normalize_api_kind(api);
        self.lookup(Service::Gateway, "request_tiers", |i| {
            i.gateway.requests.get(&key).map(|p| p.tiers.as_slice())
        })
    }

    /// Rate of the first paid request band
    pub fn api_gateway_request_price(&self, api: &str) -> Option<f64> {
        let key = normalize_api_kind(api);
        self.lookup(Service::Gateway, "request", |i| {
            i.gateway.requests.get(&key).and_then(|p| p.first_paid_rate())
        })
    }

    pub fn api_gateway_connection_minute_price(&self) -> Option<f64> {
        self.lookup(Service::Gateway, "connection_minute", |i| {
            i.gateway.connection_minute.as_ref().map(|r| r.rate)
        })
    }
}

/// Try the requested architecture, then the x86_64 baseline
fn with_arch_fallback<'a, T>(arch: Option<&'static str>, get: impl Fn(&str) -> Option<&'a T>) -> Option<&'a T> {
    arch.and_then(&get).or_else(|| get(X86_64))
}
