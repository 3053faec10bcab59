use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Service family, one catalog parser each
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Service {
    /// EC2 instances, NAT gateways, public IPv4
    Compute,
    /// EBS volumes and snapshots
    Storage,
    /// RDS
    ManagedDatabase,
    /// EKS control plane and Fargate
    ManagedCluster,
    /// Lambda
    FunctionCompute,
    /// DynamoDB
    TableStore,
    /// Elastic Load Balancing
    LoadBalancer,
    /// API Gateway
    Gateway,
}

impl Service {
    /// Services that must produce records in a complete deployment
    pub const MANDATORY: [Service; 2] = [Service::Compute, Service::Storage];

    /// `offerCode` the service's offer file declares.
    ///
    /// Compute and Storage share `AmazonEC2`, so each of their parser threads
    /// reads and decodes its own copy of the largest offer file. Peak memory
    /// during the build holds both copies; in exchange every parser owns its
    /// document and index outright.
    pub fn expected_offer_code(&self) -> &'static str {
        match self {
            Service::Compute | Service::Storage => "AmazonEC2",
            Service::ManagedDatabase => "AmazonRDS",
            Service::ManagedCluster => "AmazonEKS",
            Service::FunctionCompute => "AWSLambda",
            Service::TableStore => "AmazonDynamoDB",
            Service::LoadBalancer => "AWSELB",
            Service::Gateway => "AmazonApiGateway",
        }
    }

    /// File name of the offer file inside a catalog directory
    pub fn default_file_name(&self) -> String {
        format!("{}.json", self.expected_offer_code())
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Billing currency; the catalogs are USD-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
}

impl Currency {
    /// Key of this currency inside a `pricePerUnit` map
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
        }
    }
}

/// Billing unit of a price record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PricingUnit {
    #[default]
    Hour,
    Gb,
    GbMonth,
    GbSecond,
    IopsMonth,
    ThroughputMonth,
    Request,
    RequestUnit,
    CapacityUnitHour,
    Minute,
    Unit,
}

impl PricingUnit {
    /// Map the free-text `unit` of a price dimension
    pub fn from_catalog(unit: &str) -> Self {
        match unit.trim().to_ascii_lowercase().as_str() {
            "hrs" | "hours" | "hour" => PricingUnit::Hour,
            "gb" => PricingUnit::Gb,
            "gb-mo" | "gb-month" => PricingUnit::GbMonth,
            "lambda-gb-second" | "gb-seconds" | "gb-second" | "second" => PricingUnit::GbSecond,
            "iops-mo" => PricingUnit::IopsMonth,
            "gibps-mo" | "mibps-mo" => PricingUnit::ThroughputMonth,
            "requests" | "request" | "messages" => PricingUnit::Request,
            "readrequestunits" | "writerequestunits" => PricingUnit::RequestUnit,
            "lcu-hrs" | "nlcu-hrs" | "glcu-hrs" | "readcapacityunit-hrs" | "writecapacityunit-hrs" => {
                PricingUnit::CapacityUnitHour
            }
            "minutes" | "minute" => PricingUnit::Minute,
            _ => PricingUnit::Unit,
        }
    }
}

/// A single resolved on-demand rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub sku: String,
    /// Price per `unit`, always positive
    pub rate: f64,
    pub unit: PricingUnit,
    pub currency: Currency,
}

/// One volume band: quantity up to `upper_bound` is billed at `rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub upper_bound: f64,
    pub rate: f64,
}

impl Tier {
    pub fn new(upper_bound: f64, rate: f64) -> Self {
        Self { upper_bound, rate }
    }

    /// The open-ended last band
    pub fn unbounded(rate: f64) -> Self {
        Self::new(f64::INFINITY, rate)
    }
}

/// A volume-tiered rate resolved from ranged price dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieredPrice {
    pub sku: String,
    /// Ascending by upper bound; may start with a free band
    pub tiers: Vec<Tier>,
    pub unit: PricingUnit,
    pub currency: Currency,
}

impl TieredPrice {
    /// Rate of the first band that is actually charged
    pub fn first_paid_rate(&self) -> Option<f64> {
        self.tiers.iter().map(|t| t.rate).find(|rate| *rate > 0.0)
    }
}

/// Offer file header, kept for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogMetadata {
    pub offer_code: Option<String>,
    pub version: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_service_names_round_trip() {
        for service in Service::iter() {
            assert_eq!(Service::from_str(service.as_str()).unwrap(), service);
        }
        assert_eq!(Service::ManagedDatabase.to_string(), "managed_database");
    }

    #[test]
    fn test_compute_and_storage_share_the_ec2_offer() {
        assert_eq!(Service::Compute.default_file_name(), "AmazonEC2.json");
        assert_eq!(
            Service::Compute.expected_offer_code(),
            Service::Storage.expected_offer_code()
        );
        assert_eq!(Service::Gateway.default_file_name(), "AmazonApiGateway.json");
    }

    #[test]
    fn test_mandatory_services() {
        assert!(Service::MANDATORY.contains(&Service::Compute));
        assert!(Service::MANDATORY.contains(&Service::Storage));
        assert!(!Service::MANDATORY.contains(&Service::FunctionCompute));
    }

    #[test]
    fn test_pricing_unit_from_catalog() {
        assert_eq!(PricingUnit::from_catalog("Hrs"), PricingUnit::Hour);
        assert_eq!(PricingUnit::from_catalog("GB-Mo"), PricingUnit::GbMonth);
        assert_eq!(PricingUnit::from_catalog("Lambda-GB-Second"), PricingUnit::GbSecond);
        assert_eq!(PricingUnit::from_catalog("NLCU-Hrs"), PricingUnit::CapacityUnitHour);
        assert_eq!(PricingUnit::from_catalog("Quantity"), PricingUnit::Unit);
    }

    #[test]
    fn test_first_paid_rate_skips_free_band() {
        let price = TieredPrice {
            sku: "SKU".to_string(),
            tiers: vec![Tier::new(25.0, 0.0), Tier::unbounded(0.25)],
            unit: PricingUnit::GbMonth,
            currency: Currency::Usd,
        };
        assert_eq!(price.first_paid_rate(), Some(0.25));
    }
}
