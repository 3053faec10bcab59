//! AWS offer files and where they come from.
//!
//! An offer file is the bulk price list of one AWS service: a `products`
//! map (SKU → attributes) and a `terms.OnDemand` table (SKU → term →
//! price dimensions). See
//! https://docs.aws.amazon.com/awsaccountbilling/latest/aboutv2/reading-an-offer.html

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogMetadata, Currency, PriceRecord, PricingUnit, Service, Tier, TieredPrice};

/// Decoded offer file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub format_version: Option<String>,
    #[serde(default)]
    pub offer_code: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    /// Ordered by SKU so parse results do not depend on hash order
    pub products: BTreeMap<String, Product>,
    #[serde(default)]
    pub terms: Terms,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Terms {
    #[serde(rename = "OnDemand", default)]
    pub on_demand: HashMap<String, BTreeMap<String, Term>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub product_family: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    #[serde(default)]
    pub offer_term_code: Option<String>,
    #[serde(default)]
    pub price_dimensions: BTreeMap<String, PriceDimension>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDimension {
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub begin_range: Option<String>,
    #[serde(default)]
    pub end_range: Option<String>,
    #[serde(default)]
    pub price_per_unit: HashMap<String, String>,
}

impl Product {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attr_is(&self, name: &str, value: &str) -> bool {
        self.attr(name) == Some(value)
    }

    pub fn family_is(&self, family: &str) -> bool {
        self.product_family.as_deref() == Some(family)
    }

    /// `usagetype` carries a region prefix (`USE1-`) outside us-east-1,
    /// so match on the suffix.
    pub fn usage_type_ends_with(&self, suffix: &str) -> bool {
        self.attr("usagetype").is_some_and(|u| u.ends_with(suffix))
    }

    /// Regional product, not an Outposts, Local Zone or Wavelength variant.
    /// Products that omit `locationType` count as regional.
    pub fn in_aws_region(&self) -> bool {
        self.attr("locationType").is_none_or(|l| l == "AWS Region")
    }

    pub fn region_code(&self) -> Option<&str> {
        self.attr("regionCode")
    }
}

impl PriceDimension {
    /// Parsed amount for `currency`, if present and numeric
    pub fn amount(&self, currency: Currency) -> Option<f64> {
        self.price_per_unit
            .get(currency.code())
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|amount| amount.is_finite() && *amount >= 0.0)
    }
}

/// Parse a range bound; `Inf` and a missing bound are unbounded.
fn parse_bound(sku: &str, raw: Option<&str>, missing: f64) -> CatalogResult<f64> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(missing);
    };
    if raw.eq_ignore_ascii_case("inf") {
        return Ok(f64::INFINITY);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan() && *v >= 0.0)
        .ok_or_else(|| CatalogError::InvalidRange {
            sku: sku.to_string(),
            value: raw.to_string(),
        })
}

impl CatalogDocument {
    /// Decode raw offer-file bytes. Any syntax or shape error is fatal.
    pub fn from_slice(service: Service, bytes: &[u8]) -> CatalogResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Malformed {
            service,
            details: e.to_string(),
        })
    }

    pub fn metadata(&self) -> CatalogMetadata {
        let published_at = self.publication_date.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| debug!(value = raw, error = %e, "Unparseable publicationDate"))
                .ok()
        });

        CatalogMetadata {
            offer_code: self.offer_code.clone(),
            version: self.version.clone(),
            published_at,
        }
    }

    /// On-demand terms of a SKU in term-code order
    pub fn on_demand_terms(&self, sku: &str) -> impl Iterator<Item = &Term> {
        self.terms.on_demand.get(sku).into_iter().flat_map(|terms| terms.values())
    }

    /// Resolve a single rate for a SKU.
    ///
    /// The first term carrying any USD amount is authoritative; within it the
    /// first positive dimension (by begin range) wins, so a leading free band
    /// is skipped. Returns `None` when nothing positive is priced.
    pub fn unit_price(&self, sku: &str) -> Option<PriceRecord> {
        let currency = Currency::Usd;
        let term = self
            .on_demand_terms(sku)
            .find(|term| term.price_dimensions.values().any(|d| d.amount(currency).is_some()))?;

        let mut dimensions: Vec<&PriceDimension> = term.price_dimensions.values().collect();
        dimensions.sort_by(|a, b| {
            let begin = |d: &PriceDimension| {
                d.begin_range.as_deref().and_then(|r| r.trim().parse::<f64>().ok()).unwrap_or(0.0)
            };
            begin(a).total_cmp(&begin(b))
        });

        dimensions.into_iter().find_map(|dimension| {
            let rate = dimension.amount(currency)?;
            (rate > 0.0).then(|| PriceRecord {
                sku: sku.to_string(),
                rate,
                unit: PricingUnit::from_catalog(&dimension.unit),
                currency,
            })
        })
    }

    /// Resolve a tier table for a SKU from its ranged dimensions.
    ///
    /// Bands are ordered by begin range; each band's upper bound is its end
    /// range. A non-numeric bound is a structural error. Tables without a
    /// single positive band are not priced.
    pub fn tiered_price(&self, sku: &str) -> CatalogResult<Option<TieredPrice>> {
        let currency = Currency::Usd;
        let Some(term) = self
            .on_demand_terms(sku)
            .find(|term| term.price_dimensions.values().any(|d| d.amount(currency).is_some()))
        else {
            return Ok(None);
        };

        let mut bands = Vec::with_capacity(term.price_dimensions.len());
        let mut unit = PricingUnit::Unit;
        for dimension in term.price_dimensions.values() {
            let Some(rate) = dimension.amount(currency) else {
                continue;
            };
            let begin = parse_bound(sku, dimension.begin_range.as_deref(), 0.0)?;
            let end = parse_bound(sku, dimension.end_range.as_deref(), f64::INFINITY)?;
            unit = PricingUnit::from_catalog(&dimension.unit);
            bands.push((begin, Tier::new(end, rate)));
        }
        bands.sort_by(|a, b| a.0.total_cmp(&b.0));

        let tiers: Vec<Tier> = bands.into_iter().map(|(_, tier)| tier).collect();
        if !tiers.iter().any(|t| t.rate > 0.0) {
            return Ok(None);
        }

        Ok(Some(TieredPrice {
            sku: sku.to_string(),
            tiers,
            unit,
            currency,
        }))
    }
}

/// Where offer files come from.
///
/// `Ok(None)` means the catalog is not part of this deployment.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogSource: Send + Sync {
    fn read(&self, service: Service) -> CatalogResult<Option<Vec<u8>>>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn read(&self, service: Service) -> CatalogResult<Option<Vec<u8>>> {
        (**self).read(service)
    }
}

/// Offer files on disk, one file per service
#[derive(Debug, Clone)]
pub struct DirectoryCatalogSource {
    dir: PathBuf,
    overrides: HashMap<Service, PathBuf>,
}

impl DirectoryCatalogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overrides: HashMap::new(),
        }
    }

    /// Use a different file name (relative to the directory) for a service
    pub fn with_file(mut self, service: Service, file: impl Into<PathBuf>) -> Self {
        self.overrides.insert(service, file.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, service: Service) -> PathBuf {
        match self.overrides.get(&service) {
            Some(file) => self.dir.join(file),
            None => self.dir.join(service.default_file_name()),
        }
    }
}

impl CatalogSource for DirectoryCatalogSource {
    fn read(&self, service: Service) -> CatalogResult<Option<Vec<u8>>> {
        let path = self.path_for(service);
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(service = %service, path = %path.display(), bytes = bytes.len(), "Read catalog");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!(service = %service, path = %path.display(), error = %e, "Catalog unreadable");
                Err(CatalogError::Io {
                    path: path.display().to_string(),
                    details: e.to_string(),
                })
            }
        }
    }
}

/// Offer files held in memory (embedded snapshots, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    documents: HashMap<Service, Vec<u8>>,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, service: Service, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(service, bytes.into());
        self
    }
}

impl CatalogSource for StaticCatalogSource {
    fn read(&self, service: Service) -> CatalogResult<Option<Vec<u8>>> {
        Ok(self.documents.get(&service).cloned())
    }
}
