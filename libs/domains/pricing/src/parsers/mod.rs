//! Catalog parsers, one per service family.
//!
//! Every parser follows the same shape: walk the products of one offer file,
//! keep only the on-demand standard-configuration variant of each logical
//! price point, and write it into an index the parser owns exclusively.

pub mod cluster;
pub mod compute;
pub mod database;
pub mod function;
pub mod gateway;
pub mod load_balancer;
pub mod storage;
pub mod table;

pub use cluster::{ClusterIndex, ClusterParser};
pub use compute::{ComputeIndex, ComputeParser};
pub use database::{DatabaseIndex, DatabaseParser};
pub use function::{FunctionIndex, FunctionParser};
pub use gateway::{GatewayIndex, GatewayParser};
pub use load_balancer::{LoadBalancerIndex, LoadBalancerParser};
pub use storage::{StorageIndex, StorageParser};
pub use table::{TableIndex, TableParser};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

use crate::catalog::{CatalogDocument, CatalogSource, Product};
use crate::error::CatalogResult;
use crate::models::{CatalogMetadata, Service};

/// Read access every index offers to the engine's validation pass
pub trait PriceIndex: Default + Send {
    /// Number of records held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Optional single-valued price points that were never set
    fn missing_fields(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// A service-specific offer-file parser
pub trait CatalogParser: Sync {
    type Index: PriceIndex;

    fn service(&self) -> Service;

    /// Populate `index` from `document` and return the region the catalog
    /// reports for itself. Errors only on malformed structure.
    fn parse(&self, document: &CatalogDocument, index: &mut Self::Index) -> CatalogResult<Option<String>>;
}

/// What one parser run produced, besides its index
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    /// False when the source had no document for the service
    pub loaded: bool,
    pub region: Option<String>,
    pub metadata: Option<CatalogMetadata>,
}

/// Read, decode and parse one service's catalog into `index`.
pub fn parse_catalog<P: CatalogParser>(
    parser: &P,
    source: &dyn CatalogSource,
    index: &mut P::Index,
) -> CatalogResult<ParsedCatalog> {
    let service = parser.service();
    let Some(bytes) = source.read(service)? else {
        warn!(service = %service, "Catalog not available, index left empty");
        return Ok(ParsedCatalog::default());
    };

    let document = CatalogDocument::from_slice(service, &bytes)?;
    check_offer_code(service, &document);

    let region = parser.parse(&document, index)?;
    debug!(
        service = %service,
        products = document.products.len(),
        records = index.len(),
        region = region.as_deref().unwrap_or("unknown"),
        "Parsed catalog"
    );

    Ok(ParsedCatalog {
        loaded: true,
        region,
        metadata: Some(document.metadata()),
    })
}

/// Warn when a document declares a different offer than the parser expects.
/// Attribute checks still guard the records, so this never fails.
pub fn check_offer_code(service: Service, document: &CatalogDocument) -> bool {
    let expected = service.expected_offer_code();
    match document.offer_code.as_deref() {
        Some(actual) if actual != expected => {
            warn!(
                service = %service,
                expected = expected,
                actual = actual,
                "Catalog offer code mismatch"
            );
            false
        }
        _ => true,
    }
}

/// Remember the region of the first qualifying product
pub(crate) fn note_region(region: &mut Option<String>, product: &Product) {
    if region.is_none() {
        *region = product.region_code().map(str::to_string);
    }
}

/// Insert a record, keeping the first one on key collision
pub(crate) fn insert_first<V>(map: &mut HashMap<String, V>, service: Service, key: String, value: V) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(slot) => {
            debug!(service = %service, key = %slot.key(), "Duplicate price point ignored");
        }
    }
}

/// Set a single-valued price point, keeping the first one
pub(crate) fn set_first<V>(field: &mut Option<V>, service: Service, name: &'static str, value: V) {
    if field.is_some() {
        debug!(service = %service, field = name, "Duplicate price point ignored");
    } else {
        *field = Some(value);
    }
}
