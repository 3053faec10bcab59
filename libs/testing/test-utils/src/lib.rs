//! Shared test utilities for pricing catalog tests
//!
//! - `CatalogBuilder`: builds synthetic AWS offer files (bulk price list JSON)
//! - `catalogs`: ready-made offer files per service with realistic rates
//! - `assertions`: float-tolerant rate assertions
//!
//! The builder only emits JSON so it can be shared by unit and integration
//! tests without depending on the engine crate.
//!
//! ```
//! use test_utils::CatalogBuilder;
//!
//! let bytes = CatalogBuilder::new("AmazonEC2")
//!     .product(
//!         "Compute Instance",
//!         &[("instanceType", "t3.micro"), ("operatingSystem", "Linux")],
//!         "Hrs",
//!         "0.0104",
//!     )
//!     .to_bytes();
//! assert!(!bytes.is_empty());
//! ```

pub mod catalogs;

use serde_json::{json, Map, Value};

/// On-demand term code used by every AWS offer file
pub const ON_DEMAND_TERM: &str = "JRTCKXETXF";
const RATE_CODE: &str = "6YS6EN2CT7";

/// Builder for synthetic offer files with deterministic SKUs
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    offer_code: Option<String>,
    version: Option<String>,
    publication_date: Option<String>,
    products: Map<String, Value>,
    on_demand: Map<String, Value>,
    next_sku: u64,
}

impl CatalogBuilder {
    pub fn new(offer_code: &str) -> Self {
        Self {
            offer_code: Some(offer_code.to_string()),
            version: Some("20240105000000".to_string()),
            publication_date: Some("2024-01-05T00:00:00Z".to_string()),
            products: Map::new(),
            on_demand: Map::new(),
            next_sku: 1,
        }
    }

    /// Drop the `offerCode`, `version` and `publicationDate` fields
    pub fn without_metadata(mut self) -> Self {
        self.offer_code = None;
        self.version = None;
        self.publication_date = None;
        self
    }

    pub fn publication_date(mut self, date: &str) -> Self {
        self.publication_date = Some(date.to_string());
        self
    }

    /// SKU that the next added product will receive
    pub fn peek_sku(&self) -> String {
        format!("SKU{:08}", self.next_sku)
    }

    fn add_product(&mut self, family: &str, attributes: &[(&str, &str)]) -> String {
        let sku = self.peek_sku();
        self.next_sku += 1;

        let attrs: Map<String, Value> = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();

        self.products.insert(
            sku.clone(),
            json!({ "sku": sku, "productFamily": family, "attributes": attrs }),
        );
        sku
    }

    fn add_term(&mut self, sku: &str, dimensions: Map<String, Value>) {
        let mut terms = Map::new();
        terms.insert(
            format!("{sku}.{ON_DEMAND_TERM}"),
            json!({
                "offerTermCode": ON_DEMAND_TERM,
                "sku": sku,
                "effectiveDate": "2024-01-01T00:00:00Z",
                "priceDimensions": dimensions,
                "termAttributes": {}
            }),
        );
        self.on_demand.insert(sku.to_string(), Value::Object(terms));
    }

    /// Product priced by a single open-ended dimension
    pub fn product(mut self, family: &str, attributes: &[(&str, &str)], unit: &str, usd: &str) -> Self {
        let sku = self.add_product(family, attributes);
        let mut dimensions = Map::new();
        dimensions.insert(
            format!("{sku}.{ON_DEMAND_TERM}.{RATE_CODE}"),
            json!({
                "unit": unit,
                "beginRange": "0",
                "endRange": "Inf",
                "description": format!("{family} on-demand"),
                "pricePerUnit": { "USD": usd },
                "appliesTo": []
            }),
        );
        self.add_term(&sku, dimensions);
        self
    }

    /// Product priced by ranged dimensions given as `(begin, end, usd)`
    pub fn tiered_product(
        mut self,
        family: &str,
        attributes: &[(&str, &str)],
        unit: &str,
        tiers: &[(&str, &str, &str)],
    ) -> Self {
        let sku = self.add_product(family, attributes);
        let dimensions: Map<String, Value> = tiers
            .iter()
            .enumerate()
            .map(|(i, (begin, end, usd))| {
                (
                    format!("{sku}.{ON_DEMAND_TERM}.RATE{i:04}"),
                    json!({
                        "unit": unit,
                        "beginRange": begin,
                        "endRange": end,
                        "pricePerUnit": { "USD": usd },
                        "appliesTo": []
                    }),
                )
            })
            .collect();
        self.add_term(&sku, dimensions);
        self
    }

    /// Product without any on-demand term
    pub fn unpriced_product(mut self, family: &str, attributes: &[(&str, &str)]) -> Self {
        self.add_product(family, attributes);
        self
    }

    pub fn build(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("formatVersion".into(), json!("v1.0"));
        if let Some(code) = &self.offer_code {
            doc.insert("offerCode".into(), json!(code));
        }
        if let Some(version) = &self.version {
            doc.insert("version".into(), json!(version));
        }
        if let Some(date) = &self.publication_date {
            doc.insert("publicationDate".into(), json!(date));
        }
        doc.insert("products".into(), Value::Object(self.products.clone()));
        doc.insert("terms".into(), json!({ "OnDemand": self.on_demand.clone() }));
        Value::Object(doc)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.build()).unwrap_or_default()
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that two rates match within floating-point noise
    pub fn assert_rate_eq(actual: f64, expected: f64, context: &str) {
        let tolerance = 1e-9_f64.max(expected.abs() * 1e-9);
        assert!(
            (actual - expected).abs() <= tolerance,
            "{}: expected rate {}, got {}",
            context,
            expected,
            actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
