//! RDS offer: instance hours, storage GB-month and provisioned IOPS.

use std::collections::HashMap;

use super::{insert_first, note_region, CatalogParser, PriceIndex};
use crate::catalog::{CatalogDocument, Product};
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service};

#[derive(Debug, Default)]
pub struct DatabaseIndex {
    /// Keyed by `instanceType/databaseEngine`
    pub instances: HashMap<String, PriceRecord>,
    /// Keyed by normalized storage type (`gp2`, `gp3`, `io1`, `io2`, `standard`)
    pub storage: HashMap<String, PriceRecord>,
    pub iops: HashMap<String, PriceRecord>,
}

impl DatabaseIndex {
    pub fn instance_key(instance_class: &str, engine: &str) -> String {
        format!("{instance_class}/{engine}")
    }
}

impl PriceIndex for DatabaseIndex {
    fn len(&self) -> usize {
        self.instances.len() + self.storage.len() + self.iops.len()
    }
}

/// Map an RDS `volumeType` to the API storage type
pub fn storage_type(volume_type: &str) -> Option<&'static str> {
    match volume_type {
        "General Purpose" => Some("gp2"),
        "General Purpose-GP3" => Some("gp3"),
        "Provisioned IOPS" => Some("io1"),
        "Provisioned IOPS-IO2" => Some("io2"),
        "Magnetic" => Some("standard"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseParser;

impl DatabaseParser {
    fn single_az(product: &Product) -> bool {
        product.attr_is("deploymentOption", "Single-AZ") && product.in_aws_region()
    }

    fn is_standard_instance(product: &Product) -> bool {
        Self::single_az(product)
            && !product.attr_is("licenseModel", "Bring your own license")
            && product.attr("databaseEdition").is_none_or(|e| e.starts_with("Standard"))
            && !product.attr("storage").is_some_and(|s| s.contains("IO Optimization"))
    }

    /// Storage rows are engine-agnostic except for a handful of engine-specific SKUs
    fn is_shared_storage(product: &Product) -> bool {
        Self::single_az(product) && product.attr("databaseEngine").is_none_or(|e| e == "Any")
    }
}

impl CatalogParser for DatabaseParser {
    type Index = DatabaseIndex;

    fn service(&self) -> Service {
        Service::ManagedDatabase
    }

    fn parse(&self, document: &CatalogDocument, index: &mut DatabaseIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            let (map, key) = if product.family_is("Database Instance") {
                if !Self::is_standard_instance(product) {
                    continue;
                }
                let (Some(class), Some(engine)) = (product.attr("instanceType"), product.attr("databaseEngine")) else {
                    continue;
                };
                (&mut index.instances, DatabaseIndex::instance_key(class, engine))
            } else if product.family_is("Database Storage") {
                if !Self::is_shared_storage(product) {
                    continue;
                }
                let Some(kind) = product.attr("volumeType").and_then(storage_type) else {
                    continue;
                };
                (&mut index.storage, kind.to_string())
            } else if product.family_is("Provisioned IOPS") {
                if !Self::is_shared_storage(product) {
                    continue;
                }
                let Some(kind) = product.attr("volumeType").and_then(storage_type) else {
                    continue;
                };
                (&mut index.iops, kind.to_string())
            } else {
                continue;
            };

            if let Some(record) = document.unit_price(sku) {
                note_region(&mut region, product);
                insert_first(map, service, key, record);
            }
        }

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assertions::assert_rate_eq;
    use test_utils::{catalogs, CatalogBuilder};

    fn parse(builder: &CatalogBuilder) -> (DatabaseIndex, Option<String>) {
        let document = CatalogDocument::from_slice(Service::ManagedDatabase, &builder.to_bytes()).unwrap();
        let mut index = DatabaseIndex::default();
        let region = DatabaseParser.parse(&document, &mut index).unwrap();
        (index, region)
    }

    #[test]
    fn test_single_az_instances_only() {
        let (index, region) = parse(&catalogs::rds());

        assert_eq!(region.as_deref(), Some("us-east-1"));
        assert_rate_eq(index.instances["db.t3.micro/PostgreSQL"].rate, 0.018, "postgres single-az");
        assert_rate_eq(index.instances["db.t3.micro/MySQL"].rate, 0.017, "mysql");
        assert_rate_eq(index.instances["db.m5.large/MySQL"].rate, 0.171, "m5 mysql");
    }

    #[test]
    fn test_license_included_beats_byol() {
        let (index, _) = parse(&catalogs::rds());
        assert_rate_eq(index.instances["db.m5.large/Oracle"].rate, 0.34, "oracle li");
    }

    #[test]
    fn test_aurora_io_optimized_is_excluded() {
        let (index, _) = parse(&catalogs::rds());
        assert_rate_eq(index.instances["db.r6g.large/Aurora PostgreSQL"].rate, 0.26, "aurora standard");
        assert_eq!(index.instances.len(), 5);
    }

    #[test]
    fn test_storage_and_iops_by_type() {
        let (index, _) = parse(&catalogs::rds());

        assert_rate_eq(index.storage["gp2"].rate, 0.115, "gp2");
        assert_rate_eq(index.storage["gp3"].rate, 0.115, "gp3");
        assert_rate_eq(index.storage["io1"].rate, 0.125, "io1");
        assert_eq!(index.storage.len(), 3);
        assert_rate_eq(index.iops["io1"].rate, 0.10, "piops");
    }

    #[test]
    fn test_unknown_volume_type_is_skipped() {
        let builder = CatalogBuilder::new("AmazonRDS").product(
            "Database Storage",
            &[("volumeType", "Hyper Fast"), ("deploymentOption", "Single-AZ")],
            "GB-Mo",
            "1.00",
        );
        let (index, region) = parse(&builder);
        assert!(index.is_empty());
        assert!(region.is_none());
    }

    #[test]
    fn test_untyped_iops_row_does_not_take_io1_price() {
        let builder = CatalogBuilder::new("AmazonRDS")
            .product(
                "Provisioned IOPS",
                &[("deploymentOption", "Single-AZ"), ("databaseEngine", "Any")],
                "IOPS-Mo",
                "0.20",
            )
            .product(
                "Provisioned IOPS",
                &[("volumeType", "Aurora I/O"), ("deploymentOption", "Single-AZ"), ("databaseEngine", "Any")],
                "IOPS-Mo",
                "0.30",
            )
            .product(
                "Provisioned IOPS",
                &[("volumeType", "Provisioned IOPS"), ("deploymentOption", "Single-AZ"), ("databaseEngine", "Any")],
                "IOPS-Mo",
                "0.10",
            );
        let (index, _) = parse(&builder);

        assert_eq!(index.iops.len(), 1);
        assert_rate_eq(index.iops["io1"].rate, 0.10, "typed io1 row");
    }

    #[test]
    fn test_storage_type_mapping() {
        assert_eq!(storage_type("Provisioned IOPS-IO2"), Some("io2"));
        assert_eq!(storage_type("Magnetic"), Some("standard"));
        assert_eq!(storage_type("gp3"), None);
    }
}
