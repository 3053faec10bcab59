//! EBS side of the EC2 offer: volumes, provisioned IOPS/throughput, snapshots.

use std::collections::HashMap;

use super::{insert_first, note_region, set_first, CatalogParser, PriceIndex};
use crate::catalog::CatalogDocument;
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service};

/// All maps are keyed by lowercase `volumeApiName` (`gp3`, `io2`, ...)
#[derive(Debug, Default)]
pub struct StorageIndex {
    pub volumes: HashMap<String, PriceRecord>,
    pub iops: HashMap<String, PriceRecord>,
    pub throughput: HashMap<String, PriceRecord>,
    pub snapshot_gb_month: Option<PriceRecord>,
}

impl PriceIndex for StorageIndex {
    fn len(&self) -> usize {
        self.volumes.len() + self.iops.len() + self.throughput.len() + usize::from(self.snapshot_gb_month.is_some())
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        if self.snapshot_gb_month.is_none() {
            vec!["snapshot_gb_month"]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StorageParser;

impl CatalogParser for StorageParser {
    type Index = StorageIndex;

    fn service(&self) -> Service {
        Service::Storage
    }

    fn parse(&self, document: &CatalogDocument, index: &mut StorageIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if !product.in_aws_region() {
                continue;
            }

            if product.family_is("Storage Snapshot") {
                if product.usage_type_ends_with("EBS:SnapshotUsage") {
                    if let Some(record) = document.unit_price(sku) {
                        note_region(&mut region, product);
                        set_first(&mut index.snapshot_gb_month, service, "snapshot_gb_month", record);
                    }
                }
                continue;
            }

            let target = if product.family_is("Storage") {
                // Base GB-month charge only; other usage types on the family are surcharges
                let base = product.attr("usagetype").is_none_or(|u| u.contains("EBS:VolumeUsage"));
                base.then_some(&mut index.volumes)
            } else if product.family_is("System Operation") && product.attr_is("group", "EBS IOPS") {
                Some(&mut index.iops)
            } else if product.family_is("Provisioned Throughput") && product.attr_is("group", "EBS Throughput") {
                Some(&mut index.throughput)
            } else {
                None
            };

            let (Some(map), Some(volume)) = (target, product.attr("volumeApiName")) else {
                continue;
            };
            if let Some(record) = document.unit_price(sku) {
                note_region(&mut region, product);
                insert_first(map, service, volume.to_ascii_lowercase(), record);
            }
        }

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricingUnit;
    use test_utils::assertions::assert_rate_eq;
    use test_utils::{catalogs, CatalogBuilder};

    fn parse(builder: &CatalogBuilder) -> StorageIndex {
        let document = CatalogDocument::from_slice(Service::Storage, &builder.to_bytes()).unwrap();
        let mut index = StorageIndex::default();
        StorageParser.parse(&document, &mut index).unwrap();
        index
    }

    #[test]
    fn test_fixture_volumes() {
        let index = parse(&catalogs::ec2_storage());

        assert_eq!(index.volumes.len(), 7);
        assert_rate_eq(index.volumes["gp3"].rate, 0.08, "gp3");
        assert_rate_eq(index.volumes["sc1"].rate, 0.015, "sc1");
        assert_eq!(index.volumes["gp2"].unit, PricingUnit::GbMonth);
    }

    #[test]
    fn test_outposts_volume_is_excluded() {
        let index = parse(&catalogs::ec2_storage());
        // The Outposts gp3 volume comes later at 0.30
        assert_rate_eq(index.volumes["gp3"].rate, 0.08, "regional gp3");
    }

    #[test]
    fn test_iops_throughput_and_snapshots() {
        let index = parse(&catalogs::ec2_storage());

        assert_rate_eq(index.iops["io1"].rate, 0.065, "io1 iops");
        assert_rate_eq(index.iops["gp3"].rate, 0.005, "gp3 iops");
        assert!(!index.iops.contains_key("io2"), "io2 tier 2 group is not the base rate");
        assert_rate_eq(index.throughput["gp3"].rate, 0.04, "gp3 throughput");
        assert_rate_eq(index.snapshot_gb_month.as_ref().unwrap().rate, 0.05, "snapshot");
        assert!(index.missing_fields().is_empty());
    }

    #[test]
    fn test_volume_keys_are_lowercased() {
        let builder = CatalogBuilder::new("AmazonEC2").product(
            "Storage",
            &[("volumeApiName", "GP3"), ("usagetype", "EBS:VolumeUsage.gp3")],
            "GB-Mo",
            "0.08",
        );
        let index = parse(&builder);
        assert!(index.volumes.contains_key("gp3"));
    }

    #[test]
    fn test_compute_products_are_ignored() {
        let index = parse(&catalogs::ec2_compute());
        assert!(index.is_empty());
        assert_eq!(index.missing_fields(), vec!["snapshot_gb_month"]);
    }
}
