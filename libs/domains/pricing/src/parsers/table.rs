//! DynamoDB offer: on-demand request units, provisioned capacity, storage.

use super::{note_region, set_first, CatalogParser, PriceIndex};
use crate::catalog::{CatalogDocument, Product};
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service, TieredPrice};

#[derive(Debug, Default)]
pub struct TableIndex {
    pub read_request_unit: Option<PriceRecord>,
    pub write_request_unit: Option<PriceRecord>,
    pub provisioned_rcu_hourly: Option<PriceRecord>,
    pub provisioned_wcu_hourly: Option<PriceRecord>,
    /// Per GB-month, first band free
    pub storage: Option<TieredPrice>,
}

impl TableIndex {
    fn present(&self) -> [(&'static str, bool); 5] {
        [
            ("read_request_unit", self.read_request_unit.is_some()),
            ("write_request_unit", self.write_request_unit.is_some()),
            ("provisioned_rcu_hourly", self.provisioned_rcu_hourly.is_some()),
            ("provisioned_wcu_hourly", self.provisioned_wcu_hourly.is_some()),
            ("storage", self.storage.is_some()),
        ]
    }
}

impl PriceIndex for TableIndex {
    fn len(&self) -> usize {
        self.present().iter().filter(|(_, set)| *set).count()
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        self.present()
            .into_iter()
            .filter(|(_, set)| !set)
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableParser;

impl TableParser {
    fn is_standard_class(product: &Product) -> bool {
        product.in_aws_region() && !product.attr("usagetype").is_some_and(|u| u.contains("IA-"))
    }
}

impl CatalogParser for TableParser {
    type Index = TableIndex;

    fn service(&self) -> Service {
        Service::TableStore
    }

    fn parse(&self, document: &CatalogDocument, index: &mut TableIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if !Self::is_standard_class(product) {
                continue;
            }

            if product.family_is("Database Storage") {
                if product.attr_is("volumeType", "Amazon DynamoDB - Indexed DataStore") {
                    if let Some(price) = document.tiered_price(sku)? {
                        note_region(&mut region, product);
                        set_first(&mut index.storage, service, "storage", price);
                    }
                }
                continue;
            }

            let reads = product.attr_is("group", "DDB-ReadUnits");
            let writes = product.attr_is("group", "DDB-WriteUnits");
            let (slot, name) = match (product.product_family.as_deref(), reads, writes) {
                (Some("Amazon DynamoDB PayPerRequest Throughput"), true, _) => {
                    (&mut index.read_request_unit, "read_request_unit")
                }
                (Some("Amazon DynamoDB PayPerRequest Throughput"), _, true) => {
                    (&mut index.write_request_unit, "write_request_unit")
                }
                (Some("Provisioned IOPS"), true, _) => (&mut index.provisioned_rcu_hourly, "provisioned_rcu_hourly"),
                (Some("Provisioned IOPS"), _, true) => (&mut index.provisioned_wcu_hourly, "provisioned_wcu_hourly"),
                _ => continue,
            };

            // Provisioned capacity starts with a free-tier band; unit_price skips it
            if let Some(record) = document.unit_price(sku) {
                note_region(&mut region, product);
                set_first(slot, service, name, record);
            }
        }

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use test_utils::assertions::assert_rate_eq;
    use test_utils::{catalogs, CatalogBuilder};

    fn parse(builder: &CatalogBuilder) -> TableIndex {
        let document = CatalogDocument::from_slice(Service::TableStore, &builder.to_bytes()).unwrap();
        let mut index = TableIndex::default();
        TableParser.parse(&document, &mut index).unwrap();
        index
    }

    #[test]
    fn test_on_demand_request_units() {
        let index = parse(&catalogs::dynamodb());
        assert_rate_eq(index.read_request_unit.as_ref().unwrap().rate, 0.000000125, "read");
        assert_rate_eq(index.write_request_unit.as_ref().unwrap().rate, 0.000000625, "write");
    }

    #[test]
    fn test_provisioned_capacity_skips_free_tier() {
        let index = parse(&catalogs::dynamodb());
        assert_rate_eq(index.provisioned_rcu_hourly.as_ref().unwrap().rate, 0.00013, "rcu");
        assert_rate_eq(index.provisioned_wcu_hourly.as_ref().unwrap().rate, 0.00065, "wcu");
    }

    #[test]
    fn test_storage_keeps_free_band() {
        let index = parse(&catalogs::dynamodb());
        let storage = index.storage.as_ref().unwrap();
        assert_eq!(storage.tiers, vec![Tier::new(25.0, 0.0), Tier::unbounded(0.25)]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_infrequent_access_class_is_excluded() {
        let builder = CatalogBuilder::new("AmazonDynamoDB").product(
            "Amazon DynamoDB PayPerRequest Throughput",
            &[("group", "DDB-ReadUnits"), ("usagetype", "IA-ReadRequestUnits")],
            "ReadRequestUnits",
            "0.000000155",
        );
        let index = parse(&builder);
        assert!(index.is_empty());
        assert_eq!(index.missing_fields().len(), 5);
    }
}
