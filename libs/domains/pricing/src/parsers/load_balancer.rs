//! ELB offer: hourly and capacity-unit price per load balancer kind.

use std::collections::HashMap;

use super::{insert_first, note_region, CatalogParser, PriceIndex};
use crate::catalog::CatalogDocument;
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service};

/// Maps keyed by kind: `application`, `network`, `gateway`, `classic`
#[derive(Debug, Default)]
pub struct LoadBalancerIndex {
    pub hourly: HashMap<String, PriceRecord>,
    /// LCU-hour for ALB, NLCU-hour for NLB, GLCU-hour for GWLB, per-GB for classic
    pub capacity_units: HashMap<String, PriceRecord>,
}

impl PriceIndex for LoadBalancerIndex {
    fn len(&self) -> usize {
        self.hourly.len() + self.capacity_units.len()
    }
}

fn kind_of(family: &str) -> Option<&'static str> {
    match family {
        "Load Balancer-Application" => Some("application"),
        "Load Balancer-Network" => Some("network"),
        "Load Balancer-Gateway" => Some("gateway"),
        "Load Balancer" => Some("classic"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadBalancerParser;

impl CatalogParser for LoadBalancerParser {
    type Index = LoadBalancerIndex;

    fn service(&self) -> Service {
        Service::LoadBalancer
    }

    fn parse(&self, document: &CatalogDocument, index: &mut LoadBalancerIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if !product.in_aws_region() {
                continue;
            }
            let Some(kind) = product.product_family.as_deref().and_then(kind_of) else {
                continue;
            };

            let map = if product.usage_type_ends_with("LoadBalancerUsage") {
                &mut index.hourly
            } else if product.usage_type_ends_with("LCUUsage") || product.usage_type_ends_with("DataProcessing-Bytes") {
                &mut index.capacity_units
            } else {
                continue;
            };

            if let Some(record) = document.unit_price(sku) {
                note_region(&mut region, product);
                insert_first(map, service, kind.to_string(), record);
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

    fn parse(builder: &CatalogBuilder) -> LoadBalancerIndex {
        let document = CatalogDocument::from_slice(Service::LoadBalancer, &builder.to_bytes()).unwrap();
        let mut index = LoadBalancerIndex::default();
        LoadBalancerParser.parse(&document, &mut index).unwrap();
        index
    }

    #[test]
    fn test_every_kind_is_indexed() {
        let index = parse(&catalogs::elb());

        assert_rate_eq(index.hourly["application"].rate, 0.0225, "alb");
        assert_rate_eq(index.hourly["network"].rate, 0.0225, "nlb");
        assert_rate_eq(index.hourly["gateway"].rate, 0.0125, "gwlb");
        assert_rate_eq(index.hourly["classic"].rate, 0.025, "clb");

        assert_rate_eq(index.capacity_units["application"].rate, 0.008, "lcu");
        assert_rate_eq(index.capacity_units["network"].rate, 0.006, "nlcu");
        assert_rate_eq(index.capacity_units["gateway"].rate, 0.004, "glcu");
        assert_rate_eq(index.capacity_units["classic"].rate, 0.008, "clb data");
        assert_eq!(index.len(), 8);
    }

    #[test]
    fn test_outposts_load_balancer_is_excluded() {
        let builder = CatalogBuilder::new("AWSELB").product(
            "Load Balancer-Application",
            &[("usagetype", "LoadBalancerUsage"), ("locationType", "AWS Outposts")],
            "Hrs",
            "0.04",
        );
        assert!(parse(&builder).is_empty());
    }

    #[test]
    fn test_unrelated_usage_is_ignored() {
        let builder = CatalogBuilder::new("AWSELB").product(
            "Load Balancer-Application",
            &[("usagetype", "LoadBalancerUsage-TrustStore")],
            "Hrs",
            "0.01",
        );
        assert!(parse(&builder).is_empty());
    }
}
