//! EKS offer: control plane hours and Fargate vCPU/memory hours.

use super::{note_region, set_first, CatalogParser, PriceIndex};
use crate::catalog::CatalogDocument;
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service};

#[derive(Debug, Default)]
pub struct ClusterIndex {
    pub cluster_hourly: Option<PriceRecord>,
    pub fargate_vcpu_hourly: Option<PriceRecord>,
    pub fargate_memory_gb_hourly: Option<PriceRecord>,
}

impl ClusterIndex {
    fn fields(&self) -> [(&'static str, &Option<PriceRecord>); 3] {
        [
            ("cluster_hourly", &self.cluster_hourly),
            ("fargate_vcpu_hourly", &self.fargate_vcpu_hourly),
            ("fargate_memory_gb_hourly", &self.fargate_memory_gb_hourly),
        ]
    }
}

impl PriceIndex for ClusterIndex {
    fn len(&self) -> usize {
        self.fields().iter().filter(|(_, f)| f.is_some()).count()
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, f)| f.is_none())
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterParser;

impl CatalogParser for ClusterParser {
    type Index = ClusterIndex;

    fn service(&self) -> Service {
        Service::ManagedCluster
    }

    fn parse(&self, document: &CatalogDocument, index: &mut ClusterIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if !product.in_aws_region() {
                continue;
            }

            // Suffix match keeps extended support and ARM Fargate out
            let (slot, name) = if product.usage_type_ends_with("AmazonEKS-Hours:perCluster") {
                (&mut index.cluster_hourly, "cluster_hourly")
            } else if product.usage_type_ends_with("-Fargate-vCPU-Hours:perCPU")
                || product.attr_is("usagetype", "Fargate-vCPU-Hours:perCPU")
            {
                (&mut index.fargate_vcpu_hourly, "fargate_vcpu_hourly")
            } else if product.usage_type_ends_with("-Fargate-GB-Hours")
                || product.attr_is("usagetype", "Fargate-GB-Hours")
            {
                (&mut index.fargate_memory_gb_hourly, "fargate_memory_gb_hourly")
            } else {
                continue;
            };

            if let Some(record) = document.unit_price(sku) {
                note_region(&mut region, product);
                set_first(slot, service, name, record);
            }
        }

        Ok(region)
    }
}
