//! EC2 offer: instance hours, NAT gateway and public IPv4.

use std::collections::HashMap;

use super::{insert_first, note_region, set_first, CatalogParser, PriceIndex};
use crate::catalog::{CatalogDocument, Product};
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service};

#[derive(Debug, Default)]
pub struct ComputeIndex {
    /// Keyed by `instanceType/operatingSystem/tenancy`
    pub instances: HashMap<String, PriceRecord>,
    pub nat_gateway_hourly: Option<PriceRecord>,
    pub nat_gateway_per_gb: Option<PriceRecord>,
    pub public_ipv4_hourly: Option<PriceRecord>,
}

impl ComputeIndex {
    pub fn instance_key(instance_type: &str, operating_system: &str, tenancy: &str) -> String {
        format!("{instance_type}/{operating_system}/{tenancy}")
    }
}

impl PriceIndex for ComputeIndex {
    fn len(&self) -> usize {
        self.instances.len()
            + [&self.nat_gateway_hourly, &self.nat_gateway_per_gb, &self.public_ipv4_hourly]
                .iter()
                .filter(|f| f.is_some())
                .count()
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.nat_gateway_hourly.is_none() {
            missing.push("nat_gateway_hourly");
        }
        if self.nat_gateway_per_gb.is_none() {
            missing.push("nat_gateway_per_gb");
        }
        if self.public_ipv4_hourly.is_none() {
            missing.push("public_ipv4_hourly");
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeParser;

impl ComputeParser {
    /// Plain on-demand instance: running capacity (not a reservation
    /// placeholder), no bundled SQL Server/Enterprise software, and the
    /// license is not customer-supplied.
    fn is_on_demand_instance(product: &Product) -> bool {
        product.family_is("Compute Instance")
            && product.attr_is("capacitystatus", "Used")
            && product.attr_is("preInstalledSw", "NA")
            && !product.attr_is("licenseModel", "Bring your own license")
            && product.in_aws_region()
    }
}

impl CatalogParser for ComputeParser {
    type Index = ComputeIndex;

    fn service(&self) -> Service {
        Service::Compute
    }

    fn parse(&self, document: &CatalogDocument, index: &mut ComputeIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if Self::is_on_demand_instance(product) {
                let (Some(instance_type), Some(os), Some(tenancy)) = (
                    product.attr("instanceType"),
                    product.attr("operatingSystem"),
                    product.attr("tenancy"),
                ) else {
                    continue;
                };
                if let Some(record) = document.unit_price(sku) {
                    note_region(&mut region, product);
                    let key = ComputeIndex::instance_key(instance_type, os, tenancy);
                    insert_first(&mut index.instances, service, key, record);
                }
                continue;
            }

            if !product.in_aws_region() {
                continue;
            }

            let field = if product.family_is("NAT Gateway") && product.usage_type_ends_with("NatGateway-Hours") {
                Some((&mut index.nat_gateway_hourly, "nat_gateway_hourly"))
            } else if product.family_is("NAT Gateway") && product.usage_type_ends_with("NatGateway-Bytes") {
                Some((&mut index.nat_gateway_per_gb, "nat_gateway_per_gb"))
            } else if product.family_is("IP Address") && product.usage_type_ends_with("PublicIPv4:InUseAddress") {
                Some((&mut index.public_ipv4_hourly, "public_ipv4_hourly"))
            } else {
                None
            };

            if let Some((slot, name)) = field {
                if let Some(record) = document.unit_price(sku) {
                    note_region(&mut region, product);
                    set_first(slot, service, name, record);
                }
            }
        }

        Ok(region)
    }
}
