//! Lambda offer: request price and duration tiers per architecture.

use std::collections::HashMap;

use super::{insert_first, note_region, set_first, CatalogParser, PriceIndex};
use crate::catalog::CatalogDocument;
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service, TieredPrice};

pub const X86_64: &str = "x86_64";
pub const ARM64: &str = "arm64";

/// Maps are keyed by architecture (`x86_64`, `arm64`)
#[derive(Debug, Default)]
pub struct FunctionIndex {
    pub requests: HashMap<String, PriceRecord>,
    /// Per GB-second
    pub duration: HashMap<String, TieredPrice>,
    pub ephemeral_storage_gb_second: Option<PriceRecord>,
}

impl PriceIndex for FunctionIndex {
    fn len(&self) -> usize {
        self.requests.len() + self.duration.len() + usize::from(self.ephemeral_storage_gb_second.is_some())
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.requests.contains_key(X86_64) {
            missing.push("requests.x86_64");
        }
        if !self.duration.contains_key(X86_64) {
            missing.push("duration.x86_64");
        }
        if self.ephemeral_storage_gb_second.is_none() {
            missing.push("ephemeral_storage_gb_second");
        }
        missing
    }
}

enum Dimension {
    Requests(&'static str),
    Duration(&'static str),
    EphemeralStorage,
}

impl Dimension {
    /// Exact group match; provisioned concurrency and Edge groups share prefixes
    fn from_group(group: &str) -> Option<Self> {
        match group {
            "AWS-Lambda-Requests" => Some(Dimension::Requests(X86_64)),
            "AWS-Lambda-Requests-ARM" => Some(Dimension::Requests(ARM64)),
            "AWS-Lambda-Duration" => Some(Dimension::Duration(X86_64)),
            "AWS-Lambda-Duration-ARM" => Some(Dimension::Duration(ARM64)),
            "AWS-Lambda-Storage-Duration" => Some(Dimension::EphemeralStorage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionParser;

impl CatalogParser for FunctionParser {
    type Index = FunctionIndex;

    fn service(&self) -> Service {
        Service::FunctionCompute
    }

    fn parse(&self, document: &CatalogDocument, index: &mut FunctionIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if !product.family_is("Serverless") || !product.in_aws_region() {
                continue;
            }
            let Some(dimension) = product.attr("group").and_then(Dimension::from_group) else {
                continue;
            };

            match dimension {
                Dimension::Requests(arch) => {
                    if let Some(record) = document.unit_price(sku) {
                        note_region(&mut region, product);
                        insert_first(&mut index.requests, service, arch.to_string(), record);
                    }
                }
                Dimension::Duration(arch) => {
                    if let Some(price) = document.tiered_price(sku)? {
                        note_region(&mut region, product);
                        insert_first(&mut index.duration, service, arch.to_string(), price);
                    }
                }
                Dimension::EphemeralStorage => {
                    if let Some(record) = document.unit_price(sku) {
                        note_region(&mut region, product);
                        set_first(
                            &mut index.ephemeral_storage_gb_second,
                            service,
                            "ephemeral_storage_gb_second",
                            record,
                        );
                    }
                }
            }
        }

        Ok(region)
    }
}
