//! API Gateway offer: request tiers for REST, HTTP and WebSocket APIs.

use std::collections::HashMap;

use super::{insert_first, note_region, set_first, CatalogParser, PriceIndex};
use crate::catalog::CatalogDocument;
use crate::error::CatalogResult;
use crate::models::{PriceRecord, Service, TieredPrice};

#[derive(Debug, Default)]
pub struct GatewayIndex {
    /// Keyed by API kind: `rest`, `http`, `websocket` (messages)
    pub requests: HashMap<String, TieredPrice>,
    pub connection_minute: Option<PriceRecord>,
}

impl PriceIndex for GatewayIndex {
    fn len(&self) -> usize {
        self.requests.len() + usize::from(self.connection_minute.is_some())
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        if self.connection_minute.is_none() {
            vec!["connection_minute"]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayParser;

impl CatalogParser for GatewayParser {
    type Index = GatewayIndex;

    fn service(&self) -> Service {
        Service::Gateway
    }

    fn parse(&self, document: &CatalogDocument, index: &mut GatewayIndex) -> CatalogResult<Option<String>> {
        let service = self.service();
        let mut region = None;

        for (sku, product) in &document.products {
            if !product.in_aws_region() {
                continue;
            }

            let family = product.product_family.as_deref();
            let kind = match (family, product.attr("operation")) {
                (Some("API Calls"), Some("ApiGatewayRequest")) => "rest",
                (Some("API Calls"), Some("ApiGatewayHttpApi")) => "http",
                (Some("WebSocket"), Some("ApiGatewayWebSocket")) => "websocket",
                (Some("WebSocket"), Some("ApiGatewayMinute")) => {
                    if let Some(record) = document.unit_price(sku) {
                        note_region(&mut region, product);
                        set_first(&mut index.connection_minute, service, "connection_minute", record);
                    }
                    continue;
                }
                _ => continue,
            };

            if let Some(price) = document.tiered_price(sku)? {
                note_region(&mut region, product);
                insert_first(&mut index.requests, service, kind.to_string(), price);
            }
        }

        Ok(region)
    }
}
