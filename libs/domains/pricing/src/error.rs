use std::fmt;
use thiserror::Error;

use crate::models::Service;

/// Result type for catalog loading and parsing
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for engine initialization
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors raised while reading or decoding one catalog document.
///
/// A missing price point is never one of these; it is a `None` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The document is not a valid offer file
    #[error("Malformed {service} catalog: {details}")]
    Malformed { service: Service, details: String },

    /// A tier range bound is not numeric
    #[error("Invalid price range '{value}' for SKU {sku}")]
    InvalidRange { sku: String, value: String },

    /// The document exists but could not be read
    #[error("Failed to read catalog {path}: {details}")]
    Io { path: String, details: String },
}

/// One catalog that failed during index build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub service: Service,
    pub error: CatalogError,
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.service, self.error)
    }
}

/// Terminal initialization failures of the pricing engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// One or more catalogs failed to parse
    #[error("Pricing catalog initialization failed: {}", join(.0))]
    Initialization(Vec<ServiceFailure>),

    /// Parsing succeeded but a mandatory index ended up empty
    #[error("Mandatory pricing index empty for {}; catalog data is likely corrupt", join(.0))]
    MandatoryIndexEmpty(Vec<Service>),
}

impl PricingError {
    /// Services implicated by this error
    pub fn services(&self) -> Vec<Service> {
        match self {
            PricingError::Initialization(failures) => failures.iter().map(|f| f.service).collect(),
            PricingError::MandatoryIndexEmpty(services) => services.clone(),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization_error_names_every_service() {
        let err = PricingError::Initialization(vec![
            ServiceFailure {
                service: Service::Compute,
                error: CatalogError::Malformed {
                    service: Service::Compute,
                    details: "expected value at line 1".to_string(),
                },
            },
            ServiceFailure {
                service: Service::Gateway,
                error: CatalogError::InvalidRange {
                    sku: "SKU1".to_string(),
                    value: "lots".to_string(),
                },
            },
        ]);

        let message = err.to_string();
        assert!(message.contains("compute: Malformed compute catalog"));
        assert!(message.contains("gateway: Invalid price range 'lots'"));
        assert_eq!(err.services(), vec![Service::Compute, Service::Gateway]);
    }

    #[test]
    fn test_mandatory_index_error_message() {
        let err = PricingError::MandatoryIndexEmpty(vec![Service::Compute, Service::Storage]);
        assert!(err.to_string().contains("compute; storage"));
    }
}
