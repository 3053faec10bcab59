//! Pricing Domain
//!
//! Resolves AWS on-demand prices from locally supplied bulk offer files.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐
//! │  Lookup API   │  ← Typed getters, Option results, latency warnings
//! └───────┬───────┘
//!         │
//! ┌───────▼───────┐
//! │    Engine     │  ← One-time concurrent index build + validation
//! └───────┬───────┘
//!         │
//! ┌───────▼───────┐
//! │    Parsers    │  ← One per service, record qualification
//! └───────┬───────┘
//!         │
//! ┌───────▼───────┐
//! │    Catalog    │  ← Offer file decoding, catalog sources
//! └───────────────┘
//! ```
//!
//! `tiered_cost` is independent of the engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_pricing::{CatalogMode, DirectoryCatalogSource, PricingEngine};
//!
//! let engine = PricingEngine::new(DirectoryCatalogSource::new("./pricing"), CatalogMode::Complete);
//! let hourly = engine.ec2_hourly("t3.micro", "linux", "shared").unwrap_or(0.0);
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod models;
pub mod parsers;
pub mod tiered;

// Re-export commonly used types
pub use catalog::{CatalogDocument, CatalogSource, DirectoryCatalogSource, StaticCatalogSource};
pub use engine::{EngineState, PricingEngine};
pub use error::{CatalogError, CatalogResult, PricingError, PricingResult, ServiceFailure};
pub use models::{CatalogMetadata, Currency, PriceRecord, PricingUnit, Service, Tier, TieredPrice};
pub use tiered::tiered_cost;

// Configuration lives in core_config so binaries can load it from the environment
pub use core_config::pricing::{CatalogMode, PricingConfig};
