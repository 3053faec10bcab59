use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::path::PathBuf;
use std::time::Duration;
use strum::{Display, EnumString};

/// How strictly the pricing engine validates its catalogs.
///
/// `Complete` deployments ship every catalog and treat an empty mandatory
/// index as corruption. `Fallback` deployments (regions without an embedded
/// snapshot) accept empty indices and resolve what they can.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CatalogMode {
    #[default]
    Complete,
    Fallback,
}

impl CatalogMode {
    pub fn is_fallback(&self) -> bool {
        matches!(self, CatalogMode::Fallback)
    }
}

/// Pricing catalog configuration
#[derive(Clone, Debug)]
pub struct PricingConfig {
    /// Directory holding one offer file per service
    pub catalog_dir: PathBuf,
    pub mode: CatalogMode,
    /// Lookups slower than this are logged as warnings
    pub slow_lookup_threshold: Duration,
}

impl PricingConfig {
    pub const DEFAULT_SLOW_LOOKUP_MS: u64 = 50;

    pub fn new(catalog_dir: impl Into<PathBuf>, mode: CatalogMode) -> Self {
        Self {
            catalog_dir: catalog_dir.into(),
            mode,
            slow_lookup_threshold: Duration::from_millis(Self::DEFAULT_SLOW_LOOKUP_MS),
        }
    }
}

impl FromEnv for PricingConfig {
    /// Reads:
    /// - PRICING_CATALOG_DIR: defaults to `./pricing`
    /// - PRICING_CATALOG_MODE: `complete` (default) or `fallback`
    /// - PRICING_SLOW_LOOKUP_MS: defaults to 50
    fn from_env() -> Result<Self, ConfigError> {
        let catalog_dir = PathBuf::from(env_or_default("PRICING_CATALOG_DIR", "./pricing"));
        let mode = env_parse("PRICING_CATALOG_MODE", CatalogMode::Complete)?;
        let slow_ms = env_parse("PRICING_SLOW_LOOKUP_MS", Self::DEFAULT_SLOW_LOOKUP_MS)?;

        Ok(Self {
            catalog_dir,
            mode,
            slow_lookup_threshold: Duration::from_millis(slow_ms),
        })
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::new("./pricing", CatalogMode::Complete)
    }
}
