//! Configuration for the price resolver

use core_config::pricing::{CatalogMode, PricingConfig};
use core_config::{Environment, FromEnv};
use eyre::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub pricing: PricingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            environment: Environment::from_env(),
            pricing: PricingConfig::from_env()?,
        })
    }

    /// Command-line flags take precedence over the environment
    pub fn with_overrides(mut self, catalog_dir: Option<PathBuf>, mode: Option<CatalogMode>) -> Self {
        if let Some(dir) = catalog_dir {
            self.pricing.catalog_dir = dir;
        }
        if let Some(mode) = mode {
            self.pricing.mode = mode;
        }
        self
    }
}
