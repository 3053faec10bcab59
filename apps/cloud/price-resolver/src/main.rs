//! Price Resolver
//!
//! Resolves AWS on-demand prices from offer-file snapshots on local disk.
//! Catalogs are read once on the first query; nothing is fetched at runtime.

use clap::{Parser, Subcommand};
use core_config::pricing::CatalogMode;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pricing::{PricingEngine, Tier};
use eyre::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "price-resolver")]
#[command(about = "Resolve AWS on-demand prices from local catalog snapshots")]
struct Cli {
    /// Directory holding the offer files (overrides PRICING_CATALOG_DIR)
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,

    /// complete or fallback (overrides PRICING_CATALOG_MODE)
    #[arg(long, global = true)]
    mode: Option<CatalogMode>,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the indices and show engine status
    Status,

    /// EC2 instance hourly rate
    Ec2 {
        instance_type: String,

        #[arg(long, default_value = "linux")]
        os: String,

        #[arg(long, default_value = "shared")]
        tenancy: String,
    },

    /// EBS volume, IOPS, throughput and snapshot rates
    Ebs { volume_type: String },

    /// RDS instance hourly and storage rates
    Rds {
        instance_class: String,

        engine: String,

        #[arg(long, default_value = "gp3")]
        storage: String,
    },

    /// Lambda request, duration and ephemeral storage rates
    Lambda {
        #[arg(long, default_value = "x86_64")]
        arch: String,
    },

    /// Cost of a quantity over a tier table, without catalogs
    Tiered {
        #[arg(short, long, allow_hyphen_values = true)]
        quantity: f64,

        /// Tier as <upper>:<rate>, ascending; use inf for the last band
        #[arg(short, long = "tier", value_parser = commands::parse_tier, required = true)]
        tiers: Vec<Tier>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.catalog_dir, cli.mode);
    init_tracing(&config.environment);

    if cli.metrics {
        observability::init_metrics();
    }

    info!(
        catalog_dir = %config.pricing.catalog_dir.display(),
        mode = %config.pricing.mode,
        "Starting price resolver"
    );
    let engine = PricingEngine::from_config(&config.pricing);

    match cli.command {
        Commands::Status => {
            let report = commands::StatusReport::collect(&engine);
            print_json(&report)?;
        }

        Commands::Ec2 {
            instance_type,
            os,
            tenancy,
        } => print_json(&commands::ec2(&engine, &instance_type, &os, &tenancy))?,

        Commands::Ebs { volume_type } => print_json(&commands::ebs(&engine, &volume_type))?,

        Commands::Rds {
            instance_class,
            engine: db_engine,
            storage,
        } => print_json(&commands::rds(&engine, &instance_class, &db_engine, &storage))?,

        Commands::Lambda { arch } => print_json(&commands::lambda(&engine, &arch))?,

        Commands::Tiered { quantity, tiers } => print_json(&commands::tiered(quantity, tiers))?,
    }

    if let Some(error) = engine.init_error() {
        warn!(error = %error, "Prices unavailable, results are zero");
    }

    if cli.metrics {
        print!("{}", observability::render_metrics());
    }

    Ok(())
}
