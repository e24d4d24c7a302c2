use alloy_primitives::Address;
use anyhow::{Context, Result};
use avax_rewind::client::GlacierClient;
use avax_rewind::config::Config;
use avax_rewind::formatters::{OutputFormat, format_summary};
use avax_rewind::registry::ProtocolRegistry;
use avax_rewind::rewind::build_rewind_summary;
use chrono::{Datelike, Utc};
use clap::Parser;
use std::str::FromStr;
use tracing::info;

#[derive(Parser)]
#[command(name = "rewind")]
#[command(about = "Yearly on-chain activity summary for an Avalanche address", long_about = None)]
struct Cli {
    /// C-Chain address to analyze.
    address: String,

    /// Calendar year to cover; defaults to the current year.
    #[arg(short, long)]
    year: Option<i32>,

    #[arg(short, long, default_value = "table")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format.as_str());
    let address = Address::from_str(&cli.address).context("Invalid address format")?;
    let year = cli.year.unwrap_or_else(|| Utc::now().year());

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let client = GlacierClient::new(&config.api_base_url, &config.api_key)?;
    let registry = ProtocolRegistry::load(config.registry_path.as_deref())?;

    let summary = build_rewind_summary(&client, &config, &registry, address, year).await?;

    println!("{}", format_summary(&summary, &format));

    Ok(())
}
