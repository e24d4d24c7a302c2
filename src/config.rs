use anyhow::{Context, Result};

const DEFAULT_API_BASE: &str = "https://glacier-api.avax.network";
const DEFAULT_CHAIN_ID: &str = "43114"; // Avalanche C-Chain
const DEFAULT_AVAX_USD_PRICE: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: String,
    pub chain_id: String,
    /// Fixed AVAX/USD conversion rate applied to every native-value conversion.
    pub avax_usd_price: f64,
    /// Optional path to a protocol/bridge registry JSON file. When unset the
    /// bundled registry is used.
    pub registry_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_key =
            std::env::var("GLACIER_API_KEY").context("GLACIER_API_KEY must be set in .env")?;

        let api_base_url = std::env::var("GLACIER_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let chain_id =
            std::env::var("AVALANCHE_CHAIN_ID").unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string());

        let avax_usd_price = match std::env::var("AVAX_USD_PRICE") {
            Ok(raw) => raw
                .parse()
                .context("Invalid AVAX_USD_PRICE format, expected a number")?,
            Err(_) => DEFAULT_AVAX_USD_PRICE,
        };

        let registry_path = std::env::var("PROTOCOL_REGISTRY_PATH").ok();

        Ok(Config {
            api_base_url,
            api_key,
            chain_id,
            avax_usd_price,
            registry_path,
        })
    }
}
