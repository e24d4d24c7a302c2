use alloy_primitives::{Address, U256, utils::format_units};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tracing::warn;

/// A native C-Chain transaction scoped to the subject address.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: U256,
    pub gas_used: U256,
    pub gas_price: U256,
}

impl TransactionRecord {
    pub fn value_avax(&self) -> f64 {
        wei_to_native(self.value)
    }

    pub fn gas_cost_avax(&self) -> f64 {
        wei_to_native(self.gas_used.saturating_mul(self.gas_price))
    }
}

/// A fungible (ERC-20) transfer touching the subject address.
#[derive(Debug, Clone)]
pub struct Erc20TransferRecord {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub token: Address,
    pub symbol: String,
    pub decimals: Option<u8>,
    pub logo_uri: Option<String>,
    pub price_usd: Option<f64>,
    pub value: U256,
}

/// A non-fungible (ERC-721/1155) transfer touching the subject address.
#[derive(Debug, Clone)]
pub struct NftTransferRecord {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub collection: Address,
    pub collection_name: String,
    pub token_id: String,
    /// ERC-1155 transfer quantity; 1 for ERC-721 and for absent or invalid
    /// amounts.
    pub quantity: u64,
    pub token_uri: Option<String>,
    pub image_uri: Option<String>,
}

/// Convert a wei quantity to a whole-unit f64 (18 decimals).
pub fn wei_to_native(value: U256) -> f64 {
    units_to_f64(value, 18)
}

/// Convert a raw token amount to a whole-unit f64 at the given decimals.
pub fn units_to_f64(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

/// Parse a decimal (or 0x-hex) integer string into a U256, falling back to
/// zero on malformed input.
pub fn parse_u256(raw: &str) -> U256 {
    match U256::from_str(raw) {
        Ok(value) => value,
        Err(_) => {
            warn!("Invalid integer value: {}", raw);
            U256::ZERO
        }
    }
}

/// Parse a 0x-prefixed address, tolerating malformed input as absent.
pub fn parse_address(raw: &str) -> Option<Address> {
    Address::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_to_native() {
        let one_avax = U256::from(10).pow(U256::from(18));
        assert_eq!(wei_to_native(one_avax), 1.0);
        assert_eq!(wei_to_native(U256::ZERO), 0.0);
        let half = one_avax / U256::from(2);
        assert_eq!(wei_to_native(half), 0.5);
    }

    #[test]
    fn test_units_to_f64_respects_decimals() {
        assert_eq!(units_to_f64(U256::from(1_500_000u64), 6), 1.5);
    }

    #[test]
    fn test_parse_u256_decimal_and_fallback() {
        assert_eq!(parse_u256("1000"), U256::from(1000u64));
        assert_eq!(parse_u256("not a number"), U256::ZERO);
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0x60ae616a2155ee3d9a68541ba4544862310933d4").is_some());
        assert!(parse_address("0xzz").is_none());
        assert!(parse_address("").is_none());
    }

    #[test]
    fn test_gas_cost() {
        let tx = TransactionRecord {
            hash: "0xabc".to_string(),
            timestamp: chrono::Utc::now(),
            from: None,
            to: None,
            value: U256::ZERO,
            gas_used: U256::from(21_000u64),
            gas_price: U256::from(25_000_000_000u64), // 25 nAVAX
        };
        let cost = tx.gas_cost_avax();
        assert!((cost - 0.000525).abs() < 1e-12);
    }
}
