use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Registry shipped with the crate; used when no override path is configured.
const BUNDLED_REGISTRY: &str = include_str!("../data/registry.json");

/// Known protocol and bridge contract addresses, loaded as data so the sets
/// can be updated without a rebuild.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolRegistry {
    /// Contract address -> display name, used for DeFi highlights.
    pub defi_protocols: HashMap<Address, String>,
    /// Contracts counted as DeFi interactions for scoring.
    pub defi_contracts: HashSet<Address>,
    /// Contracts counted as bridge interactions for scoring.
    pub bridge_contracts: HashSet<Address>,
}

impl ProtocolRegistry {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse protocol registry JSON")
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_REGISTRY)
    }

    /// Load the registry from an optional override path, falling back to the
    /// bundled copy.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                info!("Loading protocol registry from {}", path);
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read protocol registry: {path}"))?;
                Self::from_json(&json)
            }
            None => Self::bundled(),
        }
    }

    pub fn protocol_name(&self, address: &Address) -> Option<&str> {
        self.defi_protocols.get(address).map(String::as_str)
    }

    pub fn is_defi(&self, address: &Address) -> bool {
        self.defi_contracts.contains(address)
    }

    pub fn is_bridge(&self, address: &Address) -> bool {
        self.bridge_contracts.contains(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_bundled_registry_loads() {
        let registry = ProtocolRegistry::bundled().unwrap();
        assert!(!registry.defi_protocols.is_empty());
        assert!(!registry.defi_contracts.is_empty());
        assert!(!registry.bridge_contracts.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ProtocolRegistry::bundled().unwrap();
        // Stored mixed-case in the JSON, queried lowercase.
        let joe_v21 = Address::from_str("0x18556da13313f3532c54711497a8fedac273220e").unwrap();
        assert_eq!(registry.protocol_name(&joe_v21), Some("Trader Joe v2.1"));
        assert!(registry.is_defi(&joe_v21));
    }

    #[test]
    fn test_bridge_membership() {
        let registry = ProtocolRegistry::bundled().unwrap();
        let ab = Address::from_str("0x8eb8a3b98659cce290402893d0123abb75e3ab28").unwrap();
        assert!(registry.is_bridge(&ab));
        assert!(!registry.is_defi(&ab));
    }

    #[test]
    fn test_from_json_custom_document() {
        let json = r#"{
            "defiProtocols": {"0x60ae616a2155ee3d9a68541ba4544862310933d4": "Trader Joe"},
            "defiContracts": ["0x60ae616a2155ee3d9a68541ba4544862310933d4"],
            "bridgeContracts": []
        }"#;
        let registry = ProtocolRegistry::from_json(json).unwrap();
        assert_eq!(registry.defi_protocols.len(), 1);
        assert!(registry.bridge_contracts.is_empty());
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(ProtocolRegistry::from_json("{").is_err());
        assert!(ProtocolRegistry::from_json(r#"{"defiProtocols": {}}"#).is_err());
    }
}
