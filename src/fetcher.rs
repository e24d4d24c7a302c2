use crate::client::GlacierClient;
use crate::models::{
    Erc20TransferRecord, NftTransferRecord, TransactionRecord, parse_address, parse_u256,
};
use crate::window::{self, TimeWindow};
use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

const PAGE_SIZE: usize = 100;

// Hard safety caps per stream; exceeding one truncates without failing.
const MAX_TRANSACTIONS: usize = 10_000;
const MAX_ERC20_TRANSFERS: usize = 5_000;
const MAX_NFT_TRANSFERS: usize = 2_000;

/// Paginated Glacier response. The record array appears under a different key
/// per endpoint (and has varied historically), so every known key is modeled
/// here and resolved in [`PageEnvelope::into_items`]. Nothing downstream of
/// this module sees the raw shapes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope {
    transactions: Option<Vec<Value>>,
    transfers: Option<Vec<Value>>,
    erc20_transfers: Option<Vec<Value>>,
    erc721_transfers: Option<Vec<Value>>,
    erc1155_transfers: Option<Vec<Value>>,
    native_transactions: Option<Vec<Value>>,
    next_page_token: Option<String>,
}

impl PageEnvelope {
    fn into_items(self) -> (Vec<Value>, Option<String>) {
        let items = self
            .transactions
            .or(self.transfers)
            .or(self.erc20_transfers)
            .or(self.erc721_transfers)
            .or(self.erc1155_transfers)
            .or(self.native_transactions)
            .unwrap_or_default();
        (items, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
struct AddressField {
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    tx_hash: String,
    block_timestamp: Value,
    from: Option<AddressField>,
    to: Option<AddressField>,
    value: Option<String>,
    gas_used: Option<String>,
    gas_price: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenPrice {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawErc20Token {
    address: String,
    symbol: Option<String>,
    decimals: Option<u8>,
    logo_uri: Option<String>,
    price: Option<RawTokenPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawErc20Transfer {
    tx_hash: String,
    block_timestamp: Value,
    from: Option<AddressField>,
    to: Option<AddressField>,
    erc20_token: RawErc20Token,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNftMetadata {
    image_uri: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawErc721Token {
    address: String,
    name: Option<String>,
    token_id: String,
    token_uri: Option<String>,
    metadata: Option<RawNftMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawErc1155Token {
    address: String,
    name: Option<String>,
    token_id: String,
    token_uri: Option<String>,
    metadata: Option<RawNftMetadata>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNftTransfer {
    tx_hash: String,
    block_timestamp: Value,
    from: Option<AddressField>,
    to: Option<AddressField>,
    erc721_token: Option<RawErc721Token>,
    erc1155_token: Option<RawErc1155Token>,
}

fn decode_transaction(item: &Value) -> Option<TransactionRecord> {
    // Some envelope variants wrap each item in a nativeTransaction object.
    let inner = item.get("nativeTransaction").unwrap_or(item);

    let raw: RawTransaction = match serde_json::from_value(inner.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping undecodable transaction item: {}", e);
            return None;
        }
    };

    Some(TransactionRecord {
        timestamp: window::parse_timestamp(&raw.block_timestamp),
        hash: raw.tx_hash,
        from: raw.from.and_then(|f| parse_address(&f.address)),
        to: raw.to.and_then(|t| parse_address(&t.address)),
        value: parse_u256(raw.value.as_deref().unwrap_or("0")),
        gas_used: parse_u256(raw.gas_used.as_deref().unwrap_or("0")),
        gas_price: parse_u256(raw.gas_price.as_deref().unwrap_or("0")),
    })
}

fn decode_erc20_transfer(item: &Value) -> Option<Erc20TransferRecord> {
    let raw: RawErc20Transfer = match serde_json::from_value(item.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping undecodable ERC-20 transfer item: {}", e);
            return None;
        }
    };

    let token = parse_address(&raw.erc20_token.address)?;

    Some(Erc20TransferRecord {
        timestamp: window::parse_timestamp(&raw.block_timestamp),
        hash: raw.tx_hash,
        from: raw.from.and_then(|f| parse_address(&f.address)),
        to: raw.to.and_then(|t| parse_address(&t.address)),
        token,
        symbol: raw
            .erc20_token
            .symbol
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        decimals: raw.erc20_token.decimals,
        logo_uri: raw.erc20_token.logo_uri,
        price_usd: raw.erc20_token.price.map(|p| p.value),
        value: parse_u256(raw.value.as_deref().unwrap_or("0")),
    })
}

fn decode_nft_transfer(item: &Value) -> Option<NftTransferRecord> {
    let raw: RawNftTransfer = match serde_json::from_value(item.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping undecodable NFT transfer item: {}", e);
            return None;
        }
    };

    let timestamp = window::parse_timestamp(&raw.block_timestamp);
    let from = raw.from.and_then(|f| parse_address(&f.address));
    let to = raw.to.and_then(|t| parse_address(&t.address));

    if let Some(token) = raw.erc721_token {
        let collection = parse_address(&token.address)?;
        return Some(NftTransferRecord {
            hash: raw.tx_hash,
            timestamp,
            from,
            to,
            collection,
            collection_name: token
                .name
                .unwrap_or_else(|| "Unknown Collection".to_string()),
            token_id: token.token_id,
            quantity: 1,
            token_uri: token.token_uri,
            image_uri: token
                .metadata
                .and_then(|m| m.image_uri.or(m.image)),
        });
    }

    if let Some(token) = raw.erc1155_token {
        let collection = parse_address(&token.address)?;
        let quantity = token
            .value
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|q| *q > 0)
            .unwrap_or(1);
        return Some(NftTransferRecord {
            hash: raw.tx_hash,
            timestamp,
            from,
            to,
            collection,
            collection_name: token
                .name
                .unwrap_or_else(|| "Unknown Collection".to_string()),
            token_id: token.token_id,
            quantity,
            token_uri: token.token_uri,
            image_uri: token
                .metadata
                .and_then(|m| m.image_uri.or(m.image)),
        });
    }

    None
}

/// Retrieves the three record streams for one address, bounded by the window.
pub struct LedgerFetcher<'a> {
    client: &'a GlacierClient,
    chain_id: &'a str,
}

impl<'a> LedgerFetcher<'a> {
    pub fn new(client: &'a GlacierClient, chain_id: &'a str) -> Self {
        LedgerFetcher { client, chain_id }
    }

    fn page_query(&self, window: &TimeWindow, page_token: Option<&str>) -> Vec<(String, String)> {
        let mut query = vec![
            (
                "startTimestamp".to_string(),
                window.start_timestamp().to_string(),
            ),
            (
                "endTimestamp".to_string(),
                window.end_timestamp().to_string(),
            ),
            ("pageSize".to_string(), PAGE_SIZE.to_string()),
            ("sortOrder".to_string(), "asc".to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken".to_string(), token.to_string()));
        }
        query
    }

    async fn fetch_paginated<T, F>(
        &self,
        path: &str,
        window: &TimeWindow,
        cap: usize,
        decode: F,
    ) -> Result<Vec<T>>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let query = self.page_query(window, page_token.as_deref());
            let envelope: PageEnvelope = self.client.get_json(path, &query).await?;
            let (items, next_token) = envelope.into_items();

            for item in &items {
                if let Some(record) = decode(item) {
                    records.push(record);
                }
            }

            page_token = next_token;
            if page_token.is_none() || records.len() >= cap {
                break;
            }
        }

        Ok(records)
    }

    /// Fetch native transactions for the address within the window. Required
    /// stream: transport failures propagate.
    pub async fn fetch_transactions(
        &self,
        address: &str,
        window: &TimeWindow,
    ) -> Result<Vec<TransactionRecord>> {
        let path = format!(
            "/v1/chains/{}/addresses/{}/transactions",
            self.chain_id, address
        );
        // The window filter also runs here in case provider-side bounding is
        // imprecise; it drops epoch-zero sentinels as a side effect.
        let records = self
            .fetch_paginated(&path, window, MAX_TRANSACTIONS, |item| {
                decode_transaction(item).filter(|r| window.contains(r.timestamp))
            })
            .await?;
        info!(
            "Found {} transactions for {} ({} only)",
            records.len(),
            address,
            window.year
        );
        Ok(records)
    }

    /// Fetch ERC-20 transfers for the address within the window. Required
    /// stream: transport failures propagate.
    pub async fn fetch_erc20_transfers(
        &self,
        address: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Erc20TransferRecord>> {
        let path = format!(
            "/v1/chains/{}/addresses/{}/transactions:listErc20",
            self.chain_id, address
        );
        let records = self
            .fetch_paginated(&path, window, MAX_ERC20_TRANSFERS, |item| {
                decode_erc20_transfer(item).filter(|r| window.contains(r.timestamp))
            })
            .await?;
        info!(
            "Found {} ERC-20 transfers for {} ({} only)",
            records.len(),
            address,
            window.year
        );
        Ok(records)
    }

    /// Fetch NFT transfers for the address within the window. Optional
    /// stream: any failure degrades to the records collected so far.
    pub async fn fetch_nft_transfers(
        &self,
        address: &str,
        window: &TimeWindow,
    ) -> Vec<NftTransferRecord> {
        let path = format!(
            "/v1/chains/{}/addresses/{}/transactions:listErc721",
            self.chain_id, address
        );

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let query = self.page_query(window, page_token.as_deref());
            let envelope: PageEnvelope = match self.client.get_json(&path, &query).await {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!("NFT transfers endpoint not available: {}", e);
                    break;
                }
            };
            let (items, next_token) = envelope.into_items();

            for item in &items {
                if let Some(record) =
                    decode_nft_transfer(item).filter(|r| window.contains(r.timestamp))
                {
                    records.push(record);
                }
            }

            page_token = next_token;
            if page_token.is_none() || records.len() >= MAX_NFT_TRANSFERS {
                break;
            }
        }

        info!(
            "Found {} NFT transfers for {} ({} only)",
            records.len(),
            address,
            window.year
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_extracts_first_present_key() {
        let envelope: PageEnvelope = serde_json::from_value(json!({
            "erc20Transfers": [{"a": 1}],
            "nextPageToken": "abc"
        }))
        .unwrap();
        let (items, token) = envelope.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_envelope_without_records_is_empty() {
        let envelope: PageEnvelope = serde_json::from_value(json!({})).unwrap();
        let (items, token) = envelope.into_items();
        assert!(items.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn test_decode_transaction_direct_shape() {
        let item = json!({
            "txHash": "0xaaa",
            "blockTimestamp": 1735689600,
            "from": {"address": "0x60ae616a2155ee3d9a68541ba4544862310933d4"},
            "to": {"address": "0x794a61358d6845594f94dc1db02a252b5b4814ad"},
            "value": "1000000000000000000",
            "gasUsed": "21000",
            "gasPrice": "25000000000"
        });
        let record = decode_transaction(&item).unwrap();
        assert_eq!(record.hash, "0xaaa");
        assert_eq!(record.timestamp.timestamp(), 1735689600);
        assert!(record.to.is_some());
        assert_eq!(record.value_avax(), 1.0);
    }

    #[test]
    fn test_decode_transaction_wrapped_shape() {
        let item = json!({
            "nativeTransaction": {
                "txHash": "0xbbb",
                "blockTimestamp": "2025-03-01T00:00:00Z",
                "from": {"address": "0x60ae616a2155ee3d9a68541ba4544862310933d4"},
                "value": "0"
            }
        });
        let record = decode_transaction(&item).unwrap();
        assert_eq!(record.hash, "0xbbb");
        assert!(record.to.is_none());
    }

    #[test]
    fn test_decode_transaction_rejects_garbage() {
        assert!(decode_transaction(&json!({"unexpected": true})).is_none());
    }

    #[test]
    fn test_decode_erc20_transfer() {
        let item = json!({
            "txHash": "0xccc",
            "blockTimestamp": 1735689600,
            "from": {"address": "0x60ae616a2155ee3d9a68541ba4544862310933d4"},
            "to": {"address": "0x794a61358d6845594f94dc1db02a252b5b4814ad"},
            "erc20Token": {
                "address": "0xb97ef9ef8734c71904d8002f8b6bc66dd9c48a6e",
                "symbol": "USDC",
                "decimals": 6,
                "price": {"value": 1.0}
            },
            "value": "2500000"
        });
        let record = decode_erc20_transfer(&item).unwrap();
        assert_eq!(record.symbol, "USDC");
        assert_eq!(record.decimals, Some(6));
        assert_eq!(record.price_usd, Some(1.0));
    }

    #[test]
    fn test_decode_nft_transfer_erc721_defaults_quantity() {
        let item = json!({
            "txHash": "0xddd",
            "blockTimestamp": 1735689600,
            "from": {"address": "0x60ae616a2155ee3d9a68541ba4544862310933d4"},
            "to": {"address": "0x794a61358d6845594f94dc1db02a252b5b4814ad"},
            "erc721Token": {
                "address": "0x152b9d0fdc40c096757f570a51e494bd4b943e50",
                "name": "Peaks",
                "tokenId": "42",
                "metadata": {"imageUri": "ipfs://Qm123"}
            }
        });
        let record = decode_nft_transfer(&item).unwrap();
        assert_eq!(record.quantity, 1);
        assert_eq!(record.collection_name, "Peaks");
        assert_eq!(record.image_uri.as_deref(), Some("ipfs://Qm123"));
    }

    #[test]
    fn test_decode_nft_transfer_erc1155_quantity_rules() {
        let base = json!({
            "txHash": "0xeee",
            "blockTimestamp": 1735689600,
            "from": {"address": "0x60ae616a2155ee3d9a68541ba4544862310933d4"},
            "to": {"address": "0x794a61358d6845594f94dc1db02a252b5b4814ad"},
            "erc1155Token": {
                "address": "0x152b9d0fdc40c096757f570a51e494bd4b943e50",
                "tokenId": "7",
                "value": "3"
            }
        });
        assert_eq!(decode_nft_transfer(&base).unwrap().quantity, 3);

        let mut invalid = base.clone();
        invalid["erc1155Token"]["value"] = json!("not-a-number");
        assert_eq!(decode_nft_transfer(&invalid).unwrap().quantity, 1);

        let mut zero = base.clone();
        zero["erc1155Token"]["value"] = json!("0");
        assert_eq!(decode_nft_transfer(&zero).unwrap().quantity, 1);

        let mut absent = base;
        absent["erc1155Token"]
            .as_object_mut()
            .unwrap()
            .remove("value");
        assert_eq!(decode_nft_transfer(&absent).unwrap().quantity, 1);
    }

    #[test]
    fn test_decode_nft_transfer_without_token_payload() {
        let item = json!({
            "txHash": "0xfff",
            "blockTimestamp": 1735689600,
            "from": {"address": "0x60ae616a2155ee3d9a68541ba4544862310933d4"},
            "to": {"address": "0x794a61358d6845594f94dc1db02a252b5b4814ad"}
        });
        assert!(decode_nft_transfer(&item).is_none());
    }
}
