use crate::models::NftTransferRecord;
use crate::summary::{AggregatedNfts, NftStats, NftStatus};
use alloy_primitives::Address;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;
use tracing::{info, warn};

const TOP_COLLECTIONS: usize = 10;
const METADATA_FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Destinations that count as deliberate burns rather than sales.
const BURN_ADDRESSES: [Address; 2] = [
    Address::ZERO,
    Address::new([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xde, 0xad,
    ]),
];

const IMAGE_EXTENSIONS: [&str; 8] = [
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".mp4", ".webm",
];

/// Rewrite ipfs:// URIs (and private-gateway /ipfs/ paths) to a public
/// gateway.
pub fn resolve_ipfs_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if let Some(hash) = url.strip_prefix("ipfs://") {
        return Some(format!("https://ipfs.io/ipfs/{hash}"));
    }
    if !url.contains("ipfs.io") {
        if let Some(idx) = url.find("/ipfs/") {
            let hash = &url[idx + "/ipfs/".len()..];
            return Some(format!("https://ipfs.io/ipfs/{hash}"));
        }
    }
    Some(url.to_string())
}

fn looks_like_image_uri(uri: &str) -> bool {
    let lowered = uri.to_lowercase();
    lowered.starts_with("ipfs://")
        || lowered.contains("/ipfs/")
        || IMAGE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

#[derive(Debug, Default, Clone, Copy)]
struct CollectionHistory {
    received: u64,
    sent: u64,
    burned: u64,
}

/// Reconciliation output before image resolution.
struct ReconcileOutcome {
    collections: Vec<NftStats>,
    /// One unresolved metadata URI per collection lacking an image.
    missing_images: Vec<(Address, String)>,
    total_nfts: usize,
    total_tx_count: usize,
}

/// Replay the transfer history against the subject address.
///
/// Balances are assumed zero at window start; this measures in-window net
/// change only. A transfer out of the subject increments `burned` when the
/// destination is a burn sentinel, `sent` otherwise.
fn reconcile(transfers: &[NftTransferRecord], user: Address) -> ReconcileOutcome {
    let mut by_collection: HashMap<Address, NftStats> = HashMap::new();
    let mut collection_order: Vec<Address> = Vec::new();
    let mut history: HashMap<Address, CollectionHistory> = HashMap::new();
    // (collection, token id) -> balance; its key count is the distinct-token
    // total even when the net balance returns to zero.
    let mut ownership: HashMap<(Address, String), u64> = HashMap::new();
    let mut missing_images: HashMap<Address, String> = HashMap::new();

    for transfer in transfers {
        let entry = history.entry(transfer.collection).or_default();
        let nft_key = (transfer.collection, transfer.token_id.clone());

        if transfer.to == Some(user) {
            entry.received += transfer.quantity;
            let balance = ownership.entry(nft_key).or_insert(0);
            *balance += transfer.quantity;
        } else if transfer.from == Some(user) {
            let balance = ownership.entry(nft_key).or_insert(0);
            *balance = balance.saturating_sub(transfer.quantity);

            let is_burn = transfer
                .to
                .map(|to| BURN_ADDRESSES.contains(&to))
                .unwrap_or(false);
            if is_burn {
                entry.burned += transfer.quantity;
            } else {
                entry.sent += transfer.quantity;
            }
        }

        // Prefer inline metadata, then a token URI that itself looks like an
        // image. A token URI that is probably a JSON document is queued for
        // the fetch phase instead.
        let candidate = transfer.image_uri.clone().or_else(|| {
            transfer
                .token_uri
                .as_ref()
                .filter(|uri| looks_like_image_uri(uri))
                .cloned()
        });
        let resolved = candidate.as_deref().and_then(resolve_ipfs_url);

        let stats = match by_collection.entry(transfer.collection) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                collection_order.push(transfer.collection);
                entry.insert(NftStats {
                    collection_name: transfer.collection_name.clone(),
                    collection_address: transfer.collection,
                    logo_uri: resolved.clone(),
                    nft_count: 0,
                    tx_count: 0,
                    status: NftStatus::Held,
                })
            }
        };

        if stats.logo_uri.is_none() {
            if let Some(resolved) = resolved {
                stats.logo_uri = Some(resolved);
            } else if let Some(token_uri) = &transfer.token_uri {
                // At most one queued URI per collection.
                missing_images
                    .entry(transfer.collection)
                    .or_insert_with(|| token_uri.clone());
            }
        }
        stats.tx_count += 1;
    }

    for (collection, stats) in &mut by_collection {
        let Some(history) = history.get(collection) else {
            continue;
        };
        let net = history
            .received
            .saturating_sub(history.sent + history.burned);
        stats.nft_count = net;
        stats.status = if net > 0 {
            NftStatus::Held
        } else if history.burned > 0 {
            NftStatus::Burned
        } else {
            NftStatus::Sold
        };
    }

    let mut collections: Vec<NftStats> = collection_order
        .iter()
        .map(|addr| by_collection[addr].clone())
        .collect();
    collections.sort_by(|a, b| b.tx_count.cmp(&a.tx_count));
    collections.truncate(TOP_COLLECTIONS);

    ReconcileOutcome {
        collections,
        missing_images: missing_images.into_iter().collect(),
        total_nfts: ownership.len(),
        total_tx_count: transfers.len(),
    }
}

/// Best-effort fetch of a metadata document, returning its image URL.
async fn fetch_collection_image(http: &reqwest::Client, uri: &str) -> Option<String> {
    let url = resolve_ipfs_url(uri)?;
    info!("Fetching missing collection metadata: {}", url);

    let response = match http
        .get(&url)
        .timeout(METADATA_FETCH_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("Metadata fetch failed for {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        return None;
    }
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return None;
    }

    let document: Value = match response.json().await {
        Ok(document) => document,
        Err(e) => {
            warn!("Malformed metadata document at {}: {}", url, e);
            return None;
        }
    };

    ["image", "image_url", "imageUrl"]
        .iter()
        .find_map(|field| document.get(field).and_then(Value::as_str))
        .and_then(resolve_ipfs_url)
}

/// Reconcile NFT ownership and resolve missing collection images.
///
/// Image fetches run concurrently, each with its own short timeout, and
/// produce isolated results that are merged afterward; failures leave the
/// collection without an image and never fail the pipeline.
pub async fn aggregate_nft_stats(
    http: &reqwest::Client,
    transfers: &[NftTransferRecord],
    user: Address,
) -> AggregatedNfts {
    let mut outcome = reconcile(transfers, user);

    if !outcome.missing_images.is_empty() {
        let fetches = outcome.missing_images.iter().map(|(collection, uri)| {
            let collection = *collection;
            async move { (collection, fetch_collection_image(http, uri).await) }
        });
        let resolved: Vec<(Address, Option<String>)> = join_all(fetches).await;

        let images: HashMap<Address, String> = resolved
            .into_iter()
            .filter_map(|(collection, image)| image.map(|image| (collection, image)))
            .collect();
        for stats in &mut outcome.collections {
            if stats.logo_uri.is_none() {
                stats.logo_uri = images.get(&stats.collection_address).cloned();
            }
        }
    }

    AggregatedNfts {
        total_nfts: outcome.total_nfts,
        total_tx_count: outcome.total_tx_count,
        collections: outcome.collections,
    }
}
