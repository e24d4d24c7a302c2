use crate::activity::calculate_activity_metrics;
use crate::client::GlacierClient;
use crate::config::Config;
use crate::defi::extract_defi_highlights;
use crate::fetcher::LedgerFetcher;
use crate::models::TransactionRecord;
use crate::nft::aggregate_nft_stats;
use crate::persona::{calculate_persona, extract_score_factors};
use crate::registry::ProtocolRegistry;
use crate::summary::{NftHighlight, RewindSummary};
use crate::tokens::aggregate_token_stats;
use crate::window::TimeWindow;
use alloy_primitives::Address;
use anyhow::Result;
use std::collections::HashMap;
use tracing::info;

const TOP_NFT_HIGHLIGHTS: usize = 3;

/// Sum of native value and gas cost over the stream, both in AVAX.
fn native_totals(transactions: &[TransactionRecord]) -> (f64, f64) {
    let mut volume = 0.0;
    let mut gas = 0.0;
    for tx in transactions {
        volume += tx.value_avax();
        gas += tx.gas_cost_avax();
    }
    (volume, gas)
}

fn contract_interactions(transactions: &[TransactionRecord]) -> HashMap<Address, u64> {
    let mut counts = HashMap::new();
    for tx in transactions {
        if let Some(to) = tx.to {
            *counts.entry(to).or_insert(0) += 1;
        }
    }
    counts
}

/// Fetch a year of activity for the address and aggregate it into the full
/// summary.
///
/// Native transactions and ERC-20 transfers are required; a failure there
/// fails the run. The NFT stream is best-effort and degrades to whatever was
/// collected.
pub async fn build_rewind_summary(
    client: &GlacierClient,
    config: &Config,
    registry: &ProtocolRegistry,
    address: Address,
    year: i32,
) -> Result<RewindSummary> {
    info!("Building rewind for {} ({})", address, year);

    let window = TimeWindow::for_year(year);
    let fetcher = LedgerFetcher::new(client, &config.chain_id);
    let address_str = address.to_string();

    let (transactions, erc20_transfers, nft_transfers) = tokio::join!(
        fetcher.fetch_transactions(&address_str, &window),
        fetcher.fetch_erc20_transfers(&address_str, &window),
        fetcher.fetch_nft_transfers(&address_str, &window),
    );
    let transactions = transactions?;
    let erc20_transfers = erc20_transfers?;

    let activity = calculate_activity_metrics(&transactions, &window, config.avax_usd_price);
    let tokens = aggregate_token_stats(&erc20_transfers);
    let nfts = aggregate_nft_stats(client.http(), &nft_transfers, address).await;
    let defi_highlights = extract_defi_highlights(&transactions, registry, config.avax_usd_price);

    let (total_volume_avax, total_gas_avax) = native_totals(&transactions);

    let interactions = contract_interactions(&transactions);
    let factors = extract_score_factors(
        transactions.len() as u64,
        activity.active_days,
        activity.longest_streak_days,
        &interactions,
        registry,
        &nfts,
        &defi_highlights,
    );
    let persona = calculate_persona(&factors);

    let nft_highlights: Vec<NftHighlight> = nfts
        .collections
        .iter()
        .take(TOP_NFT_HIGHLIGHTS)
        .map(|c| NftHighlight {
            collection_name: c.collection_name.clone(),
        })
        .collect();

    let summary = RewindSummary {
        address,
        year,
        total_transactions: transactions.len(),
        active_days: activity.active_days,
        longest_streak_days: activity.longest_streak_days,
        total_volume_usd: total_volume_avax * config.avax_usd_price,
        total_volume_avax,
        total_gas_spent_avax: total_gas_avax,
        total_gas_spent_usd: total_gas_avax * config.avax_usd_price,
        most_active_months: activity.most_active_months,
        daily_activity: activity.daily_activity,
        tokens,
        nfts,
        first_tx_date: activity.first_tx_date,
        last_tx_date: activity.last_tx_date,
        persona,
        defi_highlights,
        nft_highlights,
        biggest_day: activity.biggest_day,
    };

    info!(
        "Rewind complete: {} transactions, {} active days",
        summary.total_transactions, summary.active_days
    );
    Ok(summary)
}
