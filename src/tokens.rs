use crate::models::{Erc20TransferRecord, units_to_f64};
use crate::summary::TokenStats;
use alloy_primitives::Address;
use std::collections::HashMap;

const TOP_TOKENS: usize = 10;

/// Group ERC-20 transfers by token contract and rank by USD volume.
///
/// Volume per transfer is `amount / 10^decimals * unit price`, with a unit
/// price of 1 when none is known and 18 decimals when the payload omits them
/// (or reports 0, which the upstream API uses the same way).
pub fn aggregate_token_stats(transfers: &[Erc20TransferRecord]) -> Vec<TokenStats> {
    let mut by_token: HashMap<Address, TokenStats> = HashMap::new();

    for transfer in transfers {
        let decimals = transfer.decimals.filter(|d| *d != 0).unwrap_or(18);
        let price = transfer.price_usd.filter(|p| *p != 0.0).unwrap_or(1.0);
        let amount = units_to_f64(transfer.value, decimals);

        let stats = by_token.entry(transfer.token).or_insert_with(|| TokenStats {
            symbol: transfer.symbol.clone(),
            address: transfer.token,
            logo_uri: transfer.logo_uri.clone(),
            tx_count: 0,
            volume_usd: 0.0,
        });
        stats.tx_count += 1;
        stats.volume_usd += amount * price;
    }

    let mut ranked: Vec<TokenStats> = by_token.into_values().collect();
    ranked.sort_by(|a, b| {
        b.volume_usd
            .partial_cmp(&a.volume_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(TOP_TOKENS);
    ranked
}
