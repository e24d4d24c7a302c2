use crate::models::TransactionRecord;
use crate::registry::ProtocolRegistry;
use crate::summary::DefiHighlight;
use alloy_primitives::Address;
use std::collections::HashMap;

const TOP_PROTOCOLS: usize = 5;

/// Match native transactions against the known-protocol table and rank the
/// protocols by interaction count.
pub fn extract_defi_highlights(
    transactions: &[TransactionRecord],
    registry: &ProtocolRegistry,
    avax_usd_price: f64,
) -> Vec<DefiHighlight> {
    let mut by_protocol: HashMap<Address, DefiHighlight> = HashMap::new();

    for tx in transactions {
        let Some(to) = tx.to else { continue };
        let Some(name) = registry.protocol_name(&to) else {
            continue;
        };

        let highlight = by_protocol.entry(to).or_insert_with(|| DefiHighlight {
            protocol_name: name.to_string(),
            contract_address: to,
            volume_usd: 0.0,
            tx_count: 0,
        });
        highlight.tx_count += 1;
        highlight.volume_usd += tx.value_avax() * avax_usd_price;
    }

    let mut ranked: Vec<DefiHighlight> = by_protocol.into_values().collect();
    ranked.sort_by(|a, b| b.tx_count.cmp(&a.tx_count));
    ranked.truncate(TOP_PROTOCOLS);
    ranked
}
