use crate::registry::ProtocolRegistry;
use crate::summary::{AggregatedNfts, DefiHighlight, Persona, PersonaScoreBreakdown};
use alloy_primitives::Address;
use std::collections::HashMap;
use tracing::debug;

/// Behavioral archetypes, ordered by nothing in particular; tie-break
/// priority lives in `determine_persona_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaId {
    SummitBuilder,
    DefiTrailblazer,
    NftPeaksExplorer,
    HighAltitudeDegen,
    CrossChainBridger,
    AvalancheVeteran,
    CasualExplorer,
}

impl PersonaId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::SummitBuilder => "summit-builder",
            PersonaId::DefiTrailblazer => "defi-trailblazer",
            PersonaId::NftPeaksExplorer => "nft-peaks-explorer",
            PersonaId::HighAltitudeDegen => "high-altitude-degen",
            PersonaId::CrossChainBridger => "cross-chain-bridger",
            PersonaId::AvalancheVeteran => "avalanche-veteran",
            PersonaId::CasualExplorer => "casual-explorer",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PersonaId::SummitBuilder => "Summit Builder",
            PersonaId::DefiTrailblazer => "DeFi Trailblazer",
            PersonaId::NftPeaksExplorer => "NFT Peaks Explorer",
            PersonaId::HighAltitudeDegen => "High-Altitude Degen",
            PersonaId::CrossChainBridger => "Cross-Chain Bridger",
            PersonaId::AvalancheVeteran => "Avalanche Veteran",
            PersonaId::CasualExplorer => "Casual Explorer",
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            PersonaId::SummitBuilder => "\u{1f3d7}\u{fe0f}",
            PersonaId::DefiTrailblazer => "\u{1f4c8}",
            PersonaId::NftPeaksExplorer => "\u{1f3a8}",
            PersonaId::HighAltitudeDegen => "\u{1f3b2}",
            PersonaId::CrossChainBridger => "\u{1f309}",
            PersonaId::AvalancheVeteran => "\u{1f3d4}\u{fe0f}",
            PersonaId::CasualExplorer => "\u{1f6b6}",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            PersonaId::SummitBuilder => {
                "You deploy contracts and build on Avalanche. The ecosystem grows thanks to builders like you!"
            }
            PersonaId::DefiTrailblazer => {
                "Swaps, lending, liquidity pools — you navigate DeFi like a seasoned explorer blazing new trails."
            }
            PersonaId::NftPeaksExplorer => {
                "From rare collectibles to digital art, you scale the NFT peaks collecting treasures along the way."
            }
            PersonaId::HighAltitudeDegen => {
                "High activity, fast moves, and no fear! You live for the thrill of on-chain action."
            }
            PersonaId::CrossChainBridger => {
                "Bridges are your highways. You connect worlds and move assets across chains with ease."
            }
            PersonaId::AvalancheVeteran => {
                "A true OG! You've been here since the early days, weathering every storm on the mountain."
            }
            PersonaId::CasualExplorer => {
                "Taking it easy on the slopes. Every journey starts with a single step — keep exploring!"
            }
        }
    }
}

/// Raw behavioral counts the component scores are derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreFactors {
    pub total_tx_count: u64,
    pub defi_tx_count: u64,
    pub nft_tx_count: u64,
    pub bridge_tx_count: u64,
    pub contract_deployments: u64,
    pub unique_contracts: usize,
    pub longest_streak: u32,
    pub active_days: usize,
}

/// Derive score factors from the aggregated data.
///
/// DeFi and bridge counts come from matching interaction targets against the
/// registry tables. When the ranked DeFi highlights account for more
/// transactions than the table matched directly, the larger figure wins;
/// the name table is broader than the scoring table.
pub fn extract_score_factors(
    total_tx_count: u64,
    active_days: usize,
    longest_streak: u32,
    interactions: &HashMap<Address, u64>,
    registry: &ProtocolRegistry,
    nfts: &AggregatedNfts,
    defi_highlights: &[DefiHighlight],
) -> ScoreFactors {
    let mut factors = ScoreFactors {
        total_tx_count,
        active_days,
        longest_streak,
        unique_contracts: interactions.len(),
        ..Default::default()
    };

    for (address, count) in interactions {
        if registry.is_defi(address) {
            factors.defi_tx_count += count;
        }
        if registry.is_bridge(address) {
            factors.bridge_tx_count += count;
        }
    }

    factors.nft_tx_count = nfts.total_tx_count as u64;

    let highlighted: u64 = defi_highlights.iter().map(|h| h.tx_count).sum();
    if highlighted > factors.defi_tx_count {
        debug!(
            "Using highlighted DeFi count ({}) over direct matches ({})",
            highlighted, factors.defi_tx_count
        );
        factors.defi_tx_count = highlighted;
    }

    factors
}

fn clamp_round(score: f64) -> u32 {
    score.min(100.0).round() as u32
}

/// Component scores, each 0-100.
pub fn calculate_score_breakdown(factors: &ScoreFactors) -> PersonaScoreBreakdown {
    let total = factors.total_tx_count as f64;
    let defi = factors.defi_tx_count as f64;
    let nft = factors.nft_tx_count as f64;
    let bridge = factors.bridge_tx_count as f64;

    let tx_volume_points = if total > 500.0 {
        30.0
    } else {
        total / 500.0 * 30.0
    };

    let builder_score = (factors.unique_contracts as f64 / 30.0) * 40.0
        + tx_volume_points
        + factors.contract_deployments as f64 * 10.0;

    let defi_ratio = if total > 0.0 { defi / total } else { 0.0 };
    let defi_points = if defi > 20.0 { 40.0 } else { defi / 20.0 * 40.0 };
    let defi_score = defi_ratio * 60.0 + defi_points;

    let nft_ratio = if total > 0.0 { nft / total } else { 0.0 };
    let nft_points = if nft > 10.0 { 40.0 } else { nft / 10.0 * 40.0 };
    let nft_score = nft_ratio * 60.0 + nft_points;

    let degen_score = (factors.longest_streak as f64 / 30.0) * 40.0
        + (factors.active_days as f64 / 150.0) * 30.0
        + tx_volume_points;

    let any_bridge_points = if bridge > 0.0 { 50.0 } else { 0.0 };
    let heavy_bridge_points = if bridge > 5.0 { 50.0 } else { bridge / 5.0 * 50.0 };
    let bridger_score = any_bridge_points + heavy_bridge_points;

    PersonaScoreBreakdown {
        builder_score: clamp_round(builder_score),
        defi_score: clamp_round(defi_score),
        nft_score: clamp_round(nft_score),
        degen_score: clamp_round(degen_score),
        bridger_score: clamp_round(bridger_score),
    }
}

/// Pick the archetype from the breakdown.
///
/// Ties between dominant scores resolve in the order defi, nft, builder,
/// degen, bridger. A dominant score below 40 never wins outright; a broad
/// moderate profile becomes a veteran instead.
fn determine_persona_id(scores: &PersonaScoreBreakdown) -> PersonaId {
    let max = scores
        .builder_score
        .max(scores.defi_score)
        .max(scores.nft_score)
        .max(scores.degen_score)
        .max(scores.bridger_score);

    if max < 20 {
        return PersonaId::CasualExplorer;
    }

    if scores.defi_score == max && scores.defi_score >= 40 {
        return PersonaId::DefiTrailblazer;
    }
    if scores.nft_score == max && scores.nft_score >= 40 {
        return PersonaId::NftPeaksExplorer;
    }
    if scores.builder_score == max && scores.builder_score >= 40 {
        return PersonaId::SummitBuilder;
    }
    if scores.degen_score == max && scores.degen_score >= 40 {
        return PersonaId::HighAltitudeDegen;
    }
    if scores.bridger_score == max && scores.bridger_score >= 40 {
        return PersonaId::CrossChainBridger;
    }

    let avg = (scores.builder_score
        + scores.defi_score
        + scores.nft_score
        + scores.degen_score
        + scores.bridger_score) as f64
        / 5.0;
    if avg >= 25.0 {
        return PersonaId::AvalancheVeteran;
    }

    PersonaId::CasualExplorer
}

pub fn calculate_persona(factors: &ScoreFactors) -> Persona {
    let score_breakdown = calculate_score_breakdown(factors);
    let id = determine_persona_id(&score_breakdown);
    debug!("Persona {} from {:?}", id.as_str(), score_breakdown);

    Persona {
        id: id.as_str().to_string(),
        label: id.label().to_string(),
        emoji: id.emoji().to_string(),
        description: id.description().to_string(),
        score_breakdown,
    }
}
