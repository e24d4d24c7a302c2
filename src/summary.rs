use alloy_primitives::Address;
use serde::Serialize;

/// Transaction count and volume for one calendar month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyActivity {
    /// 1-12.
    pub month: u32,
    pub tx_count: u64,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
}

/// One cell of the full-year heatmap.
#[derive(Debug, Clone, Serialize)]
pub struct DailyActivity {
    pub date: String,
    pub count: u64,
    /// 0-4 intensity bucket.
    pub level: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestDay {
    pub date: String,
    pub tx_count: u64,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    pub symbol: String,
    pub address: Address,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    pub tx_count: u64,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
}

/// End-of-window relationship between the address and a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NftStatus {
    Held,
    Sold,
    Burned,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftStats {
    pub collection_name: String,
    pub collection_address: Address,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    /// Distinct tokens still held.
    pub nft_count: u64,
    /// Every transfer touching the collection, involved or not.
    pub tx_count: u64,
    pub status: NftStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedNfts {
    pub total_nfts: usize,
    pub total_tx_count: usize,
    pub collections: Vec<NftStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiHighlight {
    pub protocol_name: String,
    pub contract_address: Address,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
    pub tx_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftHighlight {
    pub collection_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaScoreBreakdown {
    pub builder_score: u32,
    pub defi_score: u32,
    pub nft_score: u32,
    pub degen_score: u32,
    pub bridger_score: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub label: String,
    pub emoji: String,
    pub description: String,
    pub score_breakdown: PersonaScoreBreakdown,
}

/// The full yearly summary for one address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewindSummary {
    pub address: Address,
    pub year: i32,
    pub total_transactions: usize,
    pub active_days: usize,
    pub longest_streak_days: u32,
    #[serde(rename = "totalVolumeUSD")]
    pub total_volume_usd: f64,
    #[serde(rename = "totalVolumeAVAX")]
    pub total_volume_avax: f64,
    #[serde(rename = "totalGasSpentAVAX")]
    pub total_gas_spent_avax: f64,
    #[serde(rename = "totalGasSpentUSD")]
    pub total_gas_spent_usd: f64,
    pub most_active_months: Vec<MonthlyActivity>,
    pub daily_activity: Vec<DailyActivity>,
    pub tokens: Vec<TokenStats>,
    pub nfts: AggregatedNfts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_tx_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tx_date: Option<String>,
    pub persona: Persona,
    pub defi_highlights: Vec<DefiHighlight>,
    pub nft_highlights: Vec<NftHighlight>,
    pub biggest_day: Option<BiggestDay>,
}
