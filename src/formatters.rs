use crate::summary::RewindSummary;
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

pub fn format_summary(summary: &RewindSummary, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_summary_tables(summary),
        OutputFormat::Json => {
            serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Csv => format_daily_activity_csv(summary),
    }
}

fn format_summary_tables(summary: &RewindSummary) -> String {
    let mut sections = vec![format_overview_table(summary), format_persona_table(summary)];

    if !summary.tokens.is_empty() {
        sections.push(format_tokens_table(summary));
    }
    if !summary.nfts.collections.is_empty() {
        sections.push(format_collections_table(summary));
    }
    if !summary.defi_highlights.is_empty() {
        sections.push(format_defi_table(summary));
    }

    sections.join("\n\n")
}

fn format_overview_table(summary: &RewindSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Metric", "Value"]);

    table.add_row(vec![
        Cell::new("Address"),
        Cell::new(format!("{:#}", summary.address)),
    ]);
    table.add_row(vec![Cell::new("Year"), Cell::new(summary.year)]);
    table.add_row(vec![
        Cell::new("Total Transactions"),
        Cell::new(summary.total_transactions),
    ]);
    table.add_row(vec![
        Cell::new("Active Days"),
        Cell::new(summary.active_days),
    ]);
    table.add_row(vec![
        Cell::new("Longest Streak"),
        Cell::new(format!("{} day(s)", summary.longest_streak_days)),
    ]);
    table.add_row(vec![
        Cell::new("Volume (AVAX)"),
        Cell::new(format!("{:.4}", summary.total_volume_avax)),
    ]);
    table.add_row(vec![
        Cell::new("Volume (USD)"),
        Cell::new(format!("{:.2}", summary.total_volume_usd)),
    ]);
    table.add_row(vec![
        Cell::new("Gas Spent (AVAX)"),
        Cell::new(format!("{:.6}", summary.total_gas_spent_avax)),
    ]);
    table.add_row(vec![
        Cell::new("Gas Spent (USD)"),
        Cell::new(format!("{:.2}", summary.total_gas_spent_usd)),
    ]);
    table.add_row(vec![
        Cell::new("First Transaction"),
        Cell::new(summary.first_tx_date.as_deref().unwrap_or("N/A")),
    ]);
    table.add_row(vec![
        Cell::new("Last Transaction"),
        Cell::new(summary.last_tx_date.as_deref().unwrap_or("N/A")),
    ]);
    if let Some(biggest) = &summary.biggest_day {
        table.add_row(vec![
            Cell::new("Biggest Day"),
            Cell::new(format!(
                "{} ({} txs, {:.2} USD)",
                biggest.date, biggest.tx_count, biggest.volume_usd
            )),
        ]);
    }

    table.to_string()
}

fn format_persona_table(summary: &RewindSummary) -> String {
    let persona = &summary.persona;
    let scores = &persona.score_breakdown;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Persona", "Score"]);

    table.add_row(vec![
        Cell::new(format!("{} {}", persona.emoji, persona.label)),
        Cell::new(&persona.description),
    ]);
    table.add_row(vec![Cell::new("Builder"), Cell::new(scores.builder_score)]);
    table.add_row(vec![Cell::new("DeFi"), Cell::new(scores.defi_score)]);
    table.add_row(vec![Cell::new("NFT"), Cell::new(scores.nft_score)]);
    table.add_row(vec![Cell::new("Degen"), Cell::new(scores.degen_score)]);
    table.add_row(vec![Cell::new("Bridger"), Cell::new(scores.bridger_score)]);

    table.to_string()
}

fn format_tokens_table(summary: &RewindSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Token", "Address", "Transfers", "Volume (USD)"]);

    for token in &summary.tokens {
        table.add_row(vec![
            Cell::new(&token.symbol),
            Cell::new(format!("{:#}", token.address)),
            Cell::new(token.tx_count),
            Cell::new(format!("{:.2}", token.volume_usd)),
        ]);
    }

    table.to_string()
}

fn format_collections_table(summary: &RewindSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Collection", "Address", "Held", "Transfers", "Status"]);

    for collection in &summary.nfts.collections {
        table.add_row(vec![
            Cell::new(&collection.collection_name),
            Cell::new(format!("{:#}", collection.collection_address)),
            Cell::new(collection.nft_count),
            Cell::new(collection.tx_count),
            Cell::new(format!("{:?}", collection.status).to_uppercase()),
        ]);
    }

    table.to_string()
}

fn format_defi_table(summary: &RewindSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Protocol", "Address", "Interactions", "Volume (USD)"]);

    for highlight in &summary.defi_highlights {
        table.add_row(vec![
            Cell::new(&highlight.protocol_name),
            Cell::new(format!("{:#}", highlight.contract_address)),
            Cell::new(highlight.tx_count),
            Cell::new(format!("{:.2}", highlight.volume_usd)),
        ]);
    }

    table.to_string()
}

fn format_daily_activity_csv(summary: &RewindSummary) -> String {
    let mut wtr = Writer::from_writer(vec![]);

    let _ = wtr.write_record(["date", "count", "level"]);
    for day in &summary.daily_activity {
        let _ = wtr.write_record([
            &day.date,
            &day.count.to_string(),
            &day.level.to_string(),
        ]);
    }

    String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
}
