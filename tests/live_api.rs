//! Live Glacier API tests. Require GLACIER_API_KEY and network access:
//! `cargo test -- --ignored`.

use avax_rewind::client::GlacierClient;
use avax_rewind::config::Config;
use avax_rewind::fetcher::LedgerFetcher;
use avax_rewind::window::TimeWindow;

// Trader Joe v2.1 router, active enough to return records for any year.
const KNOWN_ACTIVE_ADDRESS: &str = "0x18556DA13313f3532c54711497A8FedAC273220E";

#[tokio::test]
#[ignore]
async fn test_fetch_transactions_live() {
    let config = Config::from_env().expect("GLACIER_API_KEY must be set");
    let client = GlacierClient::new(&config.api_base_url, &config.api_key).unwrap();
    let fetcher = LedgerFetcher::new(&client, &config.chain_id);
    let window = TimeWindow::for_year(2025);

    let transactions = fetcher
        .fetch_transactions(KNOWN_ACTIVE_ADDRESS, &window)
        .await
        .unwrap();
    assert!(!transactions.is_empty());
    assert!(
        transactions
            .iter()
            .all(|tx| window.contains(tx.timestamp))
    );
}

#[tokio::test]
#[ignore]
async fn test_fetch_erc20_transfers_live() {
    let config = Config::from_env().expect("GLACIER_API_KEY must be set");
    let client = GlacierClient::new(&config.api_base_url, &config.api_key).unwrap();
    let fetcher = LedgerFetcher::new(&client, &config.chain_id);
    let window = TimeWindow::for_year(2025);

    let transfers = fetcher
        .fetch_erc20_transfers(KNOWN_ACTIVE_ADDRESS, &window)
        .await
        .unwrap();
    assert!(transfers.iter().all(|t| window.contains(t.timestamp)));
}
