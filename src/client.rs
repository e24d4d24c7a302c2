use anyhow::Result;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "x-glacier-api-key";

/// Authenticated client for the Glacier data API.
#[derive(Clone)]
pub struct GlacierClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: usize,
}

impl GlacierClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(anyhow::anyhow!("Glacier API key must not be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GlacierClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_retries: 5,
        })
    }

    /// Plain HTTP client for side requests that skip the API auth and retry
    /// machinery, such as NFT metadata lookups.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn get_retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries)
    }

    fn handle_timeout(&self, path: &str) -> anyhow::Error {
        warn!(
            "Request timeout after {} seconds on {}",
            REQUEST_TIMEOUT.as_secs(),
            path
        );
        anyhow::anyhow!(
            "Request timeout after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        )
    }

    /// GET a JSON document from `path` (relative to the base URL) with the
    /// given query parameters, retrying transient failures with backoff.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let client = self.clone();
        let url = format!("{}{}", self.base_url, path);

        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            let url = url.clone();
            let query = query.to_vec();
            async move {
                debug!("Fetching {}", url);
                let request = client
                    .http
                    .get(&url)
                    .header(API_KEY_HEADER, &client.api_key)
                    .query(&query)
                    .send();

                let response = match timeout(REQUEST_TIMEOUT, request).await {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        warn!("Transport error on {}: {}", url, e);
                        return Err(anyhow::anyhow!("{}", e));
                    }
                    Err(_) => return Err(client.handle_timeout(&url)),
                };

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    warn!("Glacier API error {} on {}: {}", status, url, body);
                    let error = anyhow::anyhow!("Glacier API error: {} - {}", status, body);
                    if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS
                    {
                        // hack since we don't want to retry on rejected requests
                        return Ok(Err(error));
                    }
                    return Err(error);
                }

                match response.json::<T>().await {
                    Ok(body) => Ok(Ok(body)),
                    Err(e) => Err(anyhow::anyhow!("Invalid response body: {}", e)),
                }
            }
        })
        .await
        .and_then(|r| r)
    }
}
