//! # Currency API Client
//!
//! A typed client for the remote latest-rates endpoint
//! (`GET {base}/v3/latest`, authenticated with an `apikey` header).

use std::time::Duration;

use async_trait::async_trait;
use currency_types::{Currency, LatestRatesResponse, RateApiClient, RateError, RateResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rate table is empty")]
    EmptyTable,
}

impl From<ClientError> for RateError {
    fn from(err: ClientError) -> Self {
        RateError::RemoteFetch(err.to_string())
    }
}

/// Latest-rates API client.
pub struct CurrencyApiClient {
    base_url: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
    http: Client,
}

impl CurrencyApiClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: None,
            http: Client::new(),
        }
    }

    /// Sets the API key sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Bounds each request, connection included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetches the raw latest-rates response.
    pub async fn latest_rates(&self) -> Result<LatestRatesResponse, ClientError> {
        self.get("/v3/latest").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Catalogued currencies of a response. A table with none is rejected so
/// it never replaces a cached one.
fn catalogued_currencies(response: LatestRatesResponse) -> Result<Vec<Currency>, ClientError> {
    let currencies = response.into_currencies();
    if currencies.is_empty() {
        return Err(ClientError::EmptyTable);
    }
    Ok(currencies)
}

#[async_trait]
impl RateApiClient for CurrencyApiClient {
    async fn get_latest_exchange_rates(&self) -> RateResult<Vec<Currency>> {
        let response = self.latest_rates().await?;
        debug!(
            provider_updated_at = %response.meta.last_updated_at,
            entries = response.data.len(),
            "Received latest rates"
        );

        let currencies = catalogued_currencies(response)?;
        info!(count = currencies.len(), "Fetched exchange rates");
        Ok(currencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use currency_types::CurrencyCode;

    #[test]
    fn test_client_creation() {
        let client = CurrencyApiClient::new("https://api.currencyapi.com");
        assert_eq!(client.base_url, "https://api.currencyapi.com");
        assert!(client.timeout.is_none());
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CurrencyApiClient::new("https://api.currencyapi.com/");
        assert_eq!(client.base_url, "https://api.currencyapi.com");
    }

    #[test]
    fn test_client_with_api_key_and_timeout() {
        let client = CurrencyApiClient::new("http://localhost:3000")
            .with_api_key("test-key")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(client.api_key, Some("test-key".to_string()));
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_client_error_maps_to_remote_fetch() {
        let err: RateError = ClientError::Api {
            status: 429,
            message: "rate limited".into(),
        }
        .into();
        assert_eq!(
            err,
            RateError::RemoteFetch("API error: 429 - rate limited".into())
        );
    }

    fn response(body: &str) -> LatestRatesResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_table_without_catalogued_codes_is_rejected() {
        let uncatalogued = response(
            r#"{
                "meta": { "last_updated_at": "2026-10-18T23:59:59Z" },
                "data": {
                    "XAU": { "code": "XAU", "value": 0.00041 },
                    "BTC": { "code": "BTC", "value": 0.0000093 }
                }
            }"#,
        );
        let empty = response(r#"{ "meta": { "last_updated_at": "2026-10-18T23:59:59Z" }, "data": {} }"#);

        assert!(matches!(
            catalogued_currencies(uncatalogued),
            Err(ClientError::EmptyTable)
        ));

        let err: RateError = catalogued_currencies(empty).unwrap_err().into();
        assert_eq!(err, RateError::RemoteFetch("Rate table is empty".into()));
    }

    #[test]
    fn test_catalogued_entries_are_kept() {
        let mixed = response(
            r#"{
                "meta": { "last_updated_at": "2026-10-18T23:59:59Z" },
                "data": {
                    "USD": { "code": "USD", "value": 1.0 },
                    "XAU": { "code": "XAU", "value": 0.00041 }
                }
            }"#,
        );

        let currencies = catalogued_currencies(mixed).unwrap();

        assert_eq!(currencies, vec![Currency::from_code(CurrencyCode::USD, 1.0)]);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_remote_fetch_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = CurrencyApiClient::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));

        let result = client.get_latest_exchange_rates().await;

        assert!(matches!(result, Err(RateError::RemoteFetch(_))));
    }
}
