//! Preference store port.
//!
//! Holds the last-update timestamp and the selected source/target codes.
//! Writes are durable across restarts.

use tokio::sync::watch;

use crate::domain::CurrencyCode;
use crate::error::RateResult;
use crate::freshness;

/// Fixed keys under which preferences are persisted.
pub mod keys {
    pub const LAST_UPDATED: &str = "lastUpdated";
    pub const SOURCE_CODE: &str = "sourceCode";
    pub const TARGET_CODE: &str = "targetCode";
}

/// Key-value persistence for sync metadata and the user's currency selection.
///
/// The code streams are `watch` receivers: a new subscriber reads the current
/// value (or the default) immediately and is woken on every later write.
/// Subscribers are independent of each other.
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    /// Persists an ISO-8601 instant as epoch milliseconds.
    ///
    /// Fails with [`RateError::Parse`](crate::RateError::Parse) on malformed input.
    async fn save_last_updated(&self, timestamp: &str) -> RateResult<()>;

    /// Epoch milliseconds of the last successful fetch-and-cache cycle, if any.
    async fn last_updated(&self) -> RateResult<Option<i64>>;

    /// Whether the saved timestamp falls on the current local calendar day
    /// (or later). `false` when nothing has been saved.
    async fn is_data_fresh(&self, current_epoch_millis: i64) -> RateResult<bool> {
        Ok(self
            .last_updated()
            .await?
            .is_some_and(|saved| freshness::is_fresh(saved, current_epoch_millis)))
    }

    async fn save_source_currency_code(&self, code: CurrencyCode) -> RateResult<()>;

    async fn save_target_currency_code(&self, code: CurrencyCode) -> RateResult<()>;

    /// Current source code followed by every later write. Defaults to USD.
    fn read_source_currency_code(&self) -> watch::Receiver<CurrencyCode>;

    /// Current target code followed by every later write. Defaults to EUR.
    fn read_target_currency_code(&self) -> watch::Receiver<CurrencyCode>;
}
