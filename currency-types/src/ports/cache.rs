//! Rate cache port.

use crate::domain::Currency;
use crate::error::RateResult;

/// Durable store of currency records keyed by code.
///
/// Holds either nothing or the complete set from one fetch cycle; callers
/// must [`clean_up`](RateCache::clean_up) before repopulating.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync + 'static {
    /// Snapshot of every stored record. Empty when never synced or cleared.
    async fn read_currency_data(&self) -> RateResult<Vec<Currency>>;

    /// Upserts one record by code.
    async fn insert_currency_data(&self, currency: &Currency) -> RateResult<()>;

    /// Deletes all records.
    async fn clean_up(&self) -> RateResult<()>;
}
