//! Remote rate service port.

use crate::domain::Currency;
use crate::error::RateResult;

/// Source of the authoritative current rate table.
///
/// A successful result replaces any previously cached table; it is never merged.
#[async_trait::async_trait]
pub trait RateApiClient: Send + Sync + 'static {
    async fn get_latest_exchange_rates(&self) -> RateResult<Vec<Currency>>;
}
