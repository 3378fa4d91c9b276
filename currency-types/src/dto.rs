//! Wire format of the remote latest-rates endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{Currency, CurrencyCode};

/// Body of `GET /v3/latest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestRatesResponse {
    pub meta: ResponseMeta,
    pub data: HashMap<String, RateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// RFC 3339 instant the provider last refreshed its table.
    pub last_updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateEntry {
    pub code: String,
    pub value: f64,
}

impl LatestRatesResponse {
    /// Catalogued currencies from the response, sorted by code.
    ///
    /// Entries with a code outside [`CurrencyCode`] are dropped.
    pub fn into_currencies(self) -> Vec<Currency> {
        let mut currencies: Vec<Currency> = self
            .data
            .into_values()
            .filter_map(|entry| {
                let code: CurrencyCode = entry.code.parse().ok()?;
                Some(Currency::from_code(code, entry.value))
            })
            .collect();
        currencies.sort_by(|a, b| a.code.cmp(&b.code));
        currencies
    }
}
