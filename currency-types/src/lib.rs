//! # Currency Types
//!
//! Domain types, the freshness policy and port traits for the currency rate
//! client. Nothing here performs I/O.
//!
//! ## Layout
//!
//! - `domain/` - Currency catalogue, published states, conversion math
//! - `freshness` - When cached rates count as stale
//! - `ports/` - Traits the storage and HTTP adapters implement
//! - `dto` - Remote wire format
//! - `error` - Error kinds shared by every layer

pub mod domain;
pub mod dto;
pub mod error;
pub mod freshness;
pub mod ports;

pub use domain::{
    Currency, CurrencyCode, CurrencySelection, RateStatus, RequestState, UnknownCurrencyCode,
};
pub use dto::LatestRatesResponse;
pub use error::{RateError, RateResult};
pub use ports::{Clock, PreferenceStore, RateApiClient, RateCache, SystemClock};
