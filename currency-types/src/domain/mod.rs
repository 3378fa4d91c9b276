//! Domain models for the currency rate client.

pub mod conversion;
pub mod currency;
pub mod status;

pub use conversion::{calculate_exchange_rate, convert, display_current_date, display_date};
pub use currency::{Currency, CurrencyCode, UnknownCurrencyCode};
pub use status::{CurrencySelection, RateStatus, RequestState};
