//! Port traits (interfaces for adapters).
//!
//! The sync controller depends on these traits, not on concrete storage or
//! HTTP implementations.

mod api;
mod cache;
mod clock;
mod preferences;

pub use api::RateApiClient;
pub use cache::RateCache;
pub use clock::{Clock, SystemClock};
pub use preferences::{PreferenceStore, keys};
