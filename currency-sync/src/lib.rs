//! # Currency Sync
//!
//! The controller that keeps cached exchange rates current and publishes the
//! selected source and target currencies.
//!
//! It depends only on the ports defined in `currency-types`:
//!
//! - [`PreferenceStore`](currency_types::PreferenceStore): last-update time and selected codes
//! - [`RateCache`](currency_types::RateCache): the durable rate table
//! - [`RateApiClient`](currency_types::RateApiClient): the remote latest-rates service

pub mod config;
pub mod controller;
pub mod events;


pub use config::SyncConfig;
pub use controller::RateSyncController;
pub use events::SyncEvent;
