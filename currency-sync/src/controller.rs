//! Rate synchronisation controller.
//!
//! Decides when cached rates are served and when they are refetched,
//! replaces the cache on a successful fetch, and publishes the rate status
//! together with the resolved source and target currencies.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use currency_types::domain::{calculate_exchange_rate, convert};
use currency_types::freshness::derive_status;
use currency_types::{
    Clock, Currency, CurrencyCode, CurrencySelection, PreferenceStore, RateApiClient, RateCache,
    RateError, RateResult, RateStatus, RequestState, SystemClock,
};

use crate::config::SyncConfig;
use crate::events::SyncEvent;

/// In-memory currencies available for lookup, keyed by code.
type WorkingSet = BTreeMap<String, Currency>;

/// Codes the published slots were resolved from.
///
/// Only locked inside a `selection` update, so it always agrees with the
/// published pair.
#[derive(Debug, Clone, Copy)]
struct SlotCodes {
    source: CurrencyCode,
    target: CurrencyCode,
}

type SharedSlotCodes = Arc<std::sync::Mutex<SlotCodes>>;

/// Orchestrates the preference store, the rate cache and the remote API.
///
/// Generic over the three ports so adapters are injected at construction.
/// Sync cycles on one instance never overlap: each holds `sync_lock` from
/// the cache read to the status update.
pub struct RateSyncController<P: PreferenceStore, C: RateCache, A: RateApiClient> {
    preferences: Arc<P>,
    cache: Arc<C>,
    api: Arc<A>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    sync_lock: Mutex<()>,
    status: watch::Sender<RateStatus>,
    currencies: watch::Sender<WorkingSet>,
    selection: Arc<watch::Sender<CurrencySelection>>,
    slot_codes: SharedSlotCodes,
}

impl<P: PreferenceStore, C: RateCache, A: RateApiClient> RateSyncController<P, C, A> {
    /// Creates a controller with the system clock and default configuration.
    pub fn new(preferences: Arc<P>, cache: Arc<C>, api: Arc<A>) -> Self {
        Self {
            preferences,
            cache,
            api,
            clock: Arc::new(SystemClock),
            config: SyncConfig::default(),
            sync_lock: Mutex::new(()),
            status: watch::Sender::new(RateStatus::Idle),
            currencies: watch::Sender::new(WorkingSet::new()),
            selection: Arc::new(watch::Sender::new(CurrencySelection::default())),
            slot_codes: Arc::new(std::sync::Mutex::new(SlotCodes {
                source: CurrencyCode::DEFAULT_SOURCE,
                target: CurrencyCode::DEFAULT_TARGET,
            })),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the first sync cycle, then starts resolving the selected currencies.
    ///
    /// The returned handle finishes once the controller or the preference
    /// store is dropped.
    pub async fn start(&self) -> JoinHandle<()> {
        self.fetch_new_rates().await;
        self.spawn_resolver()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync cycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Reads the cache, refetches when it is empty or stale, and republishes
    /// the rate status. Failures are logged and never propagate.
    #[instrument(skip(self))]
    pub async fn fetch_new_rates(&self) -> RateStatus {
        let _cycle = self.sync_lock.lock().await;

        match self.cache.read_currency_data().await {
            Ok(cached) if !cached.is_empty() => {
                info!(count = cached.len(), "Loaded rates from cache");
                self.merge(cached);

                match self.preferences.is_data_fresh(self.now_millis()).await {
                    Ok(true) => debug!("Cached rates are fresh"),
                    Ok(false) => {
                        info!("Cached rates are stale, refreshing");
                        let _ = self.refresh_from_remote().await;
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not read last update time, refreshing");
                        let _ = self.refresh_from_remote().await;
                    }
                }
            }
            Ok(_) => {
                info!("Rate cache is empty, fetching");
                let _ = self.refresh_from_remote().await;
            }
            Err(e) => warn!(error = %e, "Failed to read rate cache"),
        }

        self.update_status().await
    }

    /// Fetches from the remote service regardless of freshness.
    pub async fn force_refresh(&self) -> RateResult<usize> {
        let _cycle = self.sync_lock.lock().await;
        let result = self.refresh_from_remote().await;
        self.update_status().await;
        result
    }

    /// Replaces the cache with the remote table. Caller holds `sync_lock`.
    ///
    /// On a fetch failure the cache, the timestamp and the working set are
    /// left untouched.
    async fn refresh_from_remote(&self) -> RateResult<usize> {
        let fetched = tokio::time::timeout(
            self.config.fetch_timeout,
            self.api.get_latest_exchange_rates(),
        )
        .await
        .unwrap_or_else(|_| {
            Err(RateError::RemoteFetch(format!(
                "timed out after {:?}",
                self.config.fetch_timeout
            )))
        });

        let currencies = fetched.inspect_err(|e| warn!(error = %e, "Fetching rates failed"))?;

        self.replace_cache(&currencies).await?;
        self.merge(currencies.iter().cloned());

        let completed_at = self.clock.now().to_rfc3339();
        self.preferences
            .save_last_updated(&completed_at)
            .await
            .inspect_err(|e| warn!(error = %e, "Saving last update time failed"))?;

        info!(count = currencies.len(), %completed_at, "Rates refreshed");
        Ok(currencies.len())
    }

    /// Clears the cache then inserts every record. A failed insert empties
    /// the cache again so it never holds a partial table.
    async fn replace_cache(&self, currencies: &[Currency]) -> RateResult<()> {
        self.cache
            .clean_up()
            .await
            .inspect_err(|e| warn!(error = %e, "Clearing rate cache failed"))?;

        for currency in currencies {
            if let Err(e) = self.cache.insert_currency_data(currency).await {
                warn!(code = %currency.code, error = %e, "Caching rate failed, discarding partial table");
                if let Err(cleanup) = self.cache.clean_up().await {
                    warn!(error = %cleanup, "Clearing partial rate table failed");
                }
                return Err(e);
            }
        }

        Ok(())
    }

    async fn update_status(&self) -> RateStatus {
        let fresh = self
            .preferences
            .is_data_fresh(self.now_millis())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read last update time");
                false
            });

        let status = derive_status(fresh);
        self.status.send_replace(status);
        debug!(%status, "Rate status updated");
        status
    }

    /// Notifies subscribers only when a record was added or changed.
    fn merge(&self, currencies: impl IntoIterator<Item = Currency>) {
        self.currencies.send_if_modified(|set| {
            let mut modified = false;
            for currency in currencies {
                if set.get(&currency.code) != Some(&currency) {
                    set.insert(currency.code.clone(), currency);
                    modified = true;
                }
            }
            modified
        });
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts the task joining the stored codes with the working set.
    ///
    /// A slot is re-resolved when its stored code is written, and both slots
    /// are re-resolved from the codes they currently show when the working
    /// set changes. Lookups that failed before rates arrived converge, and a
    /// switch survives later rate updates.
    pub fn spawn_resolver(&self) -> JoinHandle<()> {
        tokio::spawn(resolve_selection(
            self.preferences.read_source_currency_code(),
            self.preferences.read_target_currency_code(),
            self.currencies.subscribe(),
            Arc::clone(&self.selection),
            Arc::clone(&self.slot_codes),
        ))
    }

    /// Swaps source and target in a single update. Stored codes are untouched.
    pub fn switch_currencies(&self) {
        self.selection.send_modify(|selection| {
            selection.swap();
            let mut codes = self.slot_codes.lock().unwrap_or_else(PoisonError::into_inner);
            let swapped = SlotCodes {
                source: codes.target,
                target: codes.source,
            };
            *codes = swapped;
        });
        debug!("Switched source and target");
    }

    pub async fn send_event(&self, event: SyncEvent) -> RateResult<()> {
        match event {
            SyncEvent::RefreshRates => {
                self.fetch_new_rates().await;
            }
            SyncEvent::SwitchCurrencies => self.switch_currencies(),
            SyncEvent::SaveSourceCurrencyCode(code) => {
                self.preferences.save_source_currency_code(code).await?;
            }
            SyncEvent::SaveTargetCurrencyCode(code) => {
                self.preferences.save_target_currency_code(code).await?;
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Published state
    // ─────────────────────────────────────────────────────────────────────────

    pub fn rate_status(&self) -> RateStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RateStatus> {
        self.status.subscribe()
    }

    /// The working set, sorted by code.
    pub fn all_currencies(&self) -> Vec<Currency> {
        self.currencies.borrow().values().cloned().collect()
    }

    pub fn selection(&self) -> CurrencySelection {
        self.selection.borrow().clone()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<CurrencySelection> {
        self.selection.subscribe()
    }

    /// Source-to-target rate, once both slots have resolved.
    pub fn exchange_rate(&self) -> Option<f64> {
        let selection = self.selection.borrow();
        let (source, target) = selection.resolved()?;
        Some(calculate_exchange_rate(source.rate, target.rate))
    }

    /// Converts an amount of the source currency into the target currency.
    pub fn convert(&self, amount: f64) -> Option<f64> {
        self.exchange_rate().map(|rate| convert(amount, rate))
    }
}

fn lookup(working_set: &WorkingSet, code: CurrencyCode) -> RequestState<Currency> {
    working_set
        .get(code.code())
        .cloned()
        .ok_or(RateError::Lookup(code))
        .into()
}

/// Single consumer of the code streams and the working set.
async fn resolve_selection(
    mut source: watch::Receiver<CurrencyCode>,
    mut target: watch::Receiver<CurrencyCode>,
    mut currencies: watch::Receiver<WorkingSet>,
    selection: Arc<watch::Sender<CurrencySelection>>,
    slot_codes: SharedSlotCodes,
) {
    let (mut source_changed, mut target_changed, mut set_changed) = (true, true, true);

    loop {
        {
            let working_set = if set_changed {
                currencies.borrow_and_update()
            } else {
                currencies.borrow()
            };
            let stored_source = source_changed.then(|| *source.borrow_and_update());
            let stored_target = target_changed.then(|| *target.borrow_and_update());

            selection.send_if_modified(|current| {
                let mut codes = slot_codes.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(code) = stored_source {
                    codes.source = code;
                }
                if let Some(code) = stored_target {
                    codes.target = code;
                }

                let mut modified = false;
                if source_changed || set_changed {
                    let state = lookup(&working_set, codes.source);
                    modified |= current.source != state;
                    current.source = state;
                }
                if target_changed || set_changed {
                    let state = lookup(&working_set, codes.target);
                    modified |= current.target != state;
                    current.target = state;
                }
                modified
            });
        }

        (source_changed, target_changed, set_changed) = (false, false, false);
        let closed = tokio::select! {
            changed = source.changed() => { source_changed = true; changed.is_err() }
            changed = target.changed() => { target_changed = true; changed.is_err() }
            changed = currencies.changed() => { set_changed = true; changed.is_err() }
        };
        if closed {
            debug!("Selection resolver stopped");
            break;
        }
    }
}
