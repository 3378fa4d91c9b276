//! Events a UI layer sends to the controller.

use currency_types::CurrencyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// Run a sync cycle (the manual refresh affordance).
    RefreshRates,
    /// Swap the published source and target.
    SwitchCurrencies,
    SaveSourceCurrencyCode(CurrencyCode),
    SaveTargetCurrencyCode(CurrencyCode),
}
