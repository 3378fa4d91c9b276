//! Published state: rate freshness and request lifecycles.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;

/// Freshness of the cached rate table as last evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RateStatus {
    /// No evaluation has completed yet in this session.
    #[default]
    Idle,
    Fresh,
    Stale,
}

impl RateStatus {
    /// Short label shown next to the date banner.
    pub fn title(&self) -> &'static str {
        match self {
            RateStatus::Idle => "Rates",
            RateStatus::Fresh => "Fresh rates",
            RateStatus::Stale => "Rates are not fresh",
        }
    }

    /// Only stale data offers a manual refresh.
    pub fn needs_refresh(&self) -> bool {
        matches!(self, RateStatus::Stale)
    }
}

impl fmt::Display for RateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Lifecycle of an asynchronous lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> RequestState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RequestState::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            RequestState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for RequestState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => RequestState::Success(data),
            Err(e) => RequestState::Error(e.to_string()),
        }
    }
}

/// The source and target slots, published together so a swap is a single update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrencySelection {
    pub source: RequestState<Currency>,
    pub target: RequestState<Currency>,
}

impl CurrencySelection {
    /// Exchanges source and target in place.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }

    /// Both slots resolved to a currency.
    pub fn resolved(&self) -> Option<(&Currency, &Currency)> {
        Some((self.source.success()?, self.target.success()?))
    }

    /// Neither slot is still waiting for its first resolution.
    pub fn is_settled(&self) -> bool {
        !self.source.is_idle()
            && !self.source.is_loading()
            && !self.target.is_idle()
            && !self.target.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_titles() {
        assert_eq!(RateStatus::default(), RateStatus::Idle);
        assert_eq!(RateStatus::Fresh.to_string(), "Fresh rates");
        assert!(RateStatus::Stale.needs_refresh());
        assert!(!RateStatus::Fresh.needs_refresh());
        assert!(!RateStatus::Idle.needs_refresh());
    }

    #[test]
    fn test_request_state_from_result() {
        let ok: RequestState<i32> = Ok::<_, String>(7).into();
        assert_eq!(ok.success(), Some(&7));

        let err: RequestState<i32> = Err::<i32, _>("boom").into();
        assert_eq!(err.error_message(), Some("boom"));
        assert!(err.is_error());
    }

    #[test]
    fn test_selection_swap() {
        let usd = Currency::new("USD", "United States Dollar", 1.0);
        let eur = Currency::new("EUR", "Euro", 0.92);
        let mut selection = CurrencySelection {
            source: RequestState::Success(usd.clone()),
            target: RequestState::Success(eur.clone()),
        };

        selection.swap();

        assert_eq!(selection.source.success(), Some(&eur));
        assert_eq!(selection.target.success(), Some(&usd));
        assert!(selection.is_settled());
        assert!(selection.resolved().is_some());
    }

    #[test]
    fn test_selection_unresolved() {
        let selection = CurrencySelection {
            source: RequestState::Success(Currency::new("USD", "United States Dollar", 1.0)),
            target: RequestState::Error("Currency not found".into()),
        };
        assert!(selection.is_settled());
        assert!(selection.resolved().is_none());
        assert!(!CurrencySelection::default().is_settled());
    }
}
