//! Currency catalogue and the fetched currency record.
//!
//! Supported codes are declared once in the `define_currency_codes!` invocation
//! below; the macro generates the `CurrencyCode` enum together with its lookup,
//! parsing and display impls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a string is not a supported ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrencyCode(pub String);

/// Defines the closed set of supported currency codes.
///
/// # Syntax
/// ```ignore
/// define_currency_codes! {
///     VARIANT => ("CODE", "Display name"),
/// }
/// ```
macro_rules! define_currency_codes {
    (
        $(
            $name:ident => ($code:literal, $display:literal)
        ),* $(,)?
    ) => {
        /// ISO 4217 codes the client knows how to display and select.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            /// The three-letter ISO code.
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            /// Human-readable currency name.
            pub fn display_name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = UnknownCurrencyCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(UnknownCurrencyCode(s.to_string())),
                }
            }
        }
    };
}

define_currency_codes! {
    USD => ("USD", "United States Dollar"),
    EUR => ("EUR", "Euro"),
    GBP => ("GBP", "British Pound Sterling"),
    JPY => ("JPY", "Japanese Yen"),
    CHF => ("CHF", "Swiss Franc"),
    CAD => ("CAD", "Canadian Dollar"),
    AUD => ("AUD", "Australian Dollar"),
    NZD => ("NZD", "New Zealand Dollar"),
    CNY => ("CNY", "Chinese Yuan"),
    HKD => ("HKD", "Hong Kong Dollar"),
    SGD => ("SGD", "Singapore Dollar"),
    INR => ("INR", "Indian Rupee"),
    KRW => ("KRW", "South Korean Won"),
    SEK => ("SEK", "Swedish Krona"),
    NOK => ("NOK", "Norwegian Krone"),
    DKK => ("DKK", "Danish Krone"),
    PLN => ("PLN", "Polish Zloty"),
    CZK => ("CZK", "Czech Koruna"),
    HUF => ("HUF", "Hungarian Forint"),
    RON => ("RON", "Romanian Leu"),
    BGN => ("BGN", "Bulgarian Lev"),
    TRY => ("TRY", "Turkish Lira"),
    ILS => ("ILS", "Israeli New Shekel"),
    AED => ("AED", "United Arab Emirates Dirham"),
    SAR => ("SAR", "Saudi Riyal"),
    ZAR => ("ZAR", "South African Rand"),
    BRL => ("BRL", "Brazilian Real"),
    MXN => ("MXN", "Mexican Peso"),
    ARS => ("ARS", "Argentine Peso"),
    CLP => ("CLP", "Chilean Peso"),
    THB => ("THB", "Thai Baht"),
    IDR => ("IDR", "Indonesian Rupiah"),
    MYR => ("MYR", "Malaysian Ringgit"),
    PHP => ("PHP", "Philippine Peso"),
    RSD => ("RSD", "Serbian Dinar"),
    BAM => ("BAM", "Bosnia-Herzegovina Convertible Mark"),
}

impl CurrencyCode {
    /// Default source currency when nothing has been stored yet.
    pub const DEFAULT_SOURCE: CurrencyCode = CurrencyCode::USD;
    /// Default target currency when nothing has been stored yet.
    pub const DEFAULT_TARGET: CurrencyCode = CurrencyCode::EUR;
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A currency and its rate as delivered by one fetch cycle.
///
/// Identified by `code`; the rate is relative to the remote service's base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub rate: f64,
}

impl Currency {
    pub fn new(code: impl Into<String>, name: impl Into<String>, rate: f64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            rate,
        }
    }

    /// Builds a record for a catalogued code, taking the name from the catalogue.
    pub fn from_code(code: CurrencyCode, rate: f64) -> Self {
        Self::new(code.code(), code.display_name(), rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!(" eur ".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
    }

    #[test]
    fn test_currency_code_parse_unknown() {
        let err = "XYZ".parse::<CurrencyCode>().unwrap_err();
        assert_eq!(err, UnknownCurrencyCode("XYZ".to_string()));
        assert_eq!(err.to_string(), "Unknown currency: XYZ");
    }

    #[test]
    fn test_currency_code_display() {
        assert_eq!(CurrencyCode::GBP.to_string(), "GBP");
        assert_eq!(CurrencyCode::GBP.display_name(), "British Pound Sterling");
    }

    #[test]
    fn test_catalogue_codes_are_unique() {
        let mut codes: Vec<&str> = CurrencyCode::all().iter().map(|c| c.code()).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(CurrencyCode::DEFAULT_SOURCE, CurrencyCode::USD);
        assert_eq!(CurrencyCode::DEFAULT_TARGET, CurrencyCode::EUR);
    }

    #[test]
    fn test_currency_from_code_uses_catalogue_name() {
        let eur = Currency::from_code(CurrencyCode::EUR, 0.92);
        assert_eq!(eur.code, "EUR");
        assert_eq!(eur.name, "Euro");
    }
}
