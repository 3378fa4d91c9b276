//! Amount conversion and date banner helpers.

use chrono::{Datelike, Local, NaiveDate};

/// Rate from `source` to `target` when both are quoted against the same base.
pub fn calculate_exchange_rate(source_rate: f64, target_rate: f64) -> f64 {
    target_rate / source_rate
}

pub fn convert(amount: f64, exchange_rate: f64) -> f64 {
    amount * exchange_rate
}

/// Renders a date as `19th October, 2026`.
pub fn display_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match day {
        11..=13 => "th",
        d if d % 10 == 1 => "st",
        d if d % 10 == 2 => "nd",
        d if d % 10 == 3 => "rd",
        _ => "th",
    };
    format!("{}{} {}", day, suffix, date.format("%B, %Y"))
}

/// Today's banner in the local time zone.
pub fn display_current_date() -> String {
    display_date(Local::now().date_naive())
}
