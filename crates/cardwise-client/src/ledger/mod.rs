//! SQLite-backed month ledger: usage totals, pending recommendations and
//! recorded transactions. This is the only writer of usage state.

pub mod history;
pub mod month;
pub mod recommendations;
pub mod reset;
pub mod usage;

use chrono::{SecondsFormat, Utc};

/// Rounds to cents. Applied when values cross into the ledger so stored
/// totals do not accumulate binary noise.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
