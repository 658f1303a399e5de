//! Currency helpers.
//!
//! Amounts travel as `f64` major units (dollars) through the API and the
//! database. Anything that must sum exactly (splits, settlements) is done in
//! integer cents.

/// Convert a major-unit amount to whole cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert whole cents back to a major-unit amount.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Convert a wide cent total (a sum of many `i64` cent amounts) back to
/// major units.
pub fn from_wide_cents(cents: i128) -> f64 {
    cents as f64 / 100.0
}

/// Round a major-unit amount to the nearest cent.
pub fn round_cents(amount: f64) -> f64 {
    from_cents(to_cents(amount))
}
