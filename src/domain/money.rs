//! Cent-precision helpers for the `f64` amounts carried on the ledger.

/// Comparison slack for user-supplied totals (one cent).
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Rounds an amount to cent precision.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Converts an amount to whole cents for exact comparisons.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// True when two amounts agree within [`AMOUNT_TOLERANCE`].
pub fn amounts_equal(a: f64, b: f64) -> bool {
    (to_cents(a) - to_cents(b)).abs() <= 1
}
