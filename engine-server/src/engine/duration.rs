//! Duration calculator
//!
//! Converts a purchased `(value, unit)` duration into a concrete expiry
//! instant. All units reduce to fixed-day offsets so billing periods stay
//! deterministic regardless of calendar irregularities: a year is 365 days,
//! a month is 30 days, and fractional values are allowed (1.5 months is a
//! well-defined 45 days).

use chrono::{DateTime, Duration, Utc};
use shared::models::{DurationSpec, DurationUnit};

/// Compute the expiry instant for a duration starting at `start`
///
/// Pure and total: day counts round to the nearest whole day, and unknown
/// units take month semantics.
pub fn compute_expiry(start: DateTime<Utc>, value: f64, unit: DurationUnit) -> DateTime<Utc> {
    let days = match unit {
        DurationUnit::Days => value,
        DurationUnit::Year => value * 365.0,
        DurationUnit::Month | DurationUnit::Months | DurationUnit::Other => value * 30.0,
    };
    start + Duration::days(days.round() as i64)
}

/// Convenience wrapper over a [`DurationSpec`]
pub fn expiry_for(start: DateTime<Utc>, duration: &DurationSpec) -> DateTime<Utc> {
    compute_expiry(start, duration.value, duration.unit)
}
