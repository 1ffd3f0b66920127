//! Duration Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration unit for subscription periods
///
/// Unrecognized units deserialize to [`DurationUnit::Other`], which carries
/// calendar-month semantics downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Days,
    Month,
    Months,
    Year,
    #[serde(other)]
    Other,
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DurationUnit::Days => "days",
            DurationUnit::Month => "month",
            DurationUnit::Months => "months",
            DurationUnit::Year => "year",
            DurationUnit::Other => "month",
        };
        write!(f, "{}", s)
    }
}

/// A duration as purchased (e.g. 1.5 months, 30 days, 1 year)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DurationSpec {
    pub value: f64,
    pub unit: DurationUnit,
}

impl DurationSpec {
    pub fn new(value: f64, unit: DurationUnit) -> Self {
        Self { value, unit }
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_deserialize_lowercase() {
        let unit: DurationUnit = serde_json::from_str("\"days\"").unwrap();
        assert_eq!(unit, DurationUnit::Days);
        let unit: DurationUnit = serde_json::from_str("\"year\"").unwrap();
        assert_eq!(unit, DurationUnit::Year);
    }

    #[test]
    fn test_unknown_unit_falls_back() {
        let unit: DurationUnit = serde_json::from_str("\"fortnight\"").unwrap();
        assert_eq!(unit, DurationUnit::Other);
    }

    #[test]
    fn test_spec_display() {
        let spec = DurationSpec::new(1.5, DurationUnit::Months);
        assert_eq!(spec.to_string(), "1.5 months");
    }
}
