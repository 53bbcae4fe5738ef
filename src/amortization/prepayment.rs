//! Extra principal payments keyed by period

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MortgageError, Result};

/// Mapping from 1-based period to an extra principal payment
///
/// Periods without an entry carry no extra payment. Amounts are applied
/// before the regular payment of their period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrepaymentMap {
    payments: BTreeMap<u32, f64>,
}

impl PrepaymentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the extra payment for a period
    pub fn insert(&mut self, period: u32, amount: f64) -> Result<()> {
        if period == 0 {
            return Err(MortgageError::invalid("period", "periods are numbered from 1"));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(MortgageError::invalid(
                "prepayment",
                format!("amount {} for period {} must be zero or positive", amount, period),
            ));
        }
        self.payments.insert(period, amount);
        Ok(())
    }

    /// Extra payment scheduled for a period (0 when absent)
    pub fn get(&self, period: u32) -> f64 {
        self.payments.get(&period).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Entries in ascending period order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.payments.iter().map(|(&period, &amount)| (period, amount))
    }

    /// Sum of all scheduled amounts (before any clamping by the engine)
    pub fn total(&self) -> f64 {
        self.payments.values().sum()
    }

    /// Equal payments every `frequency` months for `intervals` intervals
    pub fn recurring(start: u32, frequency: u32, intervals: u32, amount: f64) -> Result<Self> {
        validate_recurrence(start, frequency)?;
        let mut map = Self::new();
        for month in recurrence_months(start, frequency).take(intervals as usize) {
            map.insert(month, amount)?;
        }
        Ok(map)
    }

    /// Equal payments every `frequency` months up to and including `last_month`
    pub fn recurring_until(start: u32, frequency: u32, last_month: u32, amount: f64) -> Result<Self> {
        validate_recurrence(start, frequency)?;
        let mut map = Self::new();
        for month in recurrence_months(start, frequency).take_while(|&m| m <= last_month) {
            map.insert(month, amount)?;
        }
        Ok(map)
    }

    /// One amount per interval, in order
    pub fn custom(start: u32, frequency: u32, amounts: &[f64]) -> Result<Self> {
        validate_recurrence(start, frequency)?;
        let mut map = Self::new();
        for (month, &amount) in recurrence_months(start, frequency).zip(amounts) {
            map.insert(month, amount)?;
        }
        Ok(map)
    }
}

impl FromIterator<(u32, f64)> for PrepaymentMap {
    /// Collect without validation; the engine treats non-positive amounts as absent
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self {
            payments: iter.into_iter().collect(),
        }
    }
}

fn validate_recurrence(start: u32, frequency: u32) -> Result<()> {
    if start == 0 {
        return Err(MortgageError::invalid("start_month", "periods are numbered from 1"));
    }
    if frequency == 0 {
        return Err(MortgageError::invalid("frequency_months", "must be at least one month"));
    }
    Ok(())
}

/// `start, start + frequency, start + 2 * frequency, ...` until u32 overflow
fn recurrence_months(start: u32, frequency: u32) -> impl Iterator<Item = u32> {
    std::iter::successors(Some(start), move |&m| m.checked_add(frequency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurring() {
        let map = PrepaymentMap::recurring(3, 12, 4, 1_000.0).unwrap();
        let months: Vec<u32> = map.iter().map(|(m, _)| m).collect();
        assert_eq!(months, vec![3, 15, 27, 39]);
        assert_eq!(map.get(15), 1_000.0);
        assert_eq!(map.get(16), 0.0);
        assert_eq!(map.total(), 4_000.0);
    }

    #[test]
    fn test_recurring_until_covers_whole_term() {
        let map = PrepaymentMap::recurring_until(1, 1, 360, 5_000.0).unwrap();
        assert_eq!(map.len(), 360);
        assert_eq!(map.get(1), 5_000.0);
        assert_eq!(map.get(360), 5_000.0);
        assert_eq!(map.get(361), 0.0);
    }

    #[test]
    fn test_custom_amounts() {
        let map = PrepaymentMap::custom(6, 6, &[100.0, 200.0, 300.0]).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(6), 100.0);
        assert_eq!(map.get(12), 200.0);
        assert_eq!(map.get(18), 300.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut map = PrepaymentMap::new();
        assert!(map.insert(0, 100.0).is_err());
        assert!(map.insert(1, -1.0).is_err());
        assert!(map.insert(1, f64::INFINITY).is_err());
        assert!(map.is_empty());

        assert!(PrepaymentMap::recurring(1, 0, 3, 100.0).is_err());
        assert!(PrepaymentMap::recurring(0, 12, 3, 100.0).is_err());
        assert!(PrepaymentMap::custom(1, 12, &[100.0, -5.0]).is_err());
    }

    #[test]
    fn test_json_uses_period_keys() {
        let map = PrepaymentMap::recurring(1, 12, 2, 750.0).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":750.0,"13":750.0}"#);

        let back: PrepaymentMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
