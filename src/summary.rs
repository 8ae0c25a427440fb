//! Per-symbol accumulator of realized sale value.

use ahash::AHashMap;
use serde::{Serialize, Serializer};

/// Running total of sale value per ticker.
///
/// Entries are created at zero on first sight of a ticker and only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSummary {
    totals: AHashMap<String, u64>,
}

impl SalesSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the total for `ticker`, creating the entry if absent.
    #[inline]
    pub fn record(&mut self, ticker: &str, value: u64) {
        match self.totals.get_mut(ticker) {
            Some(total) => *total = total.saturating_add(value),
            None => {
                self.totals.insert(ticker.to_string(), value);
            }
        }
    }

    /// Total for one ticker (`None` if never seen).
    pub fn get(&self, ticker: &str) -> Option<u64> {
        self.totals.get(ticker).copied()
    }

    /// Number of tickers seen.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Iterate over `(ticker, total)` pairs (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.totals.iter().map(|(t, v)| (t.as_str(), *v))
    }

    /// Sum over all tickers.
    pub fn total_value(&self) -> u64 {
        self.totals.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }
}

impl Serialize for SalesSummary {
    /// Serializes as a ticker-sorted map so output is stable.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted: std::collections::BTreeMap<&str, u64> = self.iter().collect();
        sorted.serialize(serializer)
    }
}

impl<'a> FromIterator<(&'a str, u64)> for SalesSummary {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut summary = SalesSummary::new();
        for (ticker, value) in iter {
            summary.record(ticker, value);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut summary = SalesSummary::new();
        summary.record("AAPL  ", 100);
        summary.record("AAPL  ", 50);
        summary.record("MSFT  ", 0);

        assert_eq!(summary.get("AAPL  "), Some(150));
        assert_eq!(summary.get("MSFT  "), Some(0));
        assert_eq!(summary.get("IBM   "), None);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.total_value(), 150);
    }

    #[test]
    fn test_serialize_sorted() {
        let summary: SalesSummary = [("ZZZ", 1), ("AAA", 2)].into_iter().collect();
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"AAA":2,"ZZZ":1}"#);
    }
}
