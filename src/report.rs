//! Top-N ranking of symbols by accumulated sale value.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::summary::SalesSummary;

/// Number of symbols reported when the caller does not say otherwise.
pub const DEFAULT_TOP_N: usize = 10;

/// One ranked symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSales {
    pub ticker: String,
    pub value: u64,
}

/// Ranked symbols, highest sale value first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopN {
    /// Requested N
    pub requested: usize,

    /// Ranked entries (at most `requested`)
    pub entries: Vec<SymbolSales>,
}

impl TopN {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SymbolSales> {
        self.entries.iter()
    }

    /// Tickers in rank order.
    pub fn tickers(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.ticker.as_str()).collect()
    }
}

/// Rank the `n` symbols with the largest totals.
///
/// Ties on value are ordered by ticker ascending. Fewer than `n` symbols
/// yields all of them.
///
/// # Example
/// ```
/// use pitch_sales::{top_n, SalesSummary};
///
/// let summary: SalesSummary = [("MSFT", 10), ("AAPL", 30), ("IBM", 10)].into_iter().collect();
/// let top = top_n(&summary, 2);
/// assert_eq!(top.tickers(), vec!["AAPL", "IBM"]);
/// ```
pub fn top_n(summary: &SalesSummary, n: usize) -> TopN {
    let mut ranked: Vec<(&str, u64)> = summary.iter().collect();
    ranked.sort_unstable_by_key(|&(ticker, value)| (Reverse(value), ticker));
    ranked.truncate(n);

    TopN {
        requested: n,
        entries: ranked
            .into_iter()
            .map(|(ticker, value)| SymbolSales {
                ticker: ticker.to_string(),
                value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(pairs: &[(&str, u64)]) -> SalesSummary {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_orders_by_value_desc() {
        let s = summary(&[("B", 5), ("A", 50), ("C", 20)]);
        let top = top_n(&s, 10);
        assert_eq!(top.tickers(), vec!["A", "C", "B"]);
        assert_eq!(top.entries[0].value, 50);
        assert_eq!(top.requested, 10);
    }

    #[test]
    fn test_ties_by_ticker_ascending() {
        let s = summary(&[("ZZZ", 7), ("AAA", 7), ("MMM", 7), ("TOP", 8)]);
        let top = top_n(&s, 3);
        assert_eq!(top.tickers(), vec!["TOP", "AAA", "MMM"]);
    }

    #[test]
    fn test_truncates_to_n() {
        let pairs: Vec<(String, u64)> = (0..25).map(|i| (format!("S{i:02}"), i)).collect();
        let s: SalesSummary = pairs.iter().map(|(t, v)| (t.as_str(), *v)).collect();

        let top = top_n(&s, DEFAULT_TOP_N);
        assert_eq!(top.len(), 10);
        assert_eq!(top.entries[0].ticker, "S24");
        assert_eq!(top.entries[9].ticker, "S15");
    }

    #[test]
    fn test_fewer_than_n() {
        let s = summary(&[("ONE", 1)]);
        assert_eq!(top_n(&s, 10).len(), 1);
        assert!(top_n(&SalesSummary::new(), 10).is_empty());
        assert!(top_n(&s, 0).is_empty());
    }

    #[test]
    fn test_serializes() {
        let top = top_n(&summary(&[("AAPL", 3)]), 1);
        let json = serde_json::to_string(&top).unwrap();
        assert_eq!(json, r#"{"requested":1,"entries":[{"ticker":"AAPL","value":3}]}"#);
    }
}
