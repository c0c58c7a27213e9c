use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quote snapshot keys as the provider names them.
pub mod fields {
    pub const TRAILING_PE: &str = "trailingPE";
    pub const TOTAL_CASH: &str = "totalCash";
    pub const SHARES_OUTSTANDING: &str = "sharesOutstanding";
    pub const MARKET_CAP: &str = "marketCap";
    pub const DIVIDEND_RATE: &str = "dividendRate";
    pub const TRAILING_ANNUAL_DIVIDEND_RATE: &str = "trailingAnnualDividendRate";
    pub const PAYOUT_RATIO: &str = "payoutRatio";
    pub const CURRENT_PRICE: &str = "currentPrice";
    pub const TRAILING_EPS: &str = "trailingEps";
    pub const BOOK_VALUE: &str = "bookValue";
    pub const EARNINGS_GROWTH: &str = "earningsGrowth";
    pub const FREE_CASHFLOW: &str = "freeCashflow";
    pub const DIVIDEND_YIELD: &str = "dividendYield";
    pub const TRAILING_ANNUAL_DIVIDEND_YIELD: &str = "trailingAnnualDividendYield";
    pub const PRICE_TO_BOOK: &str = "priceToBook";
    pub const PRICE_TO_SALES: &str = "priceToSalesTrailing12Months";
    pub const PEG_RATIO: &str = "pegRatio";
    pub const DEBT_TO_EQUITY: &str = "debtToEquity";
    pub const QUICK_RATIO: &str = "quickRatio";
    pub const CURRENT_RATIO: &str = "currentRatio";
    pub const RETURN_ON_EQUITY: &str = "returnOnEquity";
    pub const RETURN_ON_ASSETS: &str = "returnOnAssets";
    pub const GROSS_MARGINS: &str = "grossMargins";
    pub const OPERATING_MARGINS: &str = "operatingMargins";
    pub const PROFIT_MARGINS: &str = "profitMargins";
    pub const RECOMMENDATION_KEY: &str = "recommendationKey";
    pub const LONG_NAME: &str = "longName";
}

/// Point-in-time key/value market data.
///
/// A key that is not present is ABSENT, which is never the same as `0.0`.
/// Non-finite numbers are refused on insert so they can't masquerade as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    values: BTreeMap<String, f64>,
    #[serde(default)]
    text: BTreeMap<String, String>,
}

impl QuoteSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert) for known-present values.
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, Some(value));
        self
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.insert(key.into(), value.into());
        self
    }

    /// Store a value; `None` and non-finite values leave the key absent.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<f64>) {
        let key = key.into();
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.values.insert(key, v);
            }
            None => {
                self.values.remove(&key);
            }
        }
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.text.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// First present value among `keys`.
    pub fn get_any(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.text.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_not_zero() {
        let q = QuoteSnapshot::new().with(fields::TRAILING_PE, 0.0);
        assert_eq!(q.get(fields::TRAILING_PE), Some(0.0));
        assert_eq!(q.get(fields::TOTAL_CASH), None);
    }

    #[test]
    fn test_non_finite_is_absent() {
        let mut q = QuoteSnapshot::new().with(fields::MARKET_CAP, 10.0);
        q.insert(fields::MARKET_CAP, Some(f64::INFINITY));
        q.insert(fields::TRAILING_PE, Some(f64::NAN));
        assert!(!q.contains(fields::MARKET_CAP));
        assert!(!q.contains(fields::TRAILING_PE));
        assert!(q.is_empty());
    }

    #[test]
    fn test_get_any_priority() {
        let q = QuoteSnapshot::new()
            .with(fields::TRAILING_ANNUAL_DIVIDEND_RATE, 0.5)
            .with(fields::DIVIDEND_RATE, 0.8);
        assert_eq!(
            q.get_any(&[fields::DIVIDEND_RATE, fields::TRAILING_ANNUAL_DIVIDEND_RATE]),
            Some(0.8)
        );
    }
}
