use analysis_core::{fields, QuoteSnapshot};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "excellent",
            Rating::Good => "good",
            Rating::Fair => "fair",
            Rating::Weak => "weak",
        }
    }
}

/// Quick or current ratio.
pub fn rate_liquidity(ratio: f64) -> Rating {
    if ratio > 1.2 {
        Rating::Good
    } else if ratio >= 0.9 {
        Rating::Fair
    } else {
        Rating::Weak
    }
}

/// Debt-to-equity as a plain ratio (1.5, not 150).
pub fn rate_debt_to_equity(ratio: f64) -> Rating {
    if ratio < 1.0 {
        Rating::Good
    } else if ratio <= 2.0 {
        Rating::Fair
    } else {
        Rating::Weak
    }
}

/// ROE or ROA in percent.
pub fn rate_returns(pct: f64) -> Rating {
    if pct >= 12.0 {
        Rating::Excellent
    } else if pct >= 9.0 {
        Rating::Good
    } else if pct >= 6.0 {
        Rating::Fair
    } else {
        Rating::Weak
    }
}

/// One row of the peer comparison table. Ratios are plain, percentages are
/// already multiplied by 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthRow {
    pub ticker: String,
    pub market_cap: Option<f64>,
    pub pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub peg: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub current_ratio: Option<f64>,
    pub roe_pct: Option<f64>,
    pub roa_pct: Option<f64>,
    pub gross_margin_pct: Option<f64>,
    pub operating_margin_pct: Option<f64>,
    pub profit_margin_pct: Option<f64>,
    pub dividend_yield_pct: Option<f64>,
    pub payout_pct: Option<f64>,
    pub recommendation: String,
}

/// Ratings for the colour-coded columns; `None` where the value is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HealthRatings {
    pub debt_to_equity: Option<Rating>,
    pub quick_ratio: Option<Rating>,
    pub current_ratio: Option<Rating>,
    pub roe: Option<Rating>,
    pub roa: Option<Rating>,
}

impl HealthRow {
    pub fn from_quote(ticker: impl Into<String>, quote: &QuoteSnapshot) -> Self {
        let pct = |key: &str| quote.get(key).map(|v| v * 100.0);

        Self {
            ticker: ticker.into(),
            market_cap: quote.get(fields::MARKET_CAP),
            pe: quote.get(fields::TRAILING_PE),
            price_to_book: quote.get(fields::PRICE_TO_BOOK),
            price_to_sales: quote.get(fields::PRICE_TO_SALES),
            peg: quote.get(fields::PEG_RATIO),
            // Reported as a percentage (150 means 1.5x).
            debt_to_equity: quote.get(fields::DEBT_TO_EQUITY).map(|v| v / 100.0),
            quick_ratio: quote.get(fields::QUICK_RATIO),
            current_ratio: quote.get(fields::CURRENT_RATIO),
            roe_pct: pct(fields::RETURN_ON_EQUITY),
            roa_pct: pct(fields::RETURN_ON_ASSETS),
            gross_margin_pct: pct(fields::GROSS_MARGINS),
            operating_margin_pct: pct(fields::OPERATING_MARGINS),
            profit_margin_pct: pct(fields::PROFIT_MARGINS),
            dividend_yield_pct: quote
                .get_any(&[fields::DIVIDEND_YIELD, fields::TRAILING_ANNUAL_DIVIDEND_YIELD])
                .map(|v| v * 100.0),
            payout_pct: pct(fields::PAYOUT_RATIO),
            recommendation: quote
                .get_text(fields::RECOMMENDATION_KEY)
                .map(title_case)
                .unwrap_or_else(|| "-".to_string()),
        }
    }

    pub fn ratings(&self) -> HealthRatings {
        HealthRatings {
            debt_to_equity: self.debt_to_equity.map(rate_debt_to_equity),
            quick_ratio: self.quick_ratio.map(rate_liquidity),
            current_ratio: self.current_ratio.map(rate_liquidity),
            roe: self.roe_pct.map(rate_returns),
            roa: self.roa_pct.map(rate_returns),
        }
    }
}

/// `strong_buy` -> `Strong Buy`.
fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_boundaries() {
        assert_eq!(rate_liquidity(1.2), Rating::Fair);
        assert_eq!(rate_liquidity(1.21), Rating::Good);
        assert_eq!(rate_liquidity(0.9), Rating::Fair);
        assert_eq!(rate_liquidity(0.89), Rating::Weak);

        assert_eq!(rate_debt_to_equity(0.99), Rating::Good);
        assert_eq!(rate_debt_to_equity(1.0), Rating::Fair);
        assert_eq!(rate_debt_to_equity(2.0), Rating::Fair);
        assert_eq!(rate_debt_to_equity(2.01), Rating::Weak);

        assert_eq!(rate_returns(12.0), Rating::Excellent);
        assert_eq!(rate_returns(9.0), Rating::Good);
        assert_eq!(rate_returns(6.0), Rating::Fair);
        assert_eq!(rate_returns(5.9), Rating::Weak);
    }

    #[test]
    fn test_row_normalization() {
        let quote = QuoteSnapshot::new()
            .with(fields::DEBT_TO_EQUITY, 150.0)
            .with(fields::RETURN_ON_EQUITY, 0.25)
            .with(fields::TRAILING_ANNUAL_DIVIDEND_YIELD, 0.015)
            .with(fields::QUICK_RATIO, 0.8)
            .with(fields::MARKET_CAP, 2.0e12)
            .with_text(fields::RECOMMENDATION_KEY, "strong_buy");
        let row = HealthRow::from_quote("MSFT", &quote);

        assert_eq!(row.debt_to_equity, Some(1.5));
        assert_eq!(row.roe_pct, Some(25.0));
        assert_eq!(row.dividend_yield_pct, Some(1.5));
        assert_eq!(row.market_cap, Some(2.0e12));
        assert_eq!(row.roa_pct, None);
        assert_eq!(row.recommendation, "Strong Buy");

        let ratings = row.ratings();
        assert_eq!(ratings.debt_to_equity, Some(Rating::Fair));
        assert_eq!(ratings.quick_ratio, Some(Rating::Weak));
        assert_eq!(ratings.roe, Some(Rating::Excellent));
        assert_eq!(ratings.current_ratio, None);
    }

    #[test]
    fn test_missing_recommendation() {
        let row = HealthRow::from_quote("X", &QuoteSnapshot::new());
        assert_eq!(row.recommendation, "-");
        assert_eq!(row.ratings(), HealthRatings::default());
    }
}
