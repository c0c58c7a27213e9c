use analysis_core::{fields, QuoteSnapshot};
use serde::{Deserialize, Serialize};

/// Inputs to the DCF projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    /// Used when the quote carries no earnings growth.
    pub default_growth: f64,
    pub min_growth: f64,
    pub max_growth: f64,
    pub discount_rate: f64,
    pub terminal_growth: f64,
    pub years: u32,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            default_growth: 0.03,
            min_growth: -0.05,
            max_growth: 0.25,
            discount_rate: 0.10,
            terminal_growth: 0.03,
            years: 5,
        }
    }
}

/// Present value per share of `years` of growing free cash flow plus a
/// Gordon terminal value.
pub fn dcf_value_per_share(
    fcf: f64,
    shares: f64,
    growth: f64,
    discount: f64,
    terminal_growth: f64,
    years: u32,
) -> Option<f64> {
    if shares <= 0.0 || fcf <= 0.0 || discount <= terminal_growth {
        return None;
    }
    let fcf_per_share = fcf / shares;
    let years = years as i32;

    let projected: f64 = (1..=years)
        .map(|i| fcf_per_share * (1.0_f64 + growth).powi(i) / (1.0_f64 + discount).powi(i))
        .sum();
    let terminal_value =
        fcf_per_share * (1.0_f64 + growth).powi(years) * (1.0 + terminal_growth) / (discount - terminal_growth);
    let terminal_pv = terminal_value / (1.0_f64 + discount).powi(years);
    Some(projected + terminal_pv)
}

/// Peter Lynch fair value: EPS times (growth % + dividend yield %).
pub fn lynch_fair_value(eps: f64, growth_pct: f64, dividend_yield_pct: f64) -> Option<f64> {
    if eps <= 0.0 {
        return None;
    }
    Some(eps * (growth_pct + dividend_yield_pct))
}

pub fn graham_number(eps: f64, book_value_per_share: f64) -> Option<f64> {
    if eps <= 0.0 || book_value_per_share <= 0.0 {
        return None;
    }
    Some((22.5 * eps * book_value_per_share).sqrt())
}

/// Fair value estimates shown beside the score card. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValuationSummary {
    pub price: Option<f64>,
    pub dcf: Option<f64>,
    pub lynch: Option<f64>,
    pub graham: Option<f64>,
}

impl ValuationSummary {
    pub fn from_quote(quote: &QuoteSnapshot, assumptions: &ValuationAssumptions) -> Self {
        let eps = quote.get(fields::TRAILING_EPS);
        let growth = quote.get(fields::EARNINGS_GROWTH);

        let dcf = match (quote.get(fields::FREE_CASHFLOW), quote.get(fields::SHARES_OUTSTANDING)) {
            (Some(fcf), Some(shares)) => {
                let g = growth
                    .unwrap_or(assumptions.default_growth)
                    .clamp(assumptions.min_growth, assumptions.max_growth);
                dcf_value_per_share(
                    fcf,
                    shares,
                    g,
                    assumptions.discount_rate,
                    assumptions.terminal_growth,
                    assumptions.years,
                )
            }
            _ => None,
        };

        let lynch = match (eps, growth) {
            (Some(eps), Some(g)) => {
                let yield_pct = quote.get(fields::DIVIDEND_YIELD).unwrap_or(0.0) * 100.0;
                lynch_fair_value(eps, g * 100.0, yield_pct)
            }
            _ => None,
        };

        let graham = match (eps, quote.get(fields::BOOK_VALUE)) {
            (Some(eps), Some(bvps)) => graham_number(eps, bvps),
            _ => None,
        };

        Self {
            price: quote.get(fields::CURRENT_PRICE),
            dcf,
            lynch,
            graham,
        }
    }
}
