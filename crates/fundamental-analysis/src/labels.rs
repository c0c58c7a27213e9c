//! Canonical metrics and the provider row labels known to carry them.
//!
//! Providers rename line items over time ("Long Term Debt" became
//! "Long Term Debt And Capital Lease Obligation" for some filers, etc.). All
//! of that knowledge lives here as data, ordered by preference, so that
//! pillars never hard-code a label.

use analysis_core::{AnalysisError, StatementKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the built-in catalog. Bump when synonyms change meaningfully.
pub const CATALOG_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalRevenue,
    NetIncome,
    Ebit,
    PretaxIncome,
    AverageShares,
    Cash,
    LongTermDebt,
    TotalDebt,
    NonCurrentLiabilities,
    StockholdersEquity,
    ShareCount,
    FreeCashFlow,
    OperatingCashFlow,
    CapitalExpenditure,
    DividendsPaid,
}

impl Metric {
    pub const ALL: [Metric; 15] = [
        Metric::TotalRevenue,
        Metric::NetIncome,
        Metric::Ebit,
        Metric::PretaxIncome,
        Metric::AverageShares,
        Metric::Cash,
        Metric::LongTermDebt,
        Metric::TotalDebt,
        Metric::NonCurrentLiabilities,
        Metric::StockholdersEquity,
        Metric::ShareCount,
        Metric::FreeCashFlow,
        Metric::OperatingCashFlow,
        Metric::CapitalExpenditure,
        Metric::DividendsPaid,
    ];

    /// Statement the metric is read from.
    pub fn statement(&self) -> StatementKind {
        match self {
            Metric::TotalRevenue
            | Metric::NetIncome
            | Metric::Ebit
            | Metric::PretaxIncome
            | Metric::AverageShares => StatementKind::Income,
            Metric::Cash
            | Metric::LongTermDebt
            | Metric::TotalDebt
            | Metric::NonCurrentLiabilities
            | Metric::StockholdersEquity
            | Metric::ShareCount => StatementKind::BalanceSheet,
            Metric::FreeCashFlow
            | Metric::OperatingCashFlow
            | Metric::CapitalExpenditure
            | Metric::DividendsPaid => StatementKind::CashFlow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::TotalRevenue => "total_revenue",
            Metric::NetIncome => "net_income",
            Metric::Ebit => "ebit",
            Metric::PretaxIncome => "pretax_income",
            Metric::AverageShares => "average_shares",
            Metric::Cash => "cash",
            Metric::LongTermDebt => "long_term_debt",
            Metric::TotalDebt => "total_debt",
            Metric::NonCurrentLiabilities => "non_current_liabilities",
            Metric::StockholdersEquity => "stockholders_equity",
            Metric::ShareCount => "share_count",
            Metric::FreeCashFlow => "free_cash_flow",
            Metric::OperatingCashFlow => "operating_cash_flow",
            Metric::CapitalExpenditure => "capital_expenditure",
            Metric::DividendsPaid => "dividends_paid",
        }
    }

    fn builtin_labels(&self) -> &'static [&'static str] {
        match self {
            Metric::TotalRevenue => &["Total Revenue", "Operating Revenue"],
            Metric::NetIncome => &[
                "Net Income",
                "Net Income Common Stockholders",
                "Net Income From Continuing Operation Net Minority Interest",
            ],
            Metric::Ebit => &["EBIT"],
            Metric::PretaxIncome => &["Pretax Income"],
            Metric::AverageShares => &["Diluted Average Shares", "Basic Average Shares"],
            Metric::Cash => &[
                "Cash And Cash Equivalents",
                "Cash Cash Equivalents And Short Term Investments",
                "Cash Financial",
            ],
            Metric::LongTermDebt => &[
                "Long Term Debt",
                "Long Term Debt And Capital Lease Obligation",
            ],
            Metric::TotalDebt => &["Total Debt"],
            Metric::NonCurrentLiabilities => &[
                "Total Non Current Liabilities Net Minority Interest",
                "Total Non Current Liabilities",
            ],
            Metric::StockholdersEquity => &[
                "Stockholders Equity",
                "Common Stock Equity",
                "Total Equity Gross Minority Interest",
            ],
            Metric::ShareCount => &["Ordinary Shares Number", "Share Issued"],
            Metric::FreeCashFlow => &["Free Cash Flow"],
            Metric::OperatingCashFlow => &[
                "Operating Cash Flow",
                "Cash Flow From Continuing Operating Activities",
            ],
            Metric::CapitalExpenditure => &["Capital Expenditure"],
            Metric::DividendsPaid => &["Cash Dividends Paid", "Common Stock Dividend Paid"],
        }
    }
}

/// Ordered synonym lists per metric, first entry preferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCatalog {
    pub version: u32,
    #[serde(default)]
    metrics: BTreeMap<Metric, Vec<String>>,
}

impl LabelCatalog {
    pub fn builtin() -> Self {
        let metrics = Metric::ALL
            .iter()
            .map(|m| (*m, m.builtin_labels().iter().map(|s| s.to_string()).collect()))
            .collect();
        Self {
            version: CATALOG_VERSION,
            metrics,
        }
    }

    /// Parse a catalog from JSON. Metrics the document omits keep their
    /// built-in synonyms; a metric listed with no synonyms is rejected.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let parsed: LabelCatalog = serde_json::from_str(json)
            .map_err(|e| AnalysisError::Config(format!("Invalid label catalog: {}", e)))?;

        let mut catalog = Self::builtin();
        catalog.version = parsed.version;
        for (metric, labels) in parsed.metrics {
            let labels: Vec<String> = labels
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            if labels.is_empty() {
                return Err(AnalysisError::Config(format!(
                    "Label catalog lists no synonyms for {}",
                    metric.as_str()
                )));
            }
            catalog.metrics.insert(metric, labels);
        }
        Ok(catalog)
    }

    pub fn labels(&self, metric: Metric) -> &[String] {
        self.metrics.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_metric() {
        let catalog = LabelCatalog::builtin();
        for metric in Metric::ALL {
            assert!(!catalog.labels(metric).is_empty(), "{:?} has no labels", metric);
        }
        assert_eq!(catalog.version, CATALOG_VERSION);
    }

    #[test]
    fn test_from_json_overrides_and_keeps_rest() {
        let json = r#"{"version": 7, "metrics": {"long_term_debt": ["LT Debt", "Long Term Debt"]}}"#;
        let catalog = LabelCatalog::from_json(json).unwrap();
        assert_eq!(catalog.version, 7);
        assert_eq!(catalog.labels(Metric::LongTermDebt), ["LT Debt", "Long Term Debt"]);
        assert_eq!(catalog.labels(Metric::TotalRevenue)[0], "Total Revenue");
    }

    #[test]
    fn test_from_json_rejects_empty_synonyms() {
        let json = r#"{"version": 2, "metrics": {"cash": ["  "]}}"#;
        assert!(LabelCatalog::from_json(json).is_err());
        assert!(LabelCatalog::from_json("not json").is_err());
    }

    #[test]
    fn test_metric_statement_kind() {
        assert_eq!(Metric::TotalRevenue.statement(), StatementKind::Income);
        assert_eq!(Metric::ShareCount.statement(), StatementKind::BalanceSheet);
        assert_eq!(Metric::CapitalExpenditure.statement(), StatementKind::CashFlow);
    }
}
