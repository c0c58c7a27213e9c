//! Annual statements from the fundamentals timeseries endpoint.
//!
//! The endpoint answers one series per requested type key
//! (`annualTotalRevenue`, ...). Each series is a list of dated points; the
//! statement is rebuilt by pivoting those points into period columns.

use analysis_core::{AnalysisError, FinancialStatement, StatementKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const ANNUAL_PREFIX: &str = "annual";

/// Type keys requested per statement, in the order rows are emitted.
pub fn type_keys(kind: StatementKind) -> &'static [&'static str] {
    match kind {
        StatementKind::Income => &[
            "TotalRevenue",
            "OperatingRevenue",
            "GrossProfit",
            "OperatingIncome",
            "EBIT",
            "PretaxIncome",
            "NetIncome",
            "NetIncomeCommonStockholders",
            "NetIncomeFromContinuingOperationNetMinorityInterest",
            "DilutedEPS",
            "DilutedAverageShares",
            "BasicAverageShares",
        ],
        StatementKind::BalanceSheet => &[
            "TotalAssets",
            "CashAndCashEquivalents",
            "CashCashEquivalentsAndShortTermInvestments",
            "CashFinancial",
            "LongTermDebt",
            "LongTermDebtAndCapitalLeaseObligation",
            "TotalDebt",
            "TotalNonCurrentLiabilitiesNetMinorityInterest",
            "StockholdersEquity",
            "CommonStockEquity",
            "TotalEquityGrossMinorityInterest",
            "OrdinarySharesNumber",
            "ShareIssued",
        ],
        StatementKind::CashFlow => &[
            "OperatingCashFlow",
            "CashFlowFromContinuingOperatingActivities",
            "CapitalExpenditure",
            "FreeCashFlow",
            "CashDividendsPaid",
            "CommonStockDividendPaid",
        ],
    }
}

/// Comma separated `type` query parameter for a statement.
pub fn type_param(kind: StatementKind) -> String {
    type_keys(kind)
        .iter()
        .map(|k| format!("{}{}", ANNUAL_PREFIX, k))
        .collect::<Vec<_>>()
        .join(",")
}

/// `TotalRevenue` -> `Total Revenue`; acronyms stay together (`EBIT`,
/// `NetPPE` -> `Net PPE`).
pub fn spaced_label(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Deserialize)]
struct TimeseriesEnvelope {
    timeseries: TimeseriesBody,
}

#[derive(Debug, Deserialize)]
struct TimeseriesBody {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DataPoint {
    #[serde(rename = "asOfDate")]
    as_of_date: String,
    #[serde(rename = "periodType", default)]
    period_type: Option<String>,
    #[serde(rename = "reportedValue", default)]
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: Option<f64>,
}

/// Pivot a timeseries response into a statement, most recent period first.
/// Unknown or empty series are skipped; an answer with no series at all is an
/// empty statement, not an error.
pub fn parse_statement(kind: StatementKind, body: &Value) -> Result<FinancialStatement, AnalysisError> {
    let envelope: TimeseriesEnvelope = serde_json::from_value(body.clone())
        .map_err(|e| AnalysisError::InvalidData(format!("timeseries: {}", e)))?;
    if let Some(err) = envelope.timeseries.error.filter(|e| !e.is_null()) {
        return Err(AnalysisError::ProviderUnavailable(format!("timeseries error: {}", err)));
    }

    let mut series: BTreeMap<&str, BTreeMap<String, f64>> = BTreeMap::new();
    let mut periods: BTreeSet<String> = BTreeSet::new();

    for result in envelope.timeseries.result.iter().flatten() {
        for &key in type_keys(kind) {
            let field = format!("{}{}", ANNUAL_PREFIX, key);
            let Some(points) = result.get(&field).and_then(Value::as_array) else {
                continue;
            };
            for point in points.iter().filter(|p| !p.is_null()) {
                let Ok(point) = serde_json::from_value::<DataPoint>(point.clone()) else {
                    tracing::debug!("Skipping malformed {} point", field);
                    continue;
                };
                if point.period_type.as_deref().map_or(false, |p| p != "12M") {
                    continue;
                }
                let Some(value) = point.reported_value.and_then(|v| v.raw) else {
                    continue;
                };
                periods.insert(point.as_of_date.clone());
                series.entry(key).or_default().insert(point.as_of_date, value);
            }
        }
    }

    let periods: Vec<String> = periods.into_iter().rev().collect();
    let mut statement = FinancialStatement::new(periods.clone());
    for &key in type_keys(kind) {
        if let Some(points) = series.get(&key) {
            let values = periods.iter().map(|p| points.get(p).copied()).collect();
            statement.push_row(spaced_label(key), values);
        }
    }
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(date: &str, raw: f64) -> Value {
        json!({
            "asOfDate": date,
            "periodType": "12M",
            "currencyCode": "USD",
            "reportedValue": {"raw": raw, "fmt": "x"}
        })
    }

    #[test]
    fn test_spaced_label() {
        assert_eq!(spaced_label("TotalRevenue"), "Total Revenue");
        assert_eq!(spaced_label("EBIT"), "EBIT");
        assert_eq!(spaced_label("NetPPE"), "Net PPE");
        assert_eq!(spaced_label("DilutedEPS"), "Diluted EPS");
        assert_eq!(
            spaced_label("TotalNonCurrentLiabilitiesNetMinorityInterest"),
            "Total Non Current Liabilities Net Minority Interest"
        );
        assert_eq!(
            spaced_label("CashCashEquivalentsAndShortTermInvestments"),
            "Cash Cash Equivalents And Short Term Investments"
        );
    }

    #[test]
    fn test_type_param_prefixes_keys() {
        let param = type_param(StatementKind::CashFlow);
        assert!(param.starts_with("annualOperatingCashFlow,"));
        assert!(param.contains("annualFreeCashFlow"));
    }

    #[test]
    fn test_parse_pivots_points_newest_first() {
        let body = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": {"symbol": ["ACME"], "type": ["annualTotalRevenue"]},
                        "annualTotalRevenue": [point("2022-12-31", 90.0), null, point("2023-12-31", 100.0)]
                    },
                    {
                        "meta": {"symbol": ["ACME"], "type": ["annualEBIT"]},
                        "annualEBIT": [point("2023-12-31", 12.0)]
                    },
                    {
                        "meta": {"symbol": ["ACME"], "type": ["annualNetIncome"]}
                    }
                ],
                "error": null
            }
        });

        let statement = parse_statement(StatementKind::Income, &body).unwrap();
        assert_eq!(statement.periods(), ["2023-12-31", "2022-12-31"]);
        assert_eq!(statement.rows().len(), 2);
        assert_eq!(statement.rows()[0].label, "Total Revenue");
        assert_eq!(statement.rows()[0].values, vec![Some(100.0), Some(90.0)]);
        assert_eq!(statement.rows()[1].label, "EBIT");
        assert_eq!(statement.rows()[1].values, vec![Some(12.0), None]);
    }

    #[test]
    fn test_parse_ignores_non_annual_points() {
        let body = json!({
            "timeseries": {
                "result": [{
                    "annualFreeCashFlow": [
                        point("2023-12-31", 5.0),
                        {"asOfDate": "2024-03-31", "periodType": "3M", "reportedValue": {"raw": 1.0}}
                    ]
                }],
                "error": null
            }
        });
        let statement = parse_statement(StatementKind::CashFlow, &body).unwrap();
        assert_eq!(statement.periods(), ["2023-12-31"]);
    }

    #[test]
    fn test_parse_empty_result_is_empty_statement() {
        let body = json!({"timeseries": {"result": [], "error": null}});
        assert!(parse_statement(StatementKind::BalanceSheet, &body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_payload() {
        let body = json!({"timeseries": {"result": null, "error": {"code": "Bad Request"}}});
        assert!(matches!(
            parse_statement(StatementKind::Income, &body),
            Err(AnalysisError::ProviderUnavailable(_))
        ));
        assert!(parse_statement(StatementKind::Income, &json!({"nope": 1})).is_err());
    }
}
