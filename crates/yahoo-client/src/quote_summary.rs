use analysis_core::{AnalysisError, QuoteSnapshot};
use serde_json::Value;

/// Modules requested from quoteSummary. Earlier modules win when a key
/// appears in more than one.
pub const MODULES: &[&str] = &["financialData", "summaryDetail", "defaultKeyStatistics", "price"];

pub fn modules_param() -> String {
    MODULES.join(",")
}

/// Flatten a quoteSummary answer into a snapshot. Values arrive either bare
/// or wrapped as `{"raw": .., "fmt": ..}`; empty wrappers (`{}`) are absent.
pub fn parse_quote(symbol: &str, body: &Value) -> Result<QuoteSnapshot, AnalysisError> {
    let summary = body
        .get("quoteSummary")
        .ok_or_else(|| AnalysisError::InvalidData("quoteSummary: missing envelope".to_string()))?;

    if let Some(err) = summary.get("error").filter(|e| !e.is_null()) {
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AnalysisError::ProviderUnavailable(format!("{}: {}", symbol, description)));
    }

    let result = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .ok_or_else(|| AnalysisError::NoData(symbol.to_string()))?;

    let mut quote = QuoteSnapshot::new();
    for module in MODULES {
        let Some(fields) = result.get(*module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if quote.contains(key) || quote.get_text(key).is_some() {
                continue;
            }
            match value {
                Value::Number(n) => quote.insert(key.as_str(), n.as_f64()),
                Value::String(s) if !s.is_empty() => quote.insert_text(key.as_str(), s.as_str()),
                Value::Object(obj) => {
                    if let Some(raw) = obj.get("raw").and_then(Value::as_f64) {
                        quote.insert(key.as_str(), Some(raw));
                    }
                }
                _ => {}
            }
        }
    }
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::fields;
    use serde_json::json;

    #[test]
    fn test_parse_flattens_modules() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "financialData": {
                        "totalCash": {"raw": 6.5e10, "fmt": "65B"},
                        "currentPrice": {"raw": 190.5, "fmt": "190.50"},
                        "recommendationKey": "buy",
                        "debtToEquity": {}
                    },
                    "summaryDetail": {
                        "trailingPE": {"raw": 29.1, "fmt": "29.10"},
                        "dividendRate": {"raw": 0.96},
                        "currentPrice": {"raw": 1.0}
                    },
                    "defaultKeyStatistics": {
                        "sharesOutstanding": {"raw": 15.5e9},
                        "maxAge": 1
                    },
                    "price": {"longName": "Acme Inc.", "marketCap": {"raw": 3.0e12}}
                }],
                "error": null
            }
        });

        let quote = parse_quote("ACME", &body).unwrap();
        assert_eq!(quote.get(fields::TOTAL_CASH), Some(6.5e10));
        assert_eq!(quote.get(fields::TRAILING_PE), Some(29.1));
        assert_eq!(quote.get(fields::MARKET_CAP), Some(3.0e12));
        // First module wins.
        assert_eq!(quote.get(fields::CURRENT_PRICE), Some(190.5));
        assert_eq!(quote.get_text(fields::RECOMMENDATION_KEY), Some("buy"));
        assert_eq!(quote.get_text(fields::LONG_NAME), Some("Acme Inc."));
        // Empty wrapper stays absent rather than becoming 0.
        assert!(!quote.contains(fields::DEBT_TO_EQUITY));
    }

    #[test]
    fn test_parse_error_and_empty() {
        let not_found = json!({
            "quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}}
        });
        assert!(matches!(
            parse_quote("ZZZZ", &not_found),
            Err(AnalysisError::ProviderUnavailable(_))
        ));

        let empty = json!({"quoteSummary": {"result": [], "error": null}});
        assert!(matches!(parse_quote("ZZZZ", &empty), Err(AnalysisError::NoData(_))));
    }
}
