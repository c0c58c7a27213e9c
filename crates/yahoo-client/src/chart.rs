use analysis_core::{AnalysisError, Bar};
use chrono::DateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Daily bars, oldest first. Sessions without a close are dropped; other
/// missing prices fall back to the close.
pub fn parse_bars(symbol: &str, body: serde_json::Value) -> Result<Vec<Bar>, AnalysisError> {
    let envelope: ChartEnvelope = serde_json::from_value(body)
        .map_err(|e| AnalysisError::InvalidData(format!("chart: {}", e)))?;

    if let Some(err) = envelope.chart.error {
        return Err(AnalysisError::ProviderUnavailable(format!(
            "{}: {}",
            symbol,
            err.description.unwrap_or_else(|| "chart error".to_string())
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let series = result.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let mut bars: Vec<Bar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&series.close, i)?;
            Some(Bar {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                open: at(&series.open, i).unwrap_or(close),
                high: at(&series.high, i).unwrap_or(close),
                low: at(&series.low, i).unwrap_or(close),
                close,
                volume: at(&series.volume, i).unwrap_or(0.0),
            })
        })
        .collect();
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bars_skips_missing_close() {
        let body = json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "ACME"},
                    "timestamp": [1700179200, 1700092800, 1700265600],
                    "indicators": {"quote": [{
                        "open": [10.0, 9.0, null],
                        "high": [11.0, 9.5, null],
                        "low": [9.5, 8.5, null],
                        "close": [10.5, 9.2, null],
                        "volume": [1000, null, null]
                    }]}
                }],
                "error": null
            }
        });

        let bars = parse_bars("ACME", body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 9.2);
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(bars[1].close, 10.5);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn test_parse_bars_error() {
        let body = json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}
        });
        assert!(matches!(
            parse_bars("ZZZZ", body),
            Err(AnalysisError::ProviderUnavailable(_))
        ));
    }
}
