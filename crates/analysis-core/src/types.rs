use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Lookback for price history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryRange {
    OneYear,
    TwoYears,
    FiveYears,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneYear => "1y",
            HistoryRange::TwoYears => "2y",
            HistoryRange::FiveYears => "5y",
        }
    }
}

impl Default for HistoryRange {
    fn default() -> Self {
        HistoryRange::TwoYears
    }
}

impl FromStr for HistoryRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1y" => Ok(HistoryRange::OneYear),
            "2y" => Ok(HistoryRange::TwoYears),
            "5y" => Ok(HistoryRange::FiveYears),
            other => Err(format!("Unknown history range: {} (expected 1y, 2y or 5y)", other)),
        }
    }
}

/// Verdict of one pillar. `evidence` is display text only and never feeds
/// the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarResult {
    pub passed: bool,
    pub evidence: String,
}

impl PillarResult {
    pub fn new(passed: bool, evidence: impl Into<String>) -> Self {
        Self {
            passed,
            evidence: evidence.into(),
        }
    }

    /// Fail-closed verdict used whenever inputs are unavailable.
    pub fn unavailable() -> Self {
        Self::new(false, "N/A")
    }
}

/// A pillar verdict paired with its display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedPillar {
    pub name: String,
    #[serde(flatten)]
    pub result: PillarResult,
}

/// Score for one ticker. Immutable once built; `score` always equals the
/// number of passed pillars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    ticker: String,
    pillars: Vec<NamedPillar>,
    score: u8,
}

impl ScoreCard {
    /// Sum passes into a score, one point per pillar, keeping insertion order.
    pub fn aggregate<I, S>(ticker: impl Into<String>, results: I) -> Self
    where
        I: IntoIterator<Item = (S, PillarResult)>,
        S: Into<String>,
    {
        let pillars: Vec<NamedPillar> = results
            .into_iter()
            .map(|(name, result)| NamedPillar {
                name: name.into(),
                result,
            })
            .collect();
        let score = pillars.iter().filter(|p| p.result.passed).count() as u8;
        Self {
            ticker: ticker.into(),
            pillars,
            score,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn pillars(&self) -> &[NamedPillar] {
        &self.pillars
    }

    pub fn get(&self, name: &str) -> Option<&PillarResult> {
        self.pillars.iter().find(|p| p.name == name).map(|p| &p.result)
    }

    pub fn passed(&self, name: &str) -> bool {
        self.get(name).map_or(false, |r| r.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_counts_passes_in_order() {
        let card = ScoreCard::aggregate(
            "CRM",
            vec![
                ("B", PillarResult::new(true, "1")),
                ("A", PillarResult::unavailable()),
                ("C", PillarResult::new(true, "3")),
            ],
        );
        assert_eq!(card.score(), 2);
        let names: Vec<&str> = card.pillars().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert!(card.passed("C"));
        assert!(!card.passed("A"));
        assert!(!card.passed("missing"));
        assert_eq!(card.get("A").map(|r| r.evidence.as_str()), Some("N/A"));
    }

    #[test]
    fn test_history_range_parse() {
        assert_eq!("5Y".parse::<HistoryRange>(), Ok(HistoryRange::FiveYears));
        assert!("3y".parse::<HistoryRange>().is_err());
        assert_eq!(HistoryRange::default().as_str(), "2y");
    }
}
