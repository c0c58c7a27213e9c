use analysis_core::{AnalysisError, Bar};
use serde::Serialize;

use crate::indicators::*;

pub const SMA_FAST: usize = 50;
pub const SMA_SLOW: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Long-term trend relative to the 200-day average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Bullish,
    Bearish,
    /// Fewer bars than the slow average needs.
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi < RSI_OVERSOLD {
            RsiZone::Oversold
        } else if rsi > RSI_OVERBOUGHT {
            RsiZone::Overbought
        } else {
            RsiZone::Neutral
        }
    }
}

/// Timing view of a price history: moving averages, RSI and what they say
/// about the latest close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSnapshot {
    pub last_close: f64,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi_14: Option<f64>,
    pub trend: Trend,
    pub rsi_zone: Option<RsiZone>,
    pub bars: usize,
}

impl TechnicalSnapshot {
    pub fn from_bars(bars: &[Bar]) -> Result<Self, AnalysisError> {
        let last = bars
            .last()
            .ok_or_else(|| AnalysisError::InsufficientData("No price history".to_string()))?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let sma_50 = latest(&sma(&closes, SMA_FAST));
        let sma_200 = latest(&sma(&closes, SMA_SLOW));
        let rsi_14 = latest(&rsi(&closes, RSI_PERIOD));

        let trend = match sma_200 {
            Some(slow) if last.close > slow => Trend::Bullish,
            Some(_) => Trend::Bearish,
            None => Trend::Undetermined,
        };

        Ok(Self {
            last_close: last.close,
            sma_50,
            sma_200,
            rsi_14,
            trend,
            rsi_zone: rsi_14.map(RsiZone::classify),
            bars: bars.len(),
        })
    }
}
