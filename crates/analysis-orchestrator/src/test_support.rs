use analysis_core::{
    fields, AnalysisError, Bar, FinancialStatement, HistoryRange, MarketDataProvider, QuoteSnapshot, StatementBundle,
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory provider. Unknown tickers fail like a dead symbol would.
#[derive(Default)]
pub struct FakeProvider {
    bundles: HashMap<String, StatementBundle>,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticker(mut self, symbol: &str, bundle: StatementBundle) -> Self {
        self.bundles.insert(symbol.to_string(), bundle);
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    /// Every fetch for `symbol` fails as unavailable with `reason`.
    pub fn with_failure(mut self, symbol: &str, reason: &str) -> Self {
        self.failures.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn bundle(&self, symbol: &str) -> Result<&StatementBundle, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(reason) = self.failures.get(symbol) {
            return Err(AnalysisError::ProviderUnavailable(reason.clone()));
        }
        self.bundles
            .get(symbol)
            .ok_or_else(|| AnalysisError::ProviderUnavailable(format!("{}: not found", symbol)))
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn fetch_financials(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError> {
        Ok(self.bundle(symbol).await?.income.clone())
    }

    async fn fetch_balance_sheet(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError> {
        Ok(self.bundle(symbol).await?.balance_sheet.clone())
    }

    async fn fetch_cashflow(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError> {
        Ok(self.bundle(symbol).await?.cash_flow.clone())
    }

    async fn fetch_quote_info(&self, symbol: &str) -> Result<QuoteSnapshot, AnalysisError> {
        Ok(self.bundle(symbol).await?.quote.clone())
    }

    async fn fetch_history(&self, symbol: &str, _range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        self.bundle(symbol).await?;
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Ok((0..252)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.5;
                Bar {
                    timestamp: start + ChronoDuration::days(i),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect())
    }
}

fn years() -> Vec<String> {
    (0..5).map(|i| (2024 - i).to_string()).collect()
}

/// Passes all ten pillars.
pub fn strong_bundle() -> StatementBundle {
    StatementBundle {
        income: FinancialStatement::new(years())
            .with_values("Total Revenue", &[120.0, 110.0, 100.0, 90.0, 70.0])
            .with_values("Net Income", &[30.0, 25.0, 20.0, 15.0, 10.0])
            .with_values("EBIT", &[20.0, 20.0, 20.0, 20.0, 20.0]),
        balance_sheet: FinancialStatement::new(years())
            .with_values("Cash And Cash Equivalents", &[60.0, 55.0, 50.0, 45.0, 40.0])
            .with_values("Long Term Debt", &[50.0, 50.0, 50.0, 50.0, 50.0])
            .with_values("Total Debt", &[50.0, 50.0, 50.0, 50.0, 50.0])
            .with_values("Total Non Current Liabilities Net Minority Interest", &[80.0; 5])
            .with_values("Stockholders Equity", &[100.0; 5])
            .with_values("Ordinary Shares Number", &[92.0, 94.0, 96.0, 98.0, 100.0]),
        cash_flow: FinancialStatement::new(years()).with_values("Free Cash Flow", &[10.0; 5]),
        quote: QuoteSnapshot::new()
            .with(fields::TOTAL_CASH, 100.0)
            .with(fields::TRAILING_PE, 15.0)
            .with(fields::MARKET_CAP, 150.0)
            .with(fields::SHARES_OUTSTANDING, 90.0)
            .with(fields::CURRENT_PRICE, 25.0)
            .with(fields::DIVIDEND_RATE, 1.0)
            .with(fields::PAYOUT_RATIO, 0.3),
    }
}

/// Fails growth and valuation pillars; still a legitimate verdict.
pub fn weak_bundle() -> StatementBundle {
    StatementBundle {
        income: FinancialStatement::new(years())
            .with_values("Total Revenue", &[70.0, 80.0, 90.0, 100.0, 120.0])
            .with_values("Net Income", &[-5.0, 1.0, 2.0, 3.0, 4.0]),
        quote: QuoteSnapshot::new()
            .with(fields::TOTAL_CASH, 10.0)
            .with(fields::TRAILING_PE, 80.0),
        ..Default::default()
    }
}
