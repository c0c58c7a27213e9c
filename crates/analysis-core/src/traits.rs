use async_trait::async_trait;
use crate::{AnalysisError, Bar, FinancialStatement, HistoryRange, QuoteSnapshot};

/// Source of raw statements and quote data for a ticker.
///
/// Every method may independently return an empty or partial result; the
/// engine treats emptiness as missing data rather than an error. `Err` is
/// reserved for the fetch itself failing.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Annual income statement, most recent period first.
    async fn fetch_financials(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError>;

    async fn fetch_balance_sheet(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError>;

    async fn fetch_cashflow(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError>;

    async fn fetch_quote_info(&self, symbol: &str) -> Result<QuoteSnapshot, AnalysisError>;

    /// Daily bars, oldest first.
    async fn fetch_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError>;
}
