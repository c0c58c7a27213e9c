use analysis_core::{
    AnalysisError, FinancialStatement, HistoryRange, MarketDataProvider, QuoteSnapshot, ScoreCard, StatementBundle,
    StatementKind,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use fundamental_analysis::{HealthRow, PillarAnalysis, PillarEngine, ValuationSummary};
use std::sync::Arc;
use technical_analysis::TechnicalSnapshot;

pub mod config;
pub mod screener;
pub use config::OrchestratorConfig;
pub use screener::{ComparisonReport, ScanReport, SkippedTicker, StockScreener};

#[cfg(test)]
mod test_support;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Fetches what the engine needs for a ticker and runs it.
///
/// Statements and quotes are cached per ticker for `cache_ttl_secs`, so a
/// `compare` right after a `scan` costs no extra requests.
pub struct PillarOrchestrator {
    provider: Arc<dyn MarketDataProvider>,
    engine: PillarEngine,
    config: OrchestratorConfig,
    /// Cache statements per (symbol, statement kind)
    statement_cache: DashMap<(String, StatementKind), CacheEntry<FinancialStatement>>,
    /// Cache quote snapshots per symbol
    quote_cache: DashMap<String, CacheEntry<QuoteSnapshot>>,
}

impl PillarOrchestrator {
    /// Build with the engine described by `config` (label catalog file and
    /// match mode).
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: OrchestratorConfig) -> Result<Self, AnalysisError> {
        let engine = config.build_engine()?;
        Ok(Self::with_engine(provider, config, engine))
    }

    pub fn with_engine(provider: Arc<dyn MarketDataProvider>, config: OrchestratorConfig, engine: PillarEngine) -> Self {
        Self {
            provider,
            engine,
            config,
            statement_cache: DashMap::new(),
            quote_cache: DashMap::new(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn engine(&self) -> &PillarEngine {
        &self.engine
    }

    /// Score card plus chart series and valuation estimates for one ticker.
    pub async fn analyze(&self, symbol: &str) -> Result<PillarAnalysis, AnalysisError> {
        let symbol = normalize_symbol(symbol)?;
        tracing::info!("Starting pillar analysis for {}", symbol);

        let bundle = self.fetch_bundle(&symbol).await?;
        let card = self.engine.evaluate(&symbol, &bundle);
        tracing::info!("{} scored {}/10", symbol, card.score());

        Ok(PillarAnalysis {
            figures: self.engine.chart_figures(&bundle),
            valuation: ValuationSummary::from_quote(&bundle.quote, &self.config.valuation),
            card,
        })
    }

    /// Score card only. Same card `analyze` would produce for the ticker.
    pub async fn score(&self, symbol: &str) -> Result<ScoreCard, AnalysisError> {
        let symbol = normalize_symbol(symbol)?;
        let bundle = self.fetch_bundle(&symbol).await?;
        Ok(self.engine.evaluate(&symbol, &bundle))
    }

    /// Peer comparison row from the quote snapshot.
    pub async fn health(&self, symbol: &str) -> Result<HealthRow, AnalysisError> {
        let symbol = normalize_symbol(symbol)?;
        let quote = self.get_quote(&symbol).await?;
        if quote.is_empty() {
            return Err(AnalysisError::NoData(symbol));
        }
        Ok(HealthRow::from_quote(symbol, &quote))
    }

    pub async fn technical(&self, symbol: &str, range: HistoryRange) -> Result<TechnicalSnapshot, AnalysisError> {
        let symbol = normalize_symbol(symbol)?;
        let bars = self.provider.fetch_history(&symbol, range).await?;
        if bars.is_empty() {
            return Err(AnalysisError::NoData(symbol));
        }
        TechnicalSnapshot::from_bars(&bars)
    }

    /// All four inputs for a ticker, fetched concurrently.
    ///
    /// Request timeouts belong to the provider, which knows how long a slot
    /// in its own rate limit takes to come free. Any fetch failing fails the
    /// ticker. Empty tables are fine except the
    /// income statement: without it there is nothing to grade.
    pub async fn fetch_bundle(&self, symbol: &str) -> Result<StatementBundle, AnalysisError> {
        let (income, balance_sheet, cash_flow, quote) = tokio::join!(
            self.get_statement(symbol, StatementKind::Income),
            self.get_statement(symbol, StatementKind::BalanceSheet),
            self.get_statement(symbol, StatementKind::CashFlow),
            self.get_quote(symbol),
        );
        let bundle = StatementBundle {
            income: income?,
            balance_sheet: balance_sheet?,
            cash_flow: cash_flow?,
            quote: quote?,
        };
        if bundle.income.column_count() == 0 {
            return Err(AnalysisError::NoData(symbol.to_string()));
        }
        Ok(bundle)
    }

    fn is_fresh(&self, cached_at: DateTime<Utc>) -> bool {
        (Utc::now() - cached_at).num_seconds() < self.config.cache_ttl_secs
    }

    /// Get one statement, using cached data when fresh
    pub async fn get_statement(&self, symbol: &str, kind: StatementKind) -> Result<FinancialStatement, AnalysisError> {
        let cache_key = (symbol.to_string(), kind);
        if let Some(entry) = self.statement_cache.get(&cache_key) {
            if self.is_fresh(entry.cached_at) {
                return Ok(entry.data.clone());
            }
        }

        let statement = match kind {
            StatementKind::Income => self.provider.fetch_financials(symbol).await?,
            StatementKind::BalanceSheet => self.provider.fetch_balance_sheet(symbol).await?,
            StatementKind::CashFlow => self.provider.fetch_cashflow(symbol).await?,
        };

        if self.config.cache_ttl_secs > 0 {
            self.statement_cache.insert(cache_key, CacheEntry {
                data: statement.clone(),
                cached_at: Utc::now(),
            });
        }

        Ok(statement)
    }

    /// Get the quote snapshot, using cached data when fresh
    pub async fn get_quote(&self, symbol: &str) -> Result<QuoteSnapshot, AnalysisError> {
        if let Some(entry) = self.quote_cache.get(symbol) {
            if self.is_fresh(entry.cached_at) {
                return Ok(entry.data.clone());
            }
        }

        let quote = self.provider.fetch_quote_info(symbol).await?;

        if self.config.cache_ttl_secs > 0 {
            self.quote_cache.insert(symbol.to_string(), CacheEntry {
                data: quote.clone(),
                cached_at: Utc::now(),
            });
        }

        Ok(quote)
    }
}

/// Trimmed, upper-cased ticker. Blank input is invalid.
pub fn normalize_symbol(symbol: &str) -> Result<String, AnalysisError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AnalysisError::InvalidData("empty ticker symbol".to_string()));
    }
    Ok(symbol)
}

/// Normalized tickers in input order, blanks and repeats dropped.
pub fn normalize_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tickers
        .iter()
        .filter_map(|t| normalize_symbol(t.as_ref()).ok())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{strong_bundle, FakeProvider};
    use std::time::Duration;

    fn orchestrator(provider: FakeProvider, config: OrchestratorConfig) -> (Arc<FakeProvider>, PillarOrchestrator) {
        let provider = Arc::new(provider);
        let orch = PillarOrchestrator::new(provider.clone(), config).unwrap();
        (provider, orch)
    }

    #[test]
    fn test_normalize_tickers() {
        let tickers = normalize_tickers(&[" aapl", "MSFT", "", "AAPL ", "  ", "brk-b"]);
        assert_eq!(tickers, ["AAPL", "MSFT", "BRK-B"]);
        assert!(normalize_symbol("   ").is_err());
    }

    #[tokio::test]
    async fn test_analyze_returns_card_figures_and_valuation() {
        let (_, orch) = orchestrator(
            FakeProvider::new().with_ticker("GOOD", strong_bundle()),
            OrchestratorConfig::default(),
        );
        let analysis = orch.analyze("good").await.unwrap();

        assert_eq!(analysis.card.ticker(), "GOOD");
        assert_eq!(analysis.card.score(), 10);
        assert_eq!(analysis.figures.periods.len(), 5);
        assert_eq!(analysis.figures.periods.first().map(String::as_str), Some("2020"));
        assert_eq!(analysis.valuation.price, Some(25.0));
    }

    #[tokio::test]
    async fn test_empty_income_is_no_data() {
        let (_, orch) = orchestrator(
            FakeProvider::new().with_ticker("SHELL", StatementBundle::default()),
            OrchestratorConfig::default(),
        );
        assert!(matches!(orch.analyze("SHELL").await, Err(AnalysisError::NoData(t)) if t == "SHELL"));
        assert!(matches!(orch.score("SHELL").await, Err(AnalysisError::NoData(_))));
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_provider_error() {
        let (_, orch) = orchestrator(FakeProvider::new(), OrchestratorConfig::default());
        assert!(matches!(
            orch.analyze("NOPE").await,
            Err(AnalysisError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_statements_are_cached() {
        let (provider, orch) = orchestrator(
            FakeProvider::new().with_ticker("GOOD", strong_bundle()),
            OrchestratorConfig::default(),
        );
        orch.score("GOOD").await.unwrap();
        orch.score("GOOD").await.unwrap();
        orch.health("GOOD").await.unwrap();
        // Three statements plus one quote, fetched once.
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let config = OrchestratorConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        let (provider, orch) = orchestrator(FakeProvider::new().with_ticker("GOOD", strong_bundle()), config);
        orch.score("GOOD").await.unwrap();
        orch.score("GOOD").await.unwrap();
        assert_eq!(provider.calls(), 8);
    }

    #[tokio::test]
    async fn test_slow_provider_is_not_cut_off() {
        let config = OrchestratorConfig {
            request_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let (_, orch) = orchestrator(
            FakeProvider::new()
                .with_ticker("SLOW", strong_bundle())
                .with_delay("SLOW", Duration::from_millis(150)),
            config,
        );
        assert_eq!(orch.score("SLOW").await.unwrap().score(), 10);
    }

    #[tokio::test]
    async fn test_provider_timeout_fails_the_ticker() {
        let (_, orch) = orchestrator(
            FakeProvider::new().with_failure("HUNG", "Yahoo request timed out after 8.0s"),
            OrchestratorConfig::default(),
        );
        match orch.score("HUNG").await {
            Err(AnalysisError::ProviderUnavailable(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout, got {:?}", other.map(|c| c.score())),
        }
    }

    #[tokio::test]
    async fn test_health_and_technical() {
        let (_, orch) = orchestrator(
            FakeProvider::new().with_ticker("GOOD", strong_bundle()),
            OrchestratorConfig::default(),
        );
        let row = orch.health("GOOD").await.unwrap();
        assert_eq!(row.ticker, "GOOD");
        assert_eq!(row.pe, Some(15.0));

        let snap = orch.technical("GOOD", HistoryRange::OneYear).await.unwrap();
        assert_eq!(snap.bars, 252);
        assert!(snap.sma_200.is_some());

        assert!(matches!(
            orch.technical("NOPE", HistoryRange::OneYear).await,
            Err(AnalysisError::ProviderUnavailable(_))
        ));
    }
}
