use super::{normalize_tickers, PillarOrchestrator};
use analysis_core::{AnalysisError, ScoreCard};
use fundamental_analysis::HealthRow;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A ticker left out of a batch and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Input order. Use [`ranked`](Self::ranked) for display.
    pub cards: Vec<ScoreCard>,
    pub skipped: Vec<SkippedTicker>,
    pub total_requested: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ScanReport {
    /// Highest score first; ties keep input order.
    pub fn ranked(&self) -> Vec<&ScoreCard> {
        let mut ranked: Vec<&ScoreCard> = self.cards.iter().collect();
        ranked.sort_by(|a, b| b.score().cmp(&a.score()));
        ranked
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub rows: Vec<HealthRow>,
    pub skipped: Vec<SkippedTicker>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Batch front end over a shared orchestrator.
pub struct StockScreener {
    orchestrator: Arc<PillarOrchestrator>,
}

impl StockScreener {
    pub fn new(orchestrator: Arc<PillarOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Score every ticker. A ticker that cannot be fetched or has no income
    /// statement is skipped; it never affects the others.
    pub async fn scan<S: AsRef<str>>(&self, tickers: &[S]) -> ScanReport {
        let symbols = normalize_tickers(tickers);
        let total_requested = symbols.len();
        tracing::info!("📊 Starting pillar scan of {} symbols", total_requested);

        let (cards, skipped) = self
            .run_bounded(symbols, |orchestrator, symbol| async move { orchestrator.score(&symbol).await })
            .await;

        tracing::info!(
            "✅ Scan complete: {}/{} scored, {} skipped",
            cards.len(),
            total_requested,
            skipped.len()
        );

        ScanReport {
            cards,
            skipped,
            total_requested,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Health rows for side-by-side comparison, input order.
    pub async fn compare<S: AsRef<str>>(&self, tickers: &[S]) -> ComparisonReport {
        let symbols = normalize_tickers(tickers);
        tracing::info!("Comparing {} symbols", symbols.len());

        let (rows, skipped) = self
            .run_bounded(symbols, |orchestrator, symbol| async move { orchestrator.health(&symbol).await })
            .await;

        ComparisonReport {
            rows,
            skipped,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Run `job` per symbol with at most `concurrency` in flight. Results come
    /// back in input order regardless of completion order.
    async fn run_bounded<T, F, Fut>(&self, symbols: Vec<String>, job: F) -> (Vec<T>, Vec<SkippedTicker>)
    where
        T: Send + 'static,
        F: Fn(Arc<PillarOrchestrator>, String) -> Fut,
        Fut: Future<Output = Result<T, AnalysisError>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.orchestrator.config().concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (idx, symbol) in symbols.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = job(Arc::clone(&self.orchestrator), symbol.clone());
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => work.await,
                    Err(e) => Err(AnalysisError::ProviderUnavailable(e.to_string())),
                };
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Result<T, AnalysisError>>> = symbols.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => tracing::error!("Task error: {}", e),
            }
        }

        let mut done = Vec::with_capacity(symbols.len());
        let mut skipped = Vec::new();
        for (symbol, slot) in symbols.into_iter().zip(slots) {
            match slot {
                Some(Ok(value)) => done.push(value),
                Some(Err(e)) => {
                    tracing::warn!("Skipping {}: {}", symbol, e);
                    skipped.push(SkippedTicker {
                        ticker: symbol,
                        reason: e.to_string(),
                    });
                }
                None => skipped.push(SkippedTicker {
                    ticker: symbol,
                    reason: "analysis task failed".to_string(),
                }),
            }
        }
        (done, skipped)
    }
}
