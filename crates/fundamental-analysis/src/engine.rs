use crate::{FieldResolver, LabelCatalog, MatchMode, Metric, Pillar, PillarContext, ValuationSummary};
use analysis_core::{ScoreCard, StatementBundle};
use serde::Serialize;

/// Runs the ten pillars against a bundle and folds them into a score card.
///
/// The engine holds no per-ticker state; the same bundle always produces the
/// same card, so it is shared freely across batch workers.
#[derive(Debug, Clone, Default)]
pub struct PillarEngine {
    catalog: LabelCatalog,
    match_mode: MatchMode,
}

impl PillarEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: LabelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn resolver(&self) -> FieldResolver<'_> {
        FieldResolver::new(&self.catalog, self.match_mode)
    }

    /// Evaluate every pillar in display order. A pillar that cannot be
    /// computed fails with "N/A" evidence; this never refuses input.
    pub fn evaluate(&self, ticker: &str, bundle: &StatementBundle) -> ScoreCard {
        let ctx = PillarContext::new(bundle, self.resolver());
        let results = Pillar::ALL.iter().map(|pillar| {
            let result = pillar.evaluate(&ctx).unwrap_or_else(|e| {
                tracing::debug!("{} {}: {}", ticker, pillar.name(), e);
                analysis_core::PillarResult::unavailable()
            });
            (pillar.name(), result)
        });
        ScoreCard::aggregate(ticker, results)
    }

    /// Per-period series for the revenue/net income and cash/debt charts.
    pub fn chart_figures(&self, bundle: &StatementBundle) -> ChartFigures {
        let resolver = self.resolver();
        let income = &bundle.income;
        let balance = &bundle.balance_sheet;

        // Oldest first, as plotted.
        let periods: Vec<String> = income.periods().iter().rev().cloned().collect();
        let income_series = |metric: Metric| -> Vec<Option<f64>> {
            let row = resolver.row(income, metric);
            (0..income.column_count())
                .rev()
                .map(|i| row.and_then(|r| r.value_at(i)))
                .collect()
        };
        let balance_series = |metric: Metric| -> Vec<Option<f64>> {
            let row = resolver.row(balance, metric);
            periods
                .iter()
                .map(|p| {
                    let idx = balance.column_for_period(p)?;
                    row?.value_at(idx)
                })
                .collect()
        };

        ChartFigures {
            revenue: income_series(Metric::TotalRevenue),
            net_income: income_series(Metric::NetIncome),
            cash: balance_series(Metric::Cash),
            total_debt: balance_series(Metric::TotalDebt),
            periods,
        }
    }
}

/// Chart series aligned to the income statement's periods, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartFigures {
    pub periods: Vec<String>,
    pub revenue: Vec<Option<f64>>,
    pub net_income: Vec<Option<f64>>,
    pub cash: Vec<Option<f64>>,
    pub total_debt: Vec<Option<f64>>,
}

/// Everything the single-ticker view shows.
#[derive(Debug, Clone, Serialize)]
pub struct PillarAnalysis {
    pub card: ScoreCard,
    pub figures: ChartFigures,
    pub valuation: ValuationSummary,
}
