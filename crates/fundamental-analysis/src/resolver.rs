use crate::{LabelCatalog, Metric};
use analysis_core::{FinancialStatement, PillarError, StatementRow};
use serde::{Deserialize, Serialize};

/// How far the resolver may stray from an exact row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Only exact label matches.
    #[default]
    Exact,
    /// Exact matches first; if none of the candidates matches exactly, the
    /// first row whose label contains a candidate (case-insensitive). Lower
    /// confidence: "Cash" also hits "Cash Flow From Financing".
    ExactThenContains,
}

/// First row whose label matches a candidate, candidates tried in order.
pub fn find_row<'a, S: AsRef<str>>(
    table: &'a FinancialStatement,
    candidates: &[S],
    mode: MatchMode,
) -> Option<&'a StatementRow> {
    let exact = candidates.iter().find_map(|c| {
        let c = c.as_ref();
        table.rows().iter().find(|r| r.label == c)
    });
    if exact.is_some() || mode == MatchMode::Exact {
        return exact;
    }

    candidates.iter().find_map(|c| {
        let needle = c.as_ref().trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        table
            .rows()
            .iter()
            .find(|r| r.label.to_lowercase().contains(&needle))
    })
}

/// Value of the first matching row at `period_offset` (negative counts from
/// the oldest column). `None` when no row matches, the column doesn't exist or
/// the cell is empty. Never falls through to a later candidate because a cell
/// was empty.
pub fn resolve<S: AsRef<str>>(
    table: &FinancialStatement,
    candidates: &[S],
    period_offset: isize,
    mode: MatchMode,
) -> Option<f64> {
    let row = find_row(table, candidates, mode)?;
    let idx = table.column_index(period_offset)?;
    row.value_at(idx)
}

/// Resolver bound to a label catalog and match mode.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    catalog: &'a LabelCatalog,
    mode: MatchMode,
}

impl<'a> FieldResolver<'a> {
    pub fn new(catalog: &'a LabelCatalog, mode: MatchMode) -> Self {
        Self { catalog, mode }
    }

    pub fn row<'t>(&self, table: &'t FinancialStatement, metric: Metric) -> Option<&'t StatementRow> {
        find_row(table, self.catalog.labels(metric), self.mode)
    }

    pub fn value(&self, table: &FinancialStatement, metric: Metric, period_offset: isize) -> Option<f64> {
        resolve(table, self.catalog.labels(metric), period_offset, self.mode)
    }

    /// Like [`value`](Self::value) but absent becomes `MissingField`.
    pub fn require(
        &self,
        table: &FinancialStatement,
        metric: Metric,
        period_offset: isize,
    ) -> Result<f64, PillarError> {
        self.value(table, metric, period_offset)
            .ok_or_else(|| PillarError::MissingField(format!("{}[{}]", metric.as_str(), period_offset)))
    }
}
