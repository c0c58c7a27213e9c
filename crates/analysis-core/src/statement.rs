use crate::QuoteSnapshot;
use serde::{Deserialize, Serialize};

/// Which of the three annual statements a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    BalanceSheet,
    CashFlow,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Income => "income",
            StatementKind::BalanceSheet => "balance_sheet",
            StatementKind::CashFlow => "cash_flow",
        }
    }
}

/// One provider-labelled line item across all periods of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl StatementRow {
    /// Cell at a column index. Missing columns and non-finite cells are absent.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten().filter(|v| v.is_finite())
    }
}

/// A table of named rows by reporting periods, most recent period first.
///
/// Row labels are whatever the provider calls them and change between tickers
/// and over time; look them up through the field resolver rather than by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    periods: Vec<String>,
    rows: Vec<StatementRow>,
}

impl FinancialStatement {
    pub fn new(periods: Vec<String>) -> Self {
        Self {
            periods,
            rows: Vec::new(),
        }
    }

    /// Builder form of [`push_row`](Self::push_row).
    pub fn with_row(mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.push_row(label, values);
        self
    }

    /// Builder for fully populated rows.
    pub fn with_values(self, label: impl Into<String>, values: &[f64]) -> Self {
        self.with_row(label, values.iter().map(|v| Some(*v)).collect())
    }

    /// Append a row. Values are padded or truncated to the period count and
    /// non-finite numbers are stored as absent.
    pub fn push_row(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) {
        let mut values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        values.resize(self.periods.len(), None);
        self.rows.push(StatementRow {
            label: label.into(),
            values,
        });
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.periods.len()
    }

    /// True when there is no period or no row to read from.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }

    /// Column holding the given period label, if this statement reports it.
    pub fn column_for_period(&self, period: &str) -> Option<usize> {
        self.periods.iter().position(|p| p == period)
    }

    /// Map a period offset to a column index. Non-negative offsets count from
    /// the most recent column, negative ones from the oldest (`-1` = oldest).
    pub fn column_index(&self, offset: isize) -> Option<usize> {
        let len = self.periods.len() as isize;
        let idx = if offset < 0 { len + offset } else { offset };
        if idx >= 0 && idx < len {
            Some(idx as usize)
        } else {
            None
        }
    }
}

/// Everything fetched for one ticker. Owned by the task evaluating it and
/// never mutated once handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementBundle {
    pub income: FinancialStatement,
    pub balance_sheet: FinancialStatement,
    pub cash_flow: FinancialStatement,
    pub quote: QuoteSnapshot,
}

impl StatementBundle {
    pub fn statement(&self, kind: StatementKind) -> &FinancialStatement {
        match kind {
            StatementKind::Income => &self.income,
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }
}
