use analysis_core::{FinancialStatement, PillarError};
use serde::Serialize;
use std::ops::Range;

/// Number of annual periods the rubric looks back over. Fixed by the
/// methodology, not per call.
pub const LOOKBACK_PERIODS: usize = 5;

/// Which columns count as "now" and "oldest" for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub current_offset: usize,
    pub oldest_offset: usize,
    pub period_count: usize,
}

impl PeriodWindow {
    pub fn for_columns(column_count: usize) -> Self {
        let period_count = column_count.min(LOOKBACK_PERIODS);
        Self {
            current_offset: 0,
            oldest_offset: period_count.saturating_sub(1),
            period_count,
        }
    }

    pub fn of(table: &FinancialStatement) -> Self {
        Self::for_columns(table.column_count())
    }

    /// True when "now" and "oldest" are distinct columns.
    pub fn has_history(&self) -> bool {
        self.oldest_offset > self.current_offset
    }

    /// Growth comparisons need two distinct periods; a single column is not
    /// a baseline of zero growth.
    pub fn require_history(&self) -> Result<(), PillarError> {
        if self.has_history() {
            Ok(())
        } else {
            Err(PillarError::InvalidPeriod {
                required: 2,
                available: self.period_count,
            })
        }
    }

    pub fn current(&self) -> isize {
        self.current_offset as isize
    }

    pub fn oldest(&self) -> isize {
        self.oldest_offset as isize
    }

    /// Column indices inside the lookback window, most recent first.
    pub fn indices(&self) -> Range<usize> {
        self.current_offset..self.period_count
    }
}
