//! The ten Rule #1 pillars.
//!
//! Each pillar is a pure function of the statement bundle. A pillar returns
//! `Err` whenever an input it needs is absent or degenerate; the engine turns
//! that into a failed verdict, so no pillar ever "assumes pass" on missing
//! data. The one neutral baseline is Dividend Safety when nothing is paid.

use crate::{format_num, format_pct, FieldResolver, Metric, PeriodWindow};
use analysis_core::{fields, PillarError, PillarResult, StatementBundle};
use serde::Serialize;

/// Upper bound (exclusive) on trailing P/E.
pub const MAX_PE: f64 = 22.5;
/// Average ROIC, in percent, that must be exceeded.
pub const MIN_ROIC_PCT: f64 = 9.0;
/// Multiple of average free cash flow used as a conservative valuation.
pub const FCF_MULTIPLE: f64 = 20.0;
/// Payout ratio (fraction of earnings) that must not be reached.
pub const MAX_PAYOUT_RATIO: f64 = 1.0;
/// Denominators smaller than this are treated as zero.
pub const NEAR_ZERO: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pillar {
    RevenueGrowth,
    NetIncomeGrowth,
    CashGrowth,
    DebtCoverage,
    LiabilityCoverage,
    ValuationMultiple,
    ReturnOnInvestedCapital,
    ShareCountTrend,
    CashFlowValue,
    DividendSafety,
}

impl Pillar {
    /// Display order of the score card.
    pub const ALL: [Pillar; 10] = [
        Pillar::RevenueGrowth,
        Pillar::NetIncomeGrowth,
        Pillar::CashGrowth,
        Pillar::DebtCoverage,
        Pillar::LiabilityCoverage,
        Pillar::ValuationMultiple,
        Pillar::ReturnOnInvestedCapital,
        Pillar::ShareCountTrend,
        Pillar::CashFlowValue,
        Pillar::DividendSafety,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pillar::RevenueGrowth => "Revenue Growth",
            Pillar::NetIncomeGrowth => "Net Income Growth",
            Pillar::CashGrowth => "Cash Growth",
            Pillar::DebtCoverage => "Repay Debt",
            Pillar::LiabilityCoverage => "Cash > Liabilities",
            Pillar::ValuationMultiple => "PE Ratio",
            Pillar::ReturnOnInvestedCapital => "ROIC > 9%",
            Pillar::ShareCountTrend => "Share Buyback",
            Pillar::CashFlowValue => "FCF x20 > Market Cap",
            Pillar::DividendSafety => "Dividend Safety",
        }
    }

    /// One-line description for legends.
    pub fn description(&self) -> &'static str {
        match self {
            Pillar::RevenueGrowth => "Revenue grew over the lookback window",
            Pillar::NetIncomeGrowth => "Net income grew (a shrinking loss counts)",
            Pillar::CashGrowth => "Cash and equivalents grew",
            Pillar::DebtCoverage => "Total cash covers long-term debt",
            Pillar::LiabilityCoverage => "Total cash covers average non-current liabilities",
            Pillar::ValuationMultiple => "Trailing P/E is positive and below 22.5",
            Pillar::ReturnOnInvestedCapital => "Average return on invested capital above 9%",
            Pillar::ShareCountTrend => "Share count did not increase",
            Pillar::CashFlowValue => "20x average free cash flow exceeds market cap",
            Pillar::DividendSafety => "No dividend, or payout below 100% of earnings",
        }
    }

    pub fn evaluate(&self, ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
        match self {
            Pillar::RevenueGrowth => revenue_growth(ctx),
            Pillar::NetIncomeGrowth => net_income_growth(ctx),
            Pillar::CashGrowth => cash_growth(ctx),
            Pillar::DebtCoverage => debt_coverage(ctx),
            Pillar::LiabilityCoverage => liability_coverage(ctx),
            Pillar::ValuationMultiple => valuation_multiple(ctx),
            Pillar::ReturnOnInvestedCapital => return_on_invested_capital(ctx),
            Pillar::ShareCountTrend => share_count_trend(ctx),
            Pillar::CashFlowValue => cash_flow_value(ctx),
            Pillar::DividendSafety => dividend_safety(ctx),
        }
    }
}

/// Inputs shared by every pillar.
#[derive(Debug, Clone, Copy)]
pub struct PillarContext<'a> {
    pub bundle: &'a StatementBundle,
    pub resolver: FieldResolver<'a>,
}

impl<'a> PillarContext<'a> {
    pub fn new(bundle: &'a StatementBundle, resolver: FieldResolver<'a>) -> Self {
        Self { bundle, resolver }
    }

    fn quote(&self, key: &str) -> Result<f64, PillarError> {
        self.bundle
            .quote
            .get(key)
            .ok_or_else(|| PillarError::MissingField(key.to_string()))
    }
}

/// `(now - old) / old`, or `/ |old|` when `abs_base` is set.
fn growth_rate(now: f64, old: f64, abs_base: bool) -> Result<f64, PillarError> {
    let base = if abs_base { old.abs() } else { old };
    if base.abs() < NEAR_ZERO {
        return Err(PillarError::ArithmeticDegenerate(
            "growth against a zero baseline".to_string(),
        ));
    }
    Ok((now - old) / base)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Growth of one metric between the current and oldest column of its statement.
fn metric_growth(ctx: &PillarContext<'_>, metric: Metric, abs_base: bool) -> Result<PillarResult, PillarError> {
    let table = ctx.bundle.statement(metric.statement());
    let window = PeriodWindow::of(table);
    window.require_history()?;

    let now = ctx.resolver.require(table, metric, window.current())?;
    let old = ctx.resolver.require(table, metric, window.oldest())?;
    let growth = growth_rate(now, old, abs_base)?;
    Ok(PillarResult::new(growth > 0.0, format_pct(growth)))
}

fn revenue_growth(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    metric_growth(ctx, Metric::TotalRevenue, false)
}

fn net_income_growth(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    // abs() on the base so that a narrowing loss (-50 -> -10) reads as growth.
    metric_growth(ctx, Metric::NetIncome, true)
}

fn cash_growth(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    metric_growth(ctx, Metric::Cash, true)
}

fn debt_coverage(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let cash = ctx.quote(fields::TOTAL_CASH)?;
    let balance = &ctx.bundle.balance_sheet;

    // No debt line at all means no long-term debt. A debt line with an empty
    // current cell means the debt is unknown.
    let debt = match ctx.resolver.row(balance, Metric::LongTermDebt) {
        None => 0.0,
        Some(row) => row
            .value_at(0)
            .ok_or_else(|| PillarError::MissingField(Metric::LongTermDebt.as_str().to_string()))?,
    };

    Ok(PillarResult::new(
        cash >= debt,
        format!("Cash: {} vs Debt: {}", format_num(cash), format_num(debt)),
    ))
}

fn liability_coverage(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let cash = ctx.quote(fields::TOTAL_CASH)?;
    let balance = &ctx.bundle.balance_sheet;
    let row = ctx
        .resolver
        .row(balance, Metric::NonCurrentLiabilities)
        .ok_or_else(|| PillarError::MissingField(Metric::NonCurrentLiabilities.as_str().to_string()))?;

    let window = PeriodWindow::of(balance);
    let values: Vec<f64> = window.indices().filter_map(|i| row.value_at(i)).collect();
    let avg = mean(&values)
        .ok_or_else(|| PillarError::MissingField(Metric::NonCurrentLiabilities.as_str().to_string()))?;

    Ok(PillarResult::new(
        cash >= avg,
        format!("Cash: {} vs Avg Liab: {}", format_num(cash), format_num(avg)),
    ))
}

fn valuation_multiple(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let pe = ctx.quote(fields::TRAILING_PE)?;
    Ok(PillarResult::new(pe > 0.0 && pe < MAX_PE, format!("{:.2}", pe)))
}

fn return_on_invested_capital(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let income = &ctx.bundle.income;
    let balance = &ctx.bundle.balance_sheet;
    let window = PeriodWindow::of(income);

    let ebit_row = ctx
        .resolver
        .row(income, Metric::Ebit)
        .or_else(|| ctx.resolver.row(income, Metric::PretaxIncome))
        .ok_or_else(|| PillarError::MissingField(Metric::Ebit.as_str().to_string()))?;
    let equity_row = ctx
        .resolver
        .row(balance, Metric::StockholdersEquity)
        .ok_or_else(|| PillarError::MissingField(Metric::StockholdersEquity.as_str().to_string()))?;
    let debt_row = ctx.resolver.row(balance, Metric::TotalDebt);

    let mut samples = Vec::with_capacity(window.period_count);
    // The statements are fetched separately; pair each income period with
    // the balance-sheet column of the same period, never the same index.
    for (i, period) in income.periods().iter().enumerate().take(window.period_count) {
        let Some(j) = balance.column_for_period(period) else {
            continue;
        };
        let (Some(ebit), Some(equity)) = (ebit_row.value_at(i), equity_row.value_at(j)) else {
            continue;
        };
        let debt = match debt_row {
            None => 0.0,
            Some(row) => match row.value_at(j) {
                Some(d) => d,
                None => continue,
            },
        };
        let invested = equity + debt;
        if invested.abs() < NEAR_ZERO {
            continue;
        }
        samples.push(ebit / invested * 100.0);
    }

    let avg = mean(&samples).ok_or_else(|| {
        PillarError::ArithmeticDegenerate("no period with usable invested capital".to_string())
    })?;
    Ok(PillarResult::new(avg > MIN_ROIC_PCT, format!("{:.1}%", avg)))
}

fn share_count_trend(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let income = &ctx.bundle.income;
    let balance = &ctx.bundle.balance_sheet;
    let balance_window = PeriodWindow::of(balance);
    let income_window = PeriodWindow::of(income);

    let now = ctx
        .bundle
        .quote
        .get(fields::SHARES_OUTSTANDING)
        .or_else(|| ctx.resolver.value(balance, Metric::ShareCount, 0))
        .ok_or_else(|| PillarError::MissingField(fields::SHARES_OUTSTANDING.to_string()))?;

    let old_from_balance = if balance_window.has_history() {
        ctx.resolver.value(balance, Metric::ShareCount, balance_window.oldest())
    } else {
        None
    };
    let old = match old_from_balance {
        Some(v) => v,
        None => {
            income_window.require_history()?;
            ctx.resolver.require(income, Metric::AverageShares, income_window.oldest())?
        }
    };

    Ok(PillarResult::new(
        now <= old,
        format!("Now: {} vs Then: {}", format_num(now), format_num(old)),
    ))
}

fn cash_flow_value(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let cash_flow = &ctx.bundle.cash_flow;
    let window = PeriodWindow::of(cash_flow);

    let samples: Vec<f64> = match ctx.resolver.row(cash_flow, Metric::FreeCashFlow) {
        Some(fcf) => window.indices().filter_map(|i| fcf.value_at(i)).collect(),
        None => {
            // Capital expenditure is reported negative, so FCF is a sum.
            let ocf = ctx.resolver.row(cash_flow, Metric::OperatingCashFlow);
            let capex = ctx.resolver.row(cash_flow, Metric::CapitalExpenditure);
            match (ocf, capex) {
                (Some(ocf), Some(capex)) => window
                    .indices()
                    .filter_map(|i| Some(ocf.value_at(i)? + capex.value_at(i)?))
                    .collect(),
                _ => Vec::new(),
            }
        }
    };
    let avg_fcf = mean(&samples)
        .ok_or_else(|| PillarError::MissingField(Metric::FreeCashFlow.as_str().to_string()))?;
    let market_cap = ctx.quote(fields::MARKET_CAP)?;

    let value = avg_fcf * FCF_MULTIPLE;
    Ok(PillarResult::new(
        value > market_cap,
        format!("Value: {} vs Cap: {}", format_num(value), format_num(market_cap)),
    ))
}

fn dividend_safety(ctx: &PillarContext<'_>) -> Result<PillarResult, PillarError> {
    let quote = &ctx.bundle.quote;
    let rate = quote.get_any(&[fields::DIVIDEND_RATE, fields::TRAILING_ANNUAL_DIVIDEND_RATE]);
    if !rate.map_or(false, |r| r > 0.0) {
        return Ok(PillarResult::new(true, "No Div"));
    }

    if let Some(payout) = quote.get(fields::PAYOUT_RATIO) {
        return Ok(PillarResult::new(
            payout < MAX_PAYOUT_RATIO,
            format!("Payout: {}", format_pct(payout)),
        ));
    }

    // No payout ratio: fall back to whether cash on hand covers what was paid.
    let cash = ctx.quote(fields::TOTAL_CASH)?;
    let paid = ctx
        .resolver
        .require(&ctx.bundle.cash_flow, Metric::DividendsPaid, 0)?
        .abs();
    Ok(PillarResult::new(
        cash > paid,
        format!("Cash: {} vs Div: {}", format_num(cash), format_num(paid)),
    ))
}
