//! Plain-text tables for the terminal.

use analysis_core::ScoreCard;
use analysis_orchestrator::{ComparisonReport, ScanReport, SkippedTicker};
use fundamental_analysis::{format_num, ChartFigures, HealthRow, Pillar, PillarAnalysis, Rating, ValuationSummary};
use std::fmt::Write;
use technical_analysis::{RsiZone, TechnicalSnapshot, Trend};

const PASS: &str = "✓";
const FAIL: &str = "✗";

fn opt_num(v: Option<f64>) -> String {
    v.map(format_num).unwrap_or_else(|| "-".to_string())
}

fn opt_fixed(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string())
}

fn opt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}%", x)).unwrap_or_else(|| "-".to_string())
}

fn rated(value: String, rating: Option<Rating>) -> String {
    match rating {
        Some(r) => format!("{} ({})", value, r.as_str()),
        None => value,
    }
}

pub fn score_card(card: &ScoreCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}/10", card.ticker(), card.score());
    for pillar in card.pillars() {
        let mark = if pillar.result.passed { PASS } else { FAIL };
        let _ = writeln!(out, "  {} {:<22} {}", mark, pillar.name, pillar.result.evidence);
    }
    out
}

fn figures(figures: &ChartFigures) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<12} {:>12} {:>12} {:>12} {:>12}",
        "Period", "Revenue", "Net Income", "Cash", "Total Debt"
    );
    for (i, period) in figures.periods.iter().enumerate() {
        let cell = |series: &[Option<f64>]| opt_num(series.get(i).copied().flatten());
        let _ = writeln!(
            out,
            "  {:<12} {:>12} {:>12} {:>12} {:>12}",
            period,
            cell(&figures.revenue),
            cell(&figures.net_income),
            cell(&figures.cash),
            cell(&figures.total_debt)
        );
    }
    out
}

fn valuation(v: &ValuationSummary) -> String {
    format!(
        "  Price {} | DCF {} | Lynch {} | Graham {}\n",
        opt_fixed(v.price),
        opt_fixed(v.dcf),
        opt_fixed(v.lynch),
        opt_fixed(v.graham)
    )
}

pub fn analysis(analysis: &PillarAnalysis) -> String {
    let mut out = score_card(&analysis.card);
    out.push_str("\nFigures (oldest first)\n");
    out.push_str(&figures(&analysis.figures));
    out.push_str("\nFair value per share\n");
    out.push_str(&valuation(&analysis.valuation));
    out
}

fn skipped(skipped: &[SkippedTicker]) -> String {
    let mut out = String::new();
    if !skipped.is_empty() {
        let _ = writeln!(out, "\nNo data:");
        for s in skipped {
            let _ = writeln!(out, "  {:<8} {}", s.ticker, s.reason);
        }
    }
    out
}

/// Ranked screener table, one mark per pillar in display order.
pub fn scan(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:>5}  {}", "Ticker", "Score", "Pillars 1-10");
    for card in report.ranked() {
        let marks: Vec<&str> = card
            .pillars()
            .iter()
            .map(|p| if p.result.passed { PASS } else { FAIL })
            .collect();
        let _ = writeln!(out, "{:<8} {:>5}  {}", card.ticker(), format!("{}/10", card.score()), marks.join(" "));
    }
    if !report.cards.is_empty() {
        let _ = writeln!(out);
        for (i, p) in Pillar::ALL.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {:<22} {}", i + 1, p.name(), p.description());
        }
    }
    out.push_str(&skipped(&report.skipped));
    out
}

fn health_line(row: &HealthRow) -> String {
    let ratings = row.ratings();
    format!(
        "{:<8} {:>10} {:>7} {:>7} {:>7} {:>7} {:>14} {:>14} {:>14} {:>18} {:>18} {:>8} {:>8} {:>8} {:>7} {:>8}  {}",
        row.ticker,
        opt_num(row.market_cap),
        opt_fixed(row.pe),
        opt_fixed(row.price_to_book),
        opt_fixed(row.price_to_sales),
        opt_fixed(row.peg),
        rated(opt_fixed(row.debt_to_equity), ratings.debt_to_equity),
        rated(opt_fixed(row.quick_ratio), ratings.quick_ratio),
        rated(opt_fixed(row.current_ratio), ratings.current_ratio),
        rated(opt_pct(row.roe_pct), ratings.roe),
        rated(opt_pct(row.roa_pct), ratings.roa),
        opt_pct(row.gross_margin_pct),
        opt_pct(row.operating_margin_pct),
        opt_pct(row.profit_margin_pct),
        opt_pct(row.dividend_yield_pct),
        opt_pct(row.payout_pct),
        row.recommendation
    )
}

pub fn comparison(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>10} {:>7} {:>7} {:>7} {:>7} {:>14} {:>14} {:>14} {:>18} {:>18} {:>8} {:>8} {:>8} {:>7} {:>8}  {}",
        "Ticker", "Mkt Cap", "P/E", "P/B", "P/S", "PEG", "Debt/Eq", "Quick", "Current", "ROE", "ROA", "Gross M",
        "Oper M", "Profit M", "Div", "Payout", "Rec"
    );
    for row in &report.rows {
        let _ = writeln!(out, "{}", health_line(row));
    }
    out.push_str(&skipped(&report.skipped));
    out
}

pub fn technical(symbol: &str, snap: &TechnicalSnapshot) -> String {
    let trend = match snap.trend {
        Trend::Bullish => "Bullish (price above SMA 200)",
        Trend::Bearish => "Bearish (price below SMA 200)",
        Trend::Undetermined => "Undetermined (not enough history for SMA 200)",
    };
    let zone = match snap.rsi_zone {
        Some(RsiZone::Oversold) => "oversold (< 30)",
        Some(RsiZone::Overbought) => "overbought (> 70)",
        Some(RsiZone::Neutral) => "neutral",
        None => "-",
    };
    format!(
        "{} ${:.2} over {} bars\n  SMA 50   {}\n  SMA 200  {}\n  RSI 14   {} {}\n  Trend    {}\n",
        symbol,
        snap.last_close,
        snap.bars,
        opt_fixed(snap.sma_50),
        opt_fixed(snap.sma_200),
        opt_fixed(snap.rsi_14),
        zone,
        trend
    )
}
