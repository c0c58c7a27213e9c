//! rule-one: Rule #1 "10 Pillars" screening from the command line.
//!
//! Usage:
//!   rule-one analyze CRM
//!   rule-one scan AAPL,MSFT,GOOG --concurrency 8
//!   rule-one compare CRM MSFT ORCL --json
//!   rule-one technical NVDA --range 5y
//!
//! Results go to stdout; logs go to stderr (RUST_LOG controls the filter).

mod args;
mod render;

use analysis_core::{AnalysisError, MarketDataProvider};
use analysis_orchestrator::{OrchestratorConfig, PillarOrchestrator, StockScreener};
use args::{Command, Invocation};
use serde::Serialize;
use std::sync::Arc;
use yahoo_client::YahooClient;

const DEFAULT_LOG_FILTER: &str = "rule_one=info,analysis_orchestrator=info,yahoo_client=warn";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("RULE_ONE_LOG_JSON")
        .map(|v| matches!(v.as_str(), "1" | "true"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// "No data" is an answer, not a failure of the tool: print it where the
/// result would have gone and exit non-zero.
fn report_no_data(ticker: &str, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "ticker": ticker, "error": "no data" }))?;
    } else {
        println!("{}: no data", ticker);
    }
    std::process::exit(1);
}

/// Ticker to report as "no data" when a single-ticker lookup fails because
/// the provider has nothing for it. Other errors are real failures.
fn no_data_ticker(err: &AnalysisError, symbol: &str) -> Option<String> {
    match err {
        AnalysisError::NoData(ticker) => Some(ticker.clone()),
        AnalysisError::ProviderUnavailable(_) => Some(symbol.trim().to_uppercase()),
        _ => None,
    }
}

fn report_failure(err: AnalysisError, symbol: &str, json: bool) -> anyhow::Result<()> {
    match no_data_ticker(&err, symbol) {
        Some(ticker) => {
            tracing::warn!("{}: {}", ticker, err);
            report_no_data(&ticker, json)
        }
        None => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let Invocation {
        command,
        json,
        concurrency,
    } = match args::parse(&raw) {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("error: {}\n", msg);
            args::print_usage();
            std::process::exit(2);
        }
    };

    let mut config = OrchestratorConfig::from_env();
    if let Some(n) = concurrency {
        config.concurrency = n;
    }
    tracing::info!(
        "rule-one: concurrency={}, request_timeout={}s, cache_ttl={}s, fuzzy_labels={}",
        config.concurrency,
        config.request_timeout.as_secs(),
        config.cache_ttl_secs,
        config.fuzzy_labels
    );

    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooClient::new().with_request_timeout(config.request_timeout));
    let orchestrator = Arc::new(PillarOrchestrator::new(provider, config)?);

    match command {
        Command::Analyze { symbol } => match orchestrator.analyze(&symbol).await {
            Ok(analysis) if json => print_json(&analysis)?,
            Ok(analysis) => print!("{}", render::analysis(&analysis)),
            Err(e) => report_failure(e, &symbol, json)?,
        },
        Command::Scan { symbols } => {
            let report = StockScreener::new(orchestrator).scan(symbols.as_slice()).await;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", render::scan(&report));
            }
        }
        Command::Compare { symbols } => {
            let report = StockScreener::new(orchestrator).compare(symbols.as_slice()).await;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", render::comparison(&report));
            }
        }
        Command::Technical { symbol, range } => match orchestrator.technical(&symbol, range).await {
            Ok(snapshot) if json => print_json(&snapshot)?,
            Ok(snapshot) => print!("{}", render::technical(&symbol.to_uppercase(), &snapshot)),
            Err(e) => report_failure(e, &symbol, json)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_symbol_is_reported_as_no_data() {
        let err = AnalysisError::ProviderUnavailable("HTTP 404 Not Found".to_string());
        assert_eq!(no_data_ticker(&err, " zzzz "), Some("ZZZZ".to_string()));

        let err = AnalysisError::NoData("SHELL".to_string());
        assert_eq!(no_data_ticker(&err, "shell"), Some("SHELL".to_string()));
    }

    #[test]
    fn test_config_errors_still_fail() {
        let err = AnalysisError::Config("bad label catalog".to_string());
        assert_eq!(no_data_ticker(&err, "AAPL"), None);
        assert!(report_failure(err, "AAPL", false).is_err());
    }
}
