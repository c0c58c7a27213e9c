use analysis_core::HistoryRange;

/// Screener list used when `scan` gets no symbols.
pub const DEFAULT_SCAN_SYMBOLS: &[&str] = &["CRM", "AAPL", "MSFT", "GOOG", "TSLA", "NVDA", "AMD", "AMZN", "META", "NFLX"];

/// Peer group used when `compare` gets no symbols.
pub const DEFAULT_COMPARE_SYMBOLS: &[&str] = &["CRM", "MSFT", "ORCL", "ADBE", "SAP", "NOW"];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Analyze { symbol: String },
    Scan { symbols: Vec<String> },
    Compare { symbols: Vec<String> },
    Technical { symbol: String, range: HistoryRange },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub json: bool,
    pub concurrency: Option<usize>,
}

/// Value following `flag`, if the flag is present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, String> {
    match args.iter().position(|a| a == flag) {
        None => Ok(None),
        Some(i) => args
            .get(i + 1)
            .filter(|v| !v.starts_with("--"))
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| format!("{} needs a value", flag)),
    }
}

/// Positional words (and `--symbols` words), split on commas.
fn symbol_list(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--concurrency" || arg == "--range" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.extend(
            arg.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }
    out
}

fn single_symbol(command: &str, rest: &[String]) -> Result<String, String> {
    let mut symbols = symbol_list(rest);
    match symbols.len() {
        1 => Ok(symbols.remove(0)),
        0 => Err(format!("{} needs a ticker symbol", command)),
        _ => Err(format!("{} takes exactly one ticker symbol", command)),
    }
}

fn or_default(symbols: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if symbols.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        symbols
    }
}

/// Parse arguments after the program name.
pub fn parse(args: &[String]) -> Result<Invocation, String> {
    let (command, rest) = args.split_first().ok_or_else(|| "missing command".to_string())?;

    let json = rest.iter().any(|a| a == "--json");
    let concurrency = match flag_value(rest, "--concurrency")? {
        None => None,
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => return Err(format!("invalid --concurrency value: {}", v)),
        },
    };

    let command = match command.as_str() {
        "analyze" => Command::Analyze {
            symbol: single_symbol("analyze", rest)?,
        },
        "scan" => Command::Scan {
            symbols: or_default(symbol_list(rest), DEFAULT_SCAN_SYMBOLS),
        },
        "compare" => Command::Compare {
            symbols: or_default(symbol_list(rest), DEFAULT_COMPARE_SYMBOLS),
        },
        "technical" => Command::Technical {
            symbol: single_symbol("technical", rest)?,
            range: flag_value(rest, "--range")?
                .map(str::parse::<HistoryRange>)
                .transpose()?
                .unwrap_or_default(),
        },
        other => return Err(format!("unknown command: {}", other)),
    };

    Ok(Invocation {
        command,
        json,
        concurrency,
    })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  rule-one analyze TICKER                   10 pillars, chart figures and valuation");
    eprintln!("  rule-one scan [TICKERS...]                Batch screener, ranked by score");
    eprintln!("  rule-one compare [TICKERS...]             Peer financial health table");
    eprintln!("  rule-one technical TICKER [--range 2y]    SMA 50/200 and RSI 14 (1y, 2y or 5y)");
    eprintln!();
    eprintln!("Tickers may be separated by spaces or commas.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --json             Print JSON instead of a table");
    eprintln!("  --concurrency N    Max tickers fetched at once (default: RULE_ONE_CONCURRENCY or 4)");
}
