use analysis_core::{
    AnalysisError, Bar, FinancialStatement, HistoryRange, MarketDataProvider, QuoteSnapshot, StatementKind,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod chart;
pub mod quote_summary;
pub mod timeseries;

const QUERY1_URL: &str = "https://query1.finance.yahoo.com";
const QUERY2_URL: &str = "https://query2.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Statements older than this are never requested.
const STATEMENT_HISTORY_YEARS: i64 = 10;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Need to wait until the oldest request falls out of the window
            let Some(&oldest) = ts.front() else {
                continue;
            };
            let sleep_dur = (oldest + self.window).saturating_duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }

    /// Wait for a slot, then run one attempt under `timeout`. The clock starts
    /// once the slot is granted.
    async fn throttled<T, E, F>(&self, timeout: Duration, attempt: F) -> Result<T, AnalysisError>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        self.acquire().await;
        match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result.map_err(|e| AnalysisError::ProviderUnavailable(e.to_string())),
            Err(_) => Err(AnalysisError::ProviderUnavailable(format!(
                "Yahoo request timed out after {:.1}s",
                timeout.as_secs_f64()
            ))),
        }
    }
}

/// Yahoo Finance over its public JSON endpoints.
///
/// quoteSummary needs a session cookie plus a matching "crumb"; both are
/// fetched lazily on first use and refreshed once when Yahoo rejects them.
///
/// `request_timeout` bounds each HTTP attempt on its own. Waiting for a rate
/// limiter slot and 429 backoff are not part of it.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    rate_limiter: RateLimiter,
    request_timeout: Duration,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooClient {
    pub fn new() -> Self {
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        Self::with_rate_limit(rate_limit)
    }

    pub fn with_rate_limit(requests_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            crumb: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder
            .build()
            .map_err(|e| AnalysisError::ProviderUnavailable(e.to_string()))?;

        for attempt in 0..3u32 {
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ProviderUnavailable("Cannot clone request".to_string()))?;
            let response = self
                .rate_limiter
                .throttled(self.request_timeout, self.client.execute(req_clone))
                .await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let wait_secs = 5u64 * (attempt as u64 + 1);
            tracing::warn!("Yahoo 429 rate limited, waiting {}s before retry {}/3", wait_secs, attempt + 1);
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(AnalysisError::ProviderUnavailable(
            "Rate limited by Yahoo after 3 retries".to_string(),
        ))
    }

    /// GET returning JSON. 404 bodies are still parsed since Yahoo reports
    /// unknown symbols inside the envelope.
    async fn get_json(&self, builder: reqwest::RequestBuilder) -> Result<serde_json::Value, AnalysisError> {
        let response = self.send_request(builder).await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(AnalysisError::ProviderUnavailable(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))
    }

    async fn crumb(&self, refresh: bool) -> Result<String, AnalysisError> {
        let mut cached = self.crumb.lock().await;
        if !refresh {
            if let Some(crumb) = cached.as_ref() {
                return Ok(crumb.clone());
            }
        }

        // Only the Set-Cookie header matters here; the page itself is a 404.
        let _ = self.send_request(self.client.get(COOKIE_URL)).await?;
        let response = self
            .send_request(self.client.get(format!("{}/v1/test/getcrumb", QUERY1_URL)))
            .await?;
        if !response.status().is_success() {
            return Err(AnalysisError::ProviderUnavailable(format!(
                "crumb request failed: HTTP {}",
                response.status()
            )));
        }
        let crumb = response
            .text()
            .await
            .map_err(|e| AnalysisError::ProviderUnavailable(e.to_string()))?
            .trim()
            .to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(AnalysisError::ProviderUnavailable("Yahoo returned no crumb".to_string()));
        }

        tracing::debug!("Obtained Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// Annual statement of one kind, most recent period first.
    pub async fn get_statement(&self, symbol: &str, kind: StatementKind) -> Result<FinancialStatement, AnalysisError> {
        let now = chrono::Utc::now();
        let start = now - chrono::Duration::days(365 * STATEMENT_HISTORY_YEARS);
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            QUERY2_URL, symbol
        );

        let body = self
            .get_json(self.client.get(&url).query(&[
                ("symbol", symbol.to_string()),
                ("type", timeseries::type_param(kind)),
                ("period1", start.timestamp().to_string()),
                ("period2", now.timestamp().to_string()),
                ("merge", "false".to_string()),
                ("padTimeSeries", "true".to_string()),
            ]))
            .await?;

        let statement = timeseries::parse_statement(kind, &body)?;
        tracing::debug!(
            "{} {}: {} rows x {} periods",
            symbol,
            kind.as_str(),
            statement.rows().len(),
            statement.column_count()
        );
        Ok(statement)
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<QuoteSnapshot, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", QUERY2_URL, symbol);

        for refresh in [false, true] {
            let crumb = self.crumb(refresh).await?;
            let response = self
                .send_request(self.client.get(&url).query(&[
                    ("modules", quote_summary::modules_param()),
                    ("crumb", crumb),
                ]))
                .await?;

            if response.status() == StatusCode::UNAUTHORIZED && !refresh {
                tracing::debug!("Yahoo rejected crumb, refreshing");
                continue;
            }
            let status = response.status();
            if !status.is_success() && status != StatusCode::NOT_FOUND {
                return Err(AnalysisError::ProviderUnavailable(format!("HTTP {}", status)));
            }
            let body: serde_json::Value = response
                .json()
                .await
                .map_err(|e| AnalysisError::InvalidData(e.to_string()))?;
            return quote_summary::parse_quote(symbol, &body);
        }

        Err(AnalysisError::ProviderUnavailable(format!(
            "{}: quoteSummary unauthorized",
            symbol
        )))
    }

    /// Daily bars, oldest first.
    pub async fn get_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", QUERY1_URL, symbol);
        let body = self
            .get_json(self.client.get(&url).query(&[
                ("range", range.as_str()),
                ("interval", "1d"),
                ("includePrePost", "false"),
            ]))
            .await?;
        chart::parse_bars(symbol, body)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_financials(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError> {
        self.get_statement(symbol, StatementKind::Income).await
    }

    async fn fetch_balance_sheet(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError> {
        self.get_statement(symbol, StatementKind::BalanceSheet).await
    }

    async fn fetch_cashflow(&self, symbol: &str) -> Result<FinancialStatement, AnalysisError> {
        self.get_statement(symbol, StatementKind::CashFlow).await
    }

    async fn fetch_quote_info(&self, symbol: &str) -> Result<QuoteSnapshot, AnalysisError> {
        self.get_quote(symbol).await
    }

    async fn fetch_history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Bar>, AnalysisError> {
        self.get_history(symbol, range).await
    }
}
