use analysis_core::AnalysisError;
use fundamental_analysis::{LabelCatalog, MatchMode, PillarEngine, ValuationAssumptions};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs for fetching and batch scanning.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Tickers fetched at the same time in batch mode.
    pub concurrency: usize,
    /// Budget for a single provider request attempt. Time spent queueing for
    /// a rate-limit slot or backing off after a 429 is not counted. Running
    /// out counts as the provider being unavailable.
    pub request_timeout: Duration,
    /// 0 disables caching.
    pub cache_ttl_secs: i64,
    pub labels_path: Option<PathBuf>,
    pub fuzzy_labels: bool,
    pub valuation: ValuationAssumptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            request_timeout: Duration::from_secs(8),
            cache_ttl_secs: 300,
            labels_path: None,
            fuzzy_labels: false,
            valuation: ValuationAssumptions::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            concurrency: parsed("RULE_ONE_CONCURRENCY")
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(defaults.concurrency),
            request_timeout: parsed("RULE_ONE_FETCH_TIMEOUT_SECS")
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            cache_ttl_secs: parsed("RULE_ONE_CACHE_TTL_SECS")
                .and_then(|n| i64::try_from(n).ok())
                .unwrap_or(defaults.cache_ttl_secs),
            labels_path: lookup("RULE_ONE_LABELS")
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            fuzzy_labels: lookup("RULE_ONE_FUZZY_LABELS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.fuzzy_labels),
            valuation: defaults.valuation,
        }
    }

    pub fn match_mode(&self) -> MatchMode {
        if self.fuzzy_labels {
            MatchMode::ExactThenContains
        } else {
            MatchMode::Exact
        }
    }

    /// Engine with the configured label catalog and match mode.
    pub fn build_engine(&self) -> Result<PillarEngine, AnalysisError> {
        let catalog = match &self.labels_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    AnalysisError::Config(format!("Cannot read label catalog {}: {}", path.display(), e))
                })?;
                let catalog = LabelCatalog::from_json(&json)?;
                tracing::info!("Loaded label catalog v{} from {}", catalog.version, path.display());
                catalog
            }
            None => LabelCatalog::builtin(),
        };
        Ok(PillarEngine::new()
            .with_catalog(catalog)
            .with_match_mode(self.match_mode()))
    }
}
