use thiserror::Error;

/// Errors that cross a component boundary. Only these reach callers of the
/// orchestrator; per-pillar problems never escape the engine.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The provider answered but had no usable statements for the ticker.
    #[error("No data for ticker {0}")]
    NoData(String),

    /// Fetch failed entirely: network, unknown ticker, rate limit or timeout.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a single pillar could not be computed. Always recovered locally by
/// failing that pillar closed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PillarError {
    #[error("missing field: {0}")]
    MissingField(String),

    #[error("need {required} distinct periods, have {available}")]
    InvalidPeriod { required: usize, available: usize },

    #[error("degenerate arithmetic: {0}")]
    ArithmeticDegenerate(String),
}
