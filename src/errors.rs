/// Domain-specific error types for the pricing engine.
/// Only input problems are errors. The engine treats:
/// - solver non-convergence as "no implied volatility" (an `Option`)
/// - expired contracts as the intrinsic-value branch
/// - a missing market price as a defined no-signal state
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot determine volatility: {0}")]
    VolatilityUnresolved(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
