use thiserror::Error;

/// Crate-level error for configuration and setup failures.
///
/// Evaluation (C4) stays a pure function and never produces an `EngineError`;
/// execution (C5) reports failures as typed result fields rather than errors
/// (§4.5, §7). This enum covers what's left: loading config, wiring venue
/// clients, and matcher/book-walker input validation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid matcher input: {0}")]
    InvalidMatcherInput(String),

    #[error("invalid order book: {0}")]
    InvalidOrderBook(String),

    #[error("credential load failure: {0}")]
    Authentication(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl EngineError {
    /// Whether this error degrades the engine (continue with reduced
    /// capability) rather than being fatal to the calling operation.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::Persistence(_))
    }
}

impl From<figment::Error> for EngineError {
    fn from(err: figment::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
