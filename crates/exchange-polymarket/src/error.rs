//! Error types for the venue-A (on-chain CLOB-style) client.
//!
//! Mirrors the classification scheme of [`arbx_kalshi::KalshiError`] so the
//! orchestrator can treat both venue clients uniformly when deciding whether
//! a scan-tick failure is transient (log and continue) or should surface a
//! startup warning (auth only), per §7's error taxonomy.

use thiserror::Error;

/// Errors that can occur when interacting with venue A.
#[derive(Debug, Error)]
pub enum PolymarketError {
    /// Network error (connection refused, DNS failure, etc).
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// API responded with a non-2xx status.
    #[error("API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limit exceeded")]
    RateLimit,

    /// Response body could not be parsed into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Market payload is missing required fields (token ids, prices).
    #[error("invalid market payload: {0}")]
    InvalidMarket(String),

    /// Order book payload failed validation.
    #[error("invalid order book: {0}")]
    InvalidOrderBook(String),
}

impl PolymarketError {
    /// Whether retrying the same request later is worthwhile.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_) | Self::RateLimit)
    }

    /// Whether the failure is transient — a scan-tick should skip and retry
    /// on the next tick without backoff, rather than treat it as fatal.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Suggested retry delay in seconds, if any.
    #[must_use]
    pub fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimit => Some(1),
            Self::Network(_) | Self::Timeout(_) => Some(1),
            Self::Api { status_code, .. } if *status_code >= 500 => Some(2),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PolymarketError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PolymarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result type alias for venue-A client operations.
pub type Result<T> = std::result::Result<T, PolymarketError>;
