use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single fetch attempt, or of the whole retry loop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 429 or 403: the engine is throttling or blocking us.
    #[error("rate limited (status {0})")]
    RateLimited(u16),

    #[error("unexpected status {0}")]
    BadStatus(u16),

    /// Timeouts, DNS failures, refused connections, unreadable bodies.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no usable response for '{query}' after {attempts} attempts: {last}")]
    Exhausted {
        query: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Classify a non-200 status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 | 403 => FetchError::RateLimited(status),
            other => FetchError::BadStatus(other),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        match self {
            FetchError::RateLimited(_) => true,
            FetchError::Exhausted { last, .. } => last.is_rate_limited(),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("no records to write: the batch produced no usable pages")]
    EmptyBatch,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("endpoint template '{0}' has no {{query}} placeholder")]
    MissingPlaceholder(String),

    #[error("endpoint template '{template}' is not a valid url: {source}")]
    InvalidEndpoint {
        template: String,
        #[source]
        source: url::ParseError,
    },

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file {0:?} does not exist")]
    Missing(PathBuf),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("no company column found in {0:?}")]
    NoCompanyColumn(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(FetchError::from_status(429), FetchError::RateLimited(429)));
        assert!(matches!(FetchError::from_status(403), FetchError::RateLimited(403)));
        assert!(matches!(FetchError::from_status(503), FetchError::BadStatus(503)));
        assert!(matches!(FetchError::from_status(302), FetchError::BadStatus(302)));
    }

    #[test]
    fn exhausted_message_names_query() {
        let err = FetchError::Exhausted {
            query: "Acme".to_string(),
            attempts: 3,
            last: Box::new(FetchError::BadStatus(503)),
        };
        let msg = err.to_string();
        assert!(msg.contains("Acme"));
        assert!(msg.contains("503"));
        assert!(!err.is_rate_limited());
    }
}
