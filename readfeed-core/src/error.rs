use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("feed parsing error: {0}")]
    Malformed(#[from] rss::Error),
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feed request returned HTTP {status}: {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("feed request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of one fetch, decode and replace pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to locate the configuration directory")]
    NoConfigDir,
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
