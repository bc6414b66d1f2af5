use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error [{code}]: {description}")]
    Api { code: String, description: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no data returned for {0}")]
    NoData(String),

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("listing load failed: {0}")]
    Listing(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("cache file: {0}")]
    Cache(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MarketError>;
