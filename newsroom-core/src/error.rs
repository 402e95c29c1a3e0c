use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("source not found: {name}")]
    SourceNotFound { name: String },

    #[error("rate limited for {seconds} seconds")]
    RateLimited { seconds: u64 },

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("no provider available")]
    NoProviderAvailable,

    #[error("analysis already in progress for item {item_id}")]
    AnalysisInProgress { item_id: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("request id {request_id} had no matching request")]
    UnknownRequest { request_id: Uuid },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
