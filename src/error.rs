use thiserror::Error;

/// rca-agent crate-specific Result type alias
pub type Result<T> = std::result::Result<T, RcaError>;

#[derive(Error, Debug)]
pub enum RcaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    // 모델 API가 실패 응답을 주거나 응답 형태가 예상과 다를 때
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Max agent turns exceeded: limit {limit}")]
    MaxTurnsExceeded { limit: usize },
}
