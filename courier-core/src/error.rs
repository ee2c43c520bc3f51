use thiserror::Error;

/// Common result type for setup and storage operations.
///
/// Request failures never surface here; they are carried inside `ApiResponse`.
pub type Result<T> = std::result::Result<T, CourierError>;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("token store error: {0}")]
    Store(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("other error: {0}")]
    Other(String),
}
