use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid reply endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("unknown contact: {0}")]
    UnknownContact(String),
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
    #[error("contact name cannot be empty")]
    InvalidName,
}

pub type Result<T> = std::result::Result<T, ChatError>;
