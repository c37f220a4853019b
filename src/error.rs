use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required config key: {0}")]
    MissingKey(String),

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reddit API error: {0}")]
    RedditApi(String),

    #[error("submission not found: {0}")]
    NotFound(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse failure class used by the top-level error boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Feed,
    Store,
    Notification,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Feed => "feed",
            ErrorKind::Store => "store",
            ErrorKind::Notification => "notification",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_)
            | AppError::MissingKey(_)
            | AppError::ConfigParse(_)
            | AppError::Io(_)
            | AppError::Url(_) => ErrorKind::Config,
            AppError::Database(_) | AppError::Sqlite(_) => ErrorKind::Store,
            AppError::Notification(_) => ErrorKind::Notification,
            AppError::Http(_)
            | AppError::Json(_)
            | AppError::RedditApi(_)
            | AppError::NotFound(_)
            | AppError::Other(_) => ErrorKind::Feed,
        }
    }
}
