use thiserror::Error;

#[derive(Error, Debug)]
pub enum NuztapError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Could not enqueue refresh job: {0}")]
    EnqueueFailure(String),

    #[error("Fetch process for {owner} failed (exit code {code:?})")]
    FetchProcessFailure { owner: String, code: Option<i32> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NuztapError>;
