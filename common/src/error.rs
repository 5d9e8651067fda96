use async_openai::error::OpenAIError;
use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("Embedding provider error: {0}")]
    Embedding(#[from] OpenAIError),
    #[error("Vector index error: {0}")]
    Index(String),
    #[error("Upstream timeout: {0}")]
    Timeout(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Authorization error: {0}")]
    Auth(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures worth retrying: transport-level errors talking to the
    /// embedding service. API rejections (auth, malformed request) and
    /// exhausted deadlines are not retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Embedding(OpenAIError::Reqwest(_)))
    }
}
