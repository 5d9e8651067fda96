#![allow(clippy::missing_docs_in_private_items)]

pub mod catalog;
pub mod search;

pub use search::{SearchFilters, SearchRequest, SearchResponse, SearchResult, DEFAULT_K};

use std::future::Future;
use std::time::Duration;

use common::error::AppError;

/// Cap an upstream call with the caller's deadline; expiry surfaces a typed
/// timeout instead of hanging the request.
pub(crate) async fn with_deadline<T, F>(
    deadline: Duration,
    label: &str,
    fut: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{label} exceeded {}ms deadline",
            deadline.as_millis()
        ))),
    }
}
