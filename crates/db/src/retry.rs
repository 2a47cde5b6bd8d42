//! Bounded retry of operations that lost a concurrency race.

use std::future::Future;

use tracing::warn;

use crate::error::PostingError;

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made.
///
/// Each attempt must open its own database transaction so that a retry
/// starts from fresh state.
///
/// # Errors
///
/// Returns the last error produced by `operation`.
pub async fn with_retry<T, F, Fut>(
    name: &'static str,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, PostingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PostingError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(operation = name, attempt, error = %err, "retrying after concurrent modification");
                attempt += 1;
            }
            result => return result,
        }
    }
}
