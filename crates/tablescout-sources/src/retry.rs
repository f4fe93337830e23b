//! Retry with exponential backoff for transient directory-API errors.
//!
//! Rate limits (429) and network-level failures are retried; API-level
//! errors, unexpected statuses, and parse failures are propagated
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Returns `true` if `err` is a transient condition worth retrying.
fn is_retriable(err: &SourceError) -> bool {
    matches!(
        err,
        SourceError::RateLimited { .. } | SourceError::Http(_)
    )
}

/// Executes `operation`, sleeping `backoff_base_secs * 2^attempt` seconds
/// between retries, up to `max_retries` additional attempts after the first.
/// The last error is returned when retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs,
                    error = %err,
                    "transient source error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
