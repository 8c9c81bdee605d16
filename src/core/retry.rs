use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Retries an async operation with exponential backoff
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `base_delay`: Delay before the first retry, doubled for each later one
///   and capped at 30 seconds
///
/// # Returns
/// Either the successful result or the error of the last attempt
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                let delay = backoff(base_delay, attempt);
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}...",
                    attempt,
                    retries + 1,
                    err,
                    delay
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn backoff(base_delay: Duration, attempt: usize) -> Duration {
    let factor = 1u32 << (attempt - 1).min(16);
    base_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
}
