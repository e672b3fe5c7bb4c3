//! Re-sending a submission after transient failures.
//!
//! A survey report is posted from the field, often over a weak mobile link,
//! so connection errors and 5xx answers are retried. A 4xx rejection or a
//! bad endpoint URL ends the submission on the first attempt. The caller
//! keeps the same `x-request-id` for every attempt of one submission.

use std::future::Future;
use std::time::Duration;

use crate::error::SubmitError;

/// Upper bound for a single wait between attempts.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Returns `true` for errors that are worth another attempt.
pub(crate) fn is_retriable(err: &SubmitError) -> bool {
    match err {
        SubmitError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        SubmitError::Server { .. } => true,
        SubmitError::Rejected { .. } | SubmitError::InvalidUrl { .. } => false,
    }
}

/// Wait before retry number `retry` (1-based).
///
/// Doubles from `base_ms` per retry and is capped at [`MAX_DELAY`], then
/// scaled by `jitter`, which is expected in `0.75..=1.25`.
pub(crate) fn backoff_delay(retry: u32, base_ms: u64, jitter: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let nominal = Duration::from_millis(base_ms.saturating_mul(1 << exponent)).min(MAX_DELAY);
    nominal.mul_f64(jitter)
}

/// Runs `operation` once, then up to `max_retries` more times while it
/// fails with a retriable error.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SubmitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SubmitError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && retry < max_retries => err,
            Err(err) => return Err(err),
        };
        retry += 1;
        let delay = backoff_delay(retry, backoff_base_ms, rand::random_range(0.75..=1.25));
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "submission attempt failed; sending again"
        );
        tokio::time::sleep(delay).await;
    }
}
