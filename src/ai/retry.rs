//! Bounded retry with exponential backoff for outbound provider calls.
//!
//! Policy: at most 3 attempts, backoff 1s -> 2s -> 4s with +/-10% jitter,
//! and only errors classified retryable by message are retried. A worst case
//! run blocks the calling task for roughly 7 seconds per credential.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};

/// Maximum call attempts per credential.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay before the second attempt.
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// Case-insensitive substrings that mark an error as transient.
const RETRYABLE_PATTERNS: [&str; 11] = [
    "timeout",
    "connection",
    "network",
    "temporary",
    "rate limit",
    "too many requests",
    "429",
    "500",
    "502",
    "503",
    "504",
];

/// Classify an error as retryable by matching its display text.
pub fn is_retryable(err: &AppError) -> bool {
    let text = err.to_string().to_lowercase();
    RETRYABLE_PATTERNS.iter().any(|p| text.contains(p))
}

/// Backoff before attempt `attempt + 1`, given the 1-indexed attempt that
/// just failed: BASE_DELAY * 2^(attempt - 1).
pub fn backoff_delay(attempt: u32) -> Duration {
    BASE_DELAY * 2_u32.pow(attempt.saturating_sub(1))
}

/// Apply +/-10% jitter in tenth-of-range steps.
fn jittered(delay: Duration) -> Duration {
    let steps: i64 = rand::thread_rng().gen_range(-10..=10);
    let jitter = delay.as_secs_f64() * 0.1 * (steps as f64 / 10.0);
    Duration::from_secs_f64((delay.as_secs_f64() + jitter).max(0.0))
}

/// Run `op` with the retry policy. Non-retryable errors abort immediately;
/// exhaustion returns a wrapping error naming the attempt count.
pub async fn with_retry<T, F, Fut>(label: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut last_error: Option<AppError> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }

                warn!(
                    "{} attempt {}/{} failed: {}",
                    label, attempt, MAX_ATTEMPTS, err
                );
                last_error = Some(err);

                if attempt < MAX_ATTEMPTS {
                    let delay = jittered(backoff_delay(attempt));
                    debug!("retrying {} in {:?}", label, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    let detail = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown error".to_string());
    Err(AppError::new(
        ErrorCode::ProviderExhausted,
        format!("{} failed after {} attempts: {}", label, MAX_ATTEMPTS, detail),
    ))
}
