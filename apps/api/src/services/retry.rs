//! # Transient-Error Retry Policy
//!
//! Business rejections are terminal and surface immediately; only transient
//! store errors (pool timeout, busy/locked writer) are worth a second try.
//! Every write path retries the WHOLE atomic step through this helper,
//! never a sub-step.

use std::future::Future;

use tracing::warn;

use optika_db::DbResult;

/// Attempts per operation, counting the first try.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Runs `step` until it succeeds, fails terminally, or the attempt cap is
/// reached. `step` must be safe to re-run from scratch: each call builds a
/// fresh transaction, so a retried attempt never observes leftovers from a
/// failed one.
pub(crate) async fn retry_transient<T, F, Fut>(operation: &'static str, mut step: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt = 1;
    loop {
        match step().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                warn!(operation, attempt, error = %err, "Transient store error, retrying");
            }
            Err(err) => return Err(err),
        }
        attempt += 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
