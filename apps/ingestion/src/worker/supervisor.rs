use std::future::Future;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::RetryPolicy;
use crate::errors::IngestError;

/// Runs `session` until it succeeds or `policy.max_attempts` sessions have
/// failed, sleeping `policy.delay` between attempts. No backoff, no jitter.
///
/// `session` receives the 1-based attempt number.
pub async fn supervise<F, Fut>(policy: RetryPolicy, mut session: F) -> Result<(), IngestError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(), IngestError>>,
{
    for attempt in 1..=policy.max_attempts {
        let err = match session(attempt).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if policy.retries_after(attempt) {
            warn!("Worker session failed: {err}");
            info!(
                "Retrying in {:?}... (attempt {attempt}/{})",
                policy.delay, policy.max_attempts
            );
            sleep(policy.delay).await;
        } else {
            error!("Worker session failed: {err}");
        }
    }

    error!("Max retries reached. Exiting.");
    Err(IngestError::RetriesExhausted {
        attempts: policy.max_attempts,
    })
}
