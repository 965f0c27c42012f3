//! Readiness-aware execution of cloud calls, with bounded retry.
//!
//! Two phases wrap every cloud operation: wait (bounded) for the session
//! to report ready, then run the call, retrying only failures the error
//! type marks retry-eligible. Classification is by variant; no message
//! inspection anywhere.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::actor::CloudActor;
use crate::error::{Result, SyncError};
use crate::session::CloudSession;

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Extra attempts after the first, spent only on readiness failures.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Poll cadence while waiting for the session to become ready.
    pub poll_interval: Duration,
    /// Ceiling on the readiness wait. Reaching it is not fatal; the call
    /// proceeds and succeeds or fails on its own.
    pub readiness_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 1,
            retry_delay: Duration::from_millis(500),
            poll_interval: Duration::from_millis(200),
            readiness_timeout: Duration::from_secs(5),
        }
    }
}

/// Run one cloud operation under the policy.
///
/// The closure receives a fresh actor handle per attempt, so a connection
/// replaced between attempts is picked up. A session with no handle at
/// all counts as a readiness failure and spends retry budget like one.
pub async fn run_cloud_op<T, F, Fut>(
    session: &CloudSession,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    op: F,
) -> Result<T>
where
    F: Fn(Arc<dyn CloudActor>) -> Fut,
    Fut: Future<Output = std::result::Result<T, crate::actor::CloudError>>,
{
    wait_until_ready(session, policy, cancel).await?;

    let mut attempt = 0u32;
    loop {
        let outcome = match session.actor().await {
            None => Err(SyncError::NotReady("no cloud connection".into())),
            Some(actor) => op(actor).await.map_err(SyncError::from),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(err) if err.retry_eligible() && attempt < policy.max_retries => {
                attempt += 1;
                debug!(attempt, max = policy.max_retries, "cloud call not ready, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                    _ = sleep(policy.retry_delay) => {}
                }
            }
            Err(err) => return Err(err),
        }
    }
}

/// Poll until the session reports ready, the timeout elapses, or the
/// token fires. Timeout is a warning, not an error.
async fn wait_until_ready(
    session: &CloudSession,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<()> {
    let deadline = Instant::now() + policy.readiness_timeout;
    while !session.is_ready().await {
        if Instant::now() >= deadline {
            warn!(
                timeout_ms = policy.readiness_timeout.as_millis() as u64,
                "readiness wait timed out, attempting the call anyway"
            );
            return Ok(());
        }
        tokio::select! {
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            _ = sleep(policy.poll_interval) => {}
        }
    }
    Ok(())
}
