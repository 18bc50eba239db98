use crate::server::{EventHandler, HandleOutcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based), doubling up to `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[derive(Debug)]
pub enum Delivery {
    Handled(HandleOutcome),
    Exhausted { attempts: u32, error: anyhow::Error },
    Cancelled,
}

/// Hands one payload to `handler`, retrying failures with backoff.
/// Cancellation is only observed while waiting between attempts.
pub async fn deliver(
    handler: &dyn EventHandler,
    payload: &[u8],
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Delivery {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let error = match handler.handle(payload).await {
            Ok(outcome @ (HandleOutcome::Commit | HandleOutcome::SkipCommit)) => {
                return Delivery::Handled(outcome);
            }
            Ok(HandleOutcome::Retry) => anyhow::anyhow!("handler requested retry"),
            Err(e) => e,
        };

        if attempt >= max_attempts {
            return Delivery::Exhausted {
                attempts: attempt,
                error,
            };
        }

        let delay = policy.backoff(attempt);
        tracing::warn!(attempt, ?delay, error = ?error, "handler failed; retrying");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Delivery::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
