use std::time::Duration;

use tokio::time::sleep;

use crate::{
    config::MigrationConfig,
    migrate::error::{MigrationError, ServiceError},
};

/// Spacing class of a remote call. Playlist creation is limited much more
/// aggressively by the remote service than per-item favorites calls, so the
/// two classes carry independent delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    Item,
    Playlist,
}

/// Enforces minimum inter-call spacing and bounded exponential backoff.
///
/// One instance is shared by everything a run does; funnelling every remote
/// call through the same limiter is what keeps the global throttling
/// contract intact. Constructed from a [`MigrationConfig`], so tests can run
/// with near-zero delays.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    item_delay: Duration,
    playlist_delay: Duration,
    max_retries: u32,
    backoff_ceiling: Duration,
}

const BACKOFF_BASE: Duration = Duration::from_secs(1);

impl RateLimiter {
    pub fn new(config: &MigrationConfig) -> Self {
        RateLimiter {
            item_delay: config.item_delay,
            playlist_delay: config.playlist_delay,
            max_retries: config.max_retries,
            backoff_ceiling: config.backoff_ceiling,
        }
    }

    /// Blocks for the configured minimum delay of the given call class.
    pub async fn throttle(&self, class: CallClass) {
        let delay = match class {
            CallClass::Item => self.item_delay,
            CallClass::Playlist => self.playlist_delay,
        };
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    /// Backoff before retry number `attempt` (0-based). The server's
    /// retry-after hint wins when present; otherwise the delay doubles per
    /// attempt. Both are capped at the configured ceiling, which keeps the
    /// sequence non-decreasing.
    pub fn backoff_delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let delay = match retry_after {
            Some(secs) => Duration::from_secs(secs),
            None => BACKOFF_BASE.saturating_mul(1u32 << attempt.min(16)),
        };
        delay.min(self.backoff_ceiling)
    }

    /// Issues one remote call with spacing, retrying throttled and transient
    /// failures up to the retry budget.
    ///
    /// Exhausting the budget surfaces [`MigrationError::RateLimitExceeded`]
    /// (or the transient reason) instead of retrying indefinitely. Permanent
    /// and session failures are never retried.
    pub async fn run<T, F>(&self, class: CallClass, op: F) -> Result<T, MigrationError>
    where
        F: AsyncFn() -> Result<T, ServiceError>,
    {
        let mut attempt: u32 = 0;

        loop {
            self.throttle(class).await;

            match op().await {
                Ok(value) => return Ok(value),
                Err(ServiceError::Throttled { retry_after }) => {
                    if attempt >= self.max_retries {
                        return Err(MigrationError::RateLimitExceeded);
                    }
                    sleep(self.backoff_delay(attempt, retry_after)).await;
                    attempt += 1;
                }
                Err(ServiceError::Transient(reason)) => {
                    if attempt >= self.max_retries {
                        return Err(MigrationError::Transient(reason));
                    }
                    sleep(self.backoff_delay(attempt, None)).await;
                    attempt += 1;
                }
                Err(ServiceError::Permanent(reason)) => {
                    return Err(MigrationError::Permanent(reason));
                }
                Err(ServiceError::AuthExpired) => return Err(MigrationError::AuthExpired),
            }
        }
    }
}
