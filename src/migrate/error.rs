use std::fmt;

/// Failure signal from the remote service boundary.
///
/// The adapter classifies every failed call into one of these variants so
/// the rate limiter can decide between backoff, bounded retry and giving up
/// without ever inspecting transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service asked us to slow down (HTTP 429 equivalent). Carries the
    /// server-suggested delay in seconds when one was sent.
    Throttled { retry_after: Option<u64> },
    /// Network trouble or a server-side error worth retrying.
    Transient(String),
    /// The call can never succeed as issued (bad identifier, gone resource).
    Permanent(String),
    /// The session is no longer valid.
    AuthExpired,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Throttled { retry_after } => match retry_after {
                Some(secs) => write!(f, "throttled by remote service (retry after {}s)", secs),
                None => write!(f, "throttled by remote service"),
            },
            ServiceError::Transient(reason) => write!(f, "transient remote failure: {}", reason),
            ServiceError::Permanent(reason) => write!(f, "permanent remote failure: {}", reason),
            ServiceError::AuthExpired => write!(f, "session expired"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Engine-level failure after the rate limiter has spent its retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// Throttled responses outlasted the retry budget.
    RateLimitExceeded,
    /// Transient failures outlasted the retry budget.
    Transient(String),
    /// A failure that retrying cannot fix.
    Permanent(String),
    /// The session died mid-run. Fatal to the whole orchestrated run.
    AuthExpired,
}

impl MigrationError {
    /// Whether this error must abort the entire run rather than one stage.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MigrationError::AuthExpired)
    }
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationError::RateLimitExceeded => {
                write!(f, "rate limit retries exhausted")
            }
            MigrationError::Transient(reason) => {
                write!(f, "transient failure retries exhausted: {}", reason)
            }
            MigrationError::Permanent(reason) => write!(f, "permanent failure: {}", reason),
            MigrationError::AuthExpired => write!(f, "session expired"),
        }
    }
}

impl std::error::Error for MigrationError {}

/// Pagination could not complete. Carries whatever was gathered before the
/// failure; callers may use the partial sequence for preview purposes but
/// never for the authoritative copy.
#[derive(Debug)]
pub struct CollectionError<T> {
    pub cause: MigrationError,
    pub partial: Vec<T>,
}

impl<T> fmt::Display for CollectionError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collection failed after {} items: {}",
            self.partial.len(),
            self.cause
        )
    }
}
