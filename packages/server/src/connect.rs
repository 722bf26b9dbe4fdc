//! Backend connection establishment with bounded retry.
//!
//! Startup connects to the relational store and the document index through
//! [`ConnectionManager`], which attempts a handshake up to a bounded number
//! of times with exponential backoff and then fails hard. The two backends
//! use independent managers, so one backend being down never blocks
//! retrying the other. A live handle that later drops is *not* reconnected
//! here; failures mid-request propagate to the caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ConnectError;

/// Lifecycle of one managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No attempt made yet.
    Disconnected,
    /// An attempt is in flight.
    Connecting,
    /// A handle was produced.
    Connected,
    /// The retry budget is exhausted; terminal.
    Failed,
}

/// Retry budget and backoff curve for connection attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up (must be at least 1).
    pub max_attempts: u32,
    /// Sleep after the first failed attempt.
    pub initial_backoff: Duration,
    /// Backoff growth factor per subsequent attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Sleep duration after the `attempt`-th failure (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1).min(16)).unwrap_or(16);
        Duration::from_secs_f64(
            self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent),
        )
    }
}

/// Result type for a single connection attempt.
pub type AttemptResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One connectable backend: knows how to perform a single handshake.
///
/// Implementations exist per backend (`PostgresConnector`,
/// `ElasticConnector`); the retry loop is shared.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The live handle produced on success.
    type Handle: Send;

    /// Human name of the resource, for logs and errors.
    fn resource(&self) -> &str;

    /// Performs a single connection/handshake attempt.
    async fn connect(&self) -> AttemptResult<Self::Handle>;
}

/// Drives a [`Connector`] through the retry state machine.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    policy: RetryPolicy,
    state: ConnectionState,
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates a manager in the [`ConnectionState::Disconnected`] state.
    #[must_use]
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        Self {
            connector,
            policy,
            state: ConnectionState::Disconnected,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Attempts to connect, retrying transient failures with backoff.
    ///
    /// Performs exactly `max_attempts` attempts before failing with
    /// [`ConnectError`]. The error is fatal by contract: the caller decides
    /// whether to abort startup or degrade explicitly, never to loop.
    pub async fn connect(&mut self) -> Result<C::Handle, ConnectError> {
        let mut last_message = String::from("no attempts made");

        for attempt in 1..=self.policy.max_attempts.max(1) {
            self.state = ConnectionState::Connecting;
            match self.connector.connect().await {
                Ok(handle) => {
                    self.state = ConnectionState::Connected;
                    debug!(resource = self.connector.resource(), attempt, "connected");
                    return Ok(handle);
                }
                Err(err) => {
                    last_message = err.to_string();
                    warn!(
                        resource = self.connector.resource(),
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %last_message,
                        "connection attempt failed"
                    );
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.backoff(attempt)).await;
                    }
                }
            }
        }

        self.state = ConnectionState::Failed;
        Err(ConnectError {
            resource: self.connector.resource().to_string(),
            attempts: self.policy.max_attempts.max(1),
            message: last_message,
        })
    }
}

/// One-shot convenience wrapper around [`ConnectionManager`].
pub async fn connect_with_retry<C: Connector>(
    connector: C,
    policy: &RetryPolicy,
) -> Result<C::Handle, ConnectError> {
    ConnectionManager::new(connector, policy.clone()).connect().await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Connector that fails the first `failures` attempts, then succeeds.
    struct FlakyConnector {
        failures: u32,
        attempts: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        type Handle = u32;

        fn resource(&self) -> &str {
            "flaky backend"
        }

        async fn connect(&self) -> AttemptResult<u32> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.failures {
                Err(format!("refused (attempt {attempt})").into())
            } else {
                Ok(attempt)
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(10),
            multiplier: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_performs_exactly_max_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let connector = FlakyConnector {
            failures: u32::MAX,
            attempts: Arc::clone(&attempts),
        };

        let mut manager = ConnectionManager::new(connector, fast_policy(3));
        let err = manager.connect().await.unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(err.resource, "flaky backend");
        assert_eq!(manager.state(), ConnectionState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let connector = FlakyConnector {
            failures: 2,
            attempts: Arc::clone(&attempts),
        };

        let mut manager = ConnectionManager::new(connector, fast_policy(3));
        let handle = manager.connect().await.unwrap();

        assert_eq!(handle, 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_skips_backoff() {
        let attempts = Arc::new(AtomicU32::new(0));
        let connector = FlakyConnector {
            failures: 0,
            attempts: Arc::clone(&attempts),
        };

        let handle = connect_with_retry(connector, &fast_policy(5)).await.unwrap();
        assert_eq!(handle, 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn manager_starts_disconnected() {
        let manager = ConnectionManager::new(
            FlakyConnector {
                failures: 0,
                attempts: Arc::new(AtomicU32::new(0)),
            },
            RetryPolicy::default(),
        );
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2.0,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }
}
