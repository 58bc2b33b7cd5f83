//! Session bootstrap with bounded, fixed-interval retry.
//!
//! The remote server is expected to be briefly unavailable while it restarts
//! during a deployment, so the connection is retried a fixed number of times
//! with a constant pause. When every attempt fails the failure is reported and
//! absorbed: the caller carries on without a session.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ConnectionConfig, NotificationConfig, RetryPolicy};
use crate::error::Error;
use crate::notify::{FailureReport, Notifier};
use crate::session::{RemoteClient, Session};

/// Pauses the calling thread between attempts.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Attempt bookkeeping for one [`ConnectionManager::establish`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Attempts made so far.
    pub attempt: u32,
    /// Attempt budget.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryState {
    /// Fresh state for `policy`.
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 0,
            max_attempts: policy.max_attempts,
            delay: policy.delay,
        }
    }

    /// Check if another attempt is allowed.
    pub fn can_attempt(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Attempts left.
    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempt)
    }

    /// Record one attempt.
    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}

/// Result of [`ConnectionManager::establish`].
#[derive(Debug)]
pub struct ConnectOutcome {
    /// The live session, absent if every attempt failed.
    pub session: Option<Arc<Session>>,
    /// Number of attempts made.
    pub attempts: u32,
    /// One message per failed attempt.
    pub failures: Vec<String>,
    /// Whether a failure notification was delivered.
    pub notified: bool,
}

impl ConnectOutcome {
    /// Check if a session was established.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

/// Produces a [`Session`] from a [`RemoteClient`], retrying transient failures.
pub struct ConnectionManager {
    client: Arc<dyn RemoteClient>,
    config: ConnectionConfig,
    retry: RetryPolicy,
    notification: Option<(NotificationConfig, Arc<dyn Notifier>)>,
    sleeper: Sleeper,
}

impl ConnectionManager {
    /// Create a manager with the default retry policy and no notification.
    pub fn new(client: Arc<dyn RemoteClient>, config: ConnectionConfig) -> Self {
        Self {
            client,
            config,
            retry: RetryPolicy::default(),
            notification: None,
            sleeper: Arc::new(thread::sleep),
        }
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Notify `config`'s recipients through `notifier` on terminal failure.
    pub fn with_notification(mut self, config: NotificationConfig, notifier: Arc<dyn Notifier>) -> Self {
        self.notification = Some((config, notifier));
        self
    }

    /// Replace the function used to wait between attempts.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The connection settings.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Connect, retrying up to the policy's attempt budget.
    ///
    /// Only a configuration error is returned as `Err`. Exhausting every
    /// attempt yields `Ok` with no session after reporting the failure.
    pub fn establish(&self) -> Result<ConnectOutcome, Error> {
        let host = self.config.validate()?;
        info!(
            host = %host,
            port = self.config.port,
            database = %self.config.database,
            max_attempts = self.retry.max_attempts,
            "connecting to remote server"
        );

        let mut state = RetryState::new(&self.retry);
        let mut failures = Vec::new();
        let mut last_error = None;

        while state.can_attempt() {
            state.advance();
            match self.client.connect(&self.config) {
                Ok(inner) => {
                    let session = Session::new(inner, &self.config);
                    info!(
                        endpoint = %session.endpoint(),
                        attempt = state.attempt,
                        lang = ?session.context().lang(),
                        "connected to remote server"
                    );
                    return Ok(ConnectOutcome {
                        session: Some(Arc::new(session)),
                        attempts: state.attempt,
                        failures,
                        notified: false,
                    });
                }
                Err(e) => {
                    warn!(
                        host = %host,
                        attempt = state.attempt,
                        remaining = state.remaining(),
                        error = %e,
                        "failed to connect to remote server"
                    );
                    failures.push(e.to_string());
                    last_error = Some(e);

                    if state.can_attempt() {
                        debug!(delay = ?state.delay, "waiting before the next attempt");
                        (self.sleeper)(state.delay);
                    }
                }
            }
        }

        error!(
            host = %host,
            attempts = state.attempt,
            "unable to connect to remote server, continuing without a session"
        );

        let report = FailureReport::new(&self.config, &self.retry, state.attempt, last_error.as_ref());
        let notified = self.notify(&report);

        Ok(ConnectOutcome {
            session: None,
            attempts: state.attempt,
            failures,
            notified,
        })
    }

    fn notify(&self, report: &FailureReport) -> bool {
        let Some((config, notifier)) = &self.notification else {
            return false;
        };
        if !config.is_enabled() {
            return false;
        }

        info!(recipients = ?config.recipients, "sending failure notification");
        match notifier.notify(&report.to_notification(config)) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to deliver failure notification");
                false
            }
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .field("notification", &self.notification.as_ref().map(|(c, _)| c))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_state() {
        let mut state = RetryState::new(&RetryPolicy::new(2, Duration::from_secs(1)));
        assert!(state.can_attempt());
        assert_eq!(state.remaining(), 2);

        state.advance();
        assert!(state.can_attempt());
        assert_eq!(state.remaining(), 1);

        state.advance();
        assert!(!state.can_attempt());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_outcome_is_connected() {
        let outcome = ConnectOutcome {
            session: None,
            attempts: 3,
            failures: vec!["a".into(), "b".into(), "c".into()],
            notified: false,
        };
        assert!(!outcome.is_connected());
    }
}
