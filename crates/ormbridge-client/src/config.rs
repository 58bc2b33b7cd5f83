//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::Error;

/// Default port of the remote server.
pub const DEFAULT_PORT: u16 = 8069;

/// Default locale applied to remote calls.
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of connection attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default sender of failure notifications.
pub const DEFAULT_SENDER: &str = "ormbridge@example.com";

/// Remote server connection settings.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Server host. Required.
    pub host: Option<String>,

    /// Server port.
    pub port: u16,

    /// Database name on the server.
    pub database: String,

    /// Login.
    pub user: String,

    /// Password. Never logged or reported.
    pub password: String,

    /// Locale stored in the session context.
    pub language: String,

    /// Per-request timeout handed to the remote client.
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Create a configuration for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the login and password.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the session locale.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the host, or a configuration error if it is missing.
    pub fn validate(&self) -> Result<&str, Error> {
        match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => Ok(host),
            _ => Err(Error::Config(
                "a host is required to reach the remote server".to_string(),
            )),
        }
    }

    /// `host:port`, if a host is configured.
    pub fn endpoint(&self) -> Option<String> {
        self.validate()
            .ok()
            .map(|host| format!("{}:{}", host, self.port))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Fixed-interval retry settings for the initial connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of connection attempts, at least one.
    pub max_attempts: u32,

    /// Pause between two attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is raised to one if zero.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A single attempt, no retry.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// Who hears about a terminal connection failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Recipient addresses.
    pub recipients: Vec<String>,

    /// Sender address.
    pub sender: String,
}

impl NotificationConfig {
    /// Notify `recipients` from the default sender.
    pub fn new<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recipients: recipients.into_iter().map(Into::into).collect(),
            sender: DEFAULT_SENDER.to_string(),
        }
    }

    /// Set the sender address.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Check if there is anyone to notify.
    pub fn is_enabled(&self) -> bool {
        !self.recipients.is_empty()
    }
}
