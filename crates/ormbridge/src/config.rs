//! Bridge configuration file.
//!
//! ```json
//! {
//!   "connection": {"host": "erp.internal", "port": 8069, "database": "prod",
//!                  "user": "admin", "password": "admin", "language": "en_US"},
//!   "retry": {"max_attempts": 3, "delay_secs": 5},
//!   "notification": {"recipients": ["ops@example.com"]},
//!   "models": [{"name": "Partner", "remote": "res.partner", "fields": ["name", "email"]}]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ormbridge_client::config::{
    DEFAULT_LANGUAGE, DEFAULT_MAX_ATTEMPTS, DEFAULT_PORT, DEFAULT_RETRY_DELAY, DEFAULT_SENDER,
    DEFAULT_TIMEOUT,
};
use ormbridge_client::{ConnectionConfig, NotificationConfig, RetryPolicy};
use ormbridge_core::BridgedModel;
use serde::Deserialize;

use crate::error::Error;

/// Connection section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub host: Option<String>,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Retry section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_secs: DEFAULT_RETRY_DELAY.as_secs(),
        }
    }
}

/// Notification section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationSection {
    pub recipients: Vec<String>,
    #[serde(default = "default_sender")]
    pub sender: String,
}

fn default_sender() -> String {
    DEFAULT_SENDER.to_string()
}

/// One bridged model, in finalization order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSection {
    /// Local model name.
    pub name: String,
    /// Remote model identifier.
    pub remote: String,
    /// Remote fields to request. Empty means all.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub connection: ConnectionSection,
    pub retry: RetrySection,
    pub notification: Option<NotificationSection>,
    pub models: Vec<ModelSection>,
}

impl BridgeConfig {
    /// Decode a configuration from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }

    /// Connection settings.
    pub fn connection_config(&self) -> ConnectionConfig {
        let c = &self.connection;
        ConnectionConfig {
            host: c.host.clone(),
            port: c.port,
            database: c.database.clone(),
            user: c.user.clone(),
            password: c.password.clone(),
            language: c.language.clone(),
            timeout: Duration::from_secs(c.timeout_secs),
        }
    }

    /// Retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.delay_secs),
        )
    }

    /// Notification settings, if any recipient is configured.
    pub fn notification_config(&self) -> Option<NotificationConfig> {
        self.notification
            .as_ref()
            .map(|n| NotificationConfig::new(n.recipients.clone()).with_sender(n.sender.clone()))
            .filter(NotificationConfig::is_enabled)
    }

    /// Build the declared models, in declaration order.
    pub fn bridged_models(&self) -> Vec<Arc<BridgedModel>> {
        self.models
            .iter()
            .map(|m| {
                BridgedModel::builder(m.name.clone(), m.remote.clone())
                    .fields(m.fields.iter().cloned())
                    .build()
            })
            .collect()
    }
}
