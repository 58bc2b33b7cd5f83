//! Terminal failure notifications.

use std::error::Error as StdError;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{ConnectionConfig, NotificationConfig, RetryPolicy};
use crate::error::Error;

/// Subject line of connection failure notifications.
pub const FAILURE_SUBJECT: &str = "APPLICATION FAILURE - ORMBRIDGE";

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub plain_body: String,
    pub html_body: String,
    pub sender: String,
    pub recipients: Vec<String>,
}

/// Delivers notifications. Best effort: callers log failures and move on.
pub trait Notifier: Send + Sync {
    /// Deliver `notification`.
    fn notify(&self, notification: &Notification) -> Result<(), Error>;
}

/// Notifier that writes the message to the log instead of sending it.
///
/// Logs at info level. The manager has already reported the failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), Error> {
        info!(
            subject = %notification.subject,
            sender = %notification.sender,
            recipients = ?notification.recipients,
            "{}",
            notification.plain_body
        );
        Ok(())
    }
}

/// What went wrong when the connection could not be established.
///
/// Carries the host configuration without the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub attempts: u32,
    pub delay: Duration,
    pub user: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub occurred_at: DateTime<Utc>,
    /// The last error and its causes, one per line.
    pub trace: String,
}

impl FailureReport {
    /// Build a report for `attempts` failed attempts ending with `last_error`.
    pub fn new(
        config: &ConnectionConfig,
        retry: &RetryPolicy,
        attempts: u32,
        last_error: Option<&Error>,
    ) -> Self {
        Self {
            attempts,
            delay: retry.delay,
            user: config.user.clone(),
            host: config.host.clone().unwrap_or_default(),
            port: config.port,
            database: config.database.clone(),
            occurred_at: Utc::now(),
            trace: last_error
                .map(|e| error_trace(e))
                .unwrap_or_else(|| "no attempt was made".to_string()),
        }
    }

    /// Plain-text body.
    pub fn plain_body(&self) -> String {
        format!(
            "Unable to connect to a running remote server. Your application may have failed \
             to start up due to a connection problem with the remote instance.\n\n\
             ormbridge tried to connect {attempts} times, waiting {delay} seconds between \
             each attempt. Still, the server could not be reached.\n\n\
             The problem occurred at {at} with the following host configuration:\n\n\
             \x20   USER: {user}\n\
             \x20   HOST: {host}\n\
             \x20   PORT: {port}\n\
             \x20   DB: {db}\n\n\
             And here is the error raised during the last attempt:\n\n{trace}\n",
            attempts = self.attempts,
            delay = self.delay.as_secs_f64(),
            at = self.occurred_at.to_rfc3339(),
            user = self.user,
            host = self.host,
            port = self.port,
            db = self.database,
            trace = self.trace,
        )
    }

    /// HTML body.
    pub fn html_body(&self) -> String {
        format!(
            "<p>Unable to connect to a running remote server. Your application may have failed \
             to start up due to a connection problem with the remote instance.</p>\n\
             <p>ormbridge tried to connect <b>{attempts} times</b>, waiting <b>{delay} seconds</b> \
             between each attempt. Still, the server could not be reached.</p>\n\
             <p>The problem occurred at {at} with the following host configuration:</p>\n\
             <div style=\"border-left: 1px solid gray; padding-left: 10px;\">\n\
             USER: {user}<br>\n\
             HOST: {host}<br>\n\
             PORT: {port}<br>\n\
             DB: {db}<br>\n\
             </div>\n\
             <p>And here is the error raised during the last attempt:</p>\n\
             <pre>{trace}</pre>\n",
            attempts = self.attempts,
            delay = self.delay.as_secs_f64(),
            at = self.occurred_at.to_rfc3339(),
            user = escape_html(&self.user),
            host = escape_html(&self.host),
            port = self.port,
            db = escape_html(&self.database),
            trace = escape_html(&self.trace),
        )
    }

    /// Address the report to `config`'s recipients.
    pub fn to_notification(&self, config: &NotificationConfig) -> Notification {
        Notification {
            subject: FAILURE_SUBJECT.to_string(),
            plain_body: self.plain_body(),
            html_body: self.html_body(),
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
        }
    }
}

/// Render an error followed by its `source()` chain.
pub fn error_trace(error: &dyn StdError) -> String {
    let mut trace = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str("\ncaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
