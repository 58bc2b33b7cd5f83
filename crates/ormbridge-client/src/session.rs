//! Remote client seams and the authenticated session.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ormbridge_proto::{FieldMap, CONTEXT_LANG};

use crate::config::ConnectionConfig;
use crate::error::Error;

/// Opens sessions on a remote server.
pub trait RemoteClient: Send + Sync {
    /// Authenticate against the server described by `config`.
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn RemoteSession>, Error>;
}

/// An authenticated connection able to describe remote models.
pub trait RemoteSession: Send + Sync {
    /// Describe `fields` of `model`. An empty set asks for every field.
    fn describe_fields(
        &self,
        model: &str,
        fields: &BTreeSet<String>,
        context: &SessionContext,
    ) -> Result<FieldMap, Error>;
}

/// Key-value bag sent along with every remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    values: BTreeMap<String, String>,
}

impl SessionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The locale, if set.
    pub fn lang(&self) -> Option<&str> {
        self.get(CONTEXT_LANG)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A live session plus the context applied to its calls.
pub struct Session {
    inner: Box<dyn RemoteSession>,
    context: SessionContext,
    endpoint: String,
    database: String,
}

impl Session {
    /// Wrap a remote session opened against `config`.
    pub fn new(inner: Box<dyn RemoteSession>, config: &ConnectionConfig) -> Self {
        let mut context = SessionContext::new();
        context.insert(CONTEXT_LANG, config.language.clone());

        Self {
            inner,
            context,
            endpoint: config.endpoint().unwrap_or_default(),
            database: config.database.clone(),
        }
    }

    /// Describe `fields` of `model` using this session's context.
    pub fn describe_fields(&self, model: &str, fields: &BTreeSet<String>) -> Result<FieldMap, Error> {
        self.inner.describe_fields(model, fields, &self.context)
    }

    /// The session context.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Mutable access to the session context.
    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }

    /// `host:port` of the server.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Database name.
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("context", &self.context)
            .finish()
    }
}
