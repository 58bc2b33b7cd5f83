//! Process-wide bridge state, passed around explicitly.

use std::sync::Arc;

use ormbridge_client::{ConnectOutcome, ConnectionManager, Session};
use ormbridge_core::LinkState;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::info;

use crate::error::Error;

/// Session plus linking state shared by every model finalization.
///
/// Built once at startup. The session is set at most once per successful
/// connection; the link state is reset whenever a new session is installed.
#[derive(Debug, Default)]
pub struct BridgeContext {
    session: RwLock<Option<Arc<Session>>>,
    state: Mutex<LinkState>,
    host: RwLock<Option<String>>,
}

impl BridgeContext {
    /// Create a context with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `manager` and install the resulting session, if any.
    ///
    /// Blocks the calling thread between attempts.
    pub fn connect(&self, manager: &ConnectionManager) -> Result<ConnectOutcome, Error> {
        self.set_host(manager.config().host.clone());
        let outcome = manager.establish()?;
        if let Some(session) = &outcome.session {
            self.install_session(Arc::clone(session));
        }
        Ok(outcome)
    }

    /// Run `manager` on the blocking thread pool.
    #[cfg(feature = "async")]
    pub async fn connect_async(
        self: Arc<Self>,
        manager: Arc<ConnectionManager>,
    ) -> Result<ConnectOutcome, Error> {
        tokio::task::spawn_blocking(move || self.connect(&manager))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    /// Install `session` and start a fresh linking epoch.
    pub fn install_session(&self, session: Arc<Session>) {
        info!(endpoint = %session.endpoint(), database = %session.database(), "installing remote session");
        let mut state = self.state.lock();
        state.reset();
        *self.session.write() = Some(session);
    }

    /// The current session, if connected.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.read().clone()
    }

    /// Check if a session is installed.
    pub fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    /// Record the configured remote host, for diagnostics.
    pub fn set_host(&self, host: Option<String>) {
        *self.host.write() = host;
    }

    /// Configured remote host, for diagnostics.
    pub fn host(&self) -> Option<String> {
        self.host.read().clone()
    }

    /// Lock the linking state.
    ///
    /// Lock order is link state, then session. Do not call back into the
    /// bridge while holding the guard.
    pub fn lock_state(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock()
    }

    /// Registered remote model identifiers, sorted.
    pub fn registered_models(&self) -> Vec<String> {
        self.state.lock().registry().identifiers()
    }
}
