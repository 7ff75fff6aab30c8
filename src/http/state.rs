use crate::session::SessionHandle;
use crate::storage::PersistenceSink;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running cooking session
    pub session: SessionHandle,
    /// Sink holding completed sessions
    pub store: Arc<dyn PersistenceSink>,
}

impl AppState {
    pub fn new(session: SessionHandle, store: Arc<dyn PersistenceSink>) -> Self {
        Self { session, store }
    }
}
