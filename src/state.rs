use std::sync::Arc;

use crate::config::AppConfig;
use crate::session::SessionManager;
use crate::store::KvStore;

/// Shared handler state. Handlers have no other mutable state; the store is
/// the only thing requests share.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub sessions: SessionManager,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, config: AppConfig) -> Self {
        let sessions = SessionManager::new(store.clone(), config.session.ttl_secs);
        Self { store, sessions, config }
    }
}
