use std::sync::Arc;

use crate::config::Config;
use crate::notice::drafter::NoticeDrafter;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable drafting strategy. Default: TemplateDrafter. Swap via DRAFTING_BACKEND.
    pub drafter: Arc<dyn NoticeDrafter>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, drafter: Arc<dyn NoticeDrafter>) -> Self {
        Self {
            sessions: SessionStore::new(config.session_idle_ttl),
            config,
            drafter,
        }
    }
}
