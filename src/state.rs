// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::llm::LlmProvider;
use crate::services::metrics_manager::MetricsManager;
use crate::services::session_manager::SessionManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: SessionManager,
    pub metrics: MetricsManager,
    pub llm: Arc<dyn LlmProvider>,
    pub admin_api_key: Option<String>,
}

impl AppState {
    pub fn new(config: &Config, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            sessions: SessionManager::new(config.session_ttl, config.history_limit),
            metrics: MetricsManager::new(),
            llm,
            admin_api_key: config.admin_api_key.clone(),
        }
    }
}
