use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion collaborator. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn ChatModel>,
    pub config: Config,
}
