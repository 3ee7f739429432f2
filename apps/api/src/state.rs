use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::ChatCompleter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// `LlmClient` in production; a scripted completer in tests.
    pub llm: Arc<dyn ChatCompleter>,
    pub config: Config,
}
