pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::store::PersonStore;

/// Shared application state injected into all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: PersonStore,
    pub config: Arc<Config>,
}
