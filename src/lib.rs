pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use store::RecordStore;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub config: config::AppConfig,
}

impl AppState {
    /// Build the state for `config`, opening the store it points at.
    pub fn new(config: config::AppConfig) -> Self {
        let store = RecordStore::new(config.data_file.clone(), config.cache_ttl());
        Self {
            store: Arc::new(store),
            config,
        }
    }
}
