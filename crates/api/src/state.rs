use std::sync::Arc;

use downnote_core::store::DocumentStore;
use downnote_core::versioning::VersioningService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Document and snapshot store. PostgreSQL in production.
    pub store: Arc<dyn DocumentStore>,
    /// Document service bound to `store` and the configured policy.
    pub versioning: VersioningService,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let versioning = VersioningService::new(Arc::clone(&store), config.versioning);
        Self {
            config: Arc::new(config),
            store,
            versioning,
        }
    }
}
