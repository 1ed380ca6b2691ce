use std::sync::Arc;

use a4l_core::notify::Notifier;
use a4l_core::store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (`PgStore` in production).
    pub store: Arc<dyn Store>,
    /// Notification delivery (SMTP or log).
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: ServerConfig) -> Self {
        Self {
            store,
            notifier,
            config: Arc::new(config),
        }
    }
}
