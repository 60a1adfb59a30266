use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and the config is behind
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: folio_db::DbPool,
    pub config: Arc<ServerConfig>,
}
