use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::pool::{DbConn, DbPool};
use crate::error::ApiError;

/// Shared application state, passed to all route handlers via `axum::extract::State`.
///
/// Owns the only handle to the document store; it is dropped with the router
/// when the server shuts down.
pub struct AppState {
    pub config: AppConfig,
    pub pool: DbPool,
}

impl AppState {
    pub fn new(config: AppConfig, pool: DbPool) -> Arc<Self> {
        Arc::new(Self { config, pool })
    }

    /// Check out a read-only connection for the current request.
    pub fn conn(&self) -> Result<DbConn, ApiError> {
        Ok(self.pool.get()?)
    }
}
