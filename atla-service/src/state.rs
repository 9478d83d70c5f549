//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;

/// Configuration and database pool shared by every route
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<Config>,
    pool: PgPool,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, pool: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            pool,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the database pool
    ///
    /// `PgPool` is reference counted, so cloning it is cheap.
    pub fn db(&self) -> &PgPool {
        &self.pool
    }
}
