//! # atla-service
//!
//! REST catalogue of Avatar: The Last Airbender characters, episodes and
//! quotes, backed by PostgreSQL.
//!
//! ## Features
//!
//! - **List engine**: query-string filters, safelisted sorting and page-based
//!   pagination compiled into a single windowed SQL query ([`listing`])
//! - **Generic CRUD**: one set of axum handlers and one repository serve every
//!   [`Resource`](models::Resource)
//! - **Relations**: character/episode and character/quote join lookups
//! - **Middleware stack**: request IDs, panic recovery, body limits,
//!   compression, CORS, request timeouts
//! - **Health checks**: liveness and readiness probes
//! - **Graceful shutdown**: SIGTERM and SIGINT
//!
//! ## Example
//!
//! ```rust,no_run
//! use atla_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let pool = create_pool(&config.database).await?;
//!     let app = router(AppState::new(config.clone(), pool));
//!
//!     Server::new(config).serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod listing;
pub mod models;
pub mod observability;
pub mod repository;
pub mod routes;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::database::{create_pool, run_migrations};
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
    pub use crate::handlers::{ApiError, ItemResponse, ListResponse, MessageResponse};
    pub use crate::health::{health, readiness};
    pub use crate::listing::{ListDirective, ListQuery, Metadata, Safelist, SortField, Validator};
    pub use crate::models::{Character, Characters, Episode, Episodes, Quote, Quotes, Resource};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{PgRelations, PgRepository, RelationRepository, Repository};
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::AppState;

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, patch, post, put},
        Json, Router,
    };
    pub use serde::{Deserialize, Serialize};
    pub use tokio;
    pub use tracing::{debug, error, info, instrument, warn};
}
