//! Route table

use axum::{routing::get, Router};

use crate::handlers::{relation_routes, resource_routes, RelationState, ResourceState};
use crate::health::{health, readiness};
use crate::models::{Characters, Episodes, Quotes};
use crate::repository::{PgRelations, PgRepository, QueryTimeouts};
use crate::state::AppState;

/// Mount point of the catalogue API
pub const API_PREFIX: &str = "/api/v1";

/// Build the application router
///
/// Probes live at the root; every resource and relation route is nested
/// under [`API_PREFIX`]. Quote listing searches text by substring and gets
/// the longer list timeout.
pub fn router(state: AppState) -> Router {
    let listing = state.config().listing.clone();
    let pool = state.db().clone();
    let page_size = listing.default_page_size;

    let characters = PgRepository::<Characters>::new(pool.clone(), QueryTimeouts::from_config(&listing));
    let episodes = PgRepository::<Episodes>::new(pool.clone(), QueryTimeouts::from_config(&listing));
    let quotes = PgRepository::<Quotes>::new(pool.clone(), QueryTimeouts::text_search(&listing));
    let relations = PgRelations::new(pool, listing.query_timeout());

    let api = Router::new()
        .merge(resource_routes::<Characters, _>(ResourceState::new(characters, page_size)))
        .merge(resource_routes::<Episodes, _>(ResourceState::new(episodes, page_size)))
        .merge(resource_routes::<Quotes, _>(ResourceState::new(quotes, page_size)))
        .merge(relation_routes(RelationState::new(relations)));

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .with_state(state)
        .nest(API_PREFIX, api)
}
