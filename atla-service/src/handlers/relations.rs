//! Handlers for the character join tables

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::instrument;

use super::error::{ApiError, ApiOperation};
use super::resource::parse_id;
use super::response::ItemResponse;
use crate::models::{Character, Episode, Quote};
use crate::repository::RelationRepository;

#[derive(Debug)]
pub struct RelationState<Rel> {
    pub relations: Arc<Rel>,
}

impl<Rel> RelationState<Rel> {
    pub fn new(relations: Rel) -> Self {
        Self {
            relations: Arc::new(relations),
        }
    }
}

impl<Rel> Clone for RelationState<Rel> {
    fn clone(&self) -> Self {
        Self {
            relations: Arc::clone(&self.relations),
        }
    }
}

/// Routes linking characters to their episodes and quotes
pub fn relation_routes<Rel>(state: RelationState<Rel>) -> Router
where
    Rel: RelationRepository + 'static,
{
    Router::new()
        .route("/characters/{id}/episodes", get(episodes_of_character::<Rel>))
        .route("/characters/{id}/quotes", get(quotes_of_character::<Rel>))
        .route("/episodes/{id}/characters", get(characters_in_episode::<Rel>))
        .route("/quotes/{id}/character", get(character_of_quote::<Rel>))
        .with_state(state)
}

fn related(err: crate::repository::RepositoryError) -> ApiError {
    ApiError::from(err).with_operation(ApiOperation::Related)
}

#[instrument(skip(state))]
pub async fn episodes_of_character<Rel: RelationRepository>(
    State(state): State<RelationState<Rel>>,
    Path(id): Path<String>,
) -> Result<ItemResponse<Vec<Episode>>, ApiError> {
    let id = parse_id(&id, "character")?;
    let episodes = state.relations.episodes_of_character(id).await.map_err(related)?;
    Ok(ItemResponse::ok("episodes", episodes))
}

#[instrument(skip(state))]
pub async fn quotes_of_character<Rel: RelationRepository>(
    State(state): State<RelationState<Rel>>,
    Path(id): Path<String>,
) -> Result<ItemResponse<Vec<Quote>>, ApiError> {
    let id = parse_id(&id, "character")?;
    let quotes = state.relations.quotes_of_character(id).await.map_err(related)?;
    Ok(ItemResponse::ok("quotes", quotes))
}

#[instrument(skip(state))]
pub async fn characters_in_episode<Rel: RelationRepository>(
    State(state): State<RelationState<Rel>>,
    Path(id): Path<String>,
) -> Result<ItemResponse<Vec<Character>>, ApiError> {
    let id = parse_id(&id, "episode")?;
    let characters = state.relations.characters_in_episode(id).await.map_err(related)?;
    Ok(ItemResponse::ok("characters", characters))
}

#[instrument(skip(state))]
pub async fn character_of_quote<Rel: RelationRepository>(
    State(state): State<RelationState<Rel>>,
    Path(id): Path<String>,
) -> Result<ItemResponse<Character>, ApiError> {
    let id = parse_id(&id, "quote")?;
    let character = state.relations.character_of_quote(id).await.map_err(related)?;
    Ok(ItemResponse::ok("character", character))
}
