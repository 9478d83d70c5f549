//! Join-table lookups between characters, episodes and quotes

use std::time::Duration;

use sqlx::PgPool;
use tracing::instrument;

use super::error::{RepositoryError, RepositoryOperation};
use super::postgres::bounded;
use super::traits::{RelationRepository, RepositoryResult};
use crate::models::{Character, Episode, Quote};

const CHARACTER_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM characters WHERE id = $1)";
const EPISODE_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM episodes WHERE id = $1)";
const QUOTE_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM quotes WHERE id = $1)";

const EPISODES_OF_CHARACTER: &str = "\
    SELECT e.id, e.title, e.air_date, e.created_at, e.updated_at \
    FROM episodes e \
    JOIN characters_and_episodes ce ON e.id = ce.episode_id \
    WHERE ce.character_id = $1 \
    ORDER BY e.id";

const QUOTES_OF_CHARACTER: &str = "\
    SELECT q.id, q.quote, q.created_at, q.updated_at \
    FROM quotes q \
    JOIN characters_and_quotes cq ON q.id = cq.quote_id \
    WHERE cq.character_id = $1 \
    ORDER BY q.id";

const CHARACTERS_IN_EPISODE: &str = "\
    SELECT c.id, c.name, c.age, c.gender, c.status, c.nation, c.created_at, c.updated_at \
    FROM characters c \
    JOIN characters_and_episodes ce ON c.id = ce.character_id \
    WHERE ce.episode_id = $1 \
    ORDER BY c.id";

const CHARACTER_OF_QUOTE: &str = "\
    SELECT c.id, c.name, c.age, c.gender, c.status, c.nation, c.created_at, c.updated_at \
    FROM characters c \
    JOIN characters_and_quotes cq ON c.id = cq.character_id \
    WHERE cq.quote_id = $1 \
    ORDER BY c.id \
    LIMIT 1";

#[derive(Debug, Clone)]
pub struct PgRelations {
    pool: PgPool,
    timeout: Duration,
}

impl PgRelations {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Fail with not-found unless `exists_query` finds the parent row
    async fn ensure_exists(
        &self,
        exists_query: &'static str,
        entity: &'static str,
        id: i64,
    ) -> RepositoryResult<()> {
        if id < 1 {
            return Err(RepositoryError::not_found(entity, id));
        }

        let exists: bool = bounded(
            RepositoryOperation::FindById,
            self.timeout,
            sqlx::query_scalar(exists_query).bind(id).fetch_one(&self.pool),
        )
        .await?;

        if exists {
            Ok(())
        } else {
            Err(RepositoryError::not_found(entity, id))
        }
    }
}

impl RelationRepository for PgRelations {
    #[instrument(skip(self))]
    async fn episodes_of_character(&self, character_id: i64) -> RepositoryResult<Vec<Episode>> {
        self.ensure_exists(CHARACTER_EXISTS, "character", character_id).await?;
        bounded(
            RepositoryOperation::FindRelated,
            self.timeout,
            sqlx::query_as(EPISODES_OF_CHARACTER)
                .bind(character_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn quotes_of_character(&self, character_id: i64) -> RepositoryResult<Vec<Quote>> {
        self.ensure_exists(CHARACTER_EXISTS, "character", character_id).await?;
        bounded(
            RepositoryOperation::FindRelated,
            self.timeout,
            sqlx::query_as(QUOTES_OF_CHARACTER)
                .bind(character_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn characters_in_episode(&self, episode_id: i64) -> RepositoryResult<Vec<Character>> {
        self.ensure_exists(EPISODE_EXISTS, "episode", episode_id).await?;
        bounded(
            RepositoryOperation::FindRelated,
            self.timeout,
            sqlx::query_as(CHARACTERS_IN_EPISODE)
                .bind(episode_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn character_of_quote(&self, quote_id: i64) -> RepositoryResult<Character> {
        self.ensure_exists(QUOTE_EXISTS, "quote", quote_id).await?;
        let character: Option<Character> = bounded(
            RepositoryOperation::FindRelated,
            self.timeout,
            sqlx::query_as(CHARACTER_OF_QUOTE)
                .bind(quote_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        character.ok_or_else(|| {
            RepositoryError::not_found("character", format!("quote {quote_id}"))
                .with_operation(RepositoryOperation::FindRelated)
        })
    }
}
