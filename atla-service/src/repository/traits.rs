//! Repository trait definitions
//!
//! Async methods use RPITIT (return position `impl Trait` in traits) so
//! implementations can be written as plain `async fn` without `async_trait`.

use std::future::Future;

use super::error::RepositoryError;
use crate::listing::ListDirective;
use crate::models::{Character, Episode, Quote, Resource};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// One page of rows plus the total the window function counted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// Rows matching the filters across all pages; 0 when `rows` is empty
    pub total_records: i64,
}

impl<T> Page<T> {
    /// An empty page
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total_records: 0,
        }
    }
}

/// CRUD and list access for one resource
pub trait Repository<R: Resource>: Send + Sync {
    /// Execute a validated list directive as a single windowed query
    fn list(
        &self,
        directive: &ListDirective<R::Sort>,
    ) -> impl Future<Output = RepositoryResult<Page<R::Entity>>> + Send;

    /// Fetch by primary key; ids below 1 are never found
    fn find_by_id(&self, id: i64) -> impl Future<Output = RepositoryResult<Option<R::Entity>>> + Send;

    /// Insert a validated draft and return the stored row
    fn create(&self, draft: R::Draft) -> impl Future<Output = RepositoryResult<R::Entity>> + Send;

    /// Persist a modified entity
    ///
    /// Fails with a conflict when the row's `updated_at` no longer matches
    /// the value the entity was read with.
    fn update(&self, entity: &R::Entity) -> impl Future<Output = RepositoryResult<R::Entity>> + Send;

    /// Delete by primary key, returning whether a row was removed
    fn delete(&self, id: i64) -> impl Future<Output = RepositoryResult<bool>> + Send;
}

/// Lookups through the character join tables
///
/// Every method fails with a not-found error when the parent does not exist.
/// Children are ordered by id.
pub trait RelationRepository: Send + Sync {
    fn episodes_of_character(
        &self,
        character_id: i64,
    ) -> impl Future<Output = RepositoryResult<Vec<Episode>>> + Send;

    fn quotes_of_character(
        &self,
        character_id: i64,
    ) -> impl Future<Output = RepositoryResult<Vec<Quote>>> + Send;

    fn characters_in_episode(
        &self,
        episode_id: i64,
    ) -> impl Future<Output = RepositoryResult<Vec<Character>>> + Send;

    /// The character who said a quote; not found when nobody is linked
    fn character_of_quote(
        &self,
        quote_id: i64,
    ) -> impl Future<Output = RepositoryResult<Character>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page() {
        let page: Page<i64> = Page::empty();
        assert!(page.rows.is_empty());
        assert_eq!(page.total_records, 0);
    }
}
