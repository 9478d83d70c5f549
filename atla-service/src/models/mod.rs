//! Catalogue resources
//!
//! Each resource is a zero-sized marker implementing [`Resource`], which ties
//! together its row type, sortable fields, list filters, write payloads and
//! the SQL used to persist them. The generic repository and handlers are
//! written once against this trait.

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow, Postgres, QueryBuilder};

use crate::listing::{ListFilters, QueryParams, Safelist, SortField, Validator};

pub mod character;
pub mod episode;
pub mod quote;

pub use character::{Character, CharacterFilters, CharacterPatch, CharacterSort, Characters, NewCharacter};
pub use episode::{Episode, EpisodeFilters, EpisodePatch, EpisodeSort, Episodes, NewEpisode};
pub use quote::{NewQuote, Quote, QuoteFilters, QuotePatch, QuoteSort, Quotes};

/// Message recorded for a required field left empty
pub const MUST_BE_PROVIDED: &str = "must be provided";

/// A catalogue resource served under `/api/v1/{PLURAL}`
pub trait Resource: Send + Sync + 'static {
    /// Stored row
    type Entity: for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static;
    /// Fields the list endpoint may order by
    type Sort: SortField;
    /// List filters parsed from the query string
    type Filters: ListFilters;
    /// Create payload
    type Draft: DeserializeOwned + Send + 'static;
    /// Partial update payload; absent fields keep their value
    type Patch: DeserializeOwned + Send + 'static;

    /// JSON envelope key for one entity
    const SINGULAR: &'static str;
    /// JSON envelope key for a list, also the route segment
    const PLURAL: &'static str;
    /// Backing table
    const TABLE: &'static str;
    /// Selected columns, in `Entity` field order
    const COLUMNS: &'static str;

    /// Sort keys accepted by the list endpoint
    fn safelist() -> Safelist<Self::Sort>;

    /// Read this resource's filters, recording parse errors in `v`
    fn filters(params: &QueryParams, v: &mut Validator) -> Self::Filters;

    /// Check a create payload
    fn validate_draft(draft: &Self::Draft, v: &mut Validator);

    /// Check an entity after a patch has been applied
    fn validate(entity: &Self::Entity, v: &mut Validator);

    /// Primary key of a stored entity
    fn id(entity: &Self::Entity) -> i64;

    /// Overwrite the fields present in `patch`
    fn apply_patch(entity: &mut Self::Entity, patch: Self::Patch);

    /// `INSERT ... RETURNING <COLUMNS>`
    fn insert_query(draft: &Self::Draft) -> QueryBuilder<'static, Postgres>;

    /// `UPDATE ... WHERE id = .. AND updated_at = .. RETURNING <COLUMNS>`
    ///
    /// Matches no row when the entity changed since it was read.
    fn update_query(entity: &Self::Entity) -> QueryBuilder<'static, Postgres>;
}

/// Append ` RETURNING <COLUMNS>` for resource `R`
pub(crate) fn push_returning<R: Resource>(qb: &mut QueryBuilder<'static, Postgres>) {
    qb.push(" RETURNING ").push(R::COLUMNS);
}
