//! List filtering, sorting and pagination shared by every resource
//!
//! A list request flows through the same pipeline regardless of resource:
//!
//! 1. parse `page`, `page_size` and `sort` from the query string
//!    ([`ListQuery::from_params`]) alongside the resource's own filters
//! 2. validate ranges and resolve `sort` against a handler-supplied
//!    [`Safelist`] ([`prepare`])
//! 3. compute LIMIT/OFFSET ([`Pagination`]) and normalize filters into
//!    predicates ([`ListFilters`])
//! 4. render one windowed query ([`sql::select_page`]) and execute it
//! 5. turn the windowed count into [`Metadata`]
//!
//! Validation failures surface as [`FieldErrors`] and no query is issued.
//! The engine holds no state and is safe to call concurrently.

pub mod filter;
pub mod metadata;
pub mod pagination;
pub mod query;
pub mod sort;
pub mod sql;
pub mod validator;

pub use filter::{Comparator, FilterValue, ListFilters, Predicate, PredicateSet};
pub use metadata::Metadata;
pub use pagination::{Pagination, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};
pub use query::{prepare, ListDirective, ListQuery, QueryParams, DEFAULT_SORT};
pub use sort::{Safelist, SortDirection, SortField, SortKey, DESCENDING_MARKER};
pub use validator::{FieldErrors, Validator};
