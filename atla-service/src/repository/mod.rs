//! Data access for catalogue resources
//!
//! - [`Repository`]: list and CRUD access, implemented generically over
//!   [`Resource`](crate::models::Resource) by [`PgRepository`]
//! - [`RelationRepository`]: join-table lookups, implemented by [`PgRelations`]
//!
//! Every query runs under a wall-clock timeout; an expired query surfaces as a
//! [`RepositoryErrorKind::Timeout`] error and no partial result is returned.

mod error;
mod postgres;
mod relations;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use postgres::{PgRepository, QueryTimeouts};
pub use relations::PgRelations;
pub use traits::{Page, RelationRepository, Repository, RepositoryResult};
