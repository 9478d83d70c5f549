//! HTTP handlers for the catalogue
//!
//! The CRUD handlers in [`resource`] are generic over a [`Resource`] and a
//! [`Repository`] for it, so every resource shares one implementation of the
//! list pipeline:
//!
//! 1. read `page`, `page_size`, `sort` and the resource's filters from the
//!    query string, collecting field errors
//! 2. validate and resolve the sort token against the resource's safelist
//! 3. on any error answer 422 with the field map, without touching the
//!    database
//! 4. run one windowed query and derive the page metadata from its count
//!
//! [`Resource`]: crate::models::Resource
//! [`Repository`]: crate::repository::Repository

pub mod error;
pub mod relations;
pub mod resource;
pub mod response;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use relations::{relation_routes, RelationState};
pub use resource::{resource_routes, ResourceState, INVALID_PAYLOAD};
pub use response::{ItemResponse, ListResponse, MessageResponse};
