//! Postgres-backed repositories

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use sqlx::{postgres::PgRow, FromRow, PgPool, QueryBuilder, Row};
use tracing::instrument;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Page, Repository, RepositoryResult};
use crate::config::ListingConfig;
use crate::error::{DatabaseError, DatabaseOperation};
use crate::listing::{sql, ListDirective};
use crate::models::Resource;

/// Wall-clock limits applied to individual queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTimeouts {
    /// Point lookups and writes
    pub point: Duration,
    /// List queries
    pub list: Duration,
}

impl QueryTimeouts {
    /// Default limits for exact-match lists
    pub fn from_config(config: &ListingConfig) -> Self {
        Self {
            point: Duration::from_millis(config.query_timeout_ms),
            list: Duration::from_millis(config.query_timeout_ms),
        }
    }

    /// Limits for lists that scan text with substring matching
    pub fn text_search(config: &ListingConfig) -> Self {
        Self {
            list: Duration::from_millis(config.text_search_timeout_ms),
            ..Self::from_config(config)
        }
    }
}

/// Run `query` under `limit`, dropping it (and abandoning the query) on expiry
pub(crate) async fn bounded<T>(
    operation: RepositoryOperation,
    limit: Duration,
    query: impl Future<Output = Result<T, sqlx::Error>>,
) -> RepositoryResult<T> {
    let db_operation = match operation {
        RepositoryOperation::Create => DatabaseOperation::Insert,
        RepositoryOperation::Update => DatabaseOperation::Update,
        RepositoryOperation::Delete => DatabaseOperation::Delete,
        _ => DatabaseOperation::Query,
    };

    match tokio::time::timeout(limit, query).await {
        Ok(result) => result.map_err(|e| {
            let err: RepositoryError = DatabaseError::from(e).during(db_operation).into();
            err.with_operation(operation)
        }),
        Err(_) => Err(RepositoryError::timeout(
            operation,
            format!("query exceeded {}ms", limit.as_millis()),
        )),
    }
}

/// A row together with the `count(*) OVER()` value selected beside it
struct Windowed<T> {
    total_records: i64,
    row: T,
}

impl<'r, T: FromRow<'r, PgRow>> FromRow<'r, PgRow> for Windowed<T> {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            total_records: row.try_get(sql::TOTAL_RECORDS_COLUMN)?,
            row: T::from_row(row)?,
        })
    }
}

/// Generic repository over any [`Resource`] table
pub struct PgRepository<R> {
    pool: PgPool,
    timeouts: QueryTimeouts,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for PgRepository<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            timeouts: self.timeouts,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> PgRepository<R> {
    pub fn new(pool: PgPool, timeouts: QueryTimeouts) -> Self {
        Self {
            pool,
            timeouts,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> Repository<R> for PgRepository<R> {
    #[instrument(skip(self, directive), fields(resource = R::PLURAL, sort = %directive.sort, page = directive.page))]
    async fn list(&self, directive: &ListDirective<R::Sort>) -> RepositoryResult<Page<R::Entity>> {
        let mut qb = sql::select_page(R::TABLE, R::COLUMNS, directive);
        let rows: Vec<Windowed<R::Entity>> = bounded(
            RepositoryOperation::List,
            self.timeouts.list,
            qb.build_query_as().fetch_all(&self.pool),
        )
        .await?;

        // every row carries the same window total; none means nothing matched
        let total_records = rows.first().map_or(0, |w| w.total_records);
        tracing::debug!(returned = rows.len(), total_records, "list query complete");

        Ok(Page {
            rows: rows.into_iter().map(|w| w.row).collect(),
            total_records,
        })
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<R::Entity>> {
        if id < 1 {
            return Ok(None);
        }

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(R::COLUMNS)
            .push(" FROM ")
            .push(R::TABLE)
            .push(" WHERE id = ")
            .push_bind(id);

        bounded(
            RepositoryOperation::FindById,
            self.timeouts.point,
            qb.build_query_as().fetch_optional(&self.pool),
        )
        .await
        .map_err(|e| e.with_entity(R::SINGULAR, id))
    }

    async fn create(&self, draft: R::Draft) -> RepositoryResult<R::Entity> {
        let mut qb = R::insert_query(&draft);
        let entity: R::Entity = bounded(
            RepositoryOperation::Create,
            self.timeouts.point,
            qb.build_query_as().fetch_one(&self.pool),
        )
        .await?;

        tracing::info!(resource = R::SINGULAR, id = R::id(&entity), "created");
        Ok(entity)
    }

    async fn update(&self, entity: &R::Entity) -> RepositoryResult<R::Entity> {
        let id = R::id(entity);
        let mut qb = R::update_query(entity);
        let updated: Option<R::Entity> = bounded(
            RepositoryOperation::Update,
            self.timeouts.point,
            qb.build_query_as().fetch_optional(&self.pool),
        )
        .await
        .map_err(|e| e.with_entity(R::SINGULAR, id))?;

        updated.ok_or_else(|| RepositoryError::conflict(R::SINGULAR, id))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        if id < 1 {
            return Ok(false);
        }

        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(R::TABLE).push(" WHERE id = ").push_bind(id);

        let result = bounded(
            RepositoryOperation::Delete,
            self.timeouts.point,
            qb.build().execute(&self.pool),
        )
        .await
        .map_err(|e| e.with_entity(R::SINGULAR, id))?;

        Ok(result.rows_affected() > 0)
    }
}
