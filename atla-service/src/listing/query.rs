//! Query-string parsing and list directive preparation

use std::collections::HashMap;

use super::filter::{ListFilters, PredicateSet};
use super::metadata::Metadata;
use super::pagination::{Pagination, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};
use super::sort::{Safelist, SortField, SortKey};
use super::validator::{FieldErrors, Validator};

/// Sort token used when the caller does not ask for one
pub const DEFAULT_SORT: &str = "id";

/// Raw query-string pairs of a list request
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    #[must_use]
    pub fn new(pairs: HashMap<String, String>) -> Self {
        Self(pairs)
    }

    /// String value for `key`, or `default` when absent or empty
    #[must_use]
    pub fn read_string(&self, key: &str, default: &str) -> String {
        match self.0.get(key) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => default.to_string(),
        }
    }

    /// Integer value for `key`, or `default` when absent or empty
    ///
    /// Unparseable values record `"must be an integer value"` and yield
    /// `default`.
    pub fn read_int(&self, key: &str, default: i64, v: &mut Validator) -> i64 {
        match self.0.get(key) {
            Some(value) if !value.is_empty() => match value.parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    v.add_error(key, "must be an integer value");
                    default
                }
            },
            _ => default,
        }
    }
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(pairs: HashMap<String, String>) -> Self {
        Self::new(pairs)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for QueryParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Caller-supplied paging and ordering, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl ListQuery {
    /// Read `page`, `page_size` and `sort` with their defaults
    pub fn from_params(params: &QueryParams, default_page_size: i64, v: &mut Validator) -> Self {
        Self {
            page: params.read_int("page", DEFAULT_PAGE, v),
            page_size: params.read_int("page_size", default_page_size, v),
            sort: params.read_string("sort", DEFAULT_SORT),
        }
    }

    /// Record range errors for page and page size
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
    }
}

/// Validated, injection-safe instructions for one list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDirective<F> {
    pub sort: SortKey<F>,
    pub pagination: Pagination,
    pub predicates: PredicateSet,
    pub page: i64,
    pub page_size: i64,
}

impl<F: SortField> ListDirective<F> {
    /// Metadata for this page given the windowed row count
    #[must_use]
    pub fn metadata(&self, total_records: i64) -> Metadata {
        Metadata::build(total_records, self.page, self.page_size)
    }
}

/// Validate a list request and turn it into a [`ListDirective`]
///
/// `v` may already carry errors from parsing the query string or the
/// resource's own filters; any recorded error fails the whole request and
/// nothing is built.
pub fn prepare<F: SortField>(
    query: &ListQuery,
    safelist: &Safelist<F>,
    filters: &impl ListFilters,
    mut v: Validator,
) -> Result<ListDirective<F>, FieldErrors> {
    query.validate(&mut v);
    let sort = safelist.resolve(&query.sort);
    v.check(sort.is_some(), "sort", "invalid sort value");

    let sort = match sort {
        Some(key) if v.valid() => key,
        _ => return Err(v.into_errors()),
    };

    // range checks above guarantee both fit in u32
    let page = u32::try_from(query.page).unwrap_or(1);
    let page_size = u32::try_from(query.page_size).unwrap_or(1);

    Ok(ListDirective {
        sort,
        pagination: Pagination::page(page, page_size),
        predicates: filters.predicates(),
        page: query.page,
        page_size: query.page_size,
    })
}
