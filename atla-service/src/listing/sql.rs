//! Rendering a [`ListDirective`] into a Postgres query
//!
//! Only `&'static str` identifiers are spliced into the query text; every
//! caller-supplied value goes through `push_bind`.

use sqlx::{Postgres, QueryBuilder};

use super::filter::{Comparator, FilterValue, Predicate, PredicateSet};
use super::query::ListDirective;
use super::sort::SortField;

/// Name of the windowed count column every list query selects
pub const TOTAL_RECORDS_COLUMN: &str = "total_records";

/// Unique column appended to every ordering so pages are deterministic
const TIE_BREAK_COLUMN: &str = "id";

/// Build a single-page SELECT with a windowed total
///
/// Produces
/// `SELECT count(*) OVER() AS total_records, <columns> FROM <table>
///  [WHERE ...] ORDER BY <col> <dir>, id ASC LIMIT $n OFFSET $m`.
/// The `id` tie-break is omitted when the sort column is already `id`.
pub fn select_page<F: SortField>(
    table: &'static str,
    columns: &'static str,
    directive: &ListDirective<F>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT count(*) OVER() AS ");
    qb.push(TOTAL_RECORDS_COLUMN)
        .push(", ")
        .push(columns)
        .push(" FROM ")
        .push(table);

    push_where(&mut qb, &directive.predicates);

    qb.push(" ORDER BY ")
        .push(directive.sort.column())
        .push(" ")
        .push(directive.sort.direction.as_sql());
    if directive.sort.column() != TIE_BREAK_COLUMN {
        qb.push(", ").push(TIE_BREAK_COLUMN).push(" ASC");
    }

    qb.push(" LIMIT ")
        .push_bind(clamp(directive.pagination.limit))
        .push(" OFFSET ")
        .push_bind(clamp(directive.pagination.offset));

    qb
}

/// Append `WHERE a AND b ...` for a non-empty predicate set
pub fn push_where(qb: &mut QueryBuilder<'static, Postgres>, predicates: &PredicateSet) {
    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(qb, predicate);
    }
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    let column = predicate.column;
    match predicate.comparator {
        Comparator::EqualIgnoreCase => {
            qb.push("LOWER(").push(column).push(") = LOWER(");
            push_value(qb, &predicate.value);
            qb.push(")");
        }
        Comparator::Contains => {
            qb.push("strpos(").push(column).push(", ");
            push_value(qb, &predicate.value);
            qb.push(") > 0");
        }
        Comparator::Equal => {
            qb.push(column).push(" = ");
            push_value(qb, &predicate.value);
        }
        Comparator::GreaterOrEqual => {
            qb.push(column).push(" >= ");
            push_value(qb, &predicate.value);
        }
        Comparator::LessOrEqual => {
            qb.push(column).push(" <= ");
            push_value(qb, &predicate.value);
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(s) => qb.push_bind(s.clone()),
        FilterValue::Integer(n) => qb.push_bind(*n),
        FilterValue::Date(d) => qb.push_bind(*d),
    };
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
