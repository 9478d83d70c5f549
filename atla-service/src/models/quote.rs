//! Quotes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::{push_returning, Resource, MUST_BE_PROVIDED};
use crate::listing::{ListFilters, PredicateSet, QueryParams, Safelist, SortField, Validator};

/// Marker for the `/quotes` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct Quotes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewQuote {
    pub quote: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuotePatch {
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSort {
    Id,
    Quote,
    CreatedAt,
    UpdatedAt,
}

impl SortField for QuoteSort {
    fn token(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Quote => "quote",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn column(self) -> &'static str {
        self.token()
    }
}

/// `quote` matches any stored quote containing it, case-sensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilters {
    pub quote: String,
}

impl ListFilters for QuoteFilters {
    fn predicates(&self) -> PredicateSet {
        PredicateSet::new().contains("quote", &self.quote)
    }
}

impl Resource for Quotes {
    type Entity = Quote;
    type Sort = QuoteSort;
    type Filters = QuoteFilters;
    type Draft = NewQuote;
    type Patch = QuotePatch;

    const SINGULAR: &'static str = "quote";
    const PLURAL: &'static str = "quotes";
    const TABLE: &'static str = "quotes";
    const COLUMNS: &'static str = "id, quote, created_at, updated_at";

    fn safelist() -> Safelist<QuoteSort> {
        Safelist::both_directions(&[
            QuoteSort::Id,
            QuoteSort::Quote,
            QuoteSort::CreatedAt,
            QuoteSort::UpdatedAt,
        ])
    }

    fn filters(params: &QueryParams, _v: &mut Validator) -> QuoteFilters {
        QuoteFilters {
            quote: params.read_string("quote", ""),
        }
    }

    fn validate_draft(draft: &NewQuote, v: &mut Validator) {
        v.check(!draft.quote.is_empty(), "quote", MUST_BE_PROVIDED);
    }

    fn validate(entity: &Quote, v: &mut Validator) {
        v.check(!entity.quote.is_empty(), "quote", MUST_BE_PROVIDED);
    }

    fn id(entity: &Quote) -> i64 {
        entity.id
    }

    fn apply_patch(entity: &mut Quote, patch: QuotePatch) {
        if let Some(quote) = patch.quote {
            entity.quote = quote;
        }
    }

    fn insert_query(draft: &NewQuote) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("INSERT INTO quotes (quote) VALUES (");
        qb.push_bind(draft.quote.clone()).push(")");
        push_returning::<Self>(&mut qb);
        qb
    }

    fn update_query(entity: &Quote) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE quotes SET quote = ");
        qb.push_bind(entity.quote.clone())
            .push(", updated_at = now() WHERE id = ")
            .push_bind(entity.id)
            .push(" AND updated_at = ")
            .push_bind(entity.updated_at);
        push_returning::<Self>(&mut qb);
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Comparator;

    #[test]
    fn test_quote_filter_is_substring() {
        let mut v = Validator::new();
        let filters = Quotes::filters(&QueryParams::from([("quote", "tea")]), &mut v);
        let predicates = filters.predicates();
        let predicate = predicates.iter().next().unwrap();
        assert_eq!(predicate.column, "quote");
        assert_eq!(predicate.comparator, Comparator::Contains);
    }

    #[test]
    fn test_safelist_tokens() {
        let tokens: Vec<String> = Quotes::safelist().tokens().collect();
        assert_eq!(
            tokens,
            vec![
                "id",
                "quote",
                "created_at",
                "updated_at",
                "-id",
                "-quote",
                "-created_at",
                "-updated_at"
            ]
        );
    }

    #[test]
    fn test_insert_query() {
        let qb = Quotes::insert_query(&NewQuote {
            quote: "Sometimes life is like this dark tunnel.".to_string(),
        });
        assert_eq!(
            qb.sql(),
            "INSERT INTO quotes (quote) VALUES ($1) RETURNING id, quote, created_at, updated_at"
        );
    }

    #[test]
    fn test_empty_quote_rejected() {
        let mut v = Validator::new();
        Quotes::validate_draft(&NewQuote::default(), &mut v);
        assert_eq!(v.finish().unwrap_err().get("quote"), Some("must be provided"));
    }
}
