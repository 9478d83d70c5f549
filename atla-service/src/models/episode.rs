//! Episodes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::{push_returning, Resource, MUST_BE_PROVIDED};
use crate::listing::{ListFilters, PredicateSet, QueryParams, Safelist, SortField, Validator};

/// Accepted `air_date` format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Marker for the `/episodes` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct Episodes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Episode {
    pub id: i64,
    pub title: String,
    pub air_date: NaiveDate,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewEpisode {
    pub title: String,
    pub air_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EpisodePatch {
    pub title: Option<String>,
    pub air_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeSort {
    Id,
    Title,
    AirDate,
}

impl SortField for EpisodeSort {
    fn token(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::AirDate => "air_date",
        }
    }

    fn column(self) -> &'static str {
        self.token()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFilters {
    pub title: String,
    pub air_date: Option<NaiveDate>,
}

impl ListFilters for EpisodeFilters {
    fn predicates(&self) -> PredicateSet {
        PredicateSet::new()
            .text_ci("title", &self.title)
            .date_eq("air_date", self.air_date)
    }
}

impl Resource for Episodes {
    type Entity = Episode;
    type Sort = EpisodeSort;
    type Filters = EpisodeFilters;
    type Draft = NewEpisode;
    type Patch = EpisodePatch;

    const SINGULAR: &'static str = "episode";
    const PLURAL: &'static str = "episodes";
    const TABLE: &'static str = "episodes";
    const COLUMNS: &'static str = "id, title, air_date, created_at, updated_at";

    fn safelist() -> Safelist<EpisodeSort> {
        Safelist::both_directions(&[EpisodeSort::Id, EpisodeSort::Title, EpisodeSort::AirDate])
    }

    fn filters(params: &QueryParams, v: &mut Validator) -> EpisodeFilters {
        let raw_date = params.read_string("air_date", "");
        let air_date = if raw_date.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(&raw_date, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    v.add_error("air_date", "must be a valid date (YYYY-MM-DD)");
                    None
                }
            }
        };

        EpisodeFilters {
            title: params.read_string("title", ""),
            air_date,
        }
    }

    fn validate_draft(draft: &NewEpisode, v: &mut Validator) {
        v.check(!draft.title.is_empty(), "title", MUST_BE_PROVIDED);
        v.check(draft.air_date.is_some(), "air_date", MUST_BE_PROVIDED);
    }

    fn validate(entity: &Episode, v: &mut Validator) {
        v.check(!entity.title.is_empty(), "title", MUST_BE_PROVIDED);
    }

    fn id(entity: &Episode) -> i64 {
        entity.id
    }

    fn apply_patch(entity: &mut Episode, patch: EpisodePatch) {
        if let Some(title) = patch.title {
            entity.title = title;
        }
        if let Some(air_date) = patch.air_date {
            entity.air_date = air_date;
        }
    }

    fn insert_query(draft: &NewEpisode) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("INSERT INTO episodes (title, air_date) VALUES (");
        qb.push_bind(draft.title.clone())
            .push(", ")
            .push_bind(draft.air_date)
            .push(")");
        push_returning::<Self>(&mut qb);
        qb
    }

    fn update_query(entity: &Episode) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE episodes SET title = ");
        qb.push_bind(entity.title.clone())
            .push(", air_date = ")
            .push_bind(entity.air_date)
            .push(", updated_at = now() WHERE id = ")
            .push_bind(entity.id)
            .push(" AND updated_at = ")
            .push_bind(entity.updated_at);
        push_returning::<Self>(&mut qb);
        qb
    }
}
