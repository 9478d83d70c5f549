//! Characters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::{push_returning, Resource, MUST_BE_PROVIDED};
use crate::listing::{ListFilters, PredicateSet, QueryParams, Safelist, SortField, Validator};

/// Oldest age a character may be recorded with
pub const MAX_AGE: i32 = 10_000;

/// Marker for the `/characters` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct Characters;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub status: String,
    pub nation: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewCharacter {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub status: String,
    pub nation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub nation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSort {
    Id,
    Name,
    Age,
}

impl SortField for CharacterSort {
    fn token(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Age => "age",
        }
    }

    fn column(self) -> &'static str {
        self.token()
    }
}

/// `name` matches case-insensitively; `age` pins both bounds unless
/// `age_from`/`age_to` override them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilters {
    pub name: String,
    pub age_from: i64,
    pub age_to: i64,
}

impl ListFilters for CharacterFilters {
    fn predicates(&self) -> PredicateSet {
        PredicateSet::new()
            .text_ci("name", &self.name)
            .at_least("age", self.age_from)
            .at_most("age", self.age_to)
    }
}

fn check_fields(v: &mut Validator, name: &str, age: i32, gender: &str, status: &str, nation: &str) {
    v.check(!name.is_empty(), "name", MUST_BE_PROVIDED);
    v.check(age <= MAX_AGE, "age", "must not be more than 10000");
    v.check(!gender.is_empty(), "gender", MUST_BE_PROVIDED);
    v.check(!status.is_empty(), "status", MUST_BE_PROVIDED);
    v.check(!nation.is_empty(), "nation", MUST_BE_PROVIDED);
}

impl Resource for Characters {
    type Entity = Character;
    type Sort = CharacterSort;
    type Filters = CharacterFilters;
    type Draft = NewCharacter;
    type Patch = CharacterPatch;

    const SINGULAR: &'static str = "character";
    const PLURAL: &'static str = "characters";
    const TABLE: &'static str = "characters";
    const COLUMNS: &'static str = "id, name, age, gender, status, nation, created_at, updated_at";

    fn safelist() -> Safelist<CharacterSort> {
        Safelist::both_directions(&[CharacterSort::Id, CharacterSort::Name, CharacterSort::Age])
    }

    fn filters(params: &QueryParams, v: &mut Validator) -> CharacterFilters {
        let age = params.read_int("age", 0, v);
        CharacterFilters {
            name: params.read_string("name", ""),
            age_from: params.read_int("age_from", age, v),
            age_to: params.read_int("age_to", age, v),
        }
    }

    fn validate_draft(draft: &NewCharacter, v: &mut Validator) {
        check_fields(v, &draft.name, draft.age, &draft.gender, &draft.status, &draft.nation);
    }

    fn validate(entity: &Character, v: &mut Validator) {
        check_fields(v, &entity.name, entity.age, &entity.gender, &entity.status, &entity.nation);
    }

    fn id(entity: &Character) -> i64 {
        entity.id
    }

    fn apply_patch(entity: &mut Character, patch: CharacterPatch) {
        if let Some(name) = patch.name {
            entity.name = name;
        }
        if let Some(age) = patch.age {
            entity.age = age;
        }
        if let Some(gender) = patch.gender {
            entity.gender = gender;
        }
        if let Some(status) = patch.status {
            entity.status = status;
        }
        if let Some(nation) = patch.nation {
            entity.nation = nation;
        }
    }

    fn insert_query(draft: &NewCharacter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("INSERT INTO characters (name, age, gender, status, nation) VALUES (");
        qb.push_bind(draft.name.clone())
            .push(", ")
            .push_bind(draft.age)
            .push(", ")
            .push_bind(draft.gender.clone())
            .push(", ")
            .push_bind(draft.status.clone())
            .push(", ")
            .push_bind(draft.nation.clone())
            .push(")");
        push_returning::<Self>(&mut qb);
        qb
    }

    fn update_query(entity: &Character) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE characters SET name = ");
        qb.push_bind(entity.name.clone())
            .push(", age = ")
            .push_bind(entity.age)
            .push(", gender = ")
            .push_bind(entity.gender.clone())
            .push(", status = ")
            .push_bind(entity.status.clone())
            .push(", nation = ")
            .push_bind(entity.nation.clone())
            .push(", updated_at = now() WHERE id = ")
            .push_bind(entity.id)
            .push(" AND updated_at = ")
            .push_bind(entity.updated_at);
        push_returning::<Self>(&mut qb);
        qb
    }
}
