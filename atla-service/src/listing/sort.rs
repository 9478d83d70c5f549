//! Safelisted sort resolution
//!
//! Sort columns are spliced into query text rather than bound as parameters,
//! so a caller-supplied `sort` token is only ever used to *select* one entry
//! of a handler-supplied [`Safelist`]. The column name that reaches SQL comes
//! from [`SortField::column`], a literal on a closed enum.
//!
//! # Example
//!
//! ```rust
//! use atla_service::listing::{Safelist, SortDirection, SortField};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum BookSort {
//!     Id,
//!     Title,
//! }
//!
//! impl SortField for BookSort {
//!     fn token(self) -> &'static str {
//!         match self {
//!             Self::Id => "id",
//!             Self::Title => "title",
//!         }
//!     }
//!
//!     fn column(self) -> &'static str {
//!         self.token()
//!     }
//! }
//!
//! let safelist = Safelist::both_directions(&[BookSort::Id, BookSort::Title]);
//! let key = safelist.resolve("-title").unwrap();
//! assert_eq!(key.column(), "title");
//! assert_eq!(key.direction, SortDirection::Descending);
//!
//! assert!(safelist.resolve("TITLE").is_none());
//! assert!(safelist.resolve("title; drop table books").is_none());
//! ```

use std::fmt;

/// Prefix on a sort token that requests descending order
pub const DESCENDING_MARKER: char = '-';

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A field a resource can be ordered by
///
/// Implement this on a fieldless enum. Both methods must return string
/// literals; nothing derived from request input may flow through them.
pub trait SortField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Ascending token accepted in the `sort` query parameter
    fn token(self) -> &'static str;

    /// Column the field orders by
    fn column(self) -> &'static str;
}

/// A resolved (field, direction) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    /// Field to order by
    pub field: F,
    /// Ordering direction
    pub direction: SortDirection,
}

impl<F: SortField> SortKey<F> {
    /// Ascending key for `field`
    #[must_use]
    pub const fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Descending key for `field`
    #[must_use]
    pub const fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Column name to splice into the ORDER BY clause
    #[must_use]
    pub fn column(&self) -> &'static str {
        self.field.column()
    }

    /// Whether `token` names exactly this key (case-sensitive)
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        match self.direction {
            SortDirection::Ascending => token == self.field.token(),
            SortDirection::Descending => token
                .strip_prefix(DESCENDING_MARKER)
                .is_some_and(|rest| rest == self.field.token()),
        }
    }
}

impl<F: SortField> fmt::Display for SortKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Descending {
            write!(f, "{}", DESCENDING_MARKER)?;
        }
        write!(f, "{}", self.field.token())
    }
}

/// Ordered set of sort keys a resource handler permits
///
/// Built per request by the handler and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Safelist<F> {
    keys: Vec<SortKey<F>>,
}

impl<F: SortField> Safelist<F> {
    /// Build a safelist from explicit keys; duplicates keep their first position
    pub fn new(keys: impl IntoIterator<Item = SortKey<F>>) -> Self {
        let mut unique: Vec<SortKey<F>> = Vec::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self { keys: unique }
    }

    /// Permit every field in both directions: all ascending tokens first,
    /// then all descending ones
    pub fn both_directions(fields: &[F]) -> Self {
        let ascending = fields.iter().copied().map(SortKey::asc);
        let descending = fields.iter().copied().map(SortKey::desc);
        Self::new(ascending.chain(descending))
    }

    /// Look up the key named by `token`
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<SortKey<F>> {
        self.keys.iter().copied().find(|key| key.matches(token))
    }

    /// Whether `token` is permitted
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.resolve(token).is_some()
    }

    /// Permitted keys in declaration order
    #[must_use]
    pub fn keys(&self) -> &[SortKey<F>] {
        &self.keys
    }

    /// Permitted tokens in declaration order
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.keys.iter().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PetSort {
        Id,
        Name,
        BirthYear,
    }

    impl SortField for PetSort {
        fn token(self) -> &'static str {
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::BirthYear => "born",
            }
        }

        fn column(self) -> &'static str {
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::BirthYear => "birth_year",
            }
        }
    }

    fn safelist() -> Safelist<PetSort> {
        Safelist::both_directions(&[PetSort::Id, PetSort::Name, PetSort::BirthYear])
    }

    #[test]
    fn test_sort_direction_display() {
        assert_eq!(format!("{}", SortDirection::Ascending), "asc");
        assert_eq!(format!("{}", SortDirection::Descending), "desc");
    }

    #[test]
    fn test_sort_direction_as_sql() {
        assert_eq!(SortDirection::Ascending.as_sql(), "ASC");
        assert_eq!(SortDirection::Descending.as_sql(), "DESC");
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }

    #[test]
    fn test_both_directions_order() {
        let tokens: Vec<String> = safelist().tokens().collect();
        assert_eq!(tokens, vec!["id", "name", "born", "-id", "-name", "-born"]);
    }

    #[test]
    fn test_resolve_ascending() {
        let key = safelist().resolve("name").unwrap();
        assert_eq!(key.field, PetSort::Name);
        assert_eq!(key.direction, SortDirection::Ascending);
        assert_eq!(key.column(), "name");
    }

    #[test]
    fn test_resolve_descending_uses_mapped_column() {
        let key = safelist().resolve("-born").unwrap();
        assert_eq!(key.direction, SortDirection::Descending);
        assert_eq!(key.column(), "birth_year");
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert!(safelist().resolve("Name").is_none());
        assert!(safelist().resolve("-ID").is_none());
    }

    #[test]
    fn test_resolve_rejects_column_names_and_injection() {
        let safelist = safelist();
        // the column exists but its token is "born"
        assert!(safelist.resolve("birth_year").is_none());
        assert!(safelist.resolve("id; DROP TABLE pets").is_none());
        assert!(safelist.resolve("--id").is_none());
        assert!(safelist.resolve("").is_none());
        assert!(safelist.resolve("-").is_none());
    }

    #[test]
    fn test_directional_variants_are_distinct_entries() {
        let only_desc = Safelist::new([SortKey::desc(PetSort::Name)]);
        assert!(only_desc.contains("-name"));
        assert!(!only_desc.contains("name"));

        let only_asc = Safelist::new([SortKey::asc(PetSort::Name)]);
        assert!(only_asc.contains("name"));
        assert!(!only_asc.contains("-name"));
    }

    #[test]
    fn test_new_drops_duplicates() {
        let list = Safelist::new([
            SortKey::asc(PetSort::Id),
            SortKey::desc(PetSort::Id),
            SortKey::asc(PetSort::Id),
        ]);
        assert_eq!(list.keys().len(), 2);
    }

    #[test]
    fn test_sort_key_display() {
        assert_eq!(SortKey::asc(PetSort::BirthYear).to_string(), "born");
        assert_eq!(SortKey::desc(PetSort::BirthYear).to_string(), "-born");
    }
}
