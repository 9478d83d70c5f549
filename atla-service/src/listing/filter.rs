//! Filter normalization
//!
//! Turns a resource's filter struct into an AND-combined set of
//! [`Predicate`]s. Fields holding their zero value (empty string, `0`,
//! `None`) do not participate and emit nothing.

use chrono::NaiveDate;
use std::fmt;

/// Comparison applied by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `LOWER(column) = LOWER(value)`
    EqualIgnoreCase,
    /// Case-sensitive substring containment
    Contains,
    /// `column = value`
    Equal,
    /// `column >= value`
    GreaterOrEqual,
    /// `column <= value`
    LessOrEqual,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EqualIgnoreCase => write!(f, "ieq"),
            Self::Contains => write!(f, "contains"),
            Self::Equal => write!(f, "eq"),
            Self::GreaterOrEqual => write!(f, "gte"),
            Self::LessOrEqual => write!(f, "lte"),
        }
    }
}

/// Value bound into a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// String value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Calendar date
    Date(NaiveDate),
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// One (column, comparator, value) constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Column the constraint applies to
    pub column: &'static str,
    /// Comparison operator
    pub comparator: Comparator,
    /// Value to compare against
    pub value: FilterValue,
}

impl Predicate {
    /// Create a new predicate
    pub fn new(column: &'static str, comparator: Comparator, value: impl Into<FilterValue>) -> Self {
        Self {
            column,
            comparator,
            value: value.into(),
        }
    }
}

/// AND-combined predicates for one list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive equality on a non-empty string
    #[must_use]
    pub fn text_ci(self, column: &'static str, value: &str) -> Self {
        self.push_if(!value.is_empty(), || {
            Predicate::new(column, Comparator::EqualIgnoreCase, value)
        })
    }

    /// Case-sensitive substring match on a non-empty string
    #[must_use]
    pub fn contains(self, column: &'static str, value: &str) -> Self {
        self.push_if(!value.is_empty(), || {
            Predicate::new(column, Comparator::Contains, value)
        })
    }

    /// Inclusive lower bound; `0` leaves the column unbounded below
    #[must_use]
    pub fn at_least(self, column: &'static str, value: i64) -> Self {
        self.push_if(value != 0, || {
            Predicate::new(column, Comparator::GreaterOrEqual, value)
        })
    }

    /// Inclusive upper bound; `0` leaves the column unbounded above
    #[must_use]
    pub fn at_most(self, column: &'static str, value: i64) -> Self {
        self.push_if(value != 0, || {
            Predicate::new(column, Comparator::LessOrEqual, value)
        })
    }

    /// Exact date match when a date was given
    #[must_use]
    pub fn date_eq(self, column: &'static str, value: Option<NaiveDate>) -> Self {
        match value {
            Some(date) => self.with(Predicate::new(column, Comparator::Equal, date)),
            None => self,
        }
    }

    /// Add a predicate unconditionally
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn push_if(self, participates: bool, predicate: impl FnOnce() -> Predicate) -> Self {
        if participates {
            self.with(predicate())
        } else {
            self
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }
}

impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-resource filter struct that can normalize itself
pub trait ListFilters: Send + Sync {
    /// Predicates for every participating field
    fn predicates(&self) -> PredicateSet;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct PetFilters {
        name: String,
        weight_min: i64,
        weight_max: i64,
        adopted_on: Option<NaiveDate>,
    }

    impl ListFilters for PetFilters {
        fn predicates(&self) -> PredicateSet {
            PredicateSet::new()
                .text_ci("name", &self.name)
                .at_least("weight", self.weight_min)
                .at_most("weight", self.weight_max)
                .date_eq("adopted_on", self.adopted_on)
        }
    }

    #[test]
    fn test_zero_values_emit_nothing() {
        let set = PetFilters::default().predicates();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_non_zero_values_always_emit() {
        let date = NaiveDate::from_ymd_opt(2005, 2, 21).unwrap();
        let filters = PetFilters {
            name: "Appa".to_string(),
            weight_min: 3,
            weight_max: 9,
            adopted_on: Some(date),
        };

        let set = filters.predicates();
        let collected: Vec<&Predicate> = set.iter().collect();
        assert_eq!(
            collected,
            vec![
                &Predicate::new("name", Comparator::EqualIgnoreCase, "Appa"),
                &Predicate::new("weight", Comparator::GreaterOrEqual, 3_i64),
                &Predicate::new("weight", Comparator::LessOrEqual, 9_i64),
                &Predicate::new("adopted_on", Comparator::Equal, date),
            ]
        );
    }

    #[test]
    fn test_single_sided_bounds() {
        let filters = PetFilters {
            weight_max: 40,
            ..Default::default()
        };
        let set = filters.predicates();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().comparator, Comparator::LessOrEqual);
    }

    #[test]
    fn test_negative_bounds_participate() {
        let set = PredicateSet::new().at_least("score", -5);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_contains_skips_empty() {
        assert!(PredicateSet::new().contains("quote", "").is_empty());
        let set = PredicateSet::new().contains("quote", "honor");
        assert_eq!(
            set.iter().next(),
            Some(&Predicate::new("quote", Comparator::Contains, "honor"))
        );
    }

    #[test]
    fn test_filter_value_from() {
        assert_eq!(FilterValue::from("x"), FilterValue::Text("x".to_string()));
        assert_eq!(FilterValue::from(4_i64), FilterValue::Integer(4));
    }

    #[test]
    fn test_comparator_display() {
        assert_eq!(Comparator::EqualIgnoreCase.to_string(), "ieq");
        assert_eq!(Comparator::GreaterOrEqual.to_string(), "gte");
    }
}
