//! Field-level validation collector

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field name to message map produced by a failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Message recorded for `field`
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Accumulates field errors; the first message recorded for a field wins
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless it already has one
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` against `field` when `ok` is false
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded, the collected errors otherwise
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_errors())
        }
    }

    /// Collected errors, possibly empty
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        FieldErrors(self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_validator_is_valid() {
        let v = Validator::new();
        assert!(v.valid());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut v = Validator::new();
        v.check(false, "page", "must be an integer value");
        v.check(false, "page", "must be greater than zero");
        v.check(true, "sort", "invalid sort value");

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("page"), Some("must be an integer value"));
        assert_eq!(errors.get("sort"), None);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let mut v = Validator::new();
        v.add_error("sort", "invalid sort value");
        v.add_error("page_size", "must be a maximum of 100");
        let json = serde_json::to_value(v.finish().unwrap_err()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "page_size": "must be a maximum of 100",
                "sort": "invalid sort value"
            })
        );
    }

    #[test]
    fn test_display_lists_fields() {
        let mut v = Validator::new();
        v.add_error("b", "two");
        v.add_error("a", "one");
        assert_eq!(v.finish().unwrap_err().to_string(), "a: one, b: two");
    }
}
