//! Pagination metadata derived from a windowed row count

use serde::{Deserialize, Serialize};

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Summary returned alongside every list response
///
/// The zero value serializes as `{}`, which is what callers see for an
/// empty result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

impl Metadata {
    /// Build metadata for `page` of size `page_size` over `total_records` rows
    ///
    /// Returns the zero value when there are no records, whatever the page
    /// arguments. `page_size` is assumed to be at least 1.
    #[must_use]
    pub fn build(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }

    /// Whether this is the empty-result value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
