//! Page arithmetic for list queries
//!
//! ```rust
//! use atla_service::listing::Pagination;
//!
//! let page3 = Pagination::page(3, 20);
//! assert_eq!(page3.offset, 40);
//! assert_eq!(page3.limit, 20);
//! ```

/// Page used when the caller does not ask for one
pub const DEFAULT_PAGE: i64 = 1;

/// Largest page number accepted
pub const MAX_PAGE: i64 = 10_000_000;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size accepted
pub const MAX_PAGE_SIZE: i64 = 100;

/// LIMIT/OFFSET pair for a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of rows to skip
    pub offset: u64,
    /// Maximum number of rows to return
    pub limit: u64,
}

impl Pagination {
    /// Create pagination parameters from raw offset and limit
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Pagination for a 1-indexed page
    ///
    /// Inputs are expected to be validated already; page 0 is treated as
    /// page 1 rather than underflowing.
    #[must_use]
    pub const fn page(page_number: u32, page_size: u32) -> Self {
        let offset = (page_number.saturating_sub(1) as u64) * (page_size as u64);
        Self {
            offset,
            limit: page_size as u64,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(DEFAULT_PAGE as u32, DEFAULT_PAGE_SIZE as u32)
    }
}
