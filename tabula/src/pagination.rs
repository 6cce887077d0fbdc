//! Pagination stage.
//!
//! Every navigation operation is a pure transition on [`PaginationState`]
//! and clamps instead of failing.

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

use crate::row::Row;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The active page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Zero-based page index, always within `[0, page_count() - 1]`.
    pub page_index: usize,
    /// Rows per page, always positive.
    pub page_size: usize,
    /// Total row count the window is computed against.
    pub total: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl PaginationState {
    /// Creates a state with no rows yet.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    /// `max(1, ceil(total / page_size))`.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Returns `true` if a previous page exists.
    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Returns `true` if a next page exists.
    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    /// Pulls `page_index` back into range.
    pub fn clamped(self) -> Self {
        let last = self.page_count() - 1;
        Self {
            page_index: self.page_index.min(last),
            page_size: self.page_size.max(1),
            ..self
        }
    }

    /// Sets the total row count and re-clamps.
    pub fn with_total(self, total: usize) -> Self {
        Self { total, ..self }.clamped()
    }

    /// Moves to the given page, clamping negative and out-of-range indices.
    pub fn with_page_index(self, page_index: i64) -> Self {
        let page_index = usize::try_from(page_index.max(0)).unwrap_or(usize::MAX);
        Self { page_index, ..self }.clamped()
    }

    /// Changes the page size and returns to the first page.
    ///
    /// A zero size is treated as one.
    pub fn with_page_size(self, page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            ..self
        }
    }

    /// Advances one page, staying on the last page.
    pub fn next_page(self) -> Self {
        Self {
            page_index: self.page_index.saturating_add(1),
            ..self
        }
        .clamped()
    }

    /// Goes back one page, staying on the first page.
    pub fn previous_page(self) -> Self {
        Self {
            page_index: self.page_index.saturating_sub(1),
            ..self
        }
        .clamped()
    }

    /// The `[start, end)` slice of a row list of length `len` on this page.
    pub fn page_range(&self, len: usize) -> Range<usize> {
        let start = self.page_index.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }
}

/// Slices the rows on the active page.
pub fn paginate(rows: &[Row], state: &PaginationState) -> Vec<Row> {
    rows[state.page_range(rows.len())].to_vec()
}
