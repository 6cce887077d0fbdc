//! Engine state.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::filter::ColumnFilter;
use crate::pagination::PaginationState;
use crate::selection::SelectionState;
use crate::sort::SortEntry;

/// Everything a [`Table`](crate::Table) knows besides its data and columns.
///
/// Only the table's mutators change it. It serializes with camelCase field
/// names so a host can snapshot it; the engine itself never persists it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    /// Active sort keys, primary key first.
    pub sorting: Vec<SortEntry>,
    /// Per-column filters, all of which must pass.
    pub column_filters: Vec<ColumnFilter>,
    /// Free text matched against every filterable column.
    pub global_filter: String,
    pub pagination: PaginationState,
    pub selection: SelectionState,
    /// Visibility per column id. Seeded from the column descriptors.
    pub column_visibility: HashMap<String, bool>,
    /// Preferred column order. Columns not listed follow in registration
    /// order.
    pub column_order: Vec<String>,
}

impl EngineState {
    /// Returns `true` unless the column has been hidden.
    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.column_visibility
            .get(column_id)
            .copied()
            .unwrap_or(true)
    }
}

/// Partial override of [`EngineState`] applied at construction.
///
/// # Example
///
/// ```
/// use tabula::{InitialState, SortEntry};
///
/// let initial = InitialState::new()
///     .with_sorting(vec![SortEntry::desc("score")])
///     .with_global_filter("jo");
/// assert!(initial.sorting.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialState {
    pub sorting: Option<Vec<SortEntry>>,
    pub column_filters: Option<Vec<ColumnFilter>>,
    pub global_filter: Option<String>,
    /// Replaces the page index and size from the options; `total` is ignored.
    pub pagination: Option<PaginationState>,
    /// Selected ids; the flags are re-derived after construction.
    pub selection: Option<SelectionState>,
    /// Merged over the visibility declared on the descriptors.
    pub column_visibility: Option<HashMap<String, bool>>,
    pub column_order: Option<Vec<String>>,
}

impl InitialState {
    /// Creates an empty override.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sorting(mut self, sorting: Vec<SortEntry>) -> Self {
        self.sorting = Some(sorting);
        self
    }

    pub fn with_column_filters(mut self, filters: Vec<ColumnFilter>) -> Self {
        self.column_filters = Some(filters);
        self
    }

    pub fn with_global_filter(mut self, text: impl Into<String>) -> Self {
        self.global_filter = Some(text.into());
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_selection(mut self, selection: SelectionState) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_column_visibility(mut self, visibility: HashMap<String, bool>) -> Self {
        self.column_visibility = Some(visibility);
        self
    }

    pub fn with_column_order(mut self, order: Vec<String>) -> Self {
        self.column_order = Some(order);
        self
    }

    /// Applies the override on top of `state`.
    pub fn apply(self, mut state: EngineState) -> EngineState {
        if let Some(sorting) = self.sorting {
            state.sorting = sorting;
        }
        if let Some(filters) = self.column_filters {
            state.column_filters = filters;
        }
        if let Some(text) = self.global_filter {
            state.global_filter = text;
        }
        if let Some(pagination) = self.pagination {
            state.pagination = PaginationState::new(pagination.page_index, pagination.page_size);
        }
        if let Some(selection) = self.selection {
            state.selection = selection;
        }
        if let Some(visibility) = self.column_visibility {
            state.column_visibility.extend(visibility);
        }
        if let Some(order) = self.column_order {
            state.column_order = order;
        }
        state
    }
}
