//! Table construction options.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::column::ColumnDef;
use crate::filter::ColumnFilter;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::pagination::PaginationState;
use crate::record::Record;
use crate::row::RowIdFn;
use crate::row::default_row_id;
use crate::selection::SelectionState;
use crate::sort::SortEntry;
use crate::state::InitialState;

pub type SortingChangeFn = Box<dyn FnMut(&[SortEntry]) + Send>;
pub type FiltersChangeFn = Box<dyn FnMut(&[ColumnFilter]) + Send>;
pub type GlobalFilterChangeFn = Box<dyn FnMut(&str) + Send>;
pub type PaginationChangeFn = Box<dyn FnMut(&PaginationState) + Send>;
pub type SelectionChangeFn = Box<dyn FnMut(&SelectionState) + Send>;
pub type VisibilityChangeFn = Box<dyn FnMut(&HashMap<String, bool>) + Send>;
pub type OrderChangeFn = Box<dyn FnMut(&[String]) + Send>;

/// Change listeners. Each one receives the new value of its sub-state.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) on_sorting_change: Option<SortingChangeFn>,
    pub(crate) on_filters_change: Option<FiltersChangeFn>,
    pub(crate) on_global_filter_change: Option<GlobalFilterChangeFn>,
    pub(crate) on_pagination_change: Option<PaginationChangeFn>,
    pub(crate) on_selection_change: Option<SelectionChangeFn>,
    pub(crate) on_column_visibility_change: Option<VisibilityChangeFn>,
    pub(crate) on_column_order_change: Option<OrderChangeFn>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_sorting_change", &self.on_sorting_change.is_some())
            .field("on_filters_change", &self.on_filters_change.is_some())
            .field(
                "on_global_filter_change",
                &self.on_global_filter_change.is_some(),
            )
            .field("on_pagination_change", &self.on_pagination_change.is_some())
            .field("on_selection_change", &self.on_selection_change.is_some())
            .field(
                "on_column_visibility_change",
                &self.on_column_visibility_change.is_some(),
            )
            .field(
                "on_column_order_change",
                &self.on_column_order_change.is_some(),
            )
            .finish()
    }
}

/// Configuration for a [`Table`](crate::Table).
///
/// # Example
///
/// ```
/// use tabula::{ColumnDef, Record, TableOptions};
///
/// let options = TableOptions::new(
///     vec![Record::new().set("name", "John")],
///     vec![ColumnDef::accessor("name", "name")],
/// )
/// .with_pagination(true)
/// .with_page_size(25)
/// .on_pagination_change(|page| println!("page {}", page.page_index));
/// assert_eq!(options.page_size, 25);
/// ```
pub struct TableOptions {
    /// Raw input records.
    pub data: Vec<Record>,

    /// Column descriptors, in display order.
    pub columns: Vec<ColumnDef>,

    /// Default: true
    pub enable_sorting: bool,

    /// Let [`toggle_sorting`](crate::Table::toggle_sorting) add keys
    /// instead of replacing the sort.
    ///
    /// Default: false
    pub enable_multi_sort: bool,

    /// Default: false
    pub enable_filtering: bool,

    /// Default: false
    pub enable_selection: bool,

    /// Allow more than one selected row.
    ///
    /// Default: true
    pub enable_multi_selection: bool,

    /// Default: false
    pub enable_pagination: bool,

    /// Rows per page. Must be positive.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Default: 0
    pub page_index: usize,

    /// The caller has already sorted the data; the sort stage passes rows
    /// through.
    pub manual_sorting: bool,

    /// The caller has already filtered the data; the filter stage passes
    /// rows through.
    pub manual_filtering: bool,

    /// The data is already a single page. The page stage does not slice and
    /// the total comes from `row_count`.
    pub manual_pagination: bool,

    /// Total row count for manual pagination. Falls back to the number of
    /// filtered rows when unset.
    pub row_count: Option<usize>,

    /// Row identity. Default: [`default_row_id`].
    pub get_row_id: RowIdFn,

    /// State applied on top of the defaults at construction.
    pub initial_state: Option<InitialState>,

    pub(crate) callbacks: Callbacks,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            columns: Vec::new(),
            enable_sorting: true,
            enable_multi_sort: false,
            enable_filtering: false,
            enable_selection: false,
            enable_multi_selection: true,
            enable_pagination: false,
            page_size: DEFAULT_PAGE_SIZE,
            page_index: 0,
            manual_sorting: false,
            manual_filtering: false,
            manual_pagination: false,
            row_count: None,
            get_row_id: Arc::new(default_row_id),
            initial_state: None,
            callbacks: Callbacks::default(),
        }
    }
}

impl TableOptions {
    /// Creates options with default flags.
    pub fn new(data: Vec<Record>, columns: Vec<ColumnDef>) -> Self {
        Self {
            data,
            columns,
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Vec<Record>) -> Self {
        self.data = data;
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDef>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn with_multi_sort(mut self, enabled: bool) -> Self {
        self.enable_multi_sort = enabled;
        self
    }

    pub fn with_filtering(mut self, enabled: bool) -> Self {
        self.enable_filtering = enabled;
        self
    }

    pub fn with_selection(mut self, enabled: bool) -> Self {
        self.enable_selection = enabled;
        self
    }

    pub fn with_multi_selection(mut self, enabled: bool) -> Self {
        self.enable_multi_selection = enabled;
        self
    }

    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.enable_pagination = enabled;
        self
    }

    /// Sets the page size. Zero is rejected by [`Table::new`](crate::Table::new).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_index(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn with_manual_sorting(mut self, manual: bool) -> Self {
        self.manual_sorting = manual;
        self
    }

    pub fn with_manual_filtering(mut self, manual: bool) -> Self {
        self.manual_filtering = manual;
        self
    }

    pub fn with_manual_pagination(mut self, manual: bool) -> Self {
        self.manual_pagination = manual;
        self
    }

    /// Sets the caller-known total for manual pagination.
    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    /// Sets the row identity function.
    pub fn with_row_id<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, usize) -> String + Send + Sync + 'static,
    {
        self.get_row_id = Arc::new(f);
        self
    }

    pub fn with_initial_state(mut self, initial_state: InitialState) -> Self {
        self.initial_state = Some(initial_state);
        self
    }

    // =========================================================================
    // Change listeners
    // =========================================================================

    pub fn on_sorting_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[SortEntry]) + Send + 'static,
    {
        self.callbacks.on_sorting_change = Some(Box::new(f));
        self
    }

    pub fn on_filters_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[ColumnFilter]) + Send + 'static,
    {
        self.callbacks.on_filters_change = Some(Box::new(f));
        self
    }

    pub fn on_global_filter_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.callbacks.on_global_filter_change = Some(Box::new(f));
        self
    }

    /// Also fires when the total or a clamped index changes as a side
    /// effect of filtering or new data.
    pub fn on_pagination_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&PaginationState) + Send + 'static,
    {
        self.callbacks.on_pagination_change = Some(Box::new(f));
        self
    }

    /// Also fires when ids are pruned after new data.
    pub fn on_selection_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&SelectionState) + Send + 'static,
    {
        self.callbacks.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn on_column_visibility_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&HashMap<String, bool>) + Send + 'static,
    {
        self.callbacks.on_column_visibility_change = Some(Box::new(f));
        self
    }

    pub fn on_column_order_change<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[String]) + Send + 'static,
    {
        self.callbacks.on_column_order_change = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("data", &self.data.len())
            .field("columns", &self.columns.len())
            .field("enable_sorting", &self.enable_sorting)
            .field("enable_multi_sort", &self.enable_multi_sort)
            .field("enable_filtering", &self.enable_filtering)
            .field("enable_selection", &self.enable_selection)
            .field("enable_multi_selection", &self.enable_multi_selection)
            .field("enable_pagination", &self.enable_pagination)
            .field("page_size", &self.page_size)
            .field("page_index", &self.page_index)
            .field("manual_sorting", &self.manual_sorting)
            .field("manual_filtering", &self.manual_filtering)
            .field("manual_pagination", &self.manual_pagination)
            .field("row_count", &self.row_count)
            .field("initial_state", &self.initial_state)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
