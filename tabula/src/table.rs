//! The table engine.
//!
//! A [`Table`] owns its data, its column registry and one [`EngineState`].
//! Every mutator computes the next state, re-runs the row pipeline
//! (`core -> sorted -> filtered -> page`) and notifies the listeners whose
//! sub-state changed.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::column::Column;
use crate::error::Result;
use crate::error::TableError;
use crate::filter::ColumnFilter;
use crate::filter::filter_rows;
use crate::options::TableOptions;
use crate::pagination::PaginationState;
use crate::pagination::paginate;
use crate::record::Record;
use crate::registry::ColumnRegistry;
use crate::registry::is_visible;
use crate::row::Cell;
use crate::row::Row;
use crate::row::materialize;
use crate::sort::SortEntry;
use crate::sort::sort_rows;
use crate::sort::toggle_sorting;
use crate::state::EngineState;

/// A declarative table: raw records in, ordered and windowed rows out.
///
/// # Example
///
/// ```
/// use tabula::{ColumnDef, Record, Table, TableOptions};
///
/// let data = (1..=8)
///     .map(|n| Record::new().set("id", n.to_string()).set("n", n))
///     .collect();
/// let mut table = Table::new(
///     TableOptions::new(data, vec![ColumnDef::accessor("n", "n")])
///         .with_pagination(true)
///         .with_page_size(3),
/// )
/// .unwrap();
///
/// assert_eq!(table.page_count(), 3);
/// table.set_page_index(2);
/// assert_eq!(table.row_model().len(), 2);
/// ```
pub struct Table {
    options: TableOptions,
    columns: Arc<ColumnRegistry>,
    records: Vec<Arc<Record>>,
    state: EngineState,
    core: Vec<Row>,
    sorted: Vec<Row>,
    filtered: Vec<Row>,
    page: Vec<Row>,
}

impl Table {
    /// Builds a table and computes its first row models.
    ///
    /// Fails on invalid column descriptors or a zero page size. No change
    /// listener fires during construction.
    pub fn new(mut options: TableOptions) -> Result<Self> {
        if options.page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }

        let columns = Arc::new(ColumnRegistry::register(std::mem::take(
            &mut options.columns,
        ))?);
        let records: Vec<Arc<Record>> = std::mem::take(&mut options.data)
            .into_iter()
            .map(Arc::new)
            .collect();

        let defaults = EngineState {
            pagination: PaginationState::new(options.page_index, options.page_size),
            column_visibility: columns
                .columns()
                .iter()
                .map(|column| (column.id().to_string(), column.default_visible()))
                .collect(),
            ..EngineState::default()
        };
        let state = match options.initial_state.take() {
            Some(initial) => initial.apply(defaults),
            None => defaults,
        };

        let core = materialize(&records, &columns, &options.get_row_id);
        let mut table = Self {
            options,
            columns,
            records,
            state,
            core,
            sorted: Vec::new(),
            filtered: Vec::new(),
            page: Vec::new(),
        };
        table.recompute();

        log::debug!(
            "Created table with {} rows and {} columns",
            table.core.len(),
            table.columns.len()
        );
        Ok(table)
    }

    // =========================================================================
    // Row models
    // =========================================================================

    /// Rows on the active page, or every filtered row when pagination is
    /// off or manual.
    pub fn row_model(&self) -> &[Row] {
        &self.page
    }

    /// Sorted rows that pass the filters.
    pub fn filtered_row_model(&self) -> &[Row] {
        &self.filtered
    }

    /// Every row, sorted.
    pub fn sorted_row_model(&self) -> &[Row] {
        &self.sorted
    }

    /// Every row in input order.
    pub fn core_row_model(&self) -> &[Row] {
        &self.core
    }

    /// Selected rows in input order, regardless of filters or paging.
    pub fn selected_row_model(&self) -> Vec<Row> {
        self.core
            .iter()
            .filter(|row| self.state.selection.is_selected(row.id()))
            .cloned()
            .collect()
    }

    /// Looks up a row by id. With duplicate ids the first row wins.
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.core.iter().find(|row| row.id() == id)
    }

    /// Cells of the visible columns for one row, in display order.
    pub fn visible_cells<'a>(&'a self, row: &'a Row) -> Vec<Cell<'a>> {
        row.visible_cells(&self.state.column_visibility, &self.state.column_order)
    }

    // =========================================================================
    // State queries
    // =========================================================================

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn is_sorting_enabled(&self) -> bool {
        self.options.enable_sorting
    }

    pub fn is_multi_sort_enabled(&self) -> bool {
        self.options.enable_multi_sort
    }

    pub fn is_filtering_enabled(&self) -> bool {
        self.options.enable_filtering
    }

    pub fn is_selection_enabled(&self) -> bool {
        self.options.enable_selection
    }

    pub fn is_multi_selection_enabled(&self) -> bool {
        self.options.enable_multi_selection
    }

    pub fn is_pagination_enabled(&self) -> bool {
        self.options.enable_pagination
    }

    pub fn is_manual_sorting(&self) -> bool {
        self.options.manual_sorting
    }

    pub fn is_manual_filtering(&self) -> bool {
        self.options.manual_filtering
    }

    pub fn is_manual_pagination(&self) -> bool {
        self.options.manual_pagination
    }

    /// The caller-supplied total for manual pagination, if any.
    pub fn row_count(&self) -> Option<usize> {
        self.options.row_count
    }

    /// Number of pages. Always 1 with pagination off, since the row model
    /// then holds every filtered row.
    pub fn page_count(&self) -> usize {
        if self.options.enable_pagination {
            self.state.pagination.page_count()
        } else {
            1
        }
    }

    pub fn can_next_page(&self) -> bool {
        self.options.enable_pagination && self.state.pagination.can_next_page()
    }

    pub fn can_previous_page(&self) -> bool {
        self.options.enable_pagination && self.state.pagination.can_previous_page()
    }

    // =========================================================================
    // Columns
    // =========================================================================

    pub fn registry(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.resolve(column_id)
    }

    /// Every column in display order, hidden ones included.
    pub fn columns(&self) -> Vec<&Column> {
        self.columns.ordered(&self.state.column_order)
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        self.columns
            .visible(&self.state.column_visibility, &self.state.column_order)
    }

    pub fn sticky_start_columns(&self) -> Vec<&Column> {
        self.columns
            .sticky_start(&self.state.column_visibility, &self.state.column_order)
    }

    pub fn center_columns(&self) -> Vec<&Column> {
        self.columns
            .center(&self.state.column_visibility, &self.state.column_order)
    }

    pub fn sticky_end_columns(&self) -> Vec<&Column> {
        self.columns
            .sticky_end(&self.state.column_visibility, &self.state.column_order)
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Toggles sorting on a column.
    ///
    /// An already-sorted column cycles `asc -> desc -> removed`; `desc`
    /// forces a direction. Non-sortable and unknown columns are ignored.
    pub fn toggle_sorting(&mut self, column_id: &str, desc: Option<bool>) {
        if !self.options.enable_sorting {
            return;
        }
        match self.columns.resolve(column_id) {
            Some(column) if column.is_sortable() => {}
            Some(_) => {
                log::debug!("Ignoring sort toggle on non-sortable column '{}'", column_id);
                return;
            }
            None => {
                log::debug!("Ignoring sort toggle on unknown column '{}'", column_id);
                return;
            }
        }
        let multi = self.options.enable_multi_sort;
        self.update(|mut state| {
            state.sorting = toggle_sorting(&state.sorting, column_id, desc, multi);
            state
        });
    }

    /// Replaces the sort list. Entries naming unknown columns are kept but
    /// have no effect.
    pub fn set_sorting(&mut self, sorting: Vec<SortEntry>) {
        if !self.options.enable_sorting {
            return;
        }
        self.update(|mut state| {
            state.sorting = sorting;
            state
        });
    }

    pub fn reset_sorting(&mut self) {
        self.set_sorting(Vec::new());
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn set_column_filters(&mut self, filters: Vec<ColumnFilter>) {
        if !self.options.enable_filtering {
            return;
        }
        self.update(|mut state| {
            state.column_filters = filters;
            state
        });
    }

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        if !self.options.enable_filtering {
            return;
        }
        let text = text.into();
        self.update(|mut state| {
            state.global_filter = text;
            state
        });
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggles one row by id. Unknown ids are ignored.
    pub fn toggle_row_selection(&mut self, id: &str) {
        if !self.options.enable_selection {
            return;
        }
        if self.row(id).is_none() {
            log::debug!("Ignoring selection toggle on unknown row '{}'", id);
            return;
        }
        let multi = self.options.enable_multi_selection;
        let total = self.core.len();
        self.update(|mut state| {
            state.selection = state.selection.toggle_row(id, multi, total);
            state
        });
    }

    /// Selects every row, or clears the selection when every row is already
    /// selected. Does nothing in single-selection mode.
    pub fn toggle_all_rows_selection(&mut self) {
        if !self.options.enable_selection || !self.options.enable_multi_selection {
            return;
        }
        let all_ids: Vec<String> = self.core.iter().map(|row| row.id().to_string()).collect();
        self.update(|mut state| {
            state.selection = state.selection.toggle_all(all_ids.iter().map(String::as_str));
            state
        });
    }

    pub fn reset_row_selection(&mut self) {
        if !self.options.enable_selection {
            return;
        }
        self.update(|mut state| {
            state.selection = state.selection.cleared();
            state
        });
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn next_page(&mut self) {
        self.paginate_with(PaginationState::next_page);
    }

    pub fn previous_page(&mut self) {
        self.paginate_with(PaginationState::previous_page);
    }

    /// Moves to a page. Out-of-range indices are clamped.
    pub fn set_page_index(&mut self, page_index: i64) {
        self.paginate_with(|pagination| pagination.with_page_index(page_index));
    }

    /// Changes the page size and returns to the first page. Zero is treated
    /// as one.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.paginate_with(|pagination| pagination.with_page_size(page_size));
    }

    fn paginate_with(&mut self, f: impl FnOnce(PaginationState) -> PaginationState) {
        if !self.options.enable_pagination {
            return;
        }
        self.update(|mut state| {
            state.pagination = f(state.pagination);
            state
        });
    }

    // =========================================================================
    // Column state
    // =========================================================================

    /// Shows a hidden column or hides a visible one.
    pub fn toggle_column_visibility(&mut self, column_id: &str) {
        let Some(column) = self.columns.resolve(column_id) else {
            log::debug!("Ignoring visibility toggle on unknown column '{}'", column_id);
            return;
        };
        let visible = is_visible(column, &self.state.column_visibility);
        self.update(|mut state| {
            state.column_visibility.insert(column_id.to_string(), !visible);
            state
        });
    }

    /// Sets the preferred column order.
    ///
    /// Unknown and repeated ids are dropped; unlisted columns follow in
    /// registration order.
    pub fn set_column_order(&mut self, order: Vec<String>) {
        let mut seen = HashSet::new();
        let order: Vec<String> = order
            .into_iter()
            .filter(|id| {
                let known = self.columns.contains(id);
                if !known {
                    log::debug!("Dropping unknown column '{}' from column order", id);
                }
                known && seen.insert(id.clone())
            })
            .collect();
        self.update(|mut state| {
            state.column_order = order;
            state
        });
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replaces the raw data.
    ///
    /// Selected ids missing from the new data are pruned and the page index
    /// is clamped to the new total.
    pub fn set_data(&mut self, data: Vec<Record>) {
        self.records = data.into_iter().map(Arc::new).collect();
        self.core = materialize(&self.records, &self.columns, &self.options.get_row_id);
        log::debug!("Replaced table data with {} rows", self.core.len());
        self.update(|state| state);
    }

    /// Sets the caller-known total used by manual pagination.
    pub fn set_row_count(&mut self, row_count: usize) {
        self.options.row_count = Some(row_count);
        self.update(|state| state);
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn update(&mut self, f: impl FnOnce(EngineState) -> EngineState) {
        let previous = self.state.clone();
        self.state = f(std::mem::take(&mut self.state));
        self.recompute();
        self.notify(&previous);
    }

    fn recompute(&mut self) {
        let options = &self.options;

        self.sorted = if options.enable_sorting && !options.manual_sorting {
            sort_rows(&self.core, &self.state.sorting, &self.columns)
        } else {
            self.core.clone()
        };

        self.filtered = if options.enable_filtering && !options.manual_filtering {
            filter_rows(
                &self.sorted,
                &self.state.column_filters,
                &self.state.global_filter,
                &self.columns,
            )
        } else {
            self.sorted.clone()
        };

        let total = if options.manual_pagination {
            options.row_count.unwrap_or(self.filtered.len())
        } else {
            self.filtered.len()
        };
        self.state.pagination = self.state.pagination.with_total(total);

        self.page = if options.enable_pagination && !options.manual_pagination {
            paginate(&self.filtered, &self.state.pagination)
        } else {
            self.filtered.clone()
        };

        let ids: HashSet<&str> = self.core.iter().map(Row::id).collect();
        self.state.selection = std::mem::take(&mut self.state.selection)
            .retain(|id| ids.contains(id))
            .with_total(self.core.len());

        log::trace!(
            "Recomputed rows: core={} sorted={} filtered={} page={}",
            self.core.len(),
            self.sorted.len(),
            self.filtered.len(),
            self.page.len()
        );
    }

    fn notify(&mut self, previous: &EngineState) {
        let state = &self.state;
        let callbacks = &mut self.options.callbacks;

        if state.sorting != previous.sorting {
            log::debug!("Sorting changed: {:?}", state.sorting);
            if let Some(f) = callbacks.on_sorting_change.as_mut() {
                f(&state.sorting);
            }
        }
        if state.column_filters != previous.column_filters {
            log::debug!("Column filters changed: {:?}", state.column_filters);
            if let Some(f) = callbacks.on_filters_change.as_mut() {
                f(&state.column_filters);
            }
        }
        if state.global_filter != previous.global_filter {
            log::debug!("Global filter changed: {:?}", state.global_filter);
            if let Some(f) = callbacks.on_global_filter_change.as_mut() {
                f(&state.global_filter);
            }
        }
        if state.pagination != previous.pagination {
            log::debug!("Pagination changed: {:?}", state.pagination);
            if let Some(f) = callbacks.on_pagination_change.as_mut() {
                f(&state.pagination);
            }
        }
        if state.selection != previous.selection {
            log::debug!("Selection changed: {} rows", state.selection.len());
            if let Some(f) = callbacks.on_selection_change.as_mut() {
                f(&state.selection);
            }
        }
        if state.column_visibility != previous.column_visibility {
            log::debug!("Column visibility changed");
            if let Some(f) = callbacks.on_column_visibility_change.as_mut() {
                f(&state.column_visibility);
            }
        }
        if state.column_order != previous.column_order {
            log::debug!("Column order changed: {:?}", state.column_order);
            if let Some(f) = callbacks.on_column_order_change.as_mut() {
                f(&state.column_order);
            }
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("rows", &self.core.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
