//! Column descriptors.
//!
//! A [`ColumnDef`] is what the caller writes; a [`Column`] is what the
//! registry keeps after validation, with its accessor resolved.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;
use crate::error::TableError;
use crate::record::Record;
use crate::row::Row;
use crate::value::Value;

/// Default column size, in caller-defined units.
pub const DEFAULT_COLUMN_SIZE: u32 = 150;

/// Computes a value from a whole record.
pub type AccessorFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// Custom comparator: `(row_a, row_b, column_id)`. Returned as ascending
/// order; the sort stage reverses it for descending entries.
pub type SortFn = Arc<dyn Fn(&Row, &Row, &str) -> Ordering + Send + Sync>;

/// Custom filter predicate: `(row, column_id, filter_value)`.
pub type FilterFn = Arc<dyn Fn(&Row, &str, &Value) -> bool + Send + Sync>;

/// Pins a column to one edge of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sticky {
    /// Pinned to the leading edge.
    Start,
    /// Pinned to the trailing edge.
    End,
}

/// How a column reads its value from a record.
#[derive(Clone)]
pub enum ValueAccessor {
    /// Reads a field by key. Missing fields read as [`Value::Null`].
    Field(String),
    /// Computes the value with a function.
    Function(AccessorFn),
}

impl ValueAccessor {
    /// Reads the value from a record.
    pub fn read(&self, record: &Record) -> Value {
        match self {
            ValueAccessor::Field(key) => record.get(key).cloned().unwrap_or_default(),
            ValueAccessor::Function(f) => f(record),
        }
    }
}

impl fmt::Debug for ValueAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueAccessor::Field(key) => f.debug_tuple("Field").field(key).finish(),
            ValueAccessor::Function(_) => f.write_str("Function(..)"),
        }
    }
}

// =============================================================================
// ColumnDef
// =============================================================================

/// A column descriptor as supplied by the caller.
///
/// # Example
///
/// ```
/// use tabula::{ColumnDef, Sticky, Value};
///
/// let columns = vec![
///     ColumnDef::accessor("name", "name").header("Name").sticky(Sticky::Start),
///     ColumnDef::accessor("score", "score"),
///     ColumnDef::computed("label", |r| {
///         Value::from(format!("#{}", r.get("id").cloned().unwrap_or_default()))
///     })
///     .sortable(false),
/// ];
/// assert_eq!(columns.len(), 3);
/// ```
#[derive(Clone)]
pub struct ColumnDef {
    pub(crate) id: String,
    pub(crate) header: Option<String>,
    pub(crate) accessor_key: Option<String>,
    pub(crate) accessor_fn: Option<AccessorFn>,
    pub(crate) sortable: bool,
    pub(crate) filterable: bool,
    pub(crate) sort_fn: Option<SortFn>,
    pub(crate) filter_fn: Option<FilterFn>,
    pub(crate) visible: bool,
    pub(crate) size: u32,
    pub(crate) sticky: Option<Sticky>,
}

impl ColumnDef {
    /// Creates a descriptor with no accessor.
    ///
    /// One of [`accessor_key`](Self::accessor_key) or
    /// [`accessor_fn`](Self::accessor_fn) must be set before registration.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: None,
            accessor_key: None,
            accessor_fn: None,
            sortable: true,
            filterable: true,
            sort_fn: None,
            filter_fn: None,
            visible: true,
            size: DEFAULT_COLUMN_SIZE,
            sticky: None,
        }
    }

    /// Creates a column that reads the field `key`.
    pub fn accessor(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(id).accessor_key(key)
    }

    /// Creates a column whose value is computed from the whole record.
    pub fn computed<F>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self::new(id).accessor_fn(f)
    }

    /// Sets the field key to read.
    pub fn accessor_key(mut self, key: impl Into<String>) -> Self {
        self.accessor_key = Some(key.into());
        self
    }

    /// Sets the accessor function.
    pub fn accessor_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.accessor_fn = Some(Arc::new(f));
        self
    }

    /// Sets the display header.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Sets whether the column can be sorted.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets whether the column takes part in filtering.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets a custom comparator.
    pub fn sort_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Row, &Row, &str) -> Ordering + Send + Sync + 'static,
    {
        self.sort_fn = Some(Arc::new(f));
        self
    }

    /// Sets a custom filter predicate, used instead of the filter operator.
    pub fn filter_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Row, &str, &Value) -> bool + Send + Sync + 'static,
    {
        self.filter_fn = Some(Arc::new(f));
        self
    }

    /// Sets the initial visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the column size.
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Pins the column to an edge.
    pub fn sticky(mut self, sticky: Sticky) -> Self {
        self.sticky = Some(sticky);
        self
    }

    /// Returns the column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Validates the descriptor and resolves its accessor.
    ///
    /// When both accessor forms are set the function wins, since it can
    /// read the keyed field itself.
    pub(crate) fn resolve(self) -> Result<Column> {
        if self.id.is_empty() {
            return Err(TableError::EmptyColumnId);
        }
        let accessor = match (self.accessor_fn, self.accessor_key) {
            (Some(f), _) => ValueAccessor::Function(f),
            (None, Some(key)) => ValueAccessor::Field(key),
            (None, None) => return Err(TableError::missing_accessor(self.id)),
        };
        Ok(Column {
            header: self.header.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            accessor,
            sortable: self.sortable,
            filterable: self.filterable,
            sort_fn: self.sort_fn,
            filter_fn: self.filter_fn,
            visible: self.visible,
            size: self.size,
            sticky: self.sticky,
        })
    }
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("accessor_key", &self.accessor_key)
            .field("accessor_fn", &self.accessor_fn.is_some())
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Column
// =============================================================================

/// A validated column held by the [`ColumnRegistry`](crate::ColumnRegistry).
#[derive(Clone)]
pub struct Column {
    id: String,
    header: String,
    accessor: ValueAccessor,
    sortable: bool,
    filterable: bool,
    sort_fn: Option<SortFn>,
    filter_fn: Option<FilterFn>,
    visible: bool,
    size: u32,
    sticky: Option<Sticky>,
}

impl Column {
    /// Returns the column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display header (the id when none was given).
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Returns the resolved accessor.
    pub fn accessor(&self) -> &ValueAccessor {
        &self.accessor
    }

    /// Reads this column's value from a record.
    pub fn value(&self, record: &Record) -> Value {
        self.accessor.read(record)
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn sort_fn(&self) -> Option<&SortFn> {
        self.sort_fn.as_ref()
    }

    pub fn filter_fn(&self) -> Option<&FilterFn> {
        self.filter_fn.as_ref()
    }

    /// Visibility declared on the descriptor. The live value is in
    /// [`EngineState::column_visibility`](crate::EngineState::column_visibility).
    pub fn default_visible(&self) -> bool {
        self.visible
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sticky(&self) -> Option<Sticky> {
        self.sticky
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("accessor", &self.accessor)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("sticky", &self.sticky)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_field_accessor() {
        let column = ColumnDef::accessor("score", "points").resolve().unwrap();
        let record = Record::new().set("points", 7i64);
        assert_eq!(column.value(&record), Value::Int(7));
        assert_eq!(column.header(), "score");
    }

    #[test]
    fn test_missing_field_reads_null() {
        let column = ColumnDef::accessor("score", "score").resolve().unwrap();
        assert_eq!(column.value(&Record::new()), Value::Null);
    }

    #[test]
    fn test_resolve_function_accessor() {
        let column = ColumnDef::computed("double", |r| {
            Value::from(r.get("n").and_then(Value::as_f64).map(|n| n * 2.0))
        })
        .resolve()
        .unwrap();
        assert_eq!(column.value(&Record::new().set("n", 4i64)), Value::Float(8.0));
        assert_eq!(column.value(&Record::new()), Value::Null);
    }

    #[test]
    fn test_missing_accessor_is_error() {
        let err = ColumnDef::new("orphan").resolve().unwrap_err();
        assert_eq!(err, TableError::missing_accessor("orphan"));
    }

    #[test]
    fn test_empty_id_is_error() {
        let err = ColumnDef::accessor("", "name").resolve().unwrap_err();
        assert_eq!(err, TableError::EmptyColumnId);
    }
}
