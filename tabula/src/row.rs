//! Row materialization.
//!
//! Rows wrap records with a stable id and read values through the column
//! registry, so later stages never look at raw records directly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::column::Column;
use crate::record::Record;
use crate::registry::ColumnRegistry;
use crate::value::Value;

/// Derives a row id from a record and its position in the input.
pub type RowIdFn = Arc<dyn Fn(&Record, usize) -> String + Send + Sync>;

/// Default row identity: the record's `id` field when present and non-null,
/// otherwise the input index.
pub fn default_row_id(record: &Record, index: usize) -> String {
    match record.get("id") {
        Some(id) if !id.is_null() => id.to_string(),
        _ => index.to_string(),
    }
}

/// A stable-identity wrapper around one input record.
///
/// Cloning a row is cheap: the record and the column registry are shared.
#[derive(Clone)]
pub struct Row {
    id: String,
    index: usize,
    original: Arc<Record>,
    columns: Arc<ColumnRegistry>,
}

impl Row {
    /// Wraps one record.
    pub fn new(
        id: impl Into<String>,
        index: usize,
        original: Arc<Record>,
        columns: Arc<ColumnRegistry>,
    ) -> Self {
        Self {
            id: id.into(),
            index,
            original,
            columns,
        }
    }

    /// The row id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Position of the record in the raw input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The wrapped record.
    pub fn original(&self) -> &Record {
        &self.original
    }

    /// Reads a column's value for this row.
    ///
    /// The record is re-read on every call. Unknown columns read as
    /// [`Value::Null`].
    pub fn get_value(&self, column_id: &str) -> Value {
        self.columns
            .resolve(column_id)
            .map(|column| column.value(&self.original))
            .unwrap_or_default()
    }

    /// One cell per registered column, in registration order.
    pub fn cells(&self) -> Vec<Cell<'_>> {
        self.columns
            .columns()
            .iter()
            .map(|column| self.cell(column))
            .collect()
    }

    /// One cell per visible column, arranged by `order`.
    pub fn visible_cells(
        &self,
        visibility: &HashMap<String, bool>,
        order: &[String],
    ) -> Vec<Cell<'_>> {
        self.columns
            .visible(visibility, order)
            .into_iter()
            .map(|column| self.cell(column))
            .collect()
    }

    fn cell<'a>(&'a self, column: &'a Column) -> Cell<'a> {
        Cell {
            row_id: &self.id,
            column,
            value: column.value(&self.original),
        }
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("original", &self.original)
            .finish()
    }
}

/// The value of one column in one row.
#[derive(Debug, Clone)]
pub struct Cell<'a> {
    /// Id of the owning row.
    pub row_id: &'a str,
    /// The column this cell belongs to.
    pub column: &'a Column,
    /// The value read through the column accessor.
    pub value: Value,
}

impl Cell<'_> {
    /// The column id.
    pub fn column_id(&self) -> &str {
        self.column.id()
    }
}

/// Wraps each record in a [`Row`], preserving input order.
pub fn materialize(
    records: &[Arc<Record>],
    columns: &Arc<ColumnRegistry>,
    row_id: &RowIdFn,
) -> Vec<Row> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Row::new(
                row_id(record, index),
                index,
                Arc::clone(record),
                Arc::clone(columns),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;

    fn columns() -> Arc<ColumnRegistry> {
        Arc::new(
            ColumnRegistry::register([
                ColumnDef::accessor("name", "name"),
                ColumnDef::accessor("age", "age").visible(false),
            ])
            .unwrap(),
        )
    }

    fn records() -> Vec<Arc<Record>> {
        vec![
            Arc::new(Record::new().set("id", "x").set("name", "Ann").set("age", 30i64)),
            Arc::new(Record::new().set("name", "Bob")),
            Arc::new(Record::new().set("id", Value::Null).set("name", "Cy")),
        ]
    }

    #[test]
    fn test_default_row_id() {
        let row_id: RowIdFn = Arc::new(default_row_id);
        let rows = materialize(&records(), &columns(), &row_id);
        let ids: Vec<&str> = rows.iter().map(Row::id).collect();
        assert_eq!(ids, ["x", "1", "2"]);
        assert_eq!(rows[2].index(), 2);
    }

    #[test]
    fn test_ids_are_stable() {
        let records = records();
        let columns = columns();
        let row_id: RowIdFn = Arc::new(|r: &Record, i: usize| {
            format!("{}-{}", r.get("name").cloned().unwrap_or_default(), i)
        });
        let first: Vec<String> = materialize(&records, &columns, &row_id)
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        let second: Vec<String> = materialize(&records, &columns, &row_id)
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "Ann-0");
    }

    #[test]
    fn test_get_value_reads_through_column() {
        let row_id: RowIdFn = Arc::new(default_row_id);
        let rows = materialize(&records(), &columns(), &row_id);
        assert_eq!(rows[0].get_value("age"), Value::Int(30));
        assert_eq!(rows[1].get_value("age"), Value::Null);
        assert_eq!(rows[0].get_value("unknown"), Value::Null);
    }

    #[test]
    fn test_visible_cells() {
        let row_id: RowIdFn = Arc::new(default_row_id);
        let rows = materialize(&records(), &columns(), &row_id);
        let cells = rows[0].visible_cells(&HashMap::new(), &[]);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].column_id(), "name");
        assert_eq!(cells[0].value, Value::from("Ann"));
        assert_eq!(rows[0].cells().len(), 2);
    }
}
