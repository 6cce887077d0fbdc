//! Column registry: validated, ordered lookup of columns.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::column::Column;
use crate::column::ColumnDef;
use crate::column::Sticky;
use crate::error::Result;
use crate::error::TableError;

/// The validated column set of one table.
///
/// Columns keep their registration order; ids are unique. The registry is
/// immutable once built. Visibility and order are engine state and are
/// passed in to the ordered queries.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl ColumnRegistry {
    /// Validates and registers a column set.
    ///
    /// Fails on the first duplicate id, empty id, or descriptor without an
    /// accessor. Nothing is registered on failure.
    pub fn register(defs: impl IntoIterator<Item = ColumnDef>) -> Result<Self> {
        let mut columns = Vec::new();
        let mut index = HashMap::new();

        for def in defs {
            let column = def.resolve()?;
            if index.contains_key(column.id()) {
                return Err(TableError::duplicate_column(column.id()));
            }
            index.insert(column.id().to_string(), columns.len());
            columns.push(column);
        }

        log::debug!("Registered {} columns", columns.len());
        Ok(Self { columns, index })
    }

    /// Looks up a column by id.
    pub fn resolve(&self, column_id: &str) -> Option<&Column> {
        self.index.get(column_id).map(|&i| &self.columns[i])
    }

    /// Returns `true` if a column with this id is registered.
    pub fn contains(&self, column_id: &str) -> bool {
        self.index.contains_key(column_id)
    }

    /// All columns in registration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns arranged by `order`.
    ///
    /// Ids listed in `order` come first, in that order; the rest follow in
    /// registration order. Unknown and repeated ids in `order` are ignored.
    pub fn ordered(&self, order: &[String]) -> Vec<&Column> {
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(self.columns.len());

        for id in order {
            if let Some(column) = self.resolve(id)
                && seen.insert(column.id())
            {
                result.push(column);
            }
        }
        for column in &self.columns {
            if seen.insert(column.id()) {
                result.push(column);
            }
        }
        result
    }

    /// Visible columns arranged by `order`.
    ///
    /// A column missing from `visibility` falls back to the visibility
    /// declared on its descriptor.
    pub fn visible(&self, visibility: &HashMap<String, bool>, order: &[String]) -> Vec<&Column> {
        self.ordered(order)
            .into_iter()
            .filter(|column| is_visible(column, visibility))
            .collect()
    }

    /// Visible columns pinned to the leading edge.
    pub fn sticky_start(
        &self,
        visibility: &HashMap<String, bool>,
        order: &[String],
    ) -> Vec<&Column> {
        self.partition(visibility, order, Some(Sticky::Start))
    }

    /// Visible columns with no pinning.
    pub fn center(&self, visibility: &HashMap<String, bool>, order: &[String]) -> Vec<&Column> {
        self.partition(visibility, order, None)
    }

    /// Visible columns pinned to the trailing edge.
    pub fn sticky_end(
        &self,
        visibility: &HashMap<String, bool>,
        order: &[String],
    ) -> Vec<&Column> {
        self.partition(visibility, order, Some(Sticky::End))
    }

    fn partition(
        &self,
        visibility: &HashMap<String, bool>,
        order: &[String],
        sticky: Option<Sticky>,
    ) -> Vec<&Column> {
        self.visible(visibility, order)
            .into_iter()
            .filter(|column| column.sticky() == sticky)
            .collect()
    }
}

pub(crate) fn is_visible(column: &Column, visibility: &HashMap<String, bool>) -> bool {
    visibility
        .get(column.id())
        .copied()
        .unwrap_or(column.default_visible())
}
