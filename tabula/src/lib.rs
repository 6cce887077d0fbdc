//! Declarative table engine
//!
//! Turns a flat collection of records plus a set of column descriptors into
//! sorted, filtered, paginated and selectable rows. The engine renders
//! nothing: hosts read the row models and column partitions from a [`Table`]
//! and call its mutators in response to user input.

pub mod column;
pub mod error;
pub mod filter;
pub mod options;
pub mod pagination;
pub mod record;
pub mod registry;
pub mod row;
pub mod selection;
pub mod sort;
pub mod state;
pub mod value;

mod table;

pub use column::Column;
pub use column::ColumnDef;
pub use column::Sticky;
pub use column::ValueAccessor;
pub use error::Result;
pub use error::TableError;
pub use filter::ColumnFilter;
pub use filter::FilterOperator;
pub use options::TableOptions;
pub use pagination::PaginationState;
pub use record::Record;
pub use registry::ColumnRegistry;
pub use row::Cell;
pub use row::Row;
pub use row::RowIdFn;
pub use row::default_row_id;
pub use selection::SelectionState;
pub use sort::SortDirection;
pub use sort::SortEntry;
pub use state::EngineState;
pub use state::InitialState;
pub use table::*;
pub use value::Value;
