//! Error types

/// Configuration errors raised while building a [`Table`](crate::Table).
///
/// These indicate a defect in the caller's setup and are returned
/// immediately from construction. Requests that merely reference a column
/// or row that no longer exists are not errors; the engine ignores them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two column descriptors share the same id.
    #[error("Duplicate column id '{id}'")]
    DuplicateColumn { id: String },

    /// A column descriptor has neither a field key nor an accessor function.
    #[error("Column '{id}' has no accessor: set a field key or an accessor function")]
    MissingAccessor { id: String },

    /// A column descriptor has an empty id.
    #[error("Column id must not be empty")]
    EmptyColumnId,

    /// The configured page size is zero.
    #[error("Page size must be positive")]
    InvalidPageSize,

    /// A JSON value could not be read as a record.
    #[error("Invalid record: expected a JSON object, got {actual}")]
    InvalidRecord { actual: &'static str },
}

impl TableError {
    /// Creates a new duplicate column error.
    pub fn duplicate_column(id: impl Into<String>) -> Self {
        Self::DuplicateColumn { id: id.into() }
    }

    /// Creates a new missing accessor error.
    pub fn missing_accessor(id: impl Into<String>) -> Self {
        Self::MissingAccessor { id: id.into() }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;
