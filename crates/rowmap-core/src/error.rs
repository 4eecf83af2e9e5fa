//! Error types for schema derivation, statement building and row mapping.

use crate::value::ConversionError;

/// Errors raised before any SQL reaches a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `CREATE TABLE` was requested with no column definitions.
    #[error("table '{table}' has no column definitions")]
    EmptyColumns {
        /// The table being created.
        table: String,
    },

    /// An INSERT or UPDATE was requested with no values.
    #[error("statement for table '{table}' has no values")]
    EmptyValues {
        /// The target table.
        table: String,
    },

    /// Column and value lists have different lengths.
    #[error("table '{table}': {columns} column(s) but {values} value(s)")]
    ArityMismatch {
        /// The target table.
        table: String,
        /// Number of column names supplied.
        columns: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// A cursor column has no matching persisted field.
    #[error("row {row}: column '{column}' has no matching field on {entity}")]
    UnknownColumn {
        /// Zero-based row index within the cursor.
        row: usize,
        /// The cursor column name.
        column: String,
        /// The target type name.
        entity: &'static str,
    },

    /// A cursor column matches more than one persisted field.
    #[error("column '{column}' matches more than one field on {entity}")]
    AmbiguousColumn {
        /// The cursor column name.
        column: String,
        /// The target type name.
        entity: &'static str,
    },

    /// A cell could not be converted to the field's declared type.
    #[error("row {row}: column '{column}': {source}")]
    Conversion {
        /// Zero-based row index, or 0 when rendering literals.
        row: usize,
        /// The column being assigned.
        column: String,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// A value required to render a literal was not supplied.
    #[error("no value supplied for column '{0}'")]
    MissingValue(String),

    /// Several entries differing only in case were supplied for one column.
    #[error("more than one value supplied for column '{0}'")]
    DuplicateValue(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
