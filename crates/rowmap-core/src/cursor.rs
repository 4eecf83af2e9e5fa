//! Materialized query results.

use crate::value::SqlValue;

/// Name and back-end type name of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorColumn {
    /// Column name as reported by the back end.
    pub name: String,
    /// Type name as reported by the back end, lowercased.
    ///
    /// Informational only: row mapping converts by the target field's
    /// declared type.
    pub type_name: String,
}

impl CursorColumn {
    /// Creates column metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into().to_ascii_lowercase(),
        }
    }
}

/// A query result: column metadata plus rows, iterated front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    columns: Vec<CursorColumn>,
    rows: Vec<Vec<SqlValue>>,
}

impl Cursor {
    /// Creates a cursor. Every row must have one value per column.
    #[must_use]
    pub fn new(columns: Vec<CursorColumn>, rows: Vec<Vec<SqlValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Column metadata in result order.
    #[must_use]
    pub fn columns(&self) -> &[CursorColumn] {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Iterates rows in result order.
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Consumes the cursor, returning the raw rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<SqlValue>> {
        self.rows
    }
}

/// One row borrowed from a [`Cursor`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [CursorColumn],
    values: &'a [SqlValue],
}

impl<'a> Row<'a> {
    /// Column metadata shared with the cursor.
    #[must_use]
    pub const fn columns(&self) -> &'a [CursorColumn] {
        self.columns
    }

    /// Cell values in column order.
    #[must_use]
    pub const fn values(&self) -> &'a [SqlValue] {
        self.values
    }

    /// Cell by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a SqlValue> {
        self.values.get(index)
    }

    /// Cell by column name, matched case-insensitively.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&'a SqlValue> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
    }

    /// Generic text accessor: the cell rendered as plain text.
    #[must_use]
    pub fn get_string(&self, index: usize) -> Option<String> {
        self.get(index).map(ToString::to_string)
    }
}
