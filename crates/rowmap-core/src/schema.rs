//! Column metadata for persisted types.
//!
//! A type opts into persistence by implementing [`Entity`], normally through
//! `#[derive(Entity)]` from `rowmap-derive`. Only fields tagged with
//! `#[column(...)]` appear in [`Entity::fields`]; everything else on the
//! struct is invisible to the mapping layer.

use std::fmt;

use crate::value::{ConversionError, FromSqlValue, SqlValue};

/// The SQL scalar kinds a persisted field can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlKind {
    /// `integer`, 32-bit.
    Integer,
    /// `bigint`, 64-bit.
    BigInt,
    /// `float`, 32-bit.
    Float,
    /// `double`, 64-bit.
    Double,
    /// `boolean`.
    Boolean,
    /// `varchar`, the fallback for every other type.
    Varchar,
}

impl SqlKind {
    /// Infers the kind from a declared scalar type name.
    ///
    /// Matching is case-insensitive and accepts both Rust primitive names
    /// and the portable names (`int`, `long`, `double`, ...). Any name not
    /// listed maps to [`SqlKind::Varchar`], so inference never fails.
    #[must_use]
    pub fn infer(type_name: &str) -> Self {
        match type_name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "i32" | "i16" | "i8" | "u16" | "u8" => Self::Integer,
            "long" | "i64" | "u32" | "isize" => Self::BigInt,
            "float" | "f32" => Self::Float,
            "double" | "f64" => Self::Double,
            "boolean" | "bool" => Self::Boolean,
            _ => Self::Varchar,
        }
    }

    /// The lowercase SQL type name used in DDL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Varchar => "varchar",
        }
    }

    /// Whether literals of this kind are written inside single quotes.
    #[must_use]
    pub const fn is_quoted(self) -> bool {
        matches!(self, Self::Varchar)
    }

    /// Parses caller-entered text into a value of this kind.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when numeric or boolean text does not
    /// parse, or parses to NaN, infinity or a value out of range for the
    /// kind. Varchar accepts any text.
    pub fn parse_text(self, text: &str) -> Result<SqlValue, ConversionError> {
        let raw = SqlValue::Text(String::from(text));
        match self {
            Self::Integer => i32::from_sql_value(raw).map(|n| SqlValue::Int(i64::from(n))),
            Self::BigInt => i64::from_sql_value(raw).map(SqlValue::Int),
            Self::Float => f32::from_sql_value(raw.clone())
                .and_then(|_| f64::from_sql_value(raw))
                .map(SqlValue::Float),
            Self::Double => f64::from_sql_value(raw).map(SqlValue::Float),
            Self::Boolean => bool::from_sql_value(raw).map(SqlValue::Bool),
            Self::Varchar => Ok(raw),
        }
    }
}

impl fmt::Display for SqlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one tagged field, as emitted by the derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// The field identifier, used as the column name.
    pub name: &'static str,
    /// The declared scalar type name (`Option<T>` reports `T`).
    pub type_name: &'static str,
    /// Constraint text from the tag, e.g. `"primary key"`.
    pub constraint: &'static str,
}

/// A type whose tagged fields map to table columns.
///
/// `Default` provides the zero-argument construction used when loading
/// rows. `get` and `set` address fields by their exact declared name.
///
/// # Example
///
/// ```ignore
/// use rowmap_derive::Entity;
///
/// #[derive(Debug, Default, Entity)]
/// #[entity(table = "books")]
/// struct Book {
///     #[column("primary key")]
///     isbn: String,
///     #[column("not null")]
///     name: String,
///     // not persisted
///     cached_label: String,
/// }
/// ```
pub trait Entity: Default {
    /// Default table name for this type.
    const TABLE: &'static str;

    /// Tagged fields in declaration order.
    fn fields() -> &'static [FieldDef];

    /// Reads a persisted field. `None` when `field` is not persisted.
    fn get(&self, field: &str) -> Option<SqlValue>;

    /// Assigns a persisted field.
    ///
    /// Returns `Ok(false)` when `field` is not persisted.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when `value` does not fit the field.
    fn set(&mut self, field: &str, value: SqlValue) -> Result<bool, ConversionError>;
}

/// Derived metadata for one persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name (the field identifier).
    pub name: String,
    /// Inferred SQL kind.
    pub kind: SqlKind,
    /// Constraint text appended after the kind in DDL.
    pub constraint: String,
}

impl ColumnDescriptor {
    /// Builds a descriptor from a field definition.
    #[must_use]
    pub fn from_field(field: &FieldDef) -> Self {
        Self {
            name: String::from(field.name),
            kind: SqlKind::infer(field.type_name),
            constraint: String::from(field.constraint.trim()),
        }
    }

    /// Renders `"<name> <kind> <constraint>"` for `CREATE TABLE`.
    #[must_use]
    pub fn definition(&self) -> String {
        if self.constraint.is_empty() {
            format!("{} {}", self.name, self.kind)
        } else {
            format!("{} {} {}", self.name, self.kind, self.constraint)
        }
    }

    /// Case-insensitive comparison against a result-set column name.
    #[must_use]
    pub fn matches(&self, column: &str) -> bool {
        self.name.eq_ignore_ascii_case(column)
    }
}

/// Returns one descriptor per tagged field of `T`, in declaration order.
#[must_use]
pub fn describe_columns<T: Entity>() -> Vec<ColumnDescriptor> {
    T::fields().iter().map(ColumnDescriptor::from_field).collect()
}

/// Returns the persisted column names of `T`, in declaration order.
#[must_use]
pub fn column_names<T: Entity>() -> Vec<String> {
    T::fields().iter().map(|f| String::from(f.name)).collect()
}
