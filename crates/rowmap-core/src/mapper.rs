//! Conversion between cursor rows and [`Entity`] instances.
//!
//! Reads go through [`load_rows`]: each cursor column is matched
//! case-insensitively against the type's column descriptors and assigned
//! through [`Entity::set`], which converts by the field's declared type.
//! The type name the back end reports for a column is never consulted.
//!
//! Writes go through [`stringify`] (caller-entered text keyed by column
//! name) or [`literals`] (an existing instance). Both render one SQL literal
//! per descriptor, ready for [`crate::statement::insert`] or
//! [`crate::statement::update`].

use std::any::type_name;
use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::warn;

use crate::cursor::{Cursor, Row};
use crate::error::{Error, Result};
use crate::schema::{ColumnDescriptor, Entity, describe_columns};
use crate::value::{ConversionError, SqlValue};

/// What [`load_rows_with`] does with a row that fails to map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MappingPolicy {
    /// Abort and return the first mapping error.
    #[default]
    FailFast,
    /// Log the error at `warn` level and leave the row out.
    SkipRow,
}

/// Loads every cursor row into a new `T`, failing on the first bad row.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`] when a cursor column has no matching
/// tagged field, [`Error::AmbiguousColumn`] when it matches several, and
/// [`Error::Conversion`] when a cell does not fit its field.
pub fn load_rows<T: Entity>(cursor: &Cursor) -> Result<Vec<T>> {
    load_rows_with(cursor, MappingPolicy::FailFast)
}

/// Loads every cursor row into a new `T` under the given policy.
///
/// # Errors
///
/// With [`MappingPolicy::FailFast`], the same errors as [`load_rows`].
/// With [`MappingPolicy::SkipRow`], never.
pub fn load_rows_with<T: Entity>(cursor: &Cursor, policy: MappingPolicy) -> Result<Vec<T>> {
    let descriptors = describe_columns::<T>();
    let mut loaded = Vec::with_capacity(cursor.len());

    for (index, row) in cursor.iter().enumerate() {
        match load_row::<T>(&descriptors, index, row) {
            Ok(instance) => loaded.push(instance),
            Err(err) if policy == MappingPolicy::SkipRow => {
                warn!(entity = type_name::<T>(), row = index, error = %err, "Skipping unmappable row");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(loaded)
}

fn load_row<T: Entity>(descriptors: &[ColumnDescriptor], index: usize, row: Row<'_>) -> Result<T> {
    let mut instance = T::default();

    for (column, value) in row.columns().iter().zip(row.values()) {
        let descriptor = match_descriptor::<T>(descriptors, index, &column.name)?;
        let assigned = instance
            .set(&descriptor.name, value.clone())
            .map_err(|source| Error::Conversion {
                row: index,
                column: column.name.clone(),
                source,
            })?;
        if !assigned {
            return Err(Error::UnknownColumn {
                row: index,
                column: column.name.clone(),
                entity: type_name::<T>(),
            });
        }
    }

    Ok(instance)
}

fn match_descriptor<'d, T: Entity>(
    descriptors: &'d [ColumnDescriptor],
    index: usize,
    column: &str,
) -> Result<&'d ColumnDescriptor> {
    let mut matches = descriptors.iter().filter(|d| d.matches(column));
    let first = matches.next().ok_or_else(|| Error::UnknownColumn {
        row: index,
        column: String::from(column),
        entity: type_name::<T>(),
    })?;
    if matches.next().is_some() {
        return Err(Error::AmbiguousColumn {
            column: String::from(column),
            entity: type_name::<T>(),
        });
    }
    Ok(first)
}

/// Renders caller-entered text as one literal per column of `T`.
///
/// A key equal to the column name is used first; otherwise keys are matched
/// case-insensitively. Text for integer, bigint, float, double and boolean
/// columns is parsed and written unquoted; every other column is
/// single-quoted with embedded quotes doubled.
///
/// # Errors
///
/// Returns [`Error::MissingValue`] when a column has no entry,
/// [`Error::DuplicateValue`] when several keys match it only
/// case-insensitively, and [`Error::Conversion`] when numeric or boolean
/// text does not parse to a finite value.
pub fn stringify<T: Entity, S: BuildHasher>(values: &HashMap<String, String, S>) -> Result<Vec<String>> {
    describe_columns::<T>()
        .iter()
        .map(|descriptor| {
            let text = lookup_value(values, descriptor)?;
            let value = descriptor
                .kind
                .parse_text(text)
                .map_err(|source| Error::Conversion {
                    row: 0,
                    column: descriptor.name.clone(),
                    source,
                })?;
            Ok(value.to_sql_inline())
        })
        .collect()
}

fn lookup_value<'v, S: BuildHasher>(
    values: &'v HashMap<String, String, S>,
    descriptor: &ColumnDescriptor,
) -> Result<&'v String> {
    if let Some(text) = values.get(&descriptor.name) {
        return Ok(text);
    }
    let mut matches = values
        .iter()
        .filter(|(key, _)| descriptor.matches(key))
        .map(|(_, text)| text);
    let text = matches
        .next()
        .ok_or_else(|| Error::MissingValue(descriptor.name.clone()))?;
    if matches.next().is_some() {
        return Err(Error::DuplicateValue(descriptor.name.clone()));
    }
    Ok(text)
}

/// Renders the persisted fields of `instance` as literals, in column order.
///
/// # Errors
///
/// Returns [`Error::MissingValue`] when the type lists a field that its
/// `get` does not answer for, and [`Error::Conversion`] for a NaN or
/// infinite float field.
pub fn literals<T: Entity>(instance: &T) -> Result<Vec<String>> {
    T::fields()
        .iter()
        .map(|field| {
            let value = instance
                .get(field.name)
                .ok_or_else(|| Error::MissingValue(String::from(field.name)))?;
            if !value.is_finite() {
                return Err(Error::Conversion {
                    row: 0,
                    column: String::from(field.name),
                    source: ConversionError::new("finite float", &value),
                });
            }
            Ok(value.to_sql_inline())
        })
        .collect()
}

/// A header-plus-rows view of loaded instances, for tabular display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// Column names in declaration order.
    pub headers: Vec<String>,
    /// One value per header for each instance.
    pub rows: Vec<Vec<SqlValue>>,
}

/// Builds a [`Grid`] from instances, reading every persisted field.
#[must_use]
pub fn to_grid<T: Entity>(instances: &[T]) -> Grid {
    let fields = T::fields();
    Grid {
        headers: fields.iter().map(|f| String::from(f.name)).collect(),
        rows: instances
            .iter()
            .map(|instance| {
                fields
                    .iter()
                    .map(|f| instance.get(f.name).unwrap_or(SqlValue::Null))
                    .collect()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorColumn;
    use crate::schema::FieldDef;
    use crate::value::{FromSqlValue, ToSqlValue};

    // Hand-written registration, the same shape the derive generates.
    #[derive(Debug, Default, PartialEq)]
    struct Phone {
        id: i32,
        label: String,
        active: bool,
        note: String,
    }

    impl Entity for Phone {
        const TABLE: &'static str = "phone";

        fn fields() -> &'static [FieldDef] {
            &[
                FieldDef {
                    name: "id",
                    type_name: "i32",
                    constraint: "primary key",
                },
                FieldDef {
                    name: "label",
                    type_name: "String",
                    constraint: "not null",
                },
                FieldDef {
                    name: "active",
                    type_name: "bool",
                    constraint: "",
                },
            ]
        }

        fn get(&self, field: &str) -> Option<SqlValue> {
            match field {
                "id" => Some(self.id.to_sql_value()),
                "label" => Some(self.label.clone().to_sql_value()),
                "active" => Some(self.active.to_sql_value()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: SqlValue) -> std::result::Result<bool, ConversionError> {
            match field {
                "id" => self.id = FromSqlValue::from_sql_value(value)?,
                "label" => self.label = FromSqlValue::from_sql_value(value)?,
                "active" => self.active = FromSqlValue::from_sql_value(value)?,
                _ => return Ok(false),
            }
            Ok(true)
        }
    }

    fn cursor(columns: &[(&str, &str)], rows: Vec<Vec<SqlValue>>) -> Cursor {
        Cursor::new(
            columns
                .iter()
                .map(|(name, ty)| CursorColumn::new(*name, *ty))
                .collect(),
            rows,
        )
    }

    #[test]
    fn test_load_rows_matches_uppercase_columns() {
        let cursor = cursor(
            &[("ID", "INTEGER"), ("LABEL", "VARCHAR"), ("ACTIVE", "BOOLEAN")],
            vec![vec![
                SqlValue::Int(7),
                SqlValue::Text(String::from("home")),
                SqlValue::Int(1),
            ]],
        );
        let phones: Vec<Phone> = load_rows(&cursor).unwrap();
        assert_eq!(
            phones,
            vec![Phone {
                id: 7,
                label: String::from("home"),
                active: true,
                note: String::new(),
            }]
        );
    }

    #[test]
    fn test_load_rows_partial_projection() {
        let cursor = cursor(&[("label", "text")], vec![vec![SqlValue::Text(String::from("x"))]]);
        let phones: Vec<Phone> = load_rows(&cursor).unwrap();
        assert_eq!(phones[0].label, "x");
        assert_eq!(phones[0].id, 0);
    }

    #[test]
    fn test_untagged_field_is_unknown_column() {
        let cursor = cursor(&[("note", "text")], vec![vec![SqlValue::Text(String::from("x"))]]);
        let err = load_rows::<Phone>(&cursor).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { row: 0, ref column, .. } if column == "note"));
    }

    #[test]
    fn test_conversion_failure_fails_fast() {
        let cursor = cursor(
            &[("id", "integer")],
            vec![vec![SqlValue::Int(1)], vec![SqlValue::Text(String::from("abc"))]],
        );
        let err = load_rows::<Phone>(&cursor).unwrap_err();
        assert!(matches!(err, Error::Conversion { row: 1, .. }));
    }

    #[test]
    fn test_skip_row_policy_drops_bad_rows() {
        let cursor = cursor(
            &[("id", "integer")],
            vec![
                vec![SqlValue::Int(1)],
                vec![SqlValue::Null],
                vec![SqlValue::Int(3)],
            ],
        );
        let phones: Vec<Phone> = load_rows_with(&cursor, MappingPolicy::SkipRow).unwrap();
        let ids: Vec<i32> = phones.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_stringify_quotes_only_text() {
        let mut values = HashMap::new();
        values.insert(String::from("ID"), String::from("42"));
        values.insert(String::from("label"), String::from("O'Neil"));
        values.insert(String::from("active"), String::from("false"));

        let literals = stringify::<Phone, _>(&values).unwrap();
        assert_eq!(literals, vec!["42", "'O''Neil'", "FALSE"]);
    }

    #[test]
    fn test_stringify_missing_value() {
        let mut values = HashMap::new();
        values.insert(String::from("id"), String::from("1"));
        let err = stringify::<Phone, _>(&values).unwrap_err();
        assert!(matches!(err, Error::MissingValue(ref c) if c == "label"));
    }

    #[test]
    fn test_stringify_rejects_bad_number() {
        let mut values = HashMap::new();
        values.insert(String::from("id"), String::from("1; DROP TABLE phone"));
        values.insert(String::from("label"), String::from("x"));
        values.insert(String::from("active"), String::from("true"));
        let err = stringify::<Phone, _>(&values).unwrap_err();
        assert!(matches!(err, Error::Conversion { ref column, .. } if column == "id"));
    }

    #[test]
    fn test_stringify_exact_key_wins() {
        let mut values = HashMap::new();
        values.insert(String::from("ID"), String::from("1"));
        values.insert(String::from("id"), String::from("2"));
        values.insert(String::from("label"), String::from("x"));
        values.insert(String::from("active"), String::from("true"));

        let literals = stringify::<Phone, _>(&values).unwrap();
        assert_eq!(literals[0], "2");
    }

    #[test]
    fn test_stringify_rejects_case_duplicates() {
        let mut values = HashMap::new();
        values.insert(String::from("id"), String::from("1"));
        values.insert(String::from("LABEL"), String::from("x"));
        values.insert(String::from("Label"), String::from("y"));
        values.insert(String::from("active"), String::from("true"));

        let err = stringify::<Phone, _>(&values).unwrap_err();
        assert!(matches!(err, Error::DuplicateValue(ref c) if c == "label"));
    }

    #[test]
    fn test_literals_from_instance() {
        let phone = Phone {
            id: 3,
            label: String::from("work"),
            active: true,
            note: String::from("ignored"),
        };
        assert_eq!(literals(&phone).unwrap(), vec!["3", "'work'", "TRUE"]);
    }

    #[test]
    fn test_to_grid() {
        let phones = vec![Phone {
            id: 1,
            label: String::from("a"),
            active: false,
            note: String::new(),
        }];
        let grid = to_grid(&phones);
        assert_eq!(grid.headers, vec!["id", "label", "active"]);
        assert_eq!(
            grid.rows,
            vec![vec![
                SqlValue::Int(1),
                SqlValue::Text(String::from("a")),
                SqlValue::Bool(false),
            ]]
        );
    }
}
