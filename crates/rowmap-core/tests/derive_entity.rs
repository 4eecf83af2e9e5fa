//! Tests for the `#[derive(Entity)]` macro output.
//!
//! These tests verify that the derive macro generates:
//! - a field table holding only tagged fields, in declaration order
//! - SQL kinds inferred from field types
//! - `get`/`set` accessors that convert through `SqlValue`

use std::collections::HashMap;

use rowmap_core::statement;
use rowmap_core::{
    Cursor, CursorColumn, Entity, Error, SqlKind, SqlValue, column_names, describe_columns,
    literals, load_rows, stringify,
};
use rowmap_derive::Entity;

// =============================================================================
// Test: the book catalog type
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(table = "books")]
pub struct Book {
    #[column("primary key")]
    pub isbn: String,
    #[column("not null")]
    pub name: String,
    pub scratch: i32,
}

#[test]
fn test_book_table_name() {
    assert_eq!(Book::TABLE, "books");
}

#[test]
fn test_untagged_field_is_invisible() {
    assert_eq!(column_names::<Book>(), vec!["isbn", "name"]);
    let mut book = Book::default();
    assert_eq!(book.get("scratch"), None);
    assert_eq!(book.set("scratch", SqlValue::Int(1)), Ok(false));
}

#[test]
fn test_book_descriptors() {
    let columns = describe_columns::<Book>();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "isbn");
    assert_eq!(columns[0].kind, SqlKind::Varchar);
    assert_eq!(columns[0].constraint, "primary key");
    assert_eq!(columns[1].definition(), "name varchar not null");
}

#[test]
fn test_book_create_table() {
    let sql = statement::create_table_for::<Book>("books", true).unwrap();
    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS books(isbn varchar primary key,name varchar not null)"
    );
}

#[test]
fn test_book_insert_from_instance() {
    let book = Book {
        isbn: String::from("0-1"),
        name: String::from("Go"),
        scratch: 9,
    };
    let sql = statement::insert("books", &column_names::<Book>(), &literals(&book).unwrap()).unwrap();
    assert_eq!(sql, "INSERT INTO books (isbn, name) VALUES('0-1', 'Go')");
}

#[test]
fn test_book_load_from_cursor() {
    let cursor = Cursor::new(
        vec![
            CursorColumn::new("ISBN", "TEXT"),
            CursorColumn::new("NAME", "TEXT"),
        ],
        vec![vec![
            SqlValue::Text(String::from("0-1")),
            SqlValue::Text(String::from("Go")),
        ]],
    );
    let books: Vec<Book> = load_rows(&cursor).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].isbn, "0-1");
    assert_eq!(books[0].name, "Go");
    assert_eq!(books[0].scratch, 0);
}

// =============================================================================
// Test: every scalar kind, default table name, bare #[column]
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Entity)]
pub struct TelecomRef {
    #[column("primary key")]
    pub id: i32,
    #[column]
    pub subscriber: i64,
    #[column]
    pub ratio: f32,
    #[column]
    pub balance: f64,
    #[column("default false")]
    pub active: bool,
    #[column("(9) not null")]
    pub reference: String,
    #[column]
    pub note: Option<String>,
    #[column]
    pub port: Option<i32>,
}

#[test]
fn test_default_table_name_is_snake_case() {
    assert_eq!(TelecomRef::TABLE, "telecom_ref");
}

#[test]
fn test_kind_inference() {
    let kinds: Vec<SqlKind> = describe_columns::<TelecomRef>()
        .iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            SqlKind::Integer,
            SqlKind::BigInt,
            SqlKind::Float,
            SqlKind::Double,
            SqlKind::Boolean,
            SqlKind::Varchar,
            SqlKind::Varchar,
            SqlKind::Integer,
        ]
    );
}

#[test]
fn test_bare_column_has_empty_constraint() {
    let columns = describe_columns::<TelecomRef>();
    assert_eq!(columns[1].definition(), "subscriber bigint");
    assert_eq!(columns[5].definition(), "reference varchar (9) not null");
}

#[test]
fn test_get_and_set_round_trip_values() {
    let mut row = TelecomRef::default();
    assert_eq!(row.set("id", SqlValue::Int(5)), Ok(true));
    assert_eq!(row.set("active", SqlValue::Int(1)), Ok(true));
    assert_eq!(row.set("note", SqlValue::Null), Ok(true));
    assert_eq!(row.set("port", SqlValue::Int(8080)), Ok(true));

    assert_eq!(row.get("id"), Some(SqlValue::Int(5)));
    assert_eq!(row.get("active"), Some(SqlValue::Bool(true)));
    assert_eq!(row.get("note"), Some(SqlValue::Null));
    assert_eq!(row.port, Some(8080));
}

#[test]
fn test_set_reports_conversion_error() {
    let mut row = TelecomRef::default();
    let err = row.set("id", SqlValue::Text(String::from("abc"))).unwrap_err();
    assert_eq!(err.expected, "i32");
}

#[test]
fn test_stringify_quoting_policy() {
    let mut values = HashMap::new();
    for (column, text) in [
        ("id", "1"),
        ("subscriber", "213555"),
        ("ratio", "0.5"),
        ("balance", "10.25"),
        ("active", "true"),
        ("reference", "ABC"),
        ("note", "n/a"),
        ("port", "22"),
    ] {
        values.insert(String::from(column), String::from(text));
    }

    let literals = stringify::<TelecomRef, _>(&values).unwrap();
    assert_eq!(
        literals,
        vec!["1", "213555", "0.5", "10.25", "TRUE", "'ABC'", "'n/a'", "22"]
    );
}

#[test]
fn test_literals_reject_non_finite_float() {
    let row = TelecomRef {
        balance: f64::INFINITY,
        ..TelecomRef::default()
    };
    let err = literals(&row).unwrap_err();
    assert!(matches!(err, Error::Conversion { ref column, .. } if column == "balance"));
}

#[test]
fn test_stringify_rejects_non_finite_text() {
    let mut values = HashMap::new();
    for (column, text) in [
        ("id", "2"),
        ("subscriber", "3"),
        ("ratio", "NaN"),
        ("balance", "1e400"),
        ("active", "false"),
        ("reference", "R"),
        ("note", ""),
        ("port", "1"),
    ] {
        values.insert(String::from(column), String::from(text));
    }

    let err = stringify::<TelecomRef, _>(&values).unwrap_err();
    assert!(matches!(err, Error::Conversion { ref column, .. } if column == "ratio"));
}

// =============================================================================
// Test: a type without tagged fields cannot produce DDL
// =============================================================================

#[derive(Debug, Default, Entity)]
pub struct Untagged {
    pub value: i32,
}

#[test]
fn test_untagged_type_has_no_columns() {
    assert!(describe_columns::<Untagged>().is_empty());
    let err = statement::create_table_for::<Untagged>("untagged", true).unwrap_err();
    assert!(matches!(err, Error::EmptyColumns { .. }));
}
