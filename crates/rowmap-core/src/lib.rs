//! # rowmap-core
//!
//! Maps plain Rust structs onto SQL tables without per-type mapping code.
//!
//! This crate provides:
//! - `Entity`, the metadata trait implemented by `#[derive(Entity)]`
//! - Column descriptors with SQL kinds inferred from field types
//! - Text builders for `CREATE TABLE`, `SELECT`, `INSERT`, `UPDATE`, `DELETE`
//! - A row mapper between result cursors and typed instances
//!
//! Nothing here talks to a database; `rowmap-session` executes the
//! statements built by this crate.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowmap_core::{statement, mapper};
//! use rowmap_derive::Entity;
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(table = "books")]
//! struct Book {
//!     #[column("primary key")]
//!     isbn: String,
//!     #[column("not null")]
//!     name: String,
//! }
//!
//! let ddl = statement::create_table_for::<Book>("books", true)?;
//! // CREATE TABLE IF NOT EXISTS books(isbn varchar primary key,name varchar not null)
//!
//! let book = Book { isbn: "0-1".into(), name: "Go".into() };
//! let insert = statement::insert(
//!     "books",
//!     &rowmap_core::column_names::<Book>(),
//!     &mapper::literals(&book)?,
//! )?;
//! // INSERT INTO books (isbn, name) VALUES('0-1', 'Go')
//! ```
//!
//! ## Statement text
//!
//! Statements are assembled as text with values inlined as literals. Text
//! literals are escaped by [`SqlValue::to_sql_inline`], but table names,
//! column names and the free-form criteria/tail clauses are trusted
//! fragments copied verbatim. See [`statement`].

pub mod cursor;
mod error;
pub mod mapper;
pub mod schema;
pub mod statement;
pub mod value;

pub use cursor::{Cursor, CursorColumn, Row};
pub use error::{Error, Result};
pub use mapper::{Grid, MappingPolicy, literals, load_rows, load_rows_with, stringify, to_grid};
pub use schema::{ColumnDescriptor, Entity, FieldDef, SqlKind, column_names, describe_columns};
pub use value::{ConversionError, FromSqlValue, SqlValue, ToSqlValue};
