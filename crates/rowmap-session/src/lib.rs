//! # rowmap-session
//!
//! Runs statements built by `rowmap-core` against a live database.
//!
//! A [`Session`] is bound to a [`Backend`], which names the driver to load
//! and the URL prefix for connection targets. Drivers come from a
//! [`DriverRegistry`] (the built-in one knows `sqlite`) unless one is set
//! on the session directly.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowmap_derive::Entity;
//! use rowmap_session::Session;
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
//! let mut session = Session::new();
//! session.connect("./books.db").await?;
//! session.create_table_for::<Book>("books", true).await?;
//! session.insert_entity(&Book { isbn: "0-1".into(), name: "Go".into() }).await?;
//! let books: Vec<Book> = session.select_as("books", "").await?;
//! ```

pub mod display;
pub mod driver;
mod error;
pub mod session;
pub mod sqlite;

pub use display::{format_cursor, print_table, show_table};
pub use driver::{
    Backend, Concurrency, Connection, Credentials, CursorKind, CursorOptions, Driver,
    DriverError, DriverRegistry, DriverResult, Holdability,
};
pub use error::{Result, SessionError};
pub use session::Session;
pub use sqlite::{SQLITE_DRIVER, Sqlite, SqliteDriver};
