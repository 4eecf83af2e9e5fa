//! Built-in SQLite back end on top of `sqlx`.
//!
//! Targets are file paths (created when missing) or `:memory:`. SQLite has
//! no authentication, so credentials are accepted and ignored.

use std::str::FromStr;

use futures::future::BoxFuture;
use rowmap_core::{Cursor, CursorColumn, SqlValue};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::{debug, warn};

use crate::driver::{
    Backend, Concurrency, Connection, Credentials, CursorKind, CursorOptions, Driver, DriverResult,
};

/// Name the SQLite driver registers under.
pub const SQLITE_DRIVER: &str = "sqlite";

/// SQLite back end: driver `sqlite`, URLs `sqlite:<target>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Backend for Sqlite {
    fn driver_name(&self) -> &str {
        SQLITE_DRIVER
    }

    fn url_prefix(&self) -> &str {
        "sqlite:"
    }
}

/// Opens SQLite connections through `sqlx`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Creates the driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        SQLITE_DRIVER
    }

    fn connect<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        cursor: CursorOptions,
    ) -> BoxFuture<'a, DriverResult<Box<dyn Connection>>> {
        Box::pin(open(url, credentials, cursor))
    }
}

async fn open(
    url: &str,
    credentials: &Credentials,
    cursor: CursorOptions,
) -> DriverResult<Box<dyn Connection>> {
    if !credentials.is_empty() {
        debug!(user = %credentials.user, "SQLite ignores credentials");
    }
    let shape = supported_shape(cursor);
    let inner = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .connect()
        .await?;
    Ok(Box::new(SqliteConnection { inner, shape }))
}

/// Results are fully materialized, so every cursor is a read-only,
/// scroll-insensitive snapshot at best.
fn supported_shape(requested: CursorOptions) -> CursorOptions {
    let mut shape = requested;
    if shape.kind == CursorKind::ScrollSensitive {
        warn!("SQLite cursors are snapshots, using scroll-insensitive");
        shape.kind = CursorKind::ScrollInsensitive;
    }
    if shape.concurrency == Concurrency::Updatable {
        warn!("SQLite cursors are read-only, ignoring updatable concurrency");
        shape.concurrency = Concurrency::ReadOnly;
    }
    shape
}

/// A single `sqlx` SQLite connection.
pub struct SqliteConnection {
    inner: sqlx::SqliteConnection,
    shape: CursorOptions,
}

impl Connection for SqliteConnection {
    fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, DriverResult<u64>> {
        Box::pin(execute(&mut self.inner, sql))
    }

    fn query<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, DriverResult<Cursor>> {
        Box::pin(query(&mut self.inner, sql))
    }

    fn cursor_options(&self) -> CursorOptions {
        self.shape
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, DriverResult<()>> {
        Box::pin(async move {
            sqlx::Connection::close(self.inner).await?;
            Ok(())
        })
    }
}

async fn execute(conn: &mut sqlx::SqliteConnection, sql: &str) -> DriverResult<u64> {
    let result = conn.execute(sqlx::raw_sql(sql)).await?;
    Ok(result.rows_affected())
}

async fn query(conn: &mut sqlx::SqliteConnection, sql: &str) -> DriverResult<Cursor> {
    let statement = (&mut *conn).prepare(sql).await?;
    let columns: Vec<CursorColumn> = statement
        .columns()
        .iter()
        .map(|c| CursorColumn::new(c.name(), c.type_info().name()))
        .collect();

    let rows = statement.query().fetch_all(&mut *conn).await?;
    let rows = rows
        .iter()
        .map(decode_row)
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Cursor::new(columns, rows))
}

fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>, sqlx::Error> {
    (0..row.len()).map(|index| decode_cell(row, index)).collect()
}

/// Decodes a cell by the storage class of the value itself; the column's
/// declared type plays no part here.
fn decode_cell(row: &SqliteRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => SqlValue::Float(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => SqlValue::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
