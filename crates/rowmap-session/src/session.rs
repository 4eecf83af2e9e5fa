//! Connection sessions.
//!
//! A [`Session`] owns at most one live connection. It starts disconnected,
//! is connected explicitly, and never reconnects on its own. Every
//! statement operation takes `&mut self`, so a session is used by one task
//! at a time.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use rowmap_core::{Cursor, Entity, MappingPolicy, statement};
use tracing::{debug, info, warn};

use crate::display;
use crate::driver::{Backend, Connection, Credentials, CursorOptions, Driver, DriverRegistry};
use crate::error::{Result, SessionError};
use crate::sqlite::Sqlite;

/// A database session bound to a back end.
///
/// The driver is taken from [`Session::set_driver`] when one was given,
/// otherwise it is looked up in the session's registry under the back
/// end's driver name.
///
/// # Example
///
/// ```no_run
/// use rowmap_session::Session;
///
/// # async fn run() -> rowmap_session::Result<()> {
/// let mut session = Session::new();
/// session.connect("./books.db").await?;
/// session
///     .create_table_if_not_exists("books", &["isbn varchar primary key", "name varchar not null"])
///     .await?;
/// session.show_table("books").await?;
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Session<B: Backend = Sqlite> {
    backend: B,
    registry: DriverRegistry,
    driver: Option<Arc<dyn Driver>>,
    connection: Option<Box<dyn Connection>>,
    url: Option<String>,
}

impl Session {
    /// Creates a disconnected SQLite session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(Sqlite)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Session<B> {
    /// Creates a disconnected session for `backend` with the built-in drivers.
    #[must_use]
    pub fn with_backend(backend: B) -> Self {
        Self::with_registry(backend, DriverRegistry::with_builtin())
    }

    /// Creates a disconnected session that resolves drivers from `registry`.
    #[must_use]
    pub fn with_registry(backend: B, registry: DriverRegistry) -> Self {
        Self {
            backend,
            registry,
            driver: None,
            connection: None,
            url: None,
        }
    }

    /// Uses `driver` for later connects instead of the registry lookup.
    pub fn set_driver(&mut self, driver: impl Driver + 'static) {
        self.driver = Some(Arc::new(driver));
    }

    /// The back end this session connects through.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Drivers available for lookup.
    pub fn registry_mut(&mut self) -> &mut DriverRegistry {
        &mut self.registry
    }

    /// Whether a connection is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// URL of the open connection.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Cursor shape of the open connection.
    #[must_use]
    pub fn cursor_options(&self) -> Option<CursorOptions> {
        self.connection.as_ref().map(|c| c.cursor_options())
    }

    /// Connects to `target` without credentials.
    ///
    /// # Errors
    ///
    /// See [`Session::connect_with_options`].
    pub async fn connect(&mut self, target: &str) -> Result<()> {
        self.connect_with_options(target, &Credentials::default(), CursorOptions::default())
            .await
    }

    /// Connects to `target` as `user`.
    ///
    /// # Errors
    ///
    /// See [`Session::connect_with_options`].
    pub async fn connect_with(&mut self, target: &str, user: &str, password: &str) -> Result<()> {
        self.connect_with_options(
            target,
            &Credentials::new(user, password),
            CursorOptions::default(),
        )
        .await
    }

    /// Connects to the back end's URL for `target`.
    ///
    /// Any connection already open is closed first. On failure the session
    /// is left disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DriverNotFound`] when no driver resolves and
    /// [`SessionError::Connection`] when the driver cannot connect.
    pub async fn connect_with_options(
        &mut self,
        target: &str,
        credentials: &Credentials,
        cursor: CursorOptions,
    ) -> Result<()> {
        if self.is_connected() {
            if let Err(err) = self.close().await {
                warn!(error = %err, "Failed to close previous connection");
            }
        }

        let driver = self.resolve_driver()?;
        let url = self.backend.url(target);
        info!(url = %url, driver = driver.name(), user = %credentials.user, "Connecting");

        let connection = driver
            .connect(&url, credentials, cursor)
            .await
            .map_err(|source| SessionError::Connection {
                url: url.clone(),
                source,
            })?;

        self.connection = Some(connection);
        self.url = Some(url);
        Ok(())
    }

    fn resolve_driver(&self) -> Result<Arc<dyn Driver>> {
        if let Some(driver) = &self.driver {
            return Ok(Arc::clone(driver));
        }
        let name = self.backend.driver_name();
        self.registry
            .get(name)
            .ok_or_else(|| SessionError::DriverNotFound(name.to_string()))
    }

    fn connection_mut(&mut self) -> Result<&mut Box<dyn Connection>> {
        self.connection.as_mut().ok_or(SessionError::NotConnected)
    }

    /// Runs a statement, discarding the affected row count.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] or [`SessionError::Statement`].
    pub async fn execute(&mut self, sql: &str) -> Result<()> {
        self.execute_update(sql).await.map(|_| ())
    }

    /// Runs a statement and returns the number of rows it affected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] or [`SessionError::Statement`].
    pub async fn execute_update(&mut self, sql: &str) -> Result<u64> {
        let connection = self.connection_mut()?;
        debug!(sql = %sql, "Executing statement");
        connection
            .execute(sql)
            .await
            .map_err(|source| SessionError::Statement {
                sql: sql.to_string(),
                source,
            })
    }

    /// Runs a query and returns its materialized result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] or [`SessionError::Statement`].
    pub async fn execute_query(&mut self, sql: &str) -> Result<Cursor> {
        let connection = self.connection_mut()?;
        debug!(sql = %sql, "Executing query");
        connection
            .query(sql)
            .await
            .map_err(|source| SessionError::Statement {
                sql: sql.to_string(),
                source,
            })
    }

    /// Creates `name` from column definitions.
    ///
    /// # Errors
    ///
    /// Returns a mapping error for an empty definition list, otherwise the
    /// errors of [`Session::execute`].
    pub async fn create_table<S: AsRef<str>>(&mut self, name: &str, defs: &[S]) -> Result<()> {
        let sql = statement::create_table(name, defs, false)?;
        self.execute(&sql).await
    }

    /// Creates `name` unless it already exists.
    ///
    /// # Errors
    ///
    /// Same as [`Session::create_table`].
    pub async fn create_table_if_not_exists<S: AsRef<str>>(
        &mut self,
        name: &str,
        defs: &[S],
    ) -> Result<()> {
        let sql = statement::create_table(name, defs, true)?;
        self.execute(&sql).await
    }

    /// Creates `name` from the tagged fields of `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::create_table`].
    pub async fn create_table_for<T: Entity>(&mut self, name: &str, if_not_exists: bool) -> Result<()> {
        let sql = statement::create_table_for::<T>(name, if_not_exists)?;
        self.execute(&sql).await
    }

    /// Runs `SELECT * FROM table tail`.
    ///
    /// `tail` is appended verbatim and must come from trusted code.
    ///
    /// # Errors
    ///
    /// Same as [`Session::execute_query`].
    pub async fn select(&mut self, table: &str, tail: &str) -> Result<Cursor> {
        self.execute_query(&statement::select(table, tail)).await
    }

    /// Runs `SELECT c1, c2 FROM table tail`.
    ///
    /// `tail` is appended verbatim and must come from trusted code.
    ///
    /// # Errors
    ///
    /// Same as [`Session::execute_query`].
    pub async fn select_columns<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        table: &str,
        tail: &str,
    ) -> Result<Cursor> {
        self.execute_query(&statement::select_columns(columns, table, tail))
            .await
    }

    /// Selects from `table` and loads every row into a `T`.
    ///
    /// # Errors
    ///
    /// Statement errors, or the first mapping error.
    pub async fn select_as<T: Entity>(&mut self, table: &str, tail: &str) -> Result<Vec<T>> {
        self.select_as_with(table, tail, MappingPolicy::FailFast)
            .await
    }

    /// Selects from `table` and loads rows into `T` under `policy`.
    ///
    /// # Errors
    ///
    /// Statement errors, or mapping errors under [`MappingPolicy::FailFast`].
    pub async fn select_as_with<T: Entity>(
        &mut self,
        table: &str,
        tail: &str,
        policy: MappingPolicy,
    ) -> Result<Vec<T>> {
        let cursor = self.select(table, tail).await?;
        Ok(rowmap_core::load_rows_with(&cursor, policy)?)
    }

    /// Inserts one row of pre-rendered literals.
    ///
    /// # Errors
    ///
    /// Mapping errors for empty or mismatched lists, then statement errors.
    pub async fn insert<C, V>(&mut self, table: &str, columns: &[C], values: &[V]) -> Result<u64>
    where
        C: AsRef<str>,
        V: AsRef<str>,
    {
        let sql = statement::insert(table, columns, values)?;
        self.execute_update(&sql).await
    }

    /// Inserts `entity` into `T::TABLE`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::insert`].
    pub async fn insert_entity<T: Entity>(&mut self, entity: &T) -> Result<u64> {
        let columns = rowmap_core::column_names::<T>();
        let values = rowmap_core::literals(entity)?;
        self.insert(T::TABLE, &columns, &values).await
    }

    /// Inserts caller-entered text for every column of `T` into `table`.
    ///
    /// # Errors
    ///
    /// Mapping errors for missing or unparsable entries, then statement
    /// errors.
    pub async fn insert_values<T: Entity, S: BuildHasher>(
        &mut self,
        table: &str,
        values: &HashMap<String, String, S>,
    ) -> Result<u64> {
        let columns = rowmap_core::column_names::<T>();
        let literals = rowmap_core::stringify::<T, S>(values)?;
        self.insert(table, &columns, &literals).await
    }

    /// Updates rows of `table` matching `criteria`, all rows when `None`.
    ///
    /// `criteria` is appended verbatim and must come from trusted code.
    ///
    /// # Errors
    ///
    /// Same as [`Session::insert`].
    pub async fn update<C, V>(
        &mut self,
        table: &str,
        columns: &[C],
        values: &[V],
        criteria: Option<&str>,
    ) -> Result<u64>
    where
        C: AsRef<str>,
        V: AsRef<str>,
    {
        let sql = statement::update(table, columns, values, criteria)?;
        self.execute_update(&sql).await
    }

    /// Deletes rows of `table` matching `criteria`, all rows when `None`.
    ///
    /// `criteria` is appended verbatim and must come from trusted code.
    ///
    /// # Errors
    ///
    /// Same as [`Session::execute_update`].
    pub async fn delete(&mut self, table: &str, criteria: Option<&str>) -> Result<u64> {
        self.execute_update(&statement::delete(table, criteria))
            .await
    }

    /// Prints every row of `table` to standard output.
    ///
    /// # Errors
    ///
    /// Statement errors, or a failed write.
    pub async fn show_table(&mut self, table: &str) -> Result<()> {
        display::show_table(self, table).await
    }

    /// Closes the open connection, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connection`] when the driver fails to close
    /// cleanly; the session is disconnected either way.
    pub async fn close(&mut self) -> Result<()> {
        let url = self.url.take().unwrap_or_default();
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        info!(url = %url, "Closing connection");
        connection
            .close()
            .await
            .map_err(|source| SessionError::Connection { url, source })
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend)
            .field("registry", &self.registry)
            .field("driver", &self.driver.as_ref().map(|d| d.name().to_string()))
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
