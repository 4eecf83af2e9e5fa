//! Driver capability and back-end selection.
//!
//! A [`Driver`] turns a URL and credentials into a live [`Connection`]. A
//! [`Backend`] names the driver it needs and the URL prefix placed in front
//! of the caller's target. Drivers are resolved by name from a
//! [`DriverRegistry`] unless the session was handed one explicitly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use rowmap_core::Cursor;

use crate::sqlite::SqliteDriver;

/// Error type produced by driver implementations.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for driver operations.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Authentication for a connection. Empty strings mean "none".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a user name and password.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Whether neither a user nor a password was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How a cursor may be traversed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorKind {
    /// Rows are read once, front to back.
    #[default]
    ForwardOnly,
    /// Rows may be revisited; later changes are not visible.
    ScrollInsensitive,
    /// Rows may be revisited and reflect later changes.
    ScrollSensitive,
}

/// Whether a cursor can write back to its rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// Read-only cursor.
    #[default]
    ReadOnly,
    /// Cursor rows can be updated in place.
    Updatable,
}

/// Whether cursors survive a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holdability {
    /// Cursors stay open across commits.
    HoldOverCommit,
    /// Cursors close at commit.
    CloseAtCommit,
}

/// Requested cursor shape for a connection's statements.
///
/// Drivers honour what they can and downgrade the rest; the effective
/// shape is reported by [`Connection::cursor_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorOptions {
    /// Traversal kind.
    pub kind: CursorKind,
    /// Read-only or updatable.
    pub concurrency: Concurrency,
    /// Commit behaviour, driver default when `None`.
    pub holdability: Option<Holdability>,
}

impl CursorOptions {
    /// Options with the given kind and concurrency.
    #[must_use]
    pub const fn new(kind: CursorKind, concurrency: Concurrency) -> Self {
        Self {
            kind,
            concurrency,
            holdability: None,
        }
    }

    /// Sets the holdability.
    #[must_use]
    pub const fn holdability(mut self, holdability: Holdability) -> Self {
        self.holdability = Some(holdability);
        self
    }
}

/// A live connection with a single statement channel.
pub trait Connection: Send {
    /// Runs a statement that returns no rows; yields the affected row count.
    fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, DriverResult<u64>>;

    /// Runs a query and materializes its result.
    fn query<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, DriverResult<Cursor>>;

    /// The cursor shape actually in effect.
    fn cursor_options(&self) -> CursorOptions;

    /// Closes the connection gracefully.
    fn close(self: Box<Self>) -> BoxFuture<'static, DriverResult<()>>;
}

/// Produces connections for one kind of database.
pub trait Driver: Send + Sync {
    /// Registry name of this driver.
    fn name(&self) -> &str;

    /// Opens a connection to `url`.
    fn connect<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        cursor: CursorOptions,
    ) -> BoxFuture<'a, DriverResult<Box<dyn Connection>>>;
}

/// Selects a driver and URL scheme for a session.
///
/// Implement this to add a database system: name a driver registered in
/// the [`DriverRegistry`] and the prefix its URLs start with.
pub trait Backend: Send + Sync {
    /// Name of the driver to load from the registry.
    fn driver_name(&self) -> &str;

    /// Prefix placed before the caller's target, e.g. `sqlite:`.
    fn url_prefix(&self) -> &str;

    /// The full connection URL for `target`.
    fn url(&self, target: &str) -> String {
        format!("{}{target}", self.url_prefix())
    }
}

/// Drivers available for lookup by name.
#[derive(Clone)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    /// Creates a registry with no drivers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in drivers.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SqliteDriver::new());
        registry
    }

    /// Registers a driver under its own name, replacing any previous one.
    pub fn register(&mut self, driver: impl Driver + 'static) {
        self.register_arc(Arc::new(driver));
    }

    /// Registers a shared driver under its own name.
    pub fn register_arc(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.insert(driver.name().to_string(), driver);
    }

    /// Looks a driver up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(name).cloned()
    }

    /// Registered driver names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
