//! Error types for sessions.

use crate::driver::DriverError;

/// Errors raised while connecting or running statements.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No driver is registered under the back end's driver name.
    #[error("No driver registered under '{0}'")]
    DriverNotFound(String),

    /// The driver could not open a connection.
    #[error("Failed to connect to '{url}': {source}")]
    Connection {
        /// URL the driver was given.
        url: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },

    /// A statement was issued on a session with no open connection.
    #[error("Session is not connected")]
    NotConnected,

    /// The database rejected a statement.
    #[error("Statement failed: {source} (sql: {sql})")]
    Statement {
        /// Statement text as sent.
        sql: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },

    /// Building SQL or mapping rows failed.
    #[error(transparent)]
    Mapping(#[from] rowmap_core::Error),

    /// Writing a table listing failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
