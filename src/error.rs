//! Error types for the source registry and query pipeline.
//!
//! All fallible operations in this crate return [`DbResult`]. The taxonomy is
//! deliberately small: tunnel setup failures, SQL execution failures,
//! structurally invalid configuration, and lookups of unknown source keys.
//! Nothing is retried and nothing is swallowed; retry policy belongs to the
//! caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Transport tunnel establishment failed during registration.
    /// Nothing is registered for the key when this is returned.
    #[error("Tunnel setup failed: {message}")]
    Tunnel { message: String },

    /// Failure during prepare/bind/execute/result extraction, propagated
    /// untouched from the driver.
    #[error("SQL execution failed: {message}")]
    Execution {
        message: String,
        /// e.g. "23000" for an integrity constraint violation
        sql_state: Option<String>,
    },

    /// Structurally invalid input, rejected at construction time.
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// No source is registered under the requested key.
    #[error("No source registered for key '{key}'")]
    SourceNotFound { key: String },
}

impl DbError {
    /// Create a tunnel setup error.
    pub fn tunnel(message: impl Into<String>) -> Self {
        Self::Tunnel {
            message: message.into(),
        }
    }

    /// Create an execution error without a SQLSTATE code.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state: None,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a source-not-found error.
    pub fn source_not_found(key: impl Into<String>) -> Self {
        Self::SourceNotFound { key: key.into() }
    }

    /// Get the SQLSTATE code for this error, if the driver reported one.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors into execution errors, keeping the SQLSTATE when the
/// server reported one.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => Self::Execution {
                message: db_err.message().to_string(),
                sql_state: db_err.code().map(|c| c.to_string()),
            },
            other => Self::execution(other.to_string()),
        }
    }
}

/// Result type alias for registry and query operations.
pub type DbResult<T> = Result<T, DbError>;
