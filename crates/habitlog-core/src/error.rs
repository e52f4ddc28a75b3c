//! Core error types for habitlog-core.
//!
//! Every failure the library can report falls into one of a few buckets:
//! storage, configuration, input validation, not-found and account errors.
//! Callers in a presentation layer map these onto their own status codes.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitlog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed input, rejected before any state changes
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The entity does not exist, or is not owned by the caller.
    ///
    /// Both cases produce the same error so ownership never leaks.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Account errors (signup, login)
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl CoreError {
    pub(crate) fn item_not_found(id: i64) -> Self {
        CoreError::NotFound { entity: "item", id }
    }

    pub(crate) fn user_not_found(id: i64) -> Self {
        CoreError::NotFound { entity: "user", id }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A number that must be finite was NaN or infinite
    #[error("'{field}' must be a finite number")]
    NotFinite { field: String },

    /// Number outside its accepted range
    #[error("Invalid value for '{field}': {message}")]
    OutOfRange { field: String, message: String },

    /// Required text was empty
    #[error("'{0}' must not be empty")]
    Empty(String),
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Account errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username already taken")]
    UsernameTaken,

    /// Unknown username and wrong password are reported identically.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
