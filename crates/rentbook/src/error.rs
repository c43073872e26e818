//! Error types for rentbook.
//!
//! This module defines all error types used throughout the rentbook crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rentbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The value stored under a collection key could not be decoded.
    #[error("collection '{key}' holds malformed data: {source}")]
    CorruptCollection {
        /// Storage key of the collection.
        key: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The storage medium rejected a write.
    #[error("storage medium rejected write to '{key}': {message}")]
    MediumWrite {
        /// Storage key being written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Record Errors ===
    /// A record failed its entry checks and was not written.
    #[error("invalid {entity}: {message}")]
    Validation {
        /// Kind of record being checked.
        entity: &'static str,
        /// Which check failed.
        message: String,
    },

    /// No record with the given identifier exists in the collection.
    #[error("no {entity} with id '{id}'")]
    RecordNotFound {
        /// Kind of record looked up.
        entity: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// A value given on the command line could not be parsed.
    #[error("invalid value for {field}: {message}")]
    InvalidInput {
        /// Name of the field.
        field: &'static str,
        /// Description of the parse failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for rentbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a validation error for the given record kind.
    #[must_use]
    pub fn validation(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            message: message.into(),
        }
    }

    /// Create a not-found error for the given record kind.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create an input parse error.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Create a medium write error.
    #[must_use]
    pub fn medium_write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MediumWrite {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if this error means stored data could not be decoded.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptCollection { .. })
    }

    /// Check if this error is a failed entry check.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
