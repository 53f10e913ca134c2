//! Error types for parklot.
//!
//! Every failure an operation can report falls into one of three kinds that
//! callers care about: the request was invalid, something it referenced does
//! not exist, or a backend failed. [`Error::kind`] performs that
//! classification so the HTTP and CLI surfaces don't have to.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for parklot operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A required input was absent or empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the missing field, as the caller spells it.
        field: &'static str,
    },

    /// An input was present but could not be used.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong.
        message: String,
    },

    // === Lookup Errors ===
    /// A referenced parking lot or car does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What kind of thing was looked up (`"parking lot"` or `"car"`).
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

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

    /// Failed to write an object to blob storage.
    #[error("failed to write blob {path}: {source}")]
    BlobWrite {
        /// Object path within the blob store.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an object from blob storage.
    #[error("failed to read blob {path}: {source}")]
    BlobRead {
        /// Object path within the blob store.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

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

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for parklot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller sent a missing or malformed input. Not retryable as-is.
    Validation,
    /// A referenced lot or car does not exist.
    NotFound,
    /// The persistence or blob backend failed. May be transient.
    Storage,
    /// Configuration could not be loaded or is invalid.
    Config,
    /// Anything else.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Storage => write!(f, "storage"),
            Self::Config => write!(f, "config"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a missing field error.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not-found error for a parking lot.
    #[must_use]
    pub fn lot_not_found(lot_id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "parking lot",
            id: lot_id.into(),
        }
    }

    /// Create a not-found error for a car.
    #[must_use]
    pub fn car_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "car",
            id: identifier.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } | Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DatabaseOpen { .. }
            | Self::DatabaseQuery(_)
            | Self::DatabaseMigration { .. }
            | Self::BlobWrite { .. }
            | Self::BlobRead { .. }
            | Self::DirectoryCreate { .. }
            | Self::Io(_) => ErrorKind::Storage,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::Json(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error was caused by bad caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this error means a lot or car could not be found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error came from a storage backend.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }
}
