//! Catalog error types
//!
//! Faults in the collection catalog. "Not a time-series collection" is never
//! one of these; lookups report it as `None`.

use thiserror::Error;

/// Errors that can occur in the collection catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// Malformed `<db>.<collection>` string
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Collection already registered
    #[error("Namespace already exists: {0}")]
    NamespaceExists(String),

    /// Collection not registered
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// Index name already used on the collection
    #[error("Index '{name}' already exists on {namespace}")]
    IndexExists { namespace: String, name: String },

    /// Stored collection options failed validation
    #[error("Invalid collection options for {namespace}: {error}")]
    InvalidOptions { namespace: String, error: String },
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
