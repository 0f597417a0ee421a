//! Time-series error types
//!
//! Errors raised while validating time-series options or converting
//! index specifications to the bucket schema.

use thiserror::Error;

/// Error codes surfaced to index-management callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The index key pattern cannot be represented on the bucket collection
    InvalidIndexSpecification,
    /// The time-series options document is malformed
    InvalidOptions,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidIndexSpecification => write!(f, "InvalidIndexSpecification"),
            ErrorCode::InvalidOptions => write!(f, "InvalidOptions"),
        }
    }
}

/// Errors from converting a time-series index spec to the bucket schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexSpecError {
    /// The key pattern has no fields
    #[error("Invalid index spec for time-series collection: index key pattern must reference at least one field")]
    Empty,

    /// The same field path appears twice
    #[error("Invalid index spec for time-series collection: duplicate key '{field}'")]
    DuplicateKey { field: String },

    /// The field is neither the time field nor rooted at the metadata field
    #[error("Invalid index spec for time-series collection: '{field}'. Indexes are only supported on the '{time_field}' and '{}' fields", .meta_field.as_deref().unwrap_or("<none>"))]
    UnsupportedField {
        field: String,
        time_field: String,
        meta_field: Option<String>,
    },

    /// The time field was given a special index type or a malformed value
    #[error("Invalid index spec for time-series collection: '{field}'. Indexes on the time field must be ascending or descending (numbers only): {value}")]
    TimeFieldNotDirectional { field: String, value: String },

    /// Special index types on the metadata field are disabled by policy
    #[error("Invalid index spec for time-series collection: '{field}'. Special index type '{value}' is not allowed on the metadata field")]
    SpecialIndexOnMetaField { field: String, value: String },

    /// The directive is neither a direction nor a known index type
    #[error("Invalid index spec for time-series collection: '{field}'. Unrecognized index directive: {value}")]
    InvalidDirective { field: String, value: String },
}

impl IndexSpecError {
    /// Error code reported to the caller
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidIndexSpecification
    }

    /// The offending field path, if the error concerns a single field
    pub fn field(&self) -> Option<&str> {
        match self {
            IndexSpecError::Empty => None,
            IndexSpecError::DuplicateKey { field }
            | IndexSpecError::UnsupportedField { field, .. }
            | IndexSpecError::TimeFieldNotDirectional { field, .. }
            | IndexSpecError::SpecialIndexOnMetaField { field, .. }
            | IndexSpecError::InvalidDirective { field, .. } => Some(field),
        }
    }
}

/// Errors from validating time-series options
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Invalid time-series options: 'timeField' must not be empty")]
    EmptyTimeField,

    #[error("Invalid time-series options: 'metaField' must not be empty")]
    EmptyMetaField,

    #[error("Invalid time-series options: 'timeField' and 'metaField' must differ, both are '{0}'")]
    SameField(String),

    #[error("Invalid time-series options: '{0}' must be a top-level field name")]
    NotTopLevel(String),
}

impl OptionsError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidOptions
    }
}

/// Result type alias for forward index conversion
pub type IndexSpecResult<T> = Result<T, IndexSpecError>;
