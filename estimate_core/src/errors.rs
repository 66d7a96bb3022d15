//! # Error Types
//!
//! Structured error types for estimate_core. Each variant carries enough
//! context for a caller (UI, export, CLI) to tell a user-input problem apart
//! from a caller bug or a broken catalog.
//!
//! A select value missing from a calculator's lookup table is *not* an error:
//! calculators return [`crate::calculators::Outcome::NotFound`] for that case.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::errors::{CalcError, CalcResult};
//!
//! fn check_area(area_m2: f64) -> CalcResult<()> {
//!     if area_m2 <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "area",
//!             area_m2.to_string(),
//!             "Area must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimate_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for estimation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A value reached the engine that it refuses to compute with
    /// (e.g. a base quantity of zero)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// One or more field-level validation rules failed
    #[error("Validation failed: {}", errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    /// Material key not present in the catalog
    #[error("Unknown material: {material_key}")]
    UnknownMaterial { material_key: String },

    /// Complexity key not present in the complexity table
    #[error("Unknown complexity level: {complexity_key}")]
    UnknownComplexity { complexity_key: String },

    /// Catalog configuration could not be parsed or is inconsistent
    #[error("Catalog error: {reason}")]
    CatalogError { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ValidationFailed error from collected messages
    pub fn validation(errors: Vec<String>) -> Self {
        CalcError::ValidationFailed { errors }
    }

    /// Create an UnknownMaterial error
    pub fn unknown_material(material_key: impl Into<String>) -> Self {
        CalcError::UnknownMaterial {
            material_key: material_key.into(),
        }
    }

    /// Create an UnknownComplexity error
    pub fn unknown_complexity(complexity_key: impl Into<String>) -> Self {
        CalcError::UnknownComplexity {
            complexity_key: complexity_key.into(),
        }
    }

    /// Create a CatalogError
    pub fn catalog(reason: impl Into<String>) -> Self {
        CalcError::CatalogError {
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry or fix the input)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. } | CalcError::ValidationFailed { .. })
    }

    /// Messages suitable for showing next to the offending fields
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            CalcError::ValidationFailed { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::ValidationFailed { .. } => "VALIDATION_FAILED",
            CalcError::UnknownMaterial { .. } => "UNKNOWN_MATERIAL",
            CalcError::UnknownComplexity { .. } => "UNKNOWN_COMPLEXITY",
            CalcError::CatalogError { .. } => "CATALOG_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
