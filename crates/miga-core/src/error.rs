//! # Error Types
//!
//! Domain-specific error types for miga-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                │
//! │                                                                    │
//! │  miga-core errors (this file)                                      │
//! │  └── ValidationError  - Input validation failures                  │
//! │                                                                    │
//! │  miga-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                │
//! │                                                                    │
//! │  API errors (in app)                                               │
//! │  └── ApiError         - What the frontend sees (serialized)        │
//! │                                                                    │
//! │  Flow: ValidationError → DbError → ApiError → Frontend             │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field so callers can surface
/// field-level detail.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A collection that must not be empty is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// A collection exceeds its maximum size.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
