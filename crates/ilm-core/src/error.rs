//! # Error Types
//!
//! Input validation errors for ilm-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ilm-core errors (this file)                                            │
//! │  └── ValidationError  - Malformed input, caught before any store call   │
//! │                                                                         │
//! │  ilm-db errors (separate crate)                                         │
//! │  └── DbError          - Wraps ValidationError + every storage failure   │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::Validation → caller (bad request)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every variant names the offending field
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant is a caller fault: the request itself is malformed and no
/// retry without change will succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Identifier or foreign key must be a positive integer.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: String, value: i64 },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}, got '{value}'")]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A required child collection was empty.
    #[error("{field} must contain at least one entry")]
    EmptyCollection { field: String },

    /// A child entry references a different parent than the one being written.
    #[error("{field} {child_id} does not belong to {parent} {parent_id}")]
    ForeignParent {
        field: String,
        child_id: i64,
        parent: String,
        parent_id: i64,
    },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a MustBePositive error for the given field and value.
    pub fn must_be_positive(field: impl Into<String>, value: i64) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
            value,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
