//! # Validation Module
//!
//! Input validation that runs before any statement reaches storage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP handler / CLI)                                   │
//! │  └── Deserialization into records and patches                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository entry (Rust)                                       │
//! │  ├── THIS MODULE: ids > 0, parent ids > 0, language code in {en,ru,tg}  │
//! │  └── Failure → ValidationError, zero store calls issued                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / UNIQUE constraints                                      │
//! │  └── Foreign key constraints (parent must exist)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ilm_core::validation::{validate_id, validate_language_code};
//!
//! validate_id("id", 7).unwrap();
//! assert!(validate_language_code("de").is_err());
//! ```

use crate::error::ValidationError;
use crate::language::LanguageCode;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates that an identifier or foreign key is positive.
///
/// Zero means "not yet persisted" and negative values never exist in storage,
/// so both are rejected wherever an existing row is referenced.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::must_be_positive(field, id));
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates and parses a language code.
pub fn validate_language_code(code: &str) -> ValidationResult<LanguageCode> {
    code.parse()
}

/// Validates that a text field is not blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    Ok(())
}

/// Validates that a value is one of an allowed set.
pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> ValidationResult<()> {
    if !allowed.contains(&value) {
        return Err(ValidationError::NotAllowed {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that a required child collection has at least one entry.
pub fn validate_not_empty<T>(field: &str, items: &[T]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyCollection {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Localized Records
// =============================================================================

/// A record stored once per language variant under a parent aggregate.
///
/// ## Create-time invariants
/// ```text
/// parent_id > 0                      → else MustBePositive
/// language_code ∈ {en, ru, tg}       → else NotAllowed
/// ```
pub trait Localized {
    /// Field name of the parent foreign key, used in error messages.
    const PARENT_FIELD: &'static str;

    /// Foreign key to the parent aggregate.
    fn parent_id(&self) -> i64;

    /// Raw language code as submitted.
    fn language_code(&self) -> &str;

    /// Checks the structural invariants every new localized record must hold.
    fn validate_new(&self) -> ValidationResult<LanguageCode> {
        validate_id(Self::PARENT_FIELD, self.parent_id())?;
        validate_language_code(self.language_code())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
