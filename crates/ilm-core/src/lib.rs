//! # ilm-core: Records and Rules for the Research Directory
//!
//! Pure domain crate for a multilingual directory of research institutions
//! and researchers. It holds the record definitions, the partial-update
//! patches, and the validation that runs before anything reaches storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ilm Architecture                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (HTTP handlers, admin CLI, seed)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ records / patches                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ilm-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   patch   │  │ language  │  │ validation│  │   │
//! │  │   │Institution│  │  merge    │  │ en/ru/tg  │  │  ids > 0  │  │   │
//! │  │   │ Employee  │  │  rules    │  │           │  │  parents  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ilm-db (Persistence Layer)                   │   │
//! │  │         SQLite queries, transactions, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Institution, Employee, User records and their patches
//! - [`patch`] - The `Patch` trait and the merge-on-update rule
//! - [`language`] - Supported language codes
//! - [`validation`] - Pre-storage checks and the `Localized` trait
//! - [`error`] - Validation error type
//!
//! ## Example Usage
//!
//! ```rust
//! use ilm_core::{InstitutionAchievement, InstitutionAchievementPatch, Patch};
//!
//! let mut stored = InstitutionAchievement {
//!     id: 7,
//!     institution_id: 1,
//!     language_code: "en".to_string(),
//!     achievement_title: "Best Lab".to_string(),
//!     given_by: "Ministry".to_string(),
//!     ..Default::default()
//! };
//!
//! let patch = InstitutionAchievementPatch {
//!     id: 7,
//!     achievement_title: Some("Best Lab 2024".to_string()),
//!     ..Default::default()
//! };
//! patch.validate().unwrap();
//! patch.merge_into(&mut stored);
//!
//! assert_eq!(stored.achievement_title, "Best Lab 2024");
//! assert_eq!(stored.given_by, "Ministry");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod language;
pub mod patch;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use language::LanguageCode;
pub use patch::Patch;
pub use types::*;
pub use validation::{Localized, ValidationResult};
