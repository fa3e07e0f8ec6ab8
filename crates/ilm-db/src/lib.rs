//! # ilm-db: Database Layer for the Research Directory
//!
//! Persistence for institutions, employees and their localized profile
//! records. SQLite storage through sqlx, with every multi-statement write
//! wrapped in one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ilm Data Flow                                    │
//! │                                                                         │
//! │  HTTP handler / CLI command (caller)                                    │
//! │       │  record or patch (ilm-core)                                     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     ilm-db (THIS CRATE)                         │    │
//! │  │                                                                 │    │
//! │  │  ┌──────────────┐   ┌───────────────────┐   ┌──────────────┐    │    │
//! │  │  │   Database   │   │   Repositories    │   │  Migrations  │    │    │
//! │  │  │  (pool.rs)   │   │  (repository/)    │   │  (embedded)  │    │    │
//! │  │  │              │   │                   │   │              │    │    │
//! │  │  │ SqlitePool ──┼──►│ LocalizedRepo<T>  │   │ 001_inst…    │    │    │
//! │  │  │ DbConfig     │   │ ProjectRepo       │   │ 002_empl…    │    │    │
//! │  │  │              │   │ ResearchAreaRepo  │   │ 003_users    │    │    │
//! │  │  └──────────────┘   └─────────┬─────────┘   └──────────────┘    │    │
//! │  │                               │                                 │    │
//! │  │              ┌────────────────┴────────────────┐                │    │
//! │  │              ▼                                 ▼                │    │
//! │  │   transaction.rs (scope)             queries.rs (statements)    │    │
//! │  │                                      record.rs  (table mapping) │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL, foreign keys ON)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration and repository accessors
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and their client/server class
//! - [`transaction`] - All-or-nothing unit of work
//! - [`queries`] - Generic single-row statements
//! - [`record`] - Record to table mapping
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ilm_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let project = db.institution_projects().create(project).await?;
//! let english = db
//!     .institution_achievements()
//!     .get_by_parent_and_language(institution_id, "en")
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod record;
pub mod repository;
pub mod transaction;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ErrorClass};
pub use migrations::MigrationStatus;
pub use pool::{ConfigError, Database, DbConfig};
pub use record::{LocalizedRecord, Record, Stamp};
pub use transaction::{run_in_transaction, TxFuture};

// Repository re-exports for convenience
pub use repository::{
    EmployeeMainResearchAreaRepository, EmployeeRepository, InstitutionProjectRepository,
    InstitutionRepository, LocalizedRepository, UserRepository, UserSessionRepository,
};
