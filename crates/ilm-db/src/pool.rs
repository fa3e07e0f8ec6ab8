//! # Database Pool Management
//!
//! Connection pool creation, configuration and repository access.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Bootstrap (HTTP server, CLI, seed)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() / DbConfig::new(path) ← Configure pool settings   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │            SqlitePool                   │                            │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐        │                            │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...    │  (max_connections)         │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘        │                            │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       │ pool cloned into every repository (constructor injection)       │
//! │       ▼                                                                 │
//! │  db.institution_achievements().create(..)  ──► uses Conn1               │
//! │  db.institution_projects().update(..)      ──► uses Conn2 (one tx)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so readers don't block
//! the writer and the writer doesn't block readers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use ilm_core::*;

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::record::LocalizedRecord;
use crate::repository::{
    EmployeeMainResearchAreaRepository, EmployeeRepository, InstitutionProjectRepository,
    InstitutionRepository, LocalizedRepository, UserRepository, UserSessionRepository,
};
use crate::transaction::{self, TxFuture};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/ilm/ilm.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long a repository call waits for a pooled connection before
    /// failing with `DbError::PoolExhausted`.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Idle connections are closed after this; `None` keeps them open.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Apply pending schema migrations in `Database::new`.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Default settings for a database file at `path` (created on first
    /// connect).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(10 * 60)),
            run_migrations: true,
        }
    }

    /// Loads configuration from environment variables with fallback to
    /// defaults.
    ///
    /// | Variable                      | Default   |
    /// |-------------------------------|-----------|
    /// | `ILM_DB_PATH`                 | `ilm.db`  |
    /// | `ILM_DB_MAX_CONNECTIONS`      | `5`       |
    /// | `ILM_DB_MIN_CONNECTIONS`      | `1`       |
    /// | `ILM_DB_CONNECT_TIMEOUT_SECS` | `30`      |
    /// | `ILM_DB_RUN_MIGRATIONS`       | `true`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = DbConfig::new(
            env::var("ILM_DB_PATH").unwrap_or_else(|_| "ilm.db".to_string()),
        );

        let max_connections: u32 = parse_var("ILM_DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections: u32 = parse_var("ILM_DB_MIN_CONNECTIONS", defaults.min_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("ILM_DB_MAX_CONNECTIONS".to_string()));
        }
        if min_connections > max_connections {
            return Err(ConfigError::InvalidValue("ILM_DB_MIN_CONNECTIONS".to_string()));
        }

        Ok(DbConfig {
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(parse_var(
                "ILM_DB_CONNECT_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
            run_migrations: parse_var("ILM_DB_RUN_MIGRATIONS", defaults.run_migrations)?,
            ..defaults
        })
    }

    pub fn max_connections(self, max_connections: u32) -> Self {
        DbConfig {
            max_connections,
            ..self
        }
    }

    pub fn min_connections(self, min_connections: u32) -> Self {
        DbConfig {
            min_connections,
            ..self
        }
    }

    pub fn acquire_timeout(self, acquire_timeout: Duration) -> Self {
        DbConfig {
            acquire_timeout,
            ..self
        }
    }

    pub fn idle_timeout(self, idle_timeout: Option<Duration>) -> Self {
        DbConfig {
            idle_timeout,
            ..self
        }
    }

    pub fn run_migrations(self, run_migrations: bool) -> Self {
        DbConfig {
            run_migrations,
            ..self
        }
    }

    /// Private in-memory database with the schema applied (for tests).
    ///
    /// Each `:memory:` connection opens its own empty database, so the pool
    /// holds exactly one connection and never lets it idle out.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            ..DbConfig::new(":memory:")
        }
    }
}

/// Reads and parses an environment variable, falling back to `default` when
/// it is unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle: owns the pool and hands out repositories.
///
/// Cloning is cheap (the pool is reference-counted). Every repository gets
/// its own clone of the pool; nothing reads a process-wide handle.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous, foreign keys ON
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(DbError::ConnectionFailed)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Cascading deletes and parent checks depend on this;
            // SQLite has foreign keys disabled by default.
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(connect_options)
            .await
            .map_err(DbError::ConnectionFailed)?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Wraps an already configured pool (the bootstrap layer owns it).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Database { pool }
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Reports applied vs embedded migrations.
    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `work` inside one transaction on this database's pool.
    ///
    /// See [`transaction::run_in_transaction`].
    pub async fn run_in_transaction<T, F>(&self, work: F) -> DbResult<T>
    where
        F: for<'c> FnOnce(&'c mut sqlx::SqliteConnection) -> TxFuture<'c, T>,
    {
        transaction::run_in_transaction(&self.pool, work).await
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations fail with
    /// `DbError::ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    /// Returns the repository for any simple localized record family.
    ///
    /// ```rust,ignore
    /// let rankings = db.localized::<InstitutionRanking>();
    /// ```
    pub fn localized<T: LocalizedRecord>(&self) -> LocalizedRepository<T> {
        LocalizedRepository::new(self.pool.clone())
    }

    /// Returns the institution repository.
    pub fn institutions(&self) -> InstitutionRepository {
        InstitutionRepository::new(self.pool.clone())
    }

    /// Returns the institution project (+ partners) repository.
    pub fn institution_projects(&self) -> InstitutionProjectRepository {
        InstitutionProjectRepository::new(self.pool.clone())
    }

    /// Returns the employee repository.
    pub fn employees(&self) -> EmployeeRepository {
        EmployeeRepository::new(self.pool.clone())
    }

    /// Returns the research area (+ key topics) repository.
    pub fn employee_main_research_areas(&self) -> EmployeeMainResearchAreaRepository {
        EmployeeMainResearchAreaRepository::new(self.pool.clone())
    }

    /// Returns the user repository.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Returns the session repository.
    pub fn user_sessions(&self) -> UserSessionRepository {
        UserSessionRepository::new(self.pool.clone())
    }
}

macro_rules! localized_accessors {
    ($($name:ident => $record:ty),+ $(,)?) => {
        impl Database {
            $(
                #[doc = concat!("Returns the `", stringify!($record), "` repository.")]
                pub fn $name(&self) -> LocalizedRepository<$record> {
                    self.localized()
                }
            )+
        }
    };
}

localized_accessors!(
    institution_details => InstitutionDetails,
    institution_accreditations => InstitutionAccreditation,
    institution_achievements => InstitutionAchievement,
    institution_conferences => InstitutionConference,
    institution_licences => InstitutionLicence,
    institution_magazines => InstitutionMagazine,
    institution_main_research_directions => InstitutionMainResearchDirection,
    institution_partnerships => InstitutionPartnership,
    institution_patents => InstitutionPatent,
    institution_rankings => InstitutionRanking,
    institution_research_support_infrastructures => InstitutionResearchSupportInfrastructure,
    institution_socials => InstitutionSocial,
    employee_degrees => EmployeeDegree,
    employee_details => EmployeeDetails,
    employee_participation_in_events => EmployeeParticipationInEvent,
    employee_participation_in_professional_communities => EmployeeParticipationInProfessionalCommunity,
    employee_patents => EmployeePatent,
    employee_publications => EmployeePublication,
    employee_refresher_courses => EmployeeRefresherCourse,
    employee_research_activities => EmployeeResearchActivity,
    employee_scientific_awards => EmployeeScientificAward,
    employee_socials => EmployeeSocial,
    employee_work_experiences => EmployeeWorkExperience,
);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert!(db.migration_status().await.unwrap().is_up_to_date());
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
        let err = db.institutions().list().await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_parse_var_fallback_and_error() {
        assert_eq!(parse_var("ILM_TEST_UNSET_VARIABLE", 7u32).unwrap(), 7);

        env::set_var("ILM_TEST_BAD_NUMBER", "many");
        let err = parse_var::<u32>("ILM_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("ILM_TEST_BAD_NUMBER"));

        env::set_var("ILM_TEST_FLAG", " false ");
        assert!(!parse_var("ILM_TEST_FLAG", true).unwrap());
    }
}
