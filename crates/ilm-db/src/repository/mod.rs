//! # Repository Module
//!
//! Database repositories for the research directory.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Shared Write Path                                    │
//! │                                                                         │
//! │  create(record)                                                         │
//! │  ├── validate (parent id > 0, language ∈ {en,ru,tg}) ──✗──► BadRequest  │
//! │  └── INSERT … RETURNING id, created_at, updated_at                      │
//! │                                                                         │
//! │  update(patch)                                                          │
//! │  ├── validate (id > 0, language if present) ───────────✗──► BadRequest  │
//! │  └── run_in_transaction                                                 │
//! │      ├── SELECT by id ─────────── absent ──────────────────► NotFound   │
//! │      ├── patch.merge_into(stored)   (None keeps stored value)           │
//! │      └── UPDATE … RETURNING         (bumps updated_at)                  │
//! │                                                                         │
//! │  delete(id)                                                             │
//! │  ├── validate (id > 0) ────────────────────────────────✗──► BadRequest  │
//! │  └── run_in_transaction                                                 │
//! │      ├── EXISTS by id ─────────── absent ──────────────────► NotFound   │
//! │      └── DELETE                     (children cascade in the store)     │
//! │                                                                         │
//! │  get_by_id(id)         absent row → Ok(None), never an error            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation always runs before a connection is acquired, so a rejected
//! request issues zero store calls.
//!
//! ## Available Repositories
//!
//! - [`LocalizedRepository`] - Any simple localized child (achievements, degrees, …)
//! - [`InstitutionRepository`] / [`EmployeeRepository`] - Aggregate roots
//! - [`InstitutionProjectRepository`] - Project + partners
//! - [`EmployeeMainResearchAreaRepository`] - Research area + key topics
//! - [`UserRepository`] / [`UserSessionRepository`] - Accounts and sessions

pub mod employee;
pub mod institution;
pub mod project;
pub mod research_area;
pub mod user;

pub use employee::EmployeeRepository;
pub use institution::InstitutionRepository;
pub use project::InstitutionProjectRepository;
pub use research_area::EmployeeMainResearchAreaRepository;
pub use user::{UserRepository, UserSessionRepository};

use std::marker::PhantomData;

use ilm_core::validation::{validate_id, validate_language_code};
use ilm_core::Patch;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::queries;
use crate::record::{LocalizedRecord, Record};
use crate::transaction::run_in_transaction;

// =============================================================================
// Shared Write Path
// =============================================================================

/// Inserts an already validated record and copies its identity back.
pub(crate) async fn create_record<T: Record>(pool: &SqlitePool, mut record: T) -> DbResult<T> {
    let mut conn = pool.acquire().await?;
    let stamp = queries::insert(&mut conn, &record).await?;
    record.apply_stamp(stamp);

    info!(entity = T::ENTITY, id = record.id(), "Created");
    Ok(record)
}

/// Validates a patch, then merges it into the stored row inside one
/// transaction and returns the merged record.
pub(crate) async fn update_record<P>(pool: &SqlitePool, patch: P) -> DbResult<P::Target>
where
    P: Patch + Send + 'static,
    P::Target: Record,
{
    patch.validate()?;
    let id = patch.id();

    let updated = run_in_transaction(pool, move |conn| {
        Box::pin(async move {
            let mut stored = queries::select_by_id::<P::Target>(&mut *conn, id)
                .await?
                .ok_or_else(|| DbError::not_found(<P::Target as Record>::ENTITY, id))?;

            patch.merge_into(&mut stored);

            let stamp = queries::update(&mut *conn, &stored)
                .await?
                .ok_or_else(|| DbError::not_found(<P::Target as Record>::ENTITY, id))?;
            stored.apply_stamp(stamp);

            Ok(stored)
        })
    })
    .await?;

    info!(entity = <P::Target as Record>::ENTITY, id, "Updated");
    Ok(updated)
}

/// Existence check then delete, inside one transaction.
pub(crate) async fn delete_record<T: Record>(pool: &SqlitePool, id: i64) -> DbResult<()> {
    validate_id("id", id)?;

    run_in_transaction(pool, move |conn| {
        Box::pin(async move {
            if !queries::exists::<T>(&mut *conn, id).await? {
                return Err(DbError::not_found(T::ENTITY, id));
            }
            queries::delete::<T>(&mut *conn, id).await?;
            Ok(())
        })
    })
    .await?;

    info!(entity = T::ENTITY, id, "Deleted");
    Ok(())
}

/// Plain lookup. A missing row is `Ok(None)`.
pub(crate) async fn find_record<T: Record>(pool: &SqlitePool, id: i64) -> DbResult<Option<T>> {
    validate_id("id", id)?;

    let mut conn = pool.acquire().await?;
    queries::select_by_id(&mut conn, id).await
}

// =============================================================================
// Localized Repository
// =============================================================================

/// Repository for one family of simple localized records.
///
/// ## Usage
/// ```rust,ignore
/// let achievements = db.institution_achievements();
///
/// let created = achievements.create(achievement).await?;
/// let updated = achievements
///     .update(InstitutionAchievementPatch {
///         id: created.id,
///         description: Some("new text".to_string()),
///         ..Default::default()
///     })
///     .await?;
/// let english = achievements.get_by_parent_and_language(institution_id, "en").await?;
/// ```
#[derive(Debug)]
pub struct LocalizedRepository<T> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalizedRepository<T> {
    fn clone(&self) -> Self {
        LocalizedRepository::new(self.pool.clone())
    }
}

impl<T> LocalizedRepository<T> {
    /// Creates a new repository on the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        LocalizedRepository {
            pool,
            _record: PhantomData,
        }
    }
}

impl<T: LocalizedRecord> LocalizedRepository<T> {
    /// Inserts a new record. The returned record carries the assigned id
    /// and timestamps.
    pub async fn create(&self, record: T) -> DbResult<T> {
        record.validate_new()?;
        create_record(&self.pool, record).await
    }

    /// Merges the provided fields into the stored record.
    pub async fn update<P>(&self, patch: P) -> DbResult<T>
    where
        P: Patch<Target = T> + Send + 'static,
    {
        update_record(&self.pool, patch).await
    }

    /// Deletes a record. `NotFound` when no row has this id.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        delete_record::<T>(&self.pool, id).await
    }

    /// Gets a record by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<T>> {
        find_record(&self.pool, id).await
    }

    /// Gets every record of one parent in one language, ordered by id.
    pub async fn get_by_parent_and_language(
        &self,
        parent_id: i64,
        language_code: &str,
    ) -> DbResult<Vec<T>> {
        validate_id(T::PARENT_FIELD, parent_id)?;
        let language = validate_language_code(language_code)?;

        let mut conn = self.pool.acquire().await?;
        queries::select_by_parent_and_language(
            &mut conn,
            T::PARENT_FIELD,
            parent_id,
            language.as_str(),
        )
        .await
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use ilm_core::{Employee, Institution};

    use crate::pool::{Database, DbConfig};

    pub async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn institution(db: &Database) -> i64 {
        db.institutions()
            .create(Institution {
                year_of_establishment: 1951,
                email: "info@ilm.tj".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    pub async fn employee(db: &Database, unique_id: &str) -> i64 {
        db.employees()
            .create(Employee {
                unique_id: unique_id.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::error::{DbError, ErrorClass};
    use chrono::NaiveDate;
    use ilm_core::*;

    fn achievement(institution_id: i64) -> InstitutionAchievement {
        InstitutionAchievement {
            institution_id,
            language_code: "en".to_string(),
            achievement_title: "Best Lab".to_string(),
            date_of_achievement: NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
            given_by: "Ministry".to_string(),
            description: "old text".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let db = setup().await;
        let parent = institution(&db).await;

        let created = db
            .institution_achievements()
            .create(achievement(parent))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert!(created.created_at.is_some());
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.given_by, "Ministry");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let db = setup().await;
        let repo = db.institution_achievements();

        let err = repo.create(achievement(0)).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::BadRequest);

        let err = repo
            .create(InstitutionAchievement {
                language_code: "fr".to_string(),
                ..achievement(1)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::NotAllowed { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_with_missing_parent_is_storage_fault() {
        let db = setup().await;

        let err = db
            .institution_achievements()
            .create(achievement(4242))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_updated_at() {
        let db = setup().await;
        let parent = institution(&db).await;
        let repo = db.institution_achievements();
        let created = repo.create(achievement(parent)).await.unwrap();

        let updated = repo
            .update(InstitutionAchievementPatch {
                id: created.id,
                description: Some("new text".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.given_by, "Ministry");
        assert_eq!(updated.description, "new text");
        assert_eq!(updated.achievement_title, "Best Lab");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_can_clear_and_relocalize() {
        let db = setup().await;
        let parent = institution(&db).await;
        let repo = db.institution_licences();
        let created = repo
            .create(InstitutionLicence {
                institution_id: parent,
                language_code: "ru".to_string(),
                licence_type: "Education".to_string(),
                date_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                date_end: NaiveDate::from_ymd_opt(2025, 1, 1),
                link: "https://example.tj/licence.pdf".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = repo
            .update(InstitutionLicencePatch {
                id: created.id,
                language_code: Some("tg".to_string()),
                date_end: Some(None),
                link: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.language_code, "tg");
        assert_eq!(updated.date_end, None);
        assert_eq!(updated.link, "");
        assert_eq!(updated.licence_type, "Education");
        assert!(repo
            .get_by_parent_and_language(parent, "ru")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let db = setup().await;
        let parent = institution(&db).await;
        let repo = db.institution_achievements();
        let created = repo.create(achievement(parent)).await.unwrap();

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(repo.get_by_id(999).await.unwrap().is_none());

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());

        let err = repo.delete(created.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_by_parent_and_language_validates_inputs() {
        let db = setup().await;
        let repo = db.employee_publications();

        assert!(repo.get_by_parent_and_language(0, "en").await.is_err());
        assert!(repo.get_by_parent_and_language(1, "EN").await.is_err());
        assert!(repo
            .get_by_parent_and_language(1, "en")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_details_unique_per_language() {
        let db = setup().await;
        let parent = employee(&db, "EMP-1").await;
        let repo = db.employee_details();
        let details = EmployeeDetails {
            employee_id: parent,
            language_code: "ru".to_string(),
            surname: "Rahimov".to_string(),
            name: "Ali".to_string(),
            ..Default::default()
        };

        repo.create(details.clone()).await.unwrap();
        let err = repo.create(details).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(err.class(), ErrorClass::Internal);
    }
}
