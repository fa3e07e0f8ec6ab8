//! # Institution Project Repository
//!
//! Projects and their partners, written as one aggregate.
//!
//! ## Aggregate Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create(project with [P1, P2])                        │
//! │                                                                         │
//! │  validate: institution_id > 0, language, partners ≥ 1, partner langs    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── INSERT institution_projects          → project.id = 17             │
//! │  ├── INSERT institution_project_partners  (project_id = 17) → P1        │
//! │  ├── INSERT institution_project_partners  (project_id = 17) → P2        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure → ROLLBACK: no project row, no partner rows                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Updates follow the same shape: the project is merged first, then every
//! partner patch is fetched, checked to belong to the project, merged and
//! written, all before the single commit.

use ilm_core::validation::{validate_id, validate_language_code};
use ilm_core::{
    InstitutionProject, InstitutionProjectPartner, InstitutionProjectPatch, Localized, Patch,
    ValidationError,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::queries;
use crate::record::Record;
use crate::transaction::run_in_transaction;

const PARTNER_PARENT_COLUMN: &str = InstitutionProjectPartner::PARENT_FIELD;

/// Repository for institution projects and their partners.
#[derive(Debug, Clone)]
pub struct InstitutionProjectRepository {
    pool: SqlitePool,
}

impl InstitutionProjectRepository {
    /// Creates a new InstitutionProjectRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InstitutionProjectRepository { pool }
    }

    /// Inserts a project together with all of its partners.
    ///
    /// Partner `project_id` values are ignored and set to the new project id.
    pub async fn create(&self, project: InstitutionProject) -> DbResult<InstitutionProject> {
        project.validate_new()?;

        let project = run_in_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let mut project = project;
                let stamp = queries::insert(&mut *conn, &project).await?;
                project.apply_stamp(stamp);

                let project_id = project.id;
                for partner in &mut project.partners {
                    partner.project_id = project_id;
                    let stamp = queries::insert(&mut *conn, &*partner).await?;
                    partner.apply_stamp(stamp);
                    debug!(project_id, partner_id = partner.id, "Inserted project partner");
                }

                Ok(project)
            })
        })
        .await?;

        info!(
            id = project.id,
            partners = project.partners.len(),
            "Created InstitutionProject"
        );
        Ok(project)
    }

    /// Merges a project patch and its partner patches in one transaction.
    ///
    /// Returns the project with its full, current partner list.
    pub async fn update(&self, patch: InstitutionProjectPatch) -> DbResult<InstitutionProject> {
        patch.validate()?;
        let project_id = patch.id;

        let project = run_in_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let mut patch = patch;
                let partner_patches = std::mem::take(&mut patch.partners);

                let mut project = queries::select_by_id::<InstitutionProject>(&mut *conn, project_id)
                    .await?
                    .ok_or_else(|| DbError::not_found(InstitutionProject::ENTITY, project_id))?;

                patch.merge_into(&mut project);
                let stamp = queries::update(&mut *conn, &project)
                    .await?
                    .ok_or_else(|| DbError::not_found(InstitutionProject::ENTITY, project_id))?;
                project.apply_stamp(stamp);

                for partner_patch in partner_patches {
                    let partner_id = partner_patch.id;
                    let mut partner =
                        queries::select_by_id::<InstitutionProjectPartner>(&mut *conn, partner_id)
                            .await?
                            .ok_or_else(|| {
                                DbError::not_found(InstitutionProjectPartner::ENTITY, partner_id)
                            })?;

                    if partner.project_id != project_id {
                        return Err(DbError::from(ValidationError::ForeignParent {
                            field: "partner".to_string(),
                            child_id: partner_id,
                            parent: "project".to_string(),
                            parent_id: project_id,
                        }));
                    }

                    partner_patch.merge_into(&mut partner);
                    queries::update(&mut *conn, &partner).await?.ok_or_else(|| {
                        DbError::not_found(InstitutionProjectPartner::ENTITY, partner_id)
                    })?;
                    debug!(project_id, partner_id, "Updated project partner");
                }

                project.partners = load_partners(&mut *conn, project_id).await?;
                Ok(project)
            })
        })
        .await?;

        info!(id = project.id, "Updated InstitutionProject");
        Ok(project)
    }

    /// Deletes a project. Its partners are removed by the store.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        super::delete_record::<InstitutionProject>(&self.pool, id).await
    }

    /// Gets a project with its partners.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<InstitutionProject>> {
        validate_id("id", id)?;

        let mut conn = self.pool.acquire().await?;
        let Some(mut project) = queries::select_by_id::<InstitutionProject>(&mut conn, id).await?
        else {
            return Ok(None);
        };
        project.partners = load_partners(&mut conn, id).await?;

        Ok(Some(project))
    }

    /// Gets every project of an institution in one language, each with its
    /// partners, ordered by id.
    pub async fn get_by_parent_and_language(
        &self,
        institution_id: i64,
        language_code: &str,
    ) -> DbResult<Vec<InstitutionProject>> {
        validate_id(InstitutionProject::PARENT_FIELD, institution_id)?;
        let language = validate_language_code(language_code)?;

        let mut conn = self.pool.acquire().await?;
        let mut projects = queries::select_by_parent_and_language::<InstitutionProject>(
            &mut conn,
            InstitutionProject::PARENT_FIELD,
            institution_id,
            language.as_str(),
        )
        .await?;

        for project in &mut projects {
            project.partners = load_partners(&mut conn, project.id).await?;
        }

        Ok(projects)
    }
}

async fn load_partners(
    conn: &mut SqliteConnection,
    project_id: i64,
) -> DbResult<Vec<InstitutionProjectPartner>> {
    queries::select_where(conn, PARTNER_PARENT_COLUMN, project_id).await
}
