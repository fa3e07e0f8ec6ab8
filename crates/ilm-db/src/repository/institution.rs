//! # Institution Repository
//!
//! Root rows of the institution aggregate. Localized children live in their
//! own tables and are reached through [`super::LocalizedRepository`] or
//! [`super::InstitutionProjectRepository`].
//!
//! Deleting an institution removes every child row with it: each child
//! table references `institutions(id)` with `ON DELETE CASCADE`.

use ilm_core::{Institution, InstitutionPatch};
use sqlx::SqlitePool;

use super::{create_record, delete_record, find_record, update_record};
use crate::error::DbResult;
use crate::queries;

/// Repository for institutions.
#[derive(Debug, Clone)]
pub struct InstitutionRepository {
    pool: SqlitePool,
}

impl InstitutionRepository {
    /// Creates a new InstitutionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InstitutionRepository { pool }
    }

    /// Inserts a new institution.
    pub async fn create(&self, institution: Institution) -> DbResult<Institution> {
        institution.validate_new()?;
        create_record(&self.pool, institution).await
    }

    /// Merges the provided fields into the stored institution.
    pub async fn update(&self, patch: InstitutionPatch) -> DbResult<Institution> {
        update_record(&self.pool, patch).await
    }

    /// Deletes an institution and, through the store, all of its children.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        delete_record::<Institution>(&self.pool, id).await
    }

    /// Gets an institution by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Institution>> {
        find_record(&self.pool, id).await
    }

    /// Lists every institution, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Institution>> {
        let mut conn = self.pool.acquire().await?;
        queries::select_all(&mut conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use chrono::NaiveDate;
    use ilm_core::*;

    #[tokio::test]
    async fn test_create_validates_year() {
        let db = setup().await;

        let err = db
            .institutions()
            .create(Institution::default())
            .await
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[tokio::test]
    async fn test_update_and_list() {
        let db = setup().await;
        let first = institution(&db).await;
        let second = institution(&db).await;

        let updated = db
            .institutions()
            .update(InstitutionPatch {
                id: second,
                phone_number: Some("+992 37 221 00 00".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.email, "info@ilm.tj");
        assert_eq!(updated.year_of_establishment, 1951);

        let ids: Vec<i64> = db
            .institutions()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let db = setup().await;
        let parent = institution(&db).await;

        let social = db
            .institution_socials()
            .create(InstitutionSocial {
                institution_id: parent,
                language_code: "en".to_string(),
                link_name: "Website".to_string(),
                link: "https://ilm.tj".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let project = db
            .institution_projects()
            .create(InstitutionProject {
                institution_id: parent,
                language_code: "en".to_string(),
                project_title: "Glaciers".to_string(),
                date_start: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
                partners: vec![InstitutionProjectPartner {
                    language_code: "en".to_string(),
                    partner_name: "ETH".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        db.institutions().delete(parent).await.unwrap();

        assert!(db.institutions().get_by_id(parent).await.unwrap().is_none());
        assert!(db
            .institution_socials()
            .get_by_id(social.id)
            .await
            .unwrap()
            .is_none());
        assert!(db
            .institution_projects()
            .get_by_id(project.id)
            .await
            .unwrap()
            .is_none());

        let partners: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM institution_project_partners")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(partners, 0);
    }
}
