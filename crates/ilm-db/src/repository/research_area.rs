//! # Employee Main Research Area Repository
//!
//! Research areas and their key topics, written as one aggregate. Same
//! contract as [`super::InstitutionProjectRepository`]: at least one key
//! topic on create, topics inserted with the new area id in the same
//! transaction, topic patches checked to belong to the area on update.
//!
//! Key topics have no language of their own; they share the area's.

use ilm_core::validation::{validate_id, validate_language_code};
use ilm_core::{
    EmployeeMainResearchArea, EmployeeMainResearchAreaPatch, Localized, Patch,
    ResearchAreaKeyTopic, ValidationError,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::queries;
use crate::record::Record;
use crate::transaction::run_in_transaction;

const TOPIC_PARENT_COLUMN: &str = "main_research_area_id";

/// Repository for employee research areas and their key topics.
#[derive(Debug, Clone)]
pub struct EmployeeMainResearchAreaRepository {
    pool: SqlitePool,
}

impl EmployeeMainResearchAreaRepository {
    /// Creates a new EmployeeMainResearchAreaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeMainResearchAreaRepository { pool }
    }

    /// Inserts a research area together with all of its key topics.
    pub async fn create(
        &self,
        area: EmployeeMainResearchArea,
    ) -> DbResult<EmployeeMainResearchArea> {
        area.validate_new()?;

        let area = run_in_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let mut area = area;
                let stamp = queries::insert(&mut *conn, &area).await?;
                area.apply_stamp(stamp);

                let area_id = area.id;
                for topic in &mut area.key_topics {
                    topic.main_research_area_id = area_id;
                    let stamp = queries::insert(&mut *conn, &*topic).await?;
                    topic.apply_stamp(stamp);
                }

                Ok(area)
            })
        })
        .await?;

        info!(
            id = area.id,
            key_topics = area.key_topics.len(),
            "Created EmployeeMainResearchArea"
        );
        Ok(area)
    }

    /// Merges an area patch and its key topic patches in one transaction.
    pub async fn update(
        &self,
        patch: EmployeeMainResearchAreaPatch,
    ) -> DbResult<EmployeeMainResearchArea> {
        patch.validate()?;
        let area_id = patch.id;

        let area = run_in_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let mut patch = patch;
                let topic_patches = std::mem::take(&mut patch.key_topics);

                let mut area = queries::select_by_id::<EmployeeMainResearchArea>(&mut *conn, area_id)
                    .await?
                    .ok_or_else(|| DbError::not_found(EmployeeMainResearchArea::ENTITY, area_id))?;

                patch.merge_into(&mut area);
                let stamp = queries::update(&mut *conn, &area)
                    .await?
                    .ok_or_else(|| DbError::not_found(EmployeeMainResearchArea::ENTITY, area_id))?;
                area.apply_stamp(stamp);

                for topic_patch in topic_patches {
                    let topic_id = topic_patch.id;
                    let mut topic = queries::select_by_id::<ResearchAreaKeyTopic>(&mut *conn, topic_id)
                        .await?
                        .ok_or_else(|| DbError::not_found(ResearchAreaKeyTopic::ENTITY, topic_id))?;

                    if topic.main_research_area_id != area_id {
                        return Err(DbError::from(ValidationError::ForeignParent {
                            field: "key topic".to_string(),
                            child_id: topic_id,
                            parent: "research area".to_string(),
                            parent_id: area_id,
                        }));
                    }

                    topic_patch.merge_into(&mut topic);
                    queries::update(&mut *conn, &topic)
                        .await?
                        .ok_or_else(|| DbError::not_found(ResearchAreaKeyTopic::ENTITY, topic_id))?;
                    debug!(area_id, topic_id, "Updated key topic");
                }

                area.key_topics = load_key_topics(&mut *conn, area_id).await?;
                Ok(area)
            })
        })
        .await?;

        info!(id = area.id, "Updated EmployeeMainResearchArea");
        Ok(area)
    }

    /// Deletes a research area. Its key topics are removed by the store.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        super::delete_record::<EmployeeMainResearchArea>(&self.pool, id).await
    }

    /// Gets a research area with its key topics.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<EmployeeMainResearchArea>> {
        validate_id("id", id)?;

        let mut conn = self.pool.acquire().await?;
        let Some(mut area) =
            queries::select_by_id::<EmployeeMainResearchArea>(&mut conn, id).await?
        else {
            return Ok(None);
        };
        area.key_topics = load_key_topics(&mut conn, id).await?;

        Ok(Some(area))
    }

    /// Gets every research area of an employee in one language, each with
    /// its key topics, ordered by id.
    pub async fn get_by_parent_and_language(
        &self,
        employee_id: i64,
        language_code: &str,
    ) -> DbResult<Vec<EmployeeMainResearchArea>> {
        validate_id(EmployeeMainResearchArea::PARENT_FIELD, employee_id)?;
        let language = validate_language_code(language_code)?;

        let mut conn = self.pool.acquire().await?;
        let mut areas = queries::select_by_parent_and_language::<EmployeeMainResearchArea>(
            &mut conn,
            EmployeeMainResearchArea::PARENT_FIELD,
            employee_id,
            language.as_str(),
        )
        .await?;

        for area in &mut areas {
            area.key_topics = load_key_topics(&mut conn, area.id).await?;
        }

        Ok(areas)
    }
}

async fn load_key_topics(
    conn: &mut SqliteConnection,
    area_id: i64,
) -> DbResult<Vec<ResearchAreaKeyTopic>> {
    queries::select_where(conn, TOPIC_PARENT_COLUMN, area_id).await
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::error::DbError;
    use ilm_core::*;

    fn topic(title: &str) -> ResearchAreaKeyTopic {
        ResearchAreaKeyTopic {
            key_topic_title: title.to_string(),
            ..Default::default()
        }
    }

    fn area(employee_id: i64, key_topics: Vec<ResearchAreaKeyTopic>) -> EmployeeMainResearchArea {
        EmployeeMainResearchArea {
            employee_id,
            language_code: "tg".to_string(),
            area: "Physics".to_string(),
            discipline: "Solid state".to_string(),
            key_topics,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_key_topics() {
        let db = setup().await;
        let parent = employee(&db, "EMP-1").await;

        let err = db
            .employee_main_research_areas()
            .create(area(parent, vec![]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::EmptyCollection { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_and_load_with_topics() {
        let db = setup().await;
        let parent = employee(&db, "EMP-1").await;
        let repo = db.employee_main_research_areas();

        let created = repo
            .create(area(parent, vec![topic("Semiconductors"), topic("Thin films")]))
            .await
            .unwrap();

        assert!(created
            .key_topics
            .iter()
            .all(|t| t.id > 0 && t.main_research_area_id == created.id));

        let loaded = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);

        let listed = repo.get_by_parent_and_language(parent, "tg").await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_update_topic_of_other_area_rolls_back() {
        let db = setup().await;
        let parent = employee(&db, "EMP-1").await;
        let repo = db.employee_main_research_areas();
        let first = repo.create(area(parent, vec![topic("Optics")])).await.unwrap();
        let second = repo.create(area(parent, vec![topic("Acoustics")])).await.unwrap();

        let err = repo
            .update(EmployeeMainResearchAreaPatch {
                id: first.id,
                area: Some("Applied physics".to_string()),
                key_topics: vec![ResearchAreaKeyTopicPatch {
                    id: second.key_topics[0].id,
                    key_topic_title: Some("Lasers".to_string()),
                }],
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(err.is_bad_request());
        let first = repo.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(first.area, "Physics");
    }

    #[tokio::test]
    async fn test_update_topic_title() {
        let db = setup().await;
        let parent = employee(&db, "EMP-1").await;
        let repo = db.employee_main_research_areas();
        let created = repo.create(area(parent, vec![topic("Optics")])).await.unwrap();

        let updated = repo
            .update(EmployeeMainResearchAreaPatch {
                id: created.id,
                key_topics: vec![ResearchAreaKeyTopicPatch {
                    id: created.key_topics[0].id,
                    key_topic_title: Some("Quantum optics".to_string()),
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.area, "Physics");
        assert_eq!(updated.key_topics[0].key_topic_title, "Quantum optics");
    }
}
