//! # Employee Repository
//!
//! Root rows of the employee aggregate. An employee is also addressable by
//! its external `unique_id`.

use ilm_core::validation::validate_required;
use ilm_core::{Employee, EmployeePatch};
use sqlx::SqlitePool;

use super::{create_record, delete_record, find_record, update_record};
use crate::error::DbResult;
use crate::queries;

/// Repository for employees.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Inserts a new employee. `unique_id` must be non-blank and unused.
    pub async fn create(&self, employee: Employee) -> DbResult<Employee> {
        employee.validate_new()?;
        create_record(&self.pool, employee).await
    }

    /// Merges the provided fields into the stored employee.
    pub async fn update(&self, patch: EmployeePatch) -> DbResult<Employee> {
        update_record(&self.pool, patch).await
    }

    /// Deletes an employee and, through the store, all of its children.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        delete_record::<Employee>(&self.pool, id).await
    }

    /// Gets an employee by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Employee>> {
        find_record(&self.pool, id).await
    }

    /// Gets an employee by external id.
    pub async fn get_by_unique_id(&self, unique_id: &str) -> DbResult<Option<Employee>> {
        validate_required("unique_id", unique_id)?;

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, unique_id, created_at, updated_at
            FROM employees
            WHERE unique_id = ?1
            "#,
        )
        .bind(unique_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Lists every employee, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let mut conn = self.pool.acquire().await?;
        queries::select_all(&mut conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::error::DbError;
    use ilm_core::*;

    #[tokio::test]
    async fn test_unique_id_lookup() {
        let db = setup().await;
        let id = employee(&db, "EMP-0042").await;

        let found = db
            .employees()
            .get_by_unique_id("EMP-0042")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);

        assert!(db
            .employees()
            .get_by_unique_id("EMP-9999")
            .await
            .unwrap()
            .is_none());
        assert!(db.employees().get_by_unique_id("").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_unique_id() {
        let db = setup().await;
        employee(&db, "EMP-1").await;

        let err = db
            .employees()
            .create(Employee {
                unique_id: "EMP-1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "employees.unique_id"));
    }

    #[tokio::test]
    async fn test_rename_unique_id() {
        let db = setup().await;
        let id = employee(&db, "EMP-1").await;

        let renamed = db
            .employees()
            .update(EmployeePatch {
                id,
                unique_id: Some("EMP-2".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(renamed.unique_id, "EMP-2");
        assert_eq!(db.employees().list().await.unwrap().len(), 1);
    }
}
