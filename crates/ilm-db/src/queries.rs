//! # Query Executor
//!
//! Single-purpose statements shared by every repository: insert one row,
//! select by id, select children, update one row, delete one row.
//!
//! Every function takes `&mut SqliteConnection`, so the same statement runs
//! on a pooled connection (`&mut *pool.acquire().await?`) or inside a
//! transaction scope (`&mut *conn`) without change.
//!
//! ## Generated SQL
//! ```text
//! INSERT INTO t (c1, c2, …) VALUES (?, ?, …)
//!     RETURNING id, created_at, updated_at
//! SELECT id, c1, c2, …, created_at, updated_at FROM t WHERE id = ?
//! UPDATE t SET c1 = ?, c2 = ?, …, updated_at = <now> WHERE id = ?
//!     RETURNING id, created_at, updated_at
//! DELETE FROM t WHERE id = ?
//! ```

use sqlx::SqliteConnection;

use crate::error::DbResult;
use crate::record::{Record, Stamp};

/// SQLite expression for "now" in the stored timestamp format.
pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const RETURNING_STAMP: &str = "RETURNING id, created_at, updated_at";

fn select_list<T: Record>() -> String {
    format!(
        "SELECT id, {}, created_at, updated_at FROM {}",
        T::COLUMNS.join(", "),
        T::TABLE
    )
}

/// Inserts a new row and returns its store-assigned identity.
pub async fn insert<T: Record>(conn: &mut SqliteConnection, record: &T) -> DbResult<Stamp> {
    let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) {}",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders,
        RETURNING_STAMP
    );

    let stamp = record
        .bind_columns(sqlx::query_as::<_, Stamp>(&sql))
        .fetch_one(&mut *conn)
        .await?;

    Ok(stamp)
}

/// Fetches one row by id. A missing row is `Ok(None)`.
pub async fn select_by_id<T: Record>(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<T>> {
    let sql = format!("{} WHERE id = ?", select_list::<T>());

    let record = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(record)
}

/// Fetches every row whose `column` equals `value`, ordered by id.
///
/// `column` must be one of `T::COLUMNS`; it is interpolated, not bound.
pub async fn select_where<T: Record>(
    conn: &mut SqliteConnection,
    column: &str,
    value: i64,
) -> DbResult<Vec<T>> {
    debug_assert!(T::COLUMNS.contains(&column));
    let sql = format!("{} WHERE {} = ? ORDER BY id", select_list::<T>(), column);

    let records = sqlx::query_as::<_, T>(&sql)
        .bind(value)
        .fetch_all(&mut *conn)
        .await?;

    Ok(records)
}

/// Fetches every row under `parent_column = parent_id` in one language,
/// ordered by id.
pub async fn select_by_parent_and_language<T: Record>(
    conn: &mut SqliteConnection,
    parent_column: &str,
    parent_id: i64,
    language_code: &str,
) -> DbResult<Vec<T>> {
    debug_assert!(T::COLUMNS.contains(&parent_column));
    let sql = format!(
        "{} WHERE {} = ? AND language_code = ? ORDER BY id",
        select_list::<T>(),
        parent_column
    );

    let records = sqlx::query_as::<_, T>(&sql)
        .bind(parent_id)
        .bind(language_code)
        .fetch_all(&mut *conn)
        .await?;

    Ok(records)
}

/// Fetches every row of the table, ordered by id.
pub async fn select_all<T: Record>(conn: &mut SqliteConnection) -> DbResult<Vec<T>> {
    let sql = format!("{} ORDER BY id", select_list::<T>());

    let records = sqlx::query_as::<_, T>(&sql).fetch_all(&mut *conn).await?;

    Ok(records)
}

/// Writes every column of `record` to the row with its id and bumps
/// `updated_at`. `Ok(None)` when no row has that id.
pub async fn update<T: Record>(conn: &mut SqliteConnection, record: &T) -> DbResult<Option<Stamp>> {
    let assignments = T::COLUMNS
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {}, updated_at = {} WHERE id = ? {}",
        T::TABLE,
        assignments,
        NOW,
        RETURNING_STAMP
    );

    let stamp = record
        .bind_columns(sqlx::query_as::<_, Stamp>(&sql))
        .bind(record.id())
        .fetch_optional(&mut *conn)
        .await?;

    Ok(stamp)
}

/// Whether a row with this id exists.
pub async fn exists<T: Record>(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", T::TABLE);

    let found: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(found != 0)
}

/// Deletes the row with this id. Returns the number of rows removed.
pub async fn delete<T: Record>(conn: &mut SqliteConnection, id: i64) -> DbResult<u64> {
    let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);

    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use ilm_core::{Institution, InstitutionSocial};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn institution() -> Institution {
        Institution {
            year_of_establishment: 1951,
            email: "info@ilm.tj".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let db = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let stamp = insert(&mut conn, &institution()).await.unwrap();
        assert!(stamp.id > 0);
        assert_eq!(stamp.created_at, stamp.updated_at);

        let loaded: Institution = select_by_id(&mut conn, stamp.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, "info@ilm.tj");
        assert_eq!(loaded.created_at, Some(stamp.created_at));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_none() {
        let db = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let ghost = Institution {
            id: 999,
            ..institution()
        };
        assert!(update(&mut conn, &ghost).await.unwrap().is_none());
        assert!(!exists::<Institution>(&mut conn, 999).await.unwrap());
        assert_eq!(delete::<Institution>(&mut conn, 999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_children_filtered_by_parent_and_language() {
        let db = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let parent = insert(&mut conn, &institution()).await.unwrap().id;

        for (lang, name) in [("en", "Site"), ("ru", "Сайт"), ("en", "Blog")] {
            let social = InstitutionSocial {
                institution_id: parent,
                language_code: lang.to_string(),
                link_name: name.to_string(),
                ..Default::default()
            };
            insert(&mut conn, &social).await.unwrap();
        }

        let en: Vec<InstitutionSocial> =
            select_by_parent_and_language(&mut conn, "institution_id", parent, "en")
                .await
                .unwrap();
        let names: Vec<_> = en.iter().map(|s| s.link_name.as_str()).collect();
        assert_eq!(names, ["Site", "Blog"]);

        let all: Vec<InstitutionSocial> = select_where(&mut conn, "institution_id", parent)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }
}
