use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

use super::parse_uuid;
use crate::domain::models::Enrolment;
use crate::domain::time_utils::{from_millis, to_millis};
use crate::storage::connection::DbConnection;

/// Repository for enrolments.
///
/// The admission checks run against a connection borrowed from an open
/// write transaction, so the counts they see cannot change underneath them.
#[derive(Clone)]
pub struct EnrolmentRepository {
    db: DbConnection,
}

impl EnrolmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Whether the child holds an enrolment in any occurrence of `event_id`
    pub async fn child_has_event_enrolment(
        &self,
        conn: &mut SqliteConnection,
        child_id: Uuid,
        event_id: Uuid,
    ) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT 1
            FROM enrolments en
            JOIN occurrences o ON o.id = en.occurrence_id
            WHERE en.child_id = ? AND o.event_id = ?
            LIMIT 1
            "#,
        )
        .bind(child_id.to_string())
        .bind(event_id.to_string())
        .fetch_optional(conn)
        .await?;
        Ok(found.is_some())
    }

    pub async fn count_for_occurrence(
        &self,
        conn: &mut SqliteConnection,
        occurrence_id: Uuid,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrolments WHERE occurrence_id = ?")
            .bind(occurrence_id.to_string())
            .fetch_one(conn)
            .await?;
        Ok(count)
    }

    pub async fn insert_enrolment(
        &self,
        conn: &mut SqliteConnection,
        enrolment: &Enrolment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO enrolments (id, child_id, occurrence_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(enrolment.id.to_string())
        .bind(enrolment.child_id.to_string())
        .bind(enrolment.occurrence_id.to_string())
        .bind(to_millis(enrolment.created_at))
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete the child's enrolment in an occurrence, returns whether one existed
    pub async fn delete_for_child(
        &self,
        conn: &mut SqliteConnection,
        child_id: Uuid,
        occurrence_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrolments WHERE child_id = ? AND occurrence_id = ?")
            .bind(child_id.to_string())
            .bind(occurrence_id.to_string())
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Enrolments of an occurrence in the order they were made
    pub async fn list_for_occurrence(&self, occurrence_id: Uuid) -> Result<Vec<Enrolment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, occurrence_id, created_at
            FROM enrolments
            WHERE occurrence_id = ?
            ORDER BY created_at, ROWID
            "#,
        )
        .bind(occurrence_id.to_string())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_enrolment).collect()
    }

    fn row_to_enrolment(row: &SqliteRow) -> Result<Enrolment> {
        Ok(Enrolment {
            id: parse_uuid(row.get("id"))?,
            child_id: parse_uuid(row.get("child_id"))?,
            occurrence_id: parse_uuid(row.get("occurrence_id"))?,
            created_at: from_millis(row.get("created_at"))?,
        })
    }
}
