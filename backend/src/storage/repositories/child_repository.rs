use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::parse_uuid;
use crate::domain::models::{Child, Guardian};
use crate::domain::time_utils::to_millis;
use crate::storage::connection::DbConnection;

/// Repository for children and their guardians
#[derive(Clone)]
pub struct ChildRepository {
    db: DbConnection,
}

impl ChildRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create the guardian or refresh its contact details
    pub async fn upsert_guardian(
        &self,
        conn: &mut SqliteConnection,
        guardian: &Guardian,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO guardians (id, email, language, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                language = excluded.language
            "#,
        )
        .bind(guardian.id.to_string())
        .bind(&guardian.email)
        .bind(guardian.language.code())
        .bind(to_millis(now))
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Insert a child and link it to a guardian
    pub async fn store_child(
        &self,
        conn: &mut SqliteConnection,
        child: &Child,
        guardian_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO children (id, first_name, created_at) VALUES (?, ?, ?)")
            .bind(child.id.to_string())
            .bind(&child.first_name)
            .bind(to_millis(now))
            .execute(&mut *conn)
            .await?;

        sqlx::query("INSERT INTO child_guardians (child_id, guardian_id) VALUES (?, ?)")
            .bind(child.id.to_string())
            .bind(guardian_id.to_string())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Get a child only if `guardian_id` is one of its guardians.
    ///
    /// A child belonging to someone else is indistinguishable from a missing one.
    pub async fn get_child_for_guardian(
        &self,
        conn: &mut SqliteConnection,
        child_id: Uuid,
        guardian_id: Uuid,
    ) -> Result<Option<Child>> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.first_name
            FROM children c
            JOIN child_guardians cg ON cg.child_id = c.id
            WHERE c.id = ? AND cg.guardian_id = ?
            "#,
        )
        .bind(child_id.to_string())
        .bind(guardian_id.to_string())
        .fetch_optional(conn)
        .await?;

        match row {
            Some(r) => Ok(Some(Child {
                id: parse_uuid(r.get("id"))?,
                first_name: r.get("first_name"),
            })),
            None => Ok(None),
        }
    }

    /// Every guardian with at least one child
    pub async fn list_guardians_with_children(&self) -> Result<Vec<Guardian>> {
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.email, g.language
            FROM guardians g
            WHERE EXISTS (SELECT 1 FROM child_guardians cg WHERE cg.guardian_id = g.id)
            ORDER BY g.created_at, g.id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Guardian {
                    id: parse_uuid(row.get("id"))?,
                    email: row.get("email"),
                    language: row.get::<String, _>("language").parse()?,
                })
            })
            .collect()
    }
}
