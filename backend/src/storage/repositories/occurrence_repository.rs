use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection};
use uuid::Uuid;

use super::{parse_uuid, sql_offset};
use crate::domain::models::{Language, Occurrence, OccurrenceWithStats};
use crate::domain::time_utils::{from_millis, to_millis};
use crate::storage::connection::DbConnection;

const STATS_SELECT: &str = r#"
    SELECT o.id, o.event_id, o.venue_id, o.time, o.occurrence_language,
           o.created_at, o.updated_at, e.capacity_per_occurrence,
           (SELECT COUNT(*) FROM enrolments en WHERE en.occurrence_id = o.id) AS enrolment_count
    FROM occurrences o
    JOIN events e ON e.id = o.event_id
"#;

/// Column-level filters that can be answered by SQL alone.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceRowFilter {
    pub starts_at_or_after: Vec<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub venue_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub occurrence_language: Option<Language>,
}

/// Repository for occurrences
#[derive(Clone)]
pub struct OccurrenceRepository {
    db: DbConnection,
}

impl OccurrenceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_occurrence(
        &self,
        conn: &mut SqliteConnection,
        occurrence: &Occurrence,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO occurrences (id, event_id, venue_id, time, occurrence_language, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(occurrence.id.to_string())
        .bind(occurrence.event_id.to_string())
        .bind(occurrence.venue_id.to_string())
        .bind(to_millis(occurrence.time))
        .bind(occurrence.occurrence_language.code())
        .bind(to_millis(occurrence.created_at))
        .bind(to_millis(occurrence.updated_at))
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Get an occurrence inside an open transaction
    pub async fn get_occurrence_in(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<Option<Occurrence>> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, venue_id, time, occurrence_language, created_at, updated_at
            FROM occurrences
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(conn)
        .await?;

        row.as_ref().map(Self::row_to_occurrence).transpose()
    }

    /// Get an occurrence with its event capacity and live enrolment count
    pub async fn get_with_stats(&self, id: Uuid) -> Result<Option<OccurrenceWithStats>> {
        let query = format!("{} WHERE o.id = ?", STATS_SELECT);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_stats).transpose()
    }

    pub async fn update_occurrence(
        &self,
        conn: &mut SqliteConnection,
        occurrence: &Occurrence,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE occurrences
            SET event_id = ?, venue_id = ?, time = ?, occurrence_language = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(occurrence.event_id.to_string())
        .bind(occurrence.venue_id.to_string())
        .bind(to_millis(occurrence.time))
        .bind(occurrence.occurrence_language.code())
        .bind(to_millis(occurrence.updated_at))
        .bind(occurrence.id.to_string())
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete an occurrence; its enrolments cascade
    pub async fn delete_occurrence(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM occurrences WHERE id = ?")
            .bind(id.to_string())
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List occurrences matching `filter`, ascending by time.
    ///
    /// `page` is `(limit, offset)`; `None` returns every match.
    pub async fn list_occurrences(
        &self,
        filter: &OccurrenceRowFilter,
        page: Option<(u32, u64)>,
    ) -> Result<Vec<OccurrenceWithStats>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(STATS_SELECT);
        builder.push(" WHERE 1 = 1");

        for lower in &filter.starts_at_or_after {
            builder.push(" AND o.time >= ").push_bind(to_millis(*lower));
        }
        if let Some(upper) = filter.starts_before {
            builder.push(" AND o.time < ").push_bind(to_millis(upper));
        }
        if let Some(venue_id) = filter.venue_id {
            builder.push(" AND o.venue_id = ").push_bind(venue_id.to_string());
        }
        if let Some(event_id) = filter.event_id {
            builder.push(" AND o.event_id = ").push_bind(event_id.to_string());
        }
        if let Some(language) = filter.occurrence_language {
            builder
                .push(" AND o.occurrence_language = ")
                .push_bind(language.code());
        }

        builder.push(" ORDER BY o.time ASC, o.id ASC");

        if let Some((limit, offset)) = page {
            builder
                .push(" LIMIT ")
                .push_bind(limit as i64)
                .push(" OFFSET ")
                .push_bind(sql_offset(offset));
        }

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::row_to_stats).collect()
    }

    fn row_to_occurrence(row: &SqliteRow) -> Result<Occurrence> {
        Ok(Occurrence {
            id: parse_uuid(row.get("id"))?,
            event_id: parse_uuid(row.get("event_id"))?,
            venue_id: parse_uuid(row.get("venue_id"))?,
            time: from_millis(row.get("time"))?,
            occurrence_language: row.get::<String, _>("occurrence_language").parse()?,
            created_at: from_millis(row.get("created_at"))?,
            updated_at: from_millis(row.get("updated_at"))?,
        })
    }

    fn row_to_stats(row: &SqliteRow) -> Result<OccurrenceWithStats> {
        Ok(OccurrenceWithStats {
            occurrence: Self::row_to_occurrence(row)?,
            capacity_per_occurrence: row.get("capacity_per_occurrence"),
            enrolment_count: row.get("enrolment_count"),
        })
    }
}
