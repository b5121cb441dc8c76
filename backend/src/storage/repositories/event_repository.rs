use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use std::collections::HashMap;
use uuid::Uuid;

use super::{parse_uuid, placeholders, sql_offset};
use crate::domain::models::{Event, EventTranslation, Language, Translations};
use crate::domain::time_utils::{from_millis, to_millis};
use crate::storage::connection::DbConnection;

const EVENT_COLUMNS: &str = "id, duration, participants_per_invite, capacity_per_occurrence, \
                             published_at, image, created_at, updated_at";

/// Repository for events and their translations
#[derive(Clone)]
pub struct EventRepository {
    db: DbConnection,
}

impl EventRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert an event together with its translations
    pub async fn store_event(&self, conn: &mut SqliteConnection, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, duration, participants_per_invite, capacity_per_occurrence,
                                published_at, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.duration)
        .bind(event.participants_per_invite.as_str())
        .bind(event.capacity_per_occurrence)
        .bind(event.published_at.map(to_millis))
        .bind(&event.image)
        .bind(to_millis(event.created_at))
        .bind(to_millis(event.updated_at))
        .execute(&mut *conn)
        .await?;

        for (language, translation) in &event.translations {
            self.upsert_translation(&mut *conn, event.id, *language, translation)
                .await?;
        }

        Ok(())
    }

    /// Get an event by ID
    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let mut conn = self.db.pool().acquire().await?;
        self.get_event_in(&mut conn, id).await
    }

    /// Get an event inside an open transaction
    pub async fn get_event_in(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Event>> {
        let query = format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut event = Self::row_to_event(&row)?;
        event.translations = Self::load_translations(&mut *conn, &[event.id])
            .await?
            .remove(&event.id)
            .unwrap_or_default();

        Ok(Some(event))
    }

    /// List events newest first
    pub async fn list_events(&self, limit: u32, offset: u64) -> Result<Vec<Event>> {
        let mut conn = self.db.pool().acquire().await?;

        let query = format!(
            "SELECT {} FROM events ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            EVENT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(limit as i64)
            .bind(sql_offset(offset))
            .fetch_all(&mut *conn)
            .await?;

        let mut events = rows
            .iter()
            .map(Self::row_to_event)
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let mut translations = Self::load_translations(&mut conn, &ids).await?;
        for event in &mut events {
            event.translations = translations.remove(&event.id).unwrap_or_default();
        }

        Ok(events)
    }

    /// Persist scalar fields of an event. Translations are handled separately.
    pub async fn update_event(&self, conn: &mut SqliteConnection, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE events
            SET duration = ?, participants_per_invite = ?, capacity_per_occurrence = ?,
                image = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(event.duration)
        .bind(event.participants_per_invite.as_str())
        .bind(event.capacity_per_occurrence)
        .bind(&event.image)
        .bind(to_millis(event.updated_at))
        .bind(event.id.to_string())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn set_published_at(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        published_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE events SET published_at = ?, updated_at = ? WHERE id = ?")
            .bind(to_millis(published_at))
            .bind(to_millis(published_at))
            .bind(id.to_string())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Create or replace the translation for one language
    pub async fn upsert_translation(
        &self,
        conn: &mut SqliteConnection,
        event_id: Uuid,
        language: Language,
        translation: &EventTranslation,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO event_translations (event_id, language_code, name, short_description, description)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (event_id, language_code) DO UPDATE SET
                name = excluded.name,
                short_description = excluded.short_description,
                description = excluded.description
            "#,
        )
        .bind(event_id.to_string())
        .bind(language.code())
        .bind(&translation.name)
        .bind(&translation.short_description)
        .bind(&translation.description)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Remove translations for the given languages, returns rows removed
    pub async fn delete_translations(
        &self,
        conn: &mut SqliteConnection,
        event_id: Uuid,
        languages: &[Language],
    ) -> Result<u64> {
        if languages.is_empty() {
            return Ok(0);
        }

        let query_str = format!(
            "DELETE FROM event_translations WHERE event_id = ? AND language_code IN ({})",
            placeholders(languages.len())
        );

        let mut query = sqlx::query(&query_str).bind(event_id.to_string());
        for language in languages {
            query = query.bind(language.code());
        }

        let result = query.execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// Delete an event; occurrences and enrolments cascade
    pub async fn delete_event(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_translations(
        conn: &mut SqliteConnection,
        event_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Translations<EventTranslation>>> {
        let mut by_event: HashMap<Uuid, Translations<EventTranslation>> = HashMap::new();
        if event_ids.is_empty() {
            return Ok(by_event);
        }

        let query_str = format!(
            "SELECT event_id, language_code, name, short_description, description \
             FROM event_translations WHERE event_id IN ({})",
            placeholders(event_ids.len())
        );
        let mut query = sqlx::query(&query_str);
        for id in event_ids {
            query = query.bind(id.to_string());
        }

        for row in query.fetch_all(conn).await? {
            let event_id = parse_uuid(row.get("event_id"))?;
            let language: Language = row.get::<String, _>("language_code").parse()?;
            by_event.entry(event_id).or_default().insert(
                language,
                EventTranslation {
                    name: row.get("name"),
                    short_description: row.get("short_description"),
                    description: row.get("description"),
                },
            );
        }

        Ok(by_event)
    }

    fn row_to_event(row: &SqliteRow) -> Result<Event> {
        Ok(Event {
            id: parse_uuid(row.get("id"))?,
            duration: row.get("duration"),
            participants_per_invite: row.get::<String, _>("participants_per_invite").parse()?,
            capacity_per_occurrence: row.get("capacity_per_occurrence"),
            published_at: row
                .get::<Option<i64>, _>("published_at")
                .map(from_millis)
                .transpose()?,
            image: row.get("image"),
            translations: Translations::new(),
            created_at: from_millis(row.get("created_at"))?,
            updated_at: from_millis(row.get("updated_at"))?,
        })
    }
}
