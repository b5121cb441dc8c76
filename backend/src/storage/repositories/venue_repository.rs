use anyhow::Result;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::parse_uuid;
use crate::domain::models::{Language, Translations, Venue, VenueTranslation};
use crate::domain::time_utils::{from_millis, to_millis};
use crate::storage::connection::DbConnection;

/// Repository for venues
#[derive(Clone)]
pub struct VenueRepository {
    db: DbConnection,
}

impl VenueRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a venue together with its translations
    pub async fn store_venue(&self, conn: &mut SqliteConnection, venue: &Venue) -> Result<()> {
        sqlx::query("INSERT INTO venues (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(venue.id.to_string())
            .bind(to_millis(venue.created_at))
            .bind(to_millis(venue.updated_at))
            .execute(&mut *conn)
            .await?;

        for (language, translation) in &venue.translations {
            sqlx::query(
                r#"
                INSERT INTO venue_translations (venue_id, language_code, name, description, address,
                                                accessibility_info, additional_info,
                                                arrival_instructions, www_url)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(venue.id.to_string())
            .bind(language.code())
            .bind(&translation.name)
            .bind(&translation.description)
            .bind(&translation.address)
            .bind(&translation.accessibility_info)
            .bind(&translation.additional_info)
            .bind(&translation.arrival_instructions)
            .bind(&translation.www_url)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Get a venue by ID
    pub async fn get_venue(&self, id: Uuid) -> Result<Option<Venue>> {
        let row = sqlx::query("SELECT id, created_at, updated_at FROM venues WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT language_code, name, description, address, accessibility_info,
                   additional_info, arrival_instructions, www_url
            FROM venue_translations
            WHERE venue_id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_all(self.db.pool())
        .await?;

        let mut translations = Translations::new();
        for r in rows {
            let language: Language = r.get::<String, _>("language_code").parse()?;
            translations.insert(
                language,
                VenueTranslation {
                    name: r.get("name"),
                    description: r.get("description"),
                    address: r.get("address"),
                    accessibility_info: r.get("accessibility_info"),
                    additional_info: r.get("additional_info"),
                    arrival_instructions: r.get("arrival_instructions"),
                    www_url: r.get("www_url"),
                },
            );
        }

        Ok(Some(Venue {
            id: parse_uuid(row.get("id"))?,
            translations,
            created_at: from_millis(row.get("created_at"))?,
            updated_at: from_millis(row.get("updated_at"))?,
        }))
    }

    /// Check whether a venue exists inside an open transaction
    pub async fn venue_exists(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM venues WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(conn)
            .await?;
        Ok(found.is_some())
    }
}
