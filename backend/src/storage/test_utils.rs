/// Test utilities module for isolated databases and seed data
///
/// Every `TestEnvironment` owns a fresh SQLite file inside a temporary
/// directory that is removed when the environment is dropped, even if the
/// test panics.
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

use super::connection::DbConnection;
use super::repositories::{ChildRepository, EventRepository, OccurrenceRepository, VenueRepository};
use crate::domain::models::{
    Child, Event, EventTranslation, Guardian, Language, Occurrence, ParticipantsPerInvite, Venue,
    VenueTranslation,
};

pub struct TestEnvironment {
    /// Kept alive so the database file survives until drop
    _temp_dir: TempDir,
    pub db: DbConnection,
    pub db_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("eventdesk-test")?;
        let db_path = temp_dir.path().join("eventdesk.db");
        let db = DbConnection::open_file(&db_path, 8).await?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            db,
            db_path,
        })
    }

    /// Insert a draft event with a Finnish name
    pub async fn seed_event(&self, name: &str, capacity: i64) -> Result<Event> {
        let now = Utc::now();
        let mut translations = BTreeMap::new();
        translations.insert(
            Language::Fi,
            EventTranslation {
                name: name.to_string(),
                short_description: String::new(),
                description: String::new(),
            },
        );
        let event = Event {
            id: Uuid::new_v4(),
            duration: Some(60),
            participants_per_invite: ParticipantsPerInvite::ChildAndGuardian,
            capacity_per_occurrence: capacity,
            published_at: None,
            image: None,
            translations,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin_write().await?;
        EventRepository::new(self.db.clone())
            .store_event(tx.conn(), &event)
            .await?;
        tx.commit().await?;
        Ok(event)
    }

    pub async fn seed_venue(&self, name: &str) -> Result<Venue> {
        let now = Utc::now();
        let mut translations = BTreeMap::new();
        translations.insert(
            Language::Fi,
            VenueTranslation {
                name: name.to_string(),
                ..Default::default()
            },
        );
        let venue = Venue {
            id: Uuid::new_v4(),
            translations,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin_write().await?;
        VenueRepository::new(self.db.clone())
            .store_venue(tx.conn(), &venue)
            .await?;
        tx.commit().await?;
        Ok(venue)
    }

    pub async fn seed_occurrence(
        &self,
        event_id: Uuid,
        venue_id: Uuid,
        time: DateTime<Utc>,
        language: Language,
    ) -> Result<Occurrence> {
        let now = Utc::now();
        let occurrence = Occurrence {
            id: Uuid::new_v4(),
            event_id,
            venue_id,
            time,
            occurrence_language: language,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin_write().await?;
        OccurrenceRepository::new(self.db.clone())
            .store_occurrence(tx.conn(), &occurrence)
            .await?;
        tx.commit().await?;
        Ok(occurrence)
    }

    /// Insert a child owned by `guardian_id`, creating the guardian if needed
    pub async fn seed_child(&self, first_name: &str, guardian_id: Uuid) -> Result<Child> {
        let now = Utc::now();
        let repo = ChildRepository::new(self.db.clone());
        let guardian = Guardian {
            id: guardian_id,
            email: format!("{}@example.com", guardian_id.simple()),
            language: Language::Fi,
        };
        let child = Child {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
        };

        let mut tx = self.db.begin_write().await?;
        repo.upsert_guardian(tx.conn(), &guardian, now).await?;
        repo.store_child(tx.conn(), &child, guardian_id, now).await?;
        tx.commit().await?;
        Ok(child)
    }
}
