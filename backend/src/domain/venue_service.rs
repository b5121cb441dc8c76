use chrono::Utc;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::venues::AddVenueCommand;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Principal, Translations, Venue};
use crate::storage::{DbConnection, VenueRepository};

/// Service for venues where occurrences take place
#[derive(Clone)]
pub struct VenueService {
    db: DbConnection,
    venue_repository: VenueRepository,
}

impl VenueService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            venue_repository: VenueRepository::new(db.clone()),
            db,
        }
    }

    pub async fn add_venue(
        &self,
        command: AddVenueCommand,
        principal: &Principal,
    ) -> DomainResult<Venue> {
        principal.require_staff()?;

        if command.translations.is_empty() {
            return Err(DomainError::validation("At least one translation is required"));
        }

        let mut seen = HashSet::new();
        let mut translations = Translations::new();
        for (language, mut translation) in command.translations {
            if !seen.insert(language) {
                return Err(DomainError::validation(format!(
                    "Duplicate translation for language {}",
                    language.wire_code()
                )));
            }
            translation.name = translation.name.trim().to_string();
            if translation.name.is_empty() {
                return Err(DomainError::validation("Venue name cannot be empty"));
            }
            translations.insert(language, translation);
        }

        let now = Utc::now();
        let venue = Venue {
            id: Uuid::new_v4(),
            translations,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin_write().await?;
        if let Err(e) = self.venue_repository.store_venue(tx.conn(), &venue).await {
            tx.abandon().await;
            return Err(e.into());
        }
        tx.commit().await?;

        info!("Created venue {}", venue.id);
        Ok(venue)
    }

    pub async fn get_venue(&self, id: Uuid, _principal: &Principal) -> DomainResult<Venue> {
        self.venue_repository
            .get_venue(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue"))
    }
}
