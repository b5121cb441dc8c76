//! # Event Service
//!
//! Event lifecycle: creation as a draft, partial updates including
//! per-language translations, deletion, listing, and one-time publication.
//!
//! ## Business Rules
//!
//! - Only staff may create, change, delete or publish events
//! - `capacity_per_occurrence` and `duration` are never negative
//! - Every event has at least one translation with a non-empty name
//! - An event is published exactly once; a second attempt is a conflict and
//!   leaves the original `published_at` in place
//! - Guardians are notified after the publication has been committed, and a
//!   failed notification never undoes it

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::commands::events::{
    AddEventCommand, EventListQuery, EventListResult, EventTranslationCommand, UpdateEventCommand,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Event, EventTranslation, Principal, Translations};
use crate::domain::notification_service::NotificationService;
use crate::storage::{DbConnection, EventRepository, WriteTransaction};

pub const ALREADY_PUBLISHED: &str = "Event is already published";
const TRANSLATION_REQUIRED: &str = "At least one translation is required";

#[derive(Clone)]
pub struct EventService {
    db: DbConnection,
    event_repository: EventRepository,
    notification_service: NotificationService,
}

impl EventService {
    pub fn new(db: DbConnection, notification_service: NotificationService) -> Self {
        Self {
            event_repository: EventRepository::new(db.clone()),
            db,
            notification_service,
        }
    }

    /// Create a new draft event
    pub async fn add_event(
        &self,
        command: AddEventCommand,
        principal: &Principal,
    ) -> DomainResult<Event> {
        principal.require_staff()?;
        info!("Creating event with {} translations", command.translations.len());

        validate_capacity(command.capacity_per_occurrence)?;
        validate_duration(command.duration)?;
        if command.translations.is_empty() {
            return Err(DomainError::validation(TRANSLATION_REQUIRED));
        }
        let translations = build_translations(command.translations)?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            duration: command.duration,
            participants_per_invite: command.participants_per_invite,
            capacity_per_occurrence: command.capacity_per_occurrence,
            published_at: None,
            image: command.image,
            translations,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin_write().await?;
        if let Err(e) = self.event_repository.store_event(tx.conn(), &event).await {
            tx.abandon().await;
            return Err(e.into());
        }
        tx.commit().await?;

        info!("Created event {}", event.id);
        Ok(event)
    }

    /// Apply a partial update in one transaction
    pub async fn update_event(
        &self,
        command: UpdateEventCommand,
        principal: &Principal,
    ) -> DomainResult<Event> {
        principal.require_staff()?;
        info!("Updating event {}", command.id);

        let mut tx = self.db.begin_write().await?;
        match self.apply_update(&mut tx, command).await {
            Ok(event) => {
                tx.commit().await?;
                info!("Updated event {}", event.id);
                Ok(event)
            }
            Err(e) => {
                tx.abandon().await;
                warn!("Event update rejected: {}", e);
                Err(e)
            }
        }
    }

    async fn apply_update(
        &self,
        tx: &mut WriteTransaction,
        command: UpdateEventCommand,
    ) -> DomainResult<Event> {
        let mut event = self
            .event_repository
            .get_event_in(tx.conn(), command.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;

        if let Some(duration) = command.duration {
            validate_duration(Some(duration))?;
            event.duration = Some(duration);
        }
        if let Some(capacity) = command.capacity_per_occurrence {
            validate_capacity(capacity)?;
            event.capacity_per_occurrence = capacity;
        }
        if let Some(participants) = command.participants_per_invite {
            event.participants_per_invite = participants;
        }
        if command.image.is_some() {
            event.image = command.image;
        }
        event.updated_at = Utc::now();

        self.event_repository.update_event(tx.conn(), &event).await?;

        for (language, translation) in build_translations(command.translations)? {
            self.event_repository
                .upsert_translation(tx.conn(), event.id, language, &translation)
                .await?;
        }
        self.event_repository
            .delete_translations(tx.conn(), event.id, &command.delete_translations)
            .await?;

        let updated = self
            .event_repository
            .get_event_in(tx.conn(), event.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;

        if updated.translations.is_empty() {
            return Err(DomainError::validation(TRANSLATION_REQUIRED));
        }
        Ok(updated)
    }

    /// Delete an event with its occurrences and enrolments
    pub async fn delete_event(&self, id: Uuid, principal: &Principal) -> DomainResult<()> {
        principal.require_staff()?;
        info!("Deleting event {}", id);

        let mut tx = self.db.begin_write().await?;
        let deleted = match self.event_repository.delete_event(tx.conn(), id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tx.abandon().await;
                return Err(e.into());
            }
        };

        if !deleted {
            tx.abandon().await;
            warn!("Event not found: {}", id);
            return Err(DomainError::not_found("Event"));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get an event by ID
    pub async fn get_event(&self, id: Uuid, _principal: &Principal) -> DomainResult<Event> {
        info!("Getting event: {}", id);
        self.event_repository
            .get_event(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))
    }

    /// List events, most recently created first
    pub async fn list_events(
        &self,
        query: EventListQuery,
        _principal: &Principal,
    ) -> DomainResult<EventListResult> {
        let page = query.page;
        let events = self
            .event_repository
            .list_events(page.limit + 1, page.offset)
            .await?;
        let (events, pagination) = page.finish(events);

        info!("Listed {} events", events.len());
        Ok(EventListResult { events, pagination })
    }

    /// Publish a draft event and notify guardians
    pub async fn publish_event(&self, id: Uuid, principal: &Principal) -> DomainResult<Event> {
        self.publish_event_at(id, principal, Utc::now()).await
    }

    pub async fn publish_event_at(
        &self,
        id: Uuid,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        principal.require_staff()?;
        info!("Publishing event {}", id);

        let mut tx = self.db.begin_write().await?;
        let result = async {
            let mut event = self
                .event_repository
                .get_event_in(tx.conn(), id)
                .await?
                .ok_or_else(|| DomainError::not_found("Event"))?;

            if event.is_published() {
                return Err(DomainError::conflict(ALREADY_PUBLISHED));
            }

            self.event_repository
                .set_published_at(tx.conn(), id, now)
                .await?;
            event.published_at = Some(now);
            event.updated_at = now;
            Ok::<_, DomainError>(event)
        }
        .await;

        let event = match result {
            Ok(event) => {
                tx.commit().await?;
                event
            }
            Err(e) => {
                tx.abandon().await;
                warn!("Publish rejected for event {}: {}", id, e);
                return Err(e);
            }
        };
        info!("Published event {}", event.id);

        match self.notification_service.dispatch_event_published(&event).await {
            Ok(report) => info!(
                "Event {} publication notifications: {} sent, {} failed",
                event.id, report.sent, report.failed
            ),
            Err(e) => error!("Failed to dispatch notifications for event {}: {}", event.id, e),
        }

        Ok(event)
    }
}

fn validate_capacity(capacity: i64) -> DomainResult<()> {
    if capacity < 0 {
        return Err(DomainError::validation(
            "Capacity per occurrence must be zero or greater",
        ));
    }
    Ok(())
}

fn validate_duration(duration: Option<i64>) -> DomainResult<()> {
    match duration {
        Some(minutes) if minutes < 0 => {
            Err(DomainError::validation("Duration must be zero or greater"))
        }
        _ => Ok(()),
    }
}

fn build_translations(
    inputs: Vec<EventTranslationCommand>,
) -> DomainResult<Translations<EventTranslation>> {
    let mut seen = HashSet::new();
    let mut translations = Translations::new();

    for input in inputs {
        if !seen.insert(input.language) {
            return Err(DomainError::validation(format!(
                "Duplicate translation for language {}",
                input.language.wire_code()
            )));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Event name cannot be empty"));
        }
        translations.insert(
            input.language,
            EventTranslation {
                name: name.to_string(),
                short_description: input.short_description,
                description: input.description,
            },
        );
    }

    Ok(translations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::pagination::PageRequest;
    use crate::domain::models::{Language, ParticipantsPerInvite};
    use crate::domain::notification_service::tests::RecordingNotifier;
    use crate::storage::test_utils::TestEnvironment;
    use std::sync::Arc;

    struct Fixture {
        env: TestEnvironment,
        service: EventService,
        notifier: Arc<RecordingNotifier>,
    }

    async fn setup_test() -> Fixture {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let notifier = Arc::new(RecordingNotifier::default());
        let notifications = NotificationService::new(env.db.clone(), notifier.clone());
        let service = EventService::new(env.db.clone(), notifications);
        Fixture {
            env,
            service,
            notifier,
        }
    }

    fn staff() -> Principal {
        Principal::staff(Uuid::new_v4())
    }

    fn translation(language: Language, name: &str) -> EventTranslationCommand {
        EventTranslationCommand {
            language,
            name: name.to_string(),
            short_description: String::new(),
            description: String::new(),
        }
    }

    fn add_command(capacity: i64) -> AddEventCommand {
        AddEventCommand {
            translations: vec![translation(Language::Fi, "Konsertti")],
            duration: Some(45),
            participants_per_invite: ParticipantsPerInvite::Family,
            capacity_per_occurrence: capacity,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_add_event_creates_draft() {
        let f = setup_test().await;

        let event = f.service.add_event(add_command(20), &staff()).await.unwrap();

        assert!(!event.is_published());
        assert_eq!(event.name(Language::Fi), Some("Konsertti"));

        let stored = f.service.get_event(event.id, &staff()).await.unwrap();
        assert_eq!(stored.capacity_per_occurrence, 20);
        assert_eq!(stored.duration, Some(45));
        assert_eq!(stored.translations.len(), 1);
    }

    #[tokio::test]
    async fn test_add_event_validation() {
        let f = setup_test().await;

        let negative = f.service.add_event(add_command(-1), &staff()).await;
        assert!(matches!(negative, Err(DomainError::Validation(_))));

        let mut no_translations = add_command(5);
        no_translations.translations.clear();
        let result = f.service.add_event(no_translations, &staff()).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let mut blank_name = add_command(5);
        blank_name.translations = vec![translation(Language::Fi, "   ")];
        let result = f.service.add_event(blank_name, &staff()).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let mut duplicate = add_command(5);
        duplicate.translations.push(translation(Language::Fi, "Toinen"));
        let result = f.service.add_event(duplicate, &staff()).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_guardian_cannot_manage_events() {
        let f = setup_test().await;
        let guardian = Principal::guardian(Uuid::new_v4());

        let result = f.service.add_event(add_command(5), &guardian).await;
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));

        let event = f.env.seed_event("Teatteri", 5).await.unwrap();
        let result = f.service.publish_event(event.id, &guardian).await;
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_update_event_partial_and_translations() {
        let f = setup_test().await;
        let event = f.service.add_event(add_command(20), &staff()).await.unwrap();

        let updated = f
            .service
            .update_event(
                UpdateEventCommand {
                    id: event.id,
                    capacity_per_occurrence: Some(12),
                    translations: vec![
                        translation(Language::Sv, "Konsert"),
                        translation(Language::En, "Concert"),
                    ],
                    ..Default::default()
                },
                &staff(),
            )
            .await
            .unwrap();

        assert_eq!(updated.capacity_per_occurrence, 12);
        assert_eq!(updated.duration, Some(45));
        assert_eq!(updated.translations.len(), 3);

        let updated = f
            .service
            .update_event(
                UpdateEventCommand {
                    id: event.id,
                    delete_translations: vec![Language::En],
                    ..Default::default()
                },
                &staff(),
            )
            .await
            .unwrap();
        assert_eq!(updated.translations.len(), 2);
        assert_eq!(updated.name(Language::En), Some("Konsertti"));
    }

    #[tokio::test]
    async fn test_update_cannot_remove_last_translation() {
        let f = setup_test().await;
        let event = f.service.add_event(add_command(20), &staff()).await.unwrap();

        let result = f
            .service
            .update_event(
                UpdateEventCommand {
                    id: event.id,
                    capacity_per_occurrence: Some(5),
                    delete_translations: vec![Language::Fi],
                    ..Default::default()
                },
                &staff(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        // Rolled back as a whole
        let stored = f.service.get_event(event.id, &staff()).await.unwrap();
        assert_eq!(stored.capacity_per_occurrence, 20);
        assert_eq!(stored.name(Language::Fi), Some("Konsertti"));

        // Replacing the only language in the same update is fine
        let updated = f
            .service
            .update_event(
                UpdateEventCommand {
                    id: event.id,
                    translations: vec![translation(Language::Sv, "Konsert")],
                    delete_translations: vec![Language::Fi],
                    ..Default::default()
                },
                &staff(),
            )
            .await
            .unwrap();
        assert_eq!(updated.translations.len(), 1);
        assert_eq!(updated.name(Language::Fi), Some("Konsert"));
    }

    #[tokio::test]
    async fn test_failed_update_changes_nothing() {
        let f = setup_test().await;
        let event = f.service.add_event(add_command(20), &staff()).await.unwrap();

        let result = f
            .service
            .update_event(
                UpdateEventCommand {
                    id: event.id,
                    capacity_per_occurrence: Some(3),
                    translations: vec![translation(Language::Sv, "")],
                    ..Default::default()
                },
                &staff(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let stored = f.service.get_event(event.id, &staff()).await.unwrap();
        assert_eq!(stored.capacity_per_occurrence, 20);
    }

    #[tokio::test]
    async fn test_delete_event() {
        let f = setup_test().await;
        let event = f.env.seed_event("Teatteri", 5).await.unwrap();

        f.service.delete_event(event.id, &staff()).await.unwrap();

        let result = f.service.get_event(event.id, &staff()).await;
        assert!(matches!(result, Err(DomainError::NotFound { entity: "Event" })));
        let again = f.service.delete_event(event.id, &staff()).await;
        assert!(matches!(again, Err(DomainError::NotFound { entity: "Event" })));
    }

    #[tokio::test]
    async fn test_list_events_newest_first_with_pagination() {
        let f = setup_test().await;
        for name in ["first", "second", "third"] {
            f.env.seed_event(name, 5).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let page = f
            .service
            .list_events(
                EventListQuery {
                    page: PageRequest::new(Some(2), None),
                },
                &staff(),
            )
            .await
            .unwrap();
        let names: Vec<_> = page.events.iter().filter_map(|e| e.name(Language::Fi)).collect();
        assert_eq!(names, vec!["third", "second"]);
        assert!(page.pagination.has_more);

        let after = crate::domain::global_id::decode_cursor(
            page.pagination.next_cursor.as_deref().unwrap(),
        )
        .unwrap();
        let rest = f
            .service
            .list_events(
                EventListQuery {
                    page: PageRequest::new(Some(2), Some(after)),
                },
                &staff(),
            )
            .await
            .unwrap();
        assert_eq!(rest.events.len(), 1);
        assert_eq!(rest.events[0].name(Language::Fi), Some("first"));
        assert!(!rest.pagination.has_more);
    }

    #[tokio::test]
    async fn test_publish_once() {
        let f = setup_test().await;
        f.env.seed_child("Aino", Uuid::new_v4()).await.unwrap();
        let event = f.env.seed_event("Sirkus", 5).await.unwrap();

        let published = f.service.publish_event(event.id, &staff()).await.unwrap();
        assert!(published.is_published());
        assert_eq!(f.notifier.sent.lock().unwrap().len(), 1);

        let first = f
            .service
            .get_event(event.id, &staff())
            .await
            .unwrap()
            .published_at;

        let again = f.service.publish_event(event.id, &staff()).await;
        match again {
            Err(DomainError::Conflict(message)) => assert_eq!(message, ALREADY_PUBLISHED),
            other => panic!("Expected conflict, got {:?}", other),
        }

        let after = f
            .service
            .get_event(event.id, &staff())
            .await
            .unwrap()
            .published_at;
        assert_eq!(first, after);
        assert_eq!(f.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_missing_event() {
        let f = setup_test().await;
        let result = f.service.publish_event(Uuid::new_v4(), &staff()).await;
        assert!(matches!(result, Err(DomainError::NotFound { entity: "Event" })));
    }

    #[tokio::test]
    async fn test_publish_survives_notification_failures() {
        let env = TestEnvironment::new().await.unwrap();
        let guardian = Uuid::new_v4();
        env.seed_child("Aino", guardian).await.unwrap();
        let notifier = Arc::new(RecordingNotifier {
            fail_for: Some(format!("{}@example.com", guardian.simple())),
            ..Default::default()
        });
        let service = EventService::new(
            env.db.clone(),
            NotificationService::new(env.db.clone(), notifier),
        );
        let event = env.seed_event("Sirkus", 5).await.unwrap();

        let published = service.publish_event(event.id, &staff()).await;

        assert!(published.is_ok());
        let stored = service.get_event(event.id, &staff()).await.unwrap();
        assert!(stored.is_published());
    }
}
