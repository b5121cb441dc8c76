//! Guardian notifications.
//!
//! Delivery itself (e-mail, push) lives behind the [`Notifier`] trait. The
//! service only decides who is told what, and keeps going when a single
//! delivery fails.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Event, Guardian, Language};
use crate::storage::{ChildRepository, DbConnection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    EventPublished,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::EventPublished => "event_published",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub recipient_email: String,
    pub language: Language,
    pub event_id: Uuid,
    /// Event name in the recipient's language, falling back to Finnish
    pub event_name: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Writes every notification to the log instead of delivering it
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            notification_type = notification.notification_type.as_str(),
            recipient = %notification.recipient_email,
            language = notification.language.code(),
            event_id = %notification.event_id,
            "Notification: {}",
            notification.event_name
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct NotificationService {
    child_repository: ChildRepository,
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(db: DbConnection, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            child_repository: ChildRepository::new(db),
            notifier,
        }
    }

    /// Tell every guardian with at least one child that `event` is open.
    pub async fn dispatch_event_published(&self, event: &Event) -> DomainResult<DispatchReport> {
        let guardians = self.child_repository.list_guardians_with_children().await?;
        info!(
            "Dispatching event_published for event {} to {} guardians",
            event.id,
            guardians.len()
        );

        let mut report = DispatchReport::default();
        for guardian in &guardians {
            let notification = Self::event_published(event, guardian);
            match self.notifier.send(&notification).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(
                        "Failed to notify guardian {} about event {}: {}",
                        guardian.id, event.id, e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    fn event_published(event: &Event, guardian: &Guardian) -> Notification {
        Notification {
            notification_type: NotificationType::EventPublished,
            recipient_email: guardian.email.clone(),
            language: guardian.language,
            event_id: event.id,
            event_name: event.name(guardian.language).unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::models::EventTranslation;
    use crate::storage::test_utils::TestEnvironment;
    use anyhow::bail;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records every notification; fails for one address if asked to
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub sent: Mutex<Vec<Notification>>,
        pub fail_for: Option<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            if self.fail_for.as_deref() == Some(notification.recipient_email.as_str()) {
                bail!("mailbox unavailable");
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_guardians_with_children_only() {
        let env = TestEnvironment::new().await.unwrap();
        let parent = Uuid::new_v4();
        env.seed_child("Aino", parent).await.unwrap();
        env.seed_child("Eero", parent).await.unwrap();

        let childless = Guardian {
            id: Uuid::new_v4(),
            email: "nobody@example.com".to_string(),
            language: Language::En,
        };
        let mut tx = env.db.begin_write().await.unwrap();
        ChildRepository::new(env.db.clone())
            .upsert_guardian(tx.conn(), &childless, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let event = env.seed_event("Sirkus", 10).await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = NotificationService::new(env.db.clone(), notifier.clone());

        let report = service.dispatch_event_published(&event).await.unwrap();

        assert_eq!(report, DispatchReport { sent: 1, failed: 0 });
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notification_type, NotificationType::EventPublished);
        assert_eq!(sent[0].event_name, "Sirkus");
    }

    #[tokio::test]
    async fn test_failed_delivery_is_counted_not_fatal() {
        let env = TestEnvironment::new().await.unwrap();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        env.seed_child("Aino", first).await.unwrap();
        env.seed_child("Eero", second).await.unwrap();

        let event = env.seed_event("Sirkus", 10).await.unwrap();
        let notifier = Arc::new(RecordingNotifier {
            fail_for: Some(format!("{}@example.com", first.simple())),
            ..Default::default()
        });
        let service = NotificationService::new(env.db.clone(), notifier.clone());

        let report = service.dispatch_event_published(&event).await.unwrap();

        assert_eq!(report, DispatchReport { sent: 1, failed: 1 });
    }

    #[test]
    fn test_notification_uses_guardian_language_with_fallback() {
        let mut event_translations = crate::domain::models::Translations::new();
        event_translations.insert(
            Language::Fi,
            EventTranslation {
                name: "Konsertti".to_string(),
                short_description: String::new(),
                description: String::new(),
            },
        );
        event_translations.insert(
            Language::Sv,
            EventTranslation {
                name: "Konsert".to_string(),
                short_description: String::new(),
                description: String::new(),
            },
        );
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            duration: None,
            participants_per_invite: crate::domain::models::ParticipantsPerInvite::Family,
            capacity_per_occurrence: 5,
            published_at: None,
            image: None,
            translations: event_translations,
            created_at: now,
            updated_at: now,
        };

        let swedish = Guardian {
            id: Uuid::new_v4(),
            email: "sv@example.com".to_string(),
            language: Language::Sv,
        };
        let english = Guardian {
            language: Language::En,
            ..swedish.clone()
        };

        assert_eq!(NotificationService::event_published(&event, &swedish).event_name, "Konsert");
        assert_eq!(NotificationService::event_published(&event, &english).event_name, "Konsertti");
    }
}
