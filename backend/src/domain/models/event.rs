//! Domain model for an event and its translations.
use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use super::language::{resolve_translation, Language, Translations};
use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantsPerInvite {
    Family,
    ChildAndGuardian,
}

impl ParticipantsPerInvite {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantsPerInvite::Family => "FAMILY",
            ParticipantsPerInvite::ChildAndGuardian => "CHILD_AND_GUARDIAN",
        }
    }
}

impl FromStr for ParticipantsPerInvite {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FAMILY" => Ok(ParticipantsPerInvite::Family),
            "CHILD_AND_GUARDIAN" => Ok(ParticipantsPerInvite::ChildAndGuardian),
            _ => Err(DomainError::validation(format!(
                "Invalid participants per invite: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventTranslation {
    pub name: String,
    pub short_description: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    /// Minutes
    pub duration: Option<i64>,
    pub participants_per_invite: ParticipantsPerInvite,
    /// Applies to every occurrence of the event
    pub capacity_per_occurrence: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub translations: Translations<EventTranslation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn translation(&self, language: Language) -> Option<&EventTranslation> {
        resolve_translation(&self.translations, language)
    }

    pub fn name(&self, language: Language) -> Option<&str> {
        self.translation(language).map(|t| t.name.as_str())
    }
}
