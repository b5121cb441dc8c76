use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::language::Translations;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueTranslation {
    pub name: String,
    pub description: String,
    pub address: String,
    pub accessibility_info: String,
    pub additional_info: String,
    pub arrival_instructions: String,
    pub www_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: Uuid,
    pub translations: Translations<VenueTranslation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
