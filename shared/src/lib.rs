//! Wire types shared between the backend and its clients.
//!
//! Identifiers in these types are opaque tokens (see the backend's
//! `global_id` module); timestamps are RFC 3339 strings and language codes
//! are upper-case (`FI`, `SV`, `EN`).

use serde::{Deserialize, Serialize};

/// Pagination info returned by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    /// Cursor to pass as `after` to fetch the next page
    pub next_cursor: Option<String>,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine readable error kind, e.g. `NOT_FOUND` or `CAPACITY_EXCEEDED`
    pub code: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTranslationInput {
    pub language_code: String,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTranslation {
    pub language_code: String,
    pub name: String,
    pub short_description: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Name in the request language, falling back to Finnish
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    /// Duration in minutes
    pub duration: Option<i64>,
    /// `FAMILY` or `CHILD_AND_GUARDIAN`
    pub participants_per_invite: String,
    pub capacity_per_occurrence: i64,
    /// `None` while the event is a draft
    pub published_at: Option<String>,
    pub image: Option<String>,
    pub translations: Vec<EventTranslation>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddEventRequest {
    pub translations: Vec<EventTranslationInput>,
    #[serde(default)]
    pub duration: Option<i64>,
    pub participants_per_invite: String,
    pub capacity_per_occurrence: i64,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub participants_per_invite: Option<String>,
    #[serde(default)]
    pub capacity_per_occurrence: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    /// Translations to create or replace, keyed by their language code
    #[serde(default)]
    pub translations: Option<Vec<EventTranslationInput>>,
    /// Language codes whose translations are removed
    #[serde(default)]
    pub delete_translations: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event: Event,
    pub success_message: String,
}

/// Query parameters for listing events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventListRequest {
    pub limit: Option<u32>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
    pub pagination: PaginationInfo,
}

// ---------------------------------------------------------------------------
// Occurrences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub event_id: String,
    pub venue_id: String,
    /// Start time (RFC 3339, UTC)
    pub time: String,
    pub occurrence_language: String,
    pub enrolment_count: i64,
    pub remaining_capacity: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOccurrenceRequest {
    pub event_id: String,
    pub venue_id: String,
    pub time: String,
    #[serde(default)]
    pub occurrence_language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOccurrenceRequest {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub venue_id: Option<String>,
    #[serde(default)]
    pub occurrence_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceResponse {
    pub occurrence: Occurrence,
    pub success_message: String,
}

/// Filters for listing occurrences; all present filters must match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceListRequest {
    /// Calendar date `YYYY-MM-DD` in the service's local time zone
    pub date: Option<String>,
    /// Time of day `HH:MM[:SS]`, optionally with a UTC offset (`+02:00`)
    pub time: Option<String>,
    pub upcoming: Option<bool>,
    pub venue_id: Option<String>,
    pub event_id: Option<String>,
    pub occurrence_language: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceListResponse {
    pub occurrences: Vec<Occurrence>,
    pub pagination: PaginationInfo,
}

// ---------------------------------------------------------------------------
// Enrolments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolOccurrenceRequest {
    pub child_id: String,
    pub occurrence_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrolment {
    pub id: String,
    pub child_id: String,
    pub occurrence_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolmentResponse {
    pub enrolment: Enrolment,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueTranslationInput {
    pub language_code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub accessibility_info: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub arrival_instructions: Option<String>,
    #[serde(default)]
    pub www_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueTranslation {
    pub language_code: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub accessibility_info: String,
    pub additional_info: String,
    pub arrival_instructions: String,
    pub www_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub translations: Vec<VenueTranslation>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddVenueRequest {
    pub translations: Vec<VenueTranslationInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueResponse {
    pub venue: Venue,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// Registers a child under the acting guardian
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddChildRequest {
    pub first_name: String,
    /// Contact address used for guardian notifications
    pub guardian_email: String,
    #[serde(default)]
    pub guardian_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResponse {
    pub child: Child,
    pub success_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_event_request_defaults_missing_fields() {
        let request: UpdateEventRequest =
            serde_json::from_str(r#"{"capacity_per_occurrence": 5}"#).unwrap();

        assert_eq!(request.capacity_per_occurrence, Some(5));
        assert!(request.translations.is_none());
        assert!(request.delete_translations.is_none());
    }

    #[test]
    fn test_add_event_request_optional_fields() {
        let request: AddEventRequest = serde_json::from_str(
            r#"{
                "translations": [{"language_code": "FI", "name": "Konsertti"}],
                "participants_per_invite": "FAMILY",
                "capacity_per_occurrence": 30
            }"#,
        )
        .unwrap();

        assert_eq!(request.translations.len(), 1);
        assert!(request.translations[0].short_description.is_none());
        assert!(request.duration.is_none());
        assert!(request.image.is_none());
    }
}
