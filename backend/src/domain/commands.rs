//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs of the `shared`
//! crate to these types, decoding opaque ids and parsing languages and
//! timestamps on the way in.

pub mod pagination {
    use crate::domain::global_id::encode_cursor;

    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Offset based page request decoded from `limit` and an `after` cursor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageRequest {
        pub limit: u32,
        pub offset: u64,
    }

    impl Default for PageRequest {
        fn default() -> Self {
            Self {
                limit: DEFAULT_LIMIT,
                offset: 0,
            }
        }
    }

    impl PageRequest {
        /// Clamps `limit` into `1..=MAX_LIMIT`; `after_offset` is the offset
        /// of the last item already seen.
        pub fn new(limit: Option<u32>, after_offset: Option<u64>) -> Self {
            Self {
                limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
                offset: after_offset.map_or(0, |o| o.saturating_add(1)),
            }
        }

        /// Trims a page fetched with `limit + 1` rows and builds the
        /// pagination info for it.
        pub fn finish<T>(&self, mut items: Vec<T>) -> (Vec<T>, PaginationInfo) {
            let has_more = items.len() > self.limit as usize;
            items.truncate(self.limit as usize);

            let next_cursor = if has_more {
                Some(encode_cursor(self.offset.saturating_add(items.len() as u64 - 1)))
            } else {
                None
            };

            (items, PaginationInfo { has_more, next_cursor })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct PaginationInfo {
        pub has_more: bool,
        pub next_cursor: Option<String>,
    }
}

pub mod events {
    use super::pagination::{PageRequest, PaginationInfo};
    use crate::domain::models::{Event, Language, ParticipantsPerInvite};
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    pub struct EventTranslationCommand {
        pub language: Language,
        pub name: String,
        pub short_description: String,
        pub description: String,
    }

    #[derive(Debug, Clone)]
    pub struct AddEventCommand {
        pub translations: Vec<EventTranslationCommand>,
        pub duration: Option<i64>,
        pub participants_per_invite: ParticipantsPerInvite,
        pub capacity_per_occurrence: i64,
        pub image: Option<String>,
    }

    /// Partial update; `None` leaves a field untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateEventCommand {
        pub id: Uuid,
        pub duration: Option<i64>,
        pub participants_per_invite: Option<ParticipantsPerInvite>,
        pub capacity_per_occurrence: Option<i64>,
        pub image: Option<String>,
        pub translations: Vec<EventTranslationCommand>,
        pub delete_translations: Vec<Language>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct EventListQuery {
        pub page: PageRequest,
    }

    #[derive(Debug, Clone)]
    pub struct EventListResult {
        pub events: Vec<Event>,
        pub pagination: PaginationInfo,
    }
}

pub mod occurrences {
    use super::pagination::{PageRequest, PaginationInfo};
    use crate::domain::models::{Language, OccurrenceWithStats};
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    #[derive(Debug, Clone)]
    pub struct AddOccurrenceCommand {
        pub event_id: Uuid,
        pub venue_id: Uuid,
        pub time: DateTime<Utc>,
        pub occurrence_language: Option<Language>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateOccurrenceCommand {
        pub id: Uuid,
        pub time: Option<DateTime<Utc>>,
        pub event_id: Option<Uuid>,
        pub venue_id: Option<Uuid>,
        pub occurrence_language: Option<Language>,
    }

    /// Time-of-day filter as given by the caller
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimeOfDayFilter {
        pub time: NaiveTime,
        /// UTC when absent
        pub offset: Option<FixedOffset>,
    }

    /// Language restriction on a listing. No occurrence carries an
    /// unsupported code, so such a filter matches nothing.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum LanguageFilter {
        Is(Language),
        Unsupported(String),
    }

    impl LanguageFilter {
        pub fn parse(code: &str) -> Self {
            code.parse()
                .map(Self::Is)
                .unwrap_or_else(|_| Self::Unsupported(code.to_string()))
        }
    }

    impl From<Language> for LanguageFilter {
        fn from(language: Language) -> Self {
            Self::Is(language)
        }
    }

    /// Conjunctive occurrence filters; `None` means "no restriction".
    #[derive(Debug, Clone, Default)]
    pub struct OccurrenceFilter {
        pub date: Option<NaiveDate>,
        pub time: Option<TimeOfDayFilter>,
        pub upcoming: bool,
        pub venue_id: Option<Uuid>,
        pub event_id: Option<Uuid>,
        pub occurrence_language: Option<LanguageFilter>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct OccurrenceListQuery {
        pub filter: OccurrenceFilter,
        pub page: PageRequest,
    }

    #[derive(Debug, Clone)]
    pub struct OccurrenceListResult {
        pub occurrences: Vec<OccurrenceWithStats>,
        pub pagination: PaginationInfo,
    }
}

pub mod enrolments {
    use uuid::Uuid;

    #[derive(Debug, Clone, Copy)]
    pub struct EnrolCommand {
        pub child_id: Uuid,
        pub occurrence_id: Uuid,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct UnenrolCommand {
        pub child_id: Uuid,
        pub occurrence_id: Uuid,
    }
}

pub mod venues {
    use crate::domain::models::{Language, VenueTranslation};

    #[derive(Debug, Clone)]
    pub struct AddVenueCommand {
        pub translations: Vec<(Language, VenueTranslation)>,
    }
}

pub mod children {
    use crate::domain::models::Language;

    #[derive(Debug, Clone)]
    pub struct AddChildCommand {
        pub first_name: String,
        pub guardian_email: String,
        pub guardian_language: Language,
    }
}

#[cfg(test)]
mod tests {
    use super::pagination::*;
    use crate::domain::global_id::decode_cursor;

    #[test]
    fn test_page_request_clamps_limit() {
        assert_eq!(PageRequest::new(None, None).limit, DEFAULT_LIMIT);
        assert_eq!(PageRequest::new(Some(0), None).limit, 1);
        assert_eq!(PageRequest::new(Some(500), None).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(None, Some(19)).offset, 20);
    }

    #[test]
    fn test_page_request_offset_does_not_overflow() {
        assert_eq!(PageRequest::new(None, Some(u64::MAX)).offset, u64::MAX);

        let page = PageRequest { limit: 1, offset: u64::MAX };
        let (items, info) = page.finish(vec![1, 2]);
        assert_eq!(items, vec![1]);
        assert!(info.has_more);
    }

    #[test]
    fn test_finish_builds_next_cursor() {
        let page = PageRequest::new(Some(2), None);
        let (items, info) = page.finish(vec![1, 2, 3]);

        assert_eq!(items, vec![1, 2]);
        assert!(info.has_more);
        let after = decode_cursor(info.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(PageRequest::new(Some(2), Some(after)).offset, 2);

        let (items, info) = page.finish(vec![1]);
        assert_eq!(items, vec![1]);
        assert!(!info.has_more);
        assert!(info.next_cursor.is_none());
    }
}
