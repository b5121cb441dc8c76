use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::language::Language;
use crate::domain::time_utils::remaining_capacity;

#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub id: Uuid,
    pub event_id: Uuid,
    pub venue_id: Uuid,
    pub time: DateTime<Utc>,
    pub occurrence_language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Occurrence joined with its event's capacity and the live enrolment count
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceWithStats {
    pub occurrence: Occurrence,
    pub capacity_per_occurrence: i64,
    pub enrolment_count: i64,
}

impl OccurrenceWithStats {
    pub fn remaining_capacity(&self) -> i64 {
        remaining_capacity(self.capacity_per_occurrence, self.enrolment_count)
    }
}
