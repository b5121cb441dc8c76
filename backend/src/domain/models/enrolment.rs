use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A child's place in one occurrence. Enrolments are only created and deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrolment {
    pub id: Uuid,
    pub child_id: Uuid,
    pub occurrence_id: Uuid,
    pub created_at: DateTime<Utc>,
}
