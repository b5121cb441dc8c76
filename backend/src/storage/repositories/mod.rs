// Repository modules
pub mod child_repository;
pub mod enrolment_repository;
pub mod event_repository;
pub mod occurrence_repository;
pub mod venue_repository;

// Re-export repository types
pub use child_repository::ChildRepository;
pub use enrolment_repository::EnrolmentRepository;
pub use event_repository::EventRepository;
pub use occurrence_repository::OccurrenceRepository;
pub use venue_repository::VenueRepository;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Ids are stored as hyphenated TEXT
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Corrupt id in database: {}", value))
}

/// `?, ?, ?` for an `IN (...)` clause
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// SQLite treats a negative OFFSET as 0, so out-of-range offsets are pinned
/// to the largest one instead of wrapping.
pub(crate) fn sql_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
