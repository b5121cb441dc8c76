//! # Storage Module
//!
//! Handles all data persistence for events, occurrences, venues, children
//! and enrolments.
//!
//! ## Key Responsibilities
//!
//! - **Connection Management**: SQLite pool in WAL mode with foreign keys on
//! - **Schema Setup**: Idempotent table creation at startup
//! - **Write Serialization**: Every write runs in a `WriteTransaction` that
//!   holds the process-wide write gate until commit or rollback
//! - **Data Retrieval**: Repository-per-aggregate reads straight from the pool
//!
//! ## Storage Format
//!
//! - Ids are hyphenated UUID text
//! - Timestamps are UTC epoch milliseconds
//! - Language codes are stored lower-case

pub mod connection;
pub mod repositories;

#[cfg(test)]
pub mod test_utils;

// Re-export the main types that other modules need
pub use connection::{DbConnection, WriteTransaction};
pub use repositories::{
    ChildRepository, EnrolmentRepository, EventRepository, OccurrenceRepository, VenueRepository,
};
