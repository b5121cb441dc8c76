//! # Domain Module
//!
//! Contains all business logic for scheduling events and admitting children
//! into event occurrences.
//!
//! ## Module Organization
//!
//! - **enrolment_service**: The admission engine deciding enrol and unenrol requests
//! - **event_service**: Event lifecycle and one-time publication
//! - **occurrence_service**: Occurrence CRUD and the filtered occurrence listing
//! - **notification_service**: Guardian notifications behind a `Notifier` seam
//! - **venue_service** / **child_service**: Thin collaborator services
//! - **time_utils**: Local time zone conversions and capacity arithmetic
//! - **global_id**: Opaque identifiers and list cursors
//!
//! ## Core Concepts
//!
//! - **Event**: A draft or published programme item with a per-occurrence capacity
//! - **Occurrence**: One scheduled instance of an event at a venue
//! - **Enrolment**: A child's place in one occurrence
//! - **Principal**: The acting user, passed explicitly to every operation
//!
//! ## Business Rules
//!
//! - A child holds at most one enrolment per event
//! - An occurrence never holds more enrolments than its event's capacity
//! - Occurrences that have started cannot be joined
//! - Only staff manage events, occurrences and venues
//! - A guardian can only act for their own children

pub mod child_service;
pub mod commands;
pub mod enrolment_service;
pub mod errors;
pub mod event_service;
pub mod global_id;
pub mod models;
pub mod notification_service;
pub mod occurrence_service;
pub mod time_utils;
pub mod venue_service;

pub use child_service::ChildService;
pub use enrolment_service::EnrolmentService;
pub use errors::{DomainError, DomainResult};
pub use event_service::EventService;
pub use notification_service::{LogNotifier, NotificationService, Notifier};
pub use occurrence_service::OccurrenceService;
pub use venue_service::VenueService;
