//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services. It turns
//! requests into domain commands, runs them on behalf of the acting
//! principal and formats the results as shared wire types.
//!
//! ## Supported Operations
//!
//! - **/api/events**: Event CRUD and one-time publication
//! - **/api/occurrences**: Occurrence CRUD and filtered, paginated listing
//! - **/api/enrolments**: Enrol a child into an occurrence
//! - **/api/children/:child_id/occurrences/:occurrence_id**: Cancel an enrolment
//! - **/api/venues**, **/api/children**: Supporting records

pub mod rest;

pub use rest::*;
