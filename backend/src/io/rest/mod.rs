//! # REST API Interface Layer
//!
//! HTTP endpoints for event scheduling and enrolment. This layer handles:
//! - JSON request/response serialization
//! - Decoding opaque identifiers and cursors into domain ids
//! - Extracting the acting principal and the response language
//! - Translating domain errors into HTTP status codes
//!
//! ## Design Principles
//!
//! - **Domain Separation**: Handlers translate and log; every rule lives in
//!   the domain services
//! - **Consistent Errors**: Every failure is a `{code, message}` JSON body
//! - **Request Logging**: One `info!` line per request, `error!` on failure

pub mod child_apis;
pub mod enrolment_apis;
pub mod error;
pub mod event_apis;
pub mod extractors;
pub mod health;
pub mod mappers;
pub mod occurrence_apis;
pub mod venue_apis;

pub use child_apis::*;
pub use enrolment_apis::*;
pub use event_apis::*;
pub use health::*;
pub use occurrence_apis::*;
pub use venue_apis::*;
