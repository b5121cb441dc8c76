pub mod child;
pub mod enrolment;
pub mod event;
pub mod language;
pub mod occurrence;
pub mod principal;
pub mod venue;

pub use child::{Child, Guardian};
pub use enrolment::Enrolment;
pub use event::{Event, EventTranslation, ParticipantsPerInvite};
pub use language::{Language, Translations};
pub use occurrence::{Occurrence, OccurrenceWithStats};
pub use principal::Principal;
pub use venue::{Venue, VenueTranslation};
