pub mod child_mapper;
pub mod enrolment_mapper;
pub mod event_mapper;
pub mod occurrence_mapper;
pub mod venue_mapper;

pub use child_mapper::ChildMapper;
pub use enrolment_mapper::EnrolmentMapper;
pub use event_mapper::EventMapper;
pub use occurrence_mapper::OccurrenceMapper;
pub use venue_mapper::VenueMapper;

use crate::domain::commands::pagination::PaginationInfo;

pub(crate) fn pagination_to_dto(info: PaginationInfo) -> shared::PaginationInfo {
    shared::PaginationInfo {
        has_more: info.has_more,
        next_cursor: info.next_cursor,
    }
}
