use crate::domain::commands::occurrences::{
    AddOccurrenceCommand, LanguageFilter, OccurrenceFilter, OccurrenceListQuery,
    OccurrenceListResult, TimeOfDayFilter, UpdateOccurrenceCommand,
};
use crate::domain::commands::pagination::PageRequest;
use crate::domain::errors::DomainResult;
use crate::domain::global_id::{decode_cursor, from_global_id, to_global_id, NodeType};
use crate::domain::models::OccurrenceWithStats;
use crate::domain::time_utils::{parse_date, parse_instant, parse_time_of_day};
use shared::{
    AddOccurrenceRequest, Occurrence as SharedOccurrence, OccurrenceListRequest,
    OccurrenceListResponse, OccurrenceResponse, UpdateOccurrenceRequest,
};
use uuid::Uuid;

use super::pagination_to_dto;

/// Mapper between occurrence DTOs and domain types.
pub struct OccurrenceMapper;

impl OccurrenceMapper {
    pub fn to_add_command(request: AddOccurrenceRequest) -> DomainResult<AddOccurrenceCommand> {
        Ok(AddOccurrenceCommand {
            event_id: from_global_id(NodeType::Event, &request.event_id)?,
            venue_id: from_global_id(NodeType::Venue, &request.venue_id)?,
            time: parse_instant(&request.time)?,
            occurrence_language: request
                .occurrence_language
                .map(|code| code.parse())
                .transpose()?,
        })
    }

    pub fn to_update_command(
        id: Uuid,
        request: UpdateOccurrenceRequest,
    ) -> DomainResult<UpdateOccurrenceCommand> {
        Ok(UpdateOccurrenceCommand {
            id,
            time: request.time.as_deref().map(parse_instant).transpose()?,
            event_id: request
                .event_id
                .as_deref()
                .map(|token| from_global_id(NodeType::Event, token))
                .transpose()?,
            venue_id: request
                .venue_id
                .as_deref()
                .map(|token| from_global_id(NodeType::Venue, token))
                .transpose()?,
            occurrence_language: request
                .occurrence_language
                .map(|code| code.parse())
                .transpose()?,
        })
    }

    pub fn to_list_query(request: OccurrenceListRequest) -> DomainResult<OccurrenceListQuery> {
        let time = match request.time.as_deref() {
            Some(value) => {
                let (time, offset) = parse_time_of_day(value)?;
                Some(TimeOfDayFilter { time, offset })
            }
            None => None,
        };

        let filter = OccurrenceFilter {
            date: request.date.as_deref().map(parse_date).transpose()?,
            time,
            upcoming: request.upcoming.unwrap_or(false),
            venue_id: request
                .venue_id
                .as_deref()
                .map(|token| from_global_id(NodeType::Venue, token))
                .transpose()?,
            event_id: request
                .event_id
                .as_deref()
                .map(|token| from_global_id(NodeType::Event, token))
                .transpose()?,
            occurrence_language: request
                .occurrence_language
                .as_deref()
                .map(LanguageFilter::parse),
        };

        let after = request.after.as_deref().map(decode_cursor).transpose()?;

        Ok(OccurrenceListQuery {
            filter,
            page: PageRequest::new(request.limit, after),
        })
    }

    pub fn to_dto(stats: OccurrenceWithStats) -> SharedOccurrence {
        let remaining_capacity = stats.remaining_capacity();
        let occurrence = stats.occurrence;

        SharedOccurrence {
            id: to_global_id(NodeType::Occurrence, occurrence.id),
            event_id: to_global_id(NodeType::Event, occurrence.event_id),
            venue_id: to_global_id(NodeType::Venue, occurrence.venue_id),
            time: occurrence.time.to_rfc3339(),
            occurrence_language: occurrence.occurrence_language.wire_code().to_string(),
            enrolment_count: stats.enrolment_count,
            remaining_capacity,
            created_at: occurrence.created_at.to_rfc3339(),
            updated_at: occurrence.updated_at.to_rfc3339(),
        }
    }

    pub fn to_response(stats: OccurrenceWithStats, message: &str) -> OccurrenceResponse {
        OccurrenceResponse {
            occurrence: Self::to_dto(stats),
            success_message: message.to_string(),
        }
    }

    pub fn to_list_dto(result: OccurrenceListResult) -> OccurrenceListResponse {
        OccurrenceListResponse {
            occurrences: result.occurrences.into_iter().map(Self::to_dto).collect(),
            pagination: pagination_to_dto(result.pagination),
        }
    }
}
