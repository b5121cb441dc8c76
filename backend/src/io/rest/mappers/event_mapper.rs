//! Conversions between event DTOs and domain events.

use crate::domain::commands::events::{
    AddEventCommand, EventListQuery, EventListResult, EventTranslationCommand, UpdateEventCommand,
};
use crate::domain::commands::pagination::PageRequest;
use crate::domain::errors::DomainResult;
use crate::domain::global_id::{decode_cursor, to_global_id, NodeType};
use crate::domain::models::{Event as DomainEvent, Language};
use shared::{
    AddEventRequest, Event as SharedEvent, EventListRequest, EventListResponse, EventResponse,
    EventTranslation as SharedTranslation, EventTranslationInput, UpdateEventRequest,
};
use uuid::Uuid;

use super::pagination_to_dto;

pub struct EventMapper;

impl EventMapper {
    pub fn to_add_command(request: AddEventRequest) -> DomainResult<AddEventCommand> {
        Ok(AddEventCommand {
            translations: Self::translations_to_domain(request.translations)?,
            duration: request.duration,
            participants_per_invite: request.participants_per_invite.parse()?,
            capacity_per_occurrence: request.capacity_per_occurrence,
            image: request.image,
        })
    }

    pub fn to_update_command(id: Uuid, request: UpdateEventRequest) -> DomainResult<UpdateEventCommand> {
        let delete_translations = request
            .delete_translations
            .unwrap_or_default()
            .iter()
            .map(|code| code.parse::<Language>())
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(UpdateEventCommand {
            id,
            duration: request.duration,
            participants_per_invite: request
                .participants_per_invite
                .map(|p| p.parse())
                .transpose()?,
            capacity_per_occurrence: request.capacity_per_occurrence,
            image: request.image,
            translations: Self::translations_to_domain(request.translations.unwrap_or_default())?,
            delete_translations,
        })
    }

    pub fn to_list_query(request: EventListRequest) -> DomainResult<EventListQuery> {
        let after = request.after.as_deref().map(decode_cursor).transpose()?;
        Ok(EventListQuery {
            page: PageRequest::new(request.limit, after),
        })
    }

    fn translations_to_domain(
        inputs: Vec<EventTranslationInput>,
    ) -> DomainResult<Vec<EventTranslationCommand>> {
        inputs
            .into_iter()
            .map(|input| {
                Ok(EventTranslationCommand {
                    language: input.language_code.parse()?,
                    name: input.name,
                    short_description: input.short_description.unwrap_or_default(),
                    description: input.description.unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Resolved texts use `language`, falling back to Finnish and then to
    /// whatever translation exists.
    pub fn to_dto(event: DomainEvent, language: Language) -> SharedEvent {
        let resolved = event.translation(language).cloned();

        SharedEvent {
            id: to_global_id(NodeType::Event, event.id),
            name: resolved.as_ref().map(|t| t.name.clone()),
            short_description: resolved.as_ref().map(|t| t.short_description.clone()),
            description: resolved.map(|t| t.description),
            duration: event.duration,
            participants_per_invite: event.participants_per_invite.as_str().to_string(),
            capacity_per_occurrence: event.capacity_per_occurrence,
            published_at: event.published_at.map(|t| t.to_rfc3339()),
            image: event.image,
            translations: event
                .translations
                .into_iter()
                .map(|(language, t)| SharedTranslation {
                    language_code: language.wire_code().to_string(),
                    name: t.name,
                    short_description: t.short_description,
                    description: t.description,
                })
                .collect(),
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }

    pub fn to_response(event: DomainEvent, language: Language, message: &str) -> EventResponse {
        EventResponse {
            event: Self::to_dto(event, language),
            success_message: message.to_string(),
        }
    }

    pub fn to_list_dto(result: EventListResult, language: Language) -> EventListResponse {
        EventListResponse {
            events: result
                .events
                .into_iter()
                .map(|e| Self::to_dto(e, language))
                .collect(),
            pagination: pagination_to_dto(result.pagination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::{EventTranslation, ParticipantsPerInvite, Translations};
    use chrono::Utc;

    fn event() -> DomainEvent {
        let mut translations = Translations::new();
        translations.insert(
            Language::Fi,
            EventTranslation {
                name: "Konsertti".into(),
                short_description: "Lyhyt".into(),
                description: "Pitkä".into(),
            },
        );
        translations.insert(
            Language::En,
            EventTranslation {
                name: "Concert".into(),
                short_description: "Short".into(),
                description: "Long".into(),
            },
        );
        DomainEvent {
            id: Uuid::new_v4(),
            duration: Some(30),
            participants_per_invite: ParticipantsPerInvite::ChildAndGuardian,
            capacity_per_occurrence: 8,
            published_at: None,
            image: None,
            translations,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_dto_resolves_language_with_fallback() {
        let dto = EventMapper::to_dto(event(), Language::En);
        assert_eq!(dto.name.as_deref(), Some("Concert"));
        assert_eq!(dto.participants_per_invite, "CHILD_AND_GUARDIAN");

        let dto = EventMapper::to_dto(event(), Language::Sv);
        assert_eq!(dto.name.as_deref(), Some("Konsertti"));
        assert_eq!(dto.translations[0].language_code, "FI");
    }

    #[test]
    fn test_add_request_with_unknown_language_is_rejected() {
        let request = AddEventRequest {
            translations: vec![EventTranslationInput {
                language_code: "DE".into(),
                name: "Konzert".into(),
                short_description: None,
                description: None,
            }],
            duration: None,
            participants_per_invite: "FAMILY".into(),
            capacity_per_occurrence: 3,
            image: None,
        };
        assert!(matches!(
            EventMapper::to_add_command(request),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_update_request_parses_deleted_languages() {
        let request = UpdateEventRequest {
            delete_translations: Some(vec!["sv".into(), "EN".into()]),
            ..Default::default()
        };
        let command = EventMapper::to_update_command(Uuid::new_v4(), request).unwrap();
        assert_eq!(command.delete_translations, vec![Language::Sv, Language::En]);
        assert!(command.translations.is_empty());
    }
}
