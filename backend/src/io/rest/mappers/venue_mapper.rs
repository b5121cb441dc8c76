use crate::domain::commands::venues::AddVenueCommand;
use crate::domain::errors::DomainResult;
use crate::domain::global_id::{to_global_id, NodeType};
use crate::domain::models::{Venue as DomainVenue, VenueTranslation};
use shared::{
    AddVenueRequest, Venue as SharedVenue, VenueResponse, VenueTranslation as SharedTranslation,
};

pub struct VenueMapper;

impl VenueMapper {
    pub fn to_add_command(request: AddVenueRequest) -> DomainResult<AddVenueCommand> {
        let translations = request
            .translations
            .into_iter()
            .map(|input| {
                Ok((
                    input.language_code.parse()?,
                    VenueTranslation {
                        name: input.name,
                        description: input.description.unwrap_or_default(),
                        address: input.address.unwrap_or_default(),
                        accessibility_info: input.accessibility_info.unwrap_or_default(),
                        additional_info: input.additional_info.unwrap_or_default(),
                        arrival_instructions: input.arrival_instructions.unwrap_or_default(),
                        www_url: input.www_url.unwrap_or_default(),
                    },
                ))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(AddVenueCommand { translations })
    }

    pub fn to_dto(venue: DomainVenue) -> SharedVenue {
        SharedVenue {
            id: to_global_id(NodeType::Venue, venue.id),
            translations: venue
                .translations
                .into_iter()
                .map(|(language, t)| SharedTranslation {
                    language_code: language.wire_code().to_string(),
                    name: t.name,
                    description: t.description,
                    address: t.address,
                    accessibility_info: t.accessibility_info,
                    additional_info: t.additional_info,
                    arrival_instructions: t.arrival_instructions,
                    www_url: t.www_url,
                })
                .collect(),
            created_at: venue.created_at.to_rfc3339(),
        }
    }

    pub fn to_response(venue: DomainVenue, message: &str) -> VenueResponse {
        VenueResponse {
            venue: Self::to_dto(venue),
            success_message: message.to_string(),
        }
    }
}
