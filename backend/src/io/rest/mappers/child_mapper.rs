use crate::domain::commands::children::AddChildCommand;
use crate::domain::errors::DomainResult;
use crate::domain::global_id::{to_global_id, NodeType};
use crate::domain::models::{Child as DomainChild, Language};
use shared::{AddChildRequest, Child as SharedChild, ChildResponse};

/// Mapper to convert between shared Child DTOs and domain Child models.
pub struct ChildMapper;

impl ChildMapper {
    pub fn to_add_command(request: AddChildRequest) -> DomainResult<AddChildCommand> {
        Ok(AddChildCommand {
            first_name: request.first_name,
            guardian_email: request.guardian_email,
            guardian_language: request
                .guardian_language
                .map(|code| code.parse())
                .transpose()?
                .unwrap_or(Language::DEFAULT),
        })
    }

    pub fn to_response(child: DomainChild) -> ChildResponse {
        ChildResponse {
            child: SharedChild {
                id: to_global_id(NodeType::Child, child.id),
                first_name: child.first_name,
            },
            success_message: "Child created successfully".to_string(),
        }
    }
}
