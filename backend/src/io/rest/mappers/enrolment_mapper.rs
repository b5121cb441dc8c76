use crate::domain::commands::enrolments::{EnrolCommand, UnenrolCommand};
use crate::domain::errors::DomainResult;
use crate::domain::global_id::{from_global_id, to_global_id, NodeType};
use crate::domain::models::Enrolment as DomainEnrolment;
use shared::{EnrolOccurrenceRequest, Enrolment as SharedEnrolment, EnrolmentResponse};

pub struct EnrolmentMapper;

impl EnrolmentMapper {
    pub fn to_enrol_command(request: &EnrolOccurrenceRequest) -> DomainResult<EnrolCommand> {
        Ok(EnrolCommand {
            child_id: from_global_id(NodeType::Child, &request.child_id)?,
            occurrence_id: from_global_id(NodeType::Occurrence, &request.occurrence_id)?,
        })
    }

    pub fn to_unenrol_command(child_id: &str, occurrence_id: &str) -> DomainResult<UnenrolCommand> {
        Ok(UnenrolCommand {
            child_id: from_global_id(NodeType::Child, child_id)?,
            occurrence_id: from_global_id(NodeType::Occurrence, occurrence_id)?,
        })
    }

    pub fn to_response(enrolment: DomainEnrolment) -> EnrolmentResponse {
        EnrolmentResponse {
            enrolment: SharedEnrolment {
                id: to_global_id(NodeType::Enrolment, enrolment.id),
                child_id: to_global_id(NodeType::Child, enrolment.child_id),
                occurrence_id: to_global_id(NodeType::Occurrence, enrolment.occurrence_id),
                created_at: enrolment.created_at.to_rfc3339(),
            },
            success_message: "Enrolment created successfully".to_string(),
        }
    }
}
