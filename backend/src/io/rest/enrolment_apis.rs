//! # REST API for Enrolments
//!
//! Guardians enrol their children into occurrences and cancel those
//! enrolments. Admission rules live in the domain layer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info, warn};

use super::error::ApiError;
use super::mappers::EnrolmentMapper;
use crate::domain::errors::DomainError;
use crate::domain::models::Principal;
use crate::AppState;
use shared::EnrolOccurrenceRequest;

/// Enrol a child into an occurrence
pub async fn enrol_occurrence(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<EnrolOccurrenceRequest>,
) -> impl IntoResponse {
    info!("POST /api/enrolments - request: {:?}", request);

    let command = match EnrolmentMapper::to_enrol_command(&request) {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.enrolment_service.enrol_occurrence(command, &principal).await {
        Ok(enrolment) => {
            (StatusCode::CREATED, Json(EnrolmentMapper::to_response(enrolment))).into_response()
        }
        // Rejections are expected traffic; only unexpected failures are errors.
        Err(e @ (DomainError::Conflict(_) | DomainError::CapacityExceeded(_))) => {
            warn!("Enrolment rejected: {}", e);
            ApiError::from(e).into_response()
        }
        Err(e) => {
            error!("Failed to enrol child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Cancel a child's enrolment
pub async fn unenrol_occurrence(
    State(state): State<AppState>,
    principal: Principal,
    Path((child_id, occurrence_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/children/{}/occurrences/{}", child_id, occurrence_id);

    let command = match EnrolmentMapper::to_unenrol_command(&child_id, &occurrence_id) {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.enrolment_service.unenrol_occurrence(command, &principal).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to unenrol child {}: {}", child_id, e);
            ApiError::from(e).into_response()
        }
    }
}
