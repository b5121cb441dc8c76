//! # REST API for Occurrences
//!
//! Scheduling endpoints for staff and the filtered occurrence listing used
//! by guardians when picking a slot.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::OccurrenceMapper;
use crate::domain::global_id::{from_global_id, NodeType};
use crate::domain::models::Principal;
use crate::AppState;
use shared::{AddOccurrenceRequest, OccurrenceListRequest, UpdateOccurrenceRequest};

pub async fn add_occurrence(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddOccurrenceRequest>,
) -> impl IntoResponse {
    info!("POST /api/occurrences - request: {:?}", request);

    let command = match OccurrenceMapper::to_add_command(request) {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.occurrence_service.add_occurrence(command, &principal).await {
        Ok(stats) => (
            StatusCode::CREATED,
            Json(OccurrenceMapper::to_response(stats, "Occurrence created successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create occurrence: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_occurrence(
    State(state): State<AppState>,
    principal: Principal,
    Path(occurrence_id): Path<String>,
    Json(request): Json<UpdateOccurrenceRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/occurrences/{} - request: {:?}", occurrence_id, request);

    let command = match from_global_id(NodeType::Occurrence, &occurrence_id)
        .and_then(|id| OccurrenceMapper::to_update_command(id, request))
    {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.occurrence_service.update_occurrence(command, &principal).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(OccurrenceMapper::to_response(stats, "Occurrence updated successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update occurrence {}: {}", occurrence_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_occurrence(
    State(state): State<AppState>,
    principal: Principal,
    Path(occurrence_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/occurrences/{}", occurrence_id);

    let id = match from_global_id(NodeType::Occurrence, &occurrence_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.occurrence_service.delete_occurrence(id, &principal).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete occurrence {}: {}", occurrence_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_occurrence(
    State(state): State<AppState>,
    principal: Principal,
    Path(occurrence_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/occurrences/{}", occurrence_id);

    let id = match from_global_id(NodeType::Occurrence, &occurrence_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.occurrence_service.get_occurrence(id, &principal).await {
        Ok(stats) => (StatusCode::OK, Json(OccurrenceMapper::to_dto(stats))).into_response(),
        Err(e) => {
            error!("Failed to get occurrence {}: {}", occurrence_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// List occurrences matching every supplied filter, ordered by start time
pub async fn list_occurrences(
    State(state): State<AppState>,
    principal: Principal,
    Query(request): Query<OccurrenceListRequest>,
) -> impl IntoResponse {
    info!("GET /api/occurrences - query: {:?}", request);

    let query = match OccurrenceMapper::to_list_query(request) {
        Ok(query) => query,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.occurrence_service.list_occurrences(query, &principal).await {
        Ok(result) => (StatusCode::OK, Json(OccurrenceMapper::to_list_dto(result))).into_response(),
        Err(e) => {
            error!("Failed to list occurrences: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
