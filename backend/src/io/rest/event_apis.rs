//! # REST API for Event Management
//!
//! Staff endpoints for creating, updating, publishing and deleting events,
//! plus read endpoints available to every authenticated user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::error::ApiError;
use super::extractors::RequestLanguage;
use super::mappers::EventMapper;
use crate::domain::global_id::{from_global_id, NodeType};
use crate::domain::models::Principal;
use crate::AppState;
use shared::{AddEventRequest, EventListRequest, UpdateEventRequest};

/// Create a new draft event
pub async fn add_event(
    State(state): State<AppState>,
    principal: Principal,
    RequestLanguage(language): RequestLanguage,
    Json(request): Json<AddEventRequest>,
) -> impl IntoResponse {
    info!("POST /api/events - request: {:?}", request);

    let command = match EventMapper::to_add_command(request) {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.event_service.add_event(command, &principal).await {
        Ok(event) => (
            StatusCode::CREATED,
            Json(EventMapper::to_response(event, language, "Event created successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create event: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Partially update an event
pub async fn update_event(
    State(state): State<AppState>,
    principal: Principal,
    RequestLanguage(language): RequestLanguage,
    Path(event_id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/events/{} - request: {:?}", event_id, request);

    let command = match from_global_id(NodeType::Event, &event_id)
        .and_then(|id| EventMapper::to_update_command(id, request))
    {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.event_service.update_event(command, &principal).await {
        Ok(event) => (
            StatusCode::OK,
            Json(EventMapper::to_response(event, language, "Event updated successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update event {}: {}", event_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Delete an event together with its occurrences and enrolments
pub async fn delete_event(
    State(state): State<AppState>,
    principal: Principal,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/events/{}", event_id);

    let id = match from_global_id(NodeType::Event, &event_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.event_service.delete_event(id, &principal).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete event {}: {}", event_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Publish a draft event and notify guardians
pub async fn publish_event(
    State(state): State<AppState>,
    principal: Principal,
    RequestLanguage(language): RequestLanguage,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/events/{}/publish", event_id);

    let id = match from_global_id(NodeType::Event, &event_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.event_service.publish_event(id, &principal).await {
        Ok(event) => (
            StatusCode::OK,
            Json(EventMapper::to_response(event, language, "Event published successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to publish event {}: {}", event_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_event(
    State(state): State<AppState>,
    principal: Principal,
    RequestLanguage(language): RequestLanguage,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/events/{}", event_id);

    let id = match from_global_id(NodeType::Event, &event_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.event_service.get_event(id, &principal).await {
        Ok(event) => (StatusCode::OK, Json(EventMapper::to_dto(event, language))).into_response(),
        Err(e) => {
            error!("Failed to get event {}: {}", event_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_events(
    State(state): State<AppState>,
    principal: Principal,
    RequestLanguage(language): RequestLanguage,
    Query(request): Query<EventListRequest>,
) -> impl IntoResponse {
    info!("GET /api/events - query: {:?}", request);

    let query = match EventMapper::to_list_query(request) {
        Ok(query) => query,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.event_service.list_events(query, &principal).await {
        Ok(result) => {
            (StatusCode::OK, Json(EventMapper::to_list_dto(result, language))).into_response()
        }
        Err(e) => {
            error!("Failed to list events: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
