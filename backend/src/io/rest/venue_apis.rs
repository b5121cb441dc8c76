use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::VenueMapper;
use crate::domain::global_id::{from_global_id, NodeType};
use crate::domain::models::Principal;
use crate::AppState;
use shared::AddVenueRequest;

/// Create a venue
pub async fn add_venue(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddVenueRequest>,
) -> impl IntoResponse {
    info!("POST /api/venues - request: {:?}", request);

    let command = match VenueMapper::to_add_command(request) {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.venue_service.add_venue(command, &principal).await {
        Ok(venue) => (
            StatusCode::CREATED,
            Json(VenueMapper::to_response(venue, "Venue created successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create venue: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Get a venue by ID
pub async fn get_venue(
    State(state): State<AppState>,
    principal: Principal,
    Path(venue_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/venues/{}", venue_id);

    let id = match from_global_id(NodeType::Venue, &venue_id) {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.venue_service.get_venue(id, &principal).await {
        Ok(venue) => (StatusCode::OK, Json(VenueMapper::to_dto(venue))).into_response(),
        Err(e) => {
            error!("Failed to get venue {}: {}", venue_id, e);
            ApiError::from(e).into_response()
        }
    }
}
