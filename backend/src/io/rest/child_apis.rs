//! # REST API for Children
//!
//! Guardians register their children here before enrolling them.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::ChildMapper;
use crate::domain::models::Principal;
use crate::AppState;
use shared::AddChildRequest;

/// Register a child under the acting guardian
pub async fn add_child(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddChildRequest>,
) -> impl IntoResponse {
    info!("POST /api/children - user: {}", principal.user_id);

    let command = match ChildMapper::to_add_command(request) {
        Ok(command) => command,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match state.child_service.add_child(command, &principal).await {
        Ok(child) => (StatusCode::CREATED, Json(ChildMapper::to_response(child))).into_response(),
        Err(e) => {
            error!("Failed to create child: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
