//! # Event Desk Backend
//!
//! Scheduling and enrolment backend for children's events. Staff publish
//! events and schedule occurrences at venues; guardians enrol their
//! children into those occurrences.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! HTTP clients
//!     ↓
//! IO Layer (REST API, handlers, DTO mappers)
//!     ↓
//! Domain Layer (Admission engine, services, business rules)
//!     ↓
//! Storage Layer (SQLite repositories, write transactions)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize and configure the application state
//! - Set up the REST API router with CORS configuration
//! - Coordinate between domain logic and data persistence

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::time_utils::LocalTimeZone;
use crate::domain::{
    ChildService, EnrolmentService, EventService, LogNotifier, NotificationService, Notifier,
    OccurrenceService, VenueService,
};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
    pub event_service: EventService,
    pub occurrence_service: OccurrenceService,
    pub enrolment_service: EnrolmentService,
    pub venue_service: VenueService,
    pub child_service: ChildService,
}

impl AppState {
    pub fn new(db: DbConnection, time_zone: LocalTimeZone, notifier: Arc<dyn Notifier>) -> Self {
        let notification_service = NotificationService::new(db.clone(), notifier);

        Self {
            event_service: EventService::new(db.clone(), notification_service),
            occurrence_service: OccurrenceService::new(db.clone(), time_zone),
            enrolment_service: EnrolmentService::new(db.clone()),
            venue_service: VenueService::new(db.clone()),
            child_service: ChildService::new(db.clone()),
            db,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::connect(&config.database_url, config.db_max_connections).await?;

    info!("Setting up domain services (time zone {})", config.time_zone.tz());
    Ok(AppState::new(db, config.time_zone, Arc::new(LogNotifier)))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/events", get(io::list_events).post(io::add_event))
        .route(
            "/events/:event_id",
            get(io::get_event)
                .patch(io::update_event)
                .delete(io::delete_event),
        )
        .route("/events/:event_id/publish", post(io::publish_event))
        .route(
            "/occurrences",
            get(io::list_occurrences).post(io::add_occurrence),
        )
        .route(
            "/occurrences/:occurrence_id",
            get(io::get_occurrence)
                .patch(io::update_occurrence)
                .delete(io::delete_occurrence),
        )
        .route("/enrolments", post(io::enrol_occurrence))
        .route("/children", post(io::add_child))
        .route(
            "/children/:child_id/occurrences/:occurrence_id",
            delete(io::unenrol_occurrence),
        )
        .route("/venues", post(io::add_venue))
        .route("/venues/:venue_id", get(io::get_venue));

    Ok(Router::new()
        .route("/health", get(io::health))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::global_id::{to_global_id, NodeType};
    use crate::domain::models::Language;
    use crate::io::extractors::{USER_ID_HEADER, USER_ROLE_HEADER};
    use crate::storage::test_utils::TestEnvironment;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn setup() -> (TestEnvironment, Router) {
        let env = TestEnvironment::new().await.unwrap();
        let state = AppState::new(env.db.clone(), LocalTimeZone::default(), Arc::new(LogNotifier));
        let router = create_router(state, "http://localhost:8080").unwrap();
        (env, router)
    }

    fn request(method: &str, uri: &str, user: Option<(Uuid, bool)>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((user_id, is_staff)) = user {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
            if is_staff {
                builder = builder.header(USER_ROLE_HEADER, "staff");
            }
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (_env, router) = setup().await;
        let (status, body) = send(&router, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthenticated() {
        let (_env, router) = setup().await;
        let (status, body) = send(&router, request("GET", "/api/events", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_guardian_cannot_create_event() {
        let (_env, router) = setup().await;
        let payload = json!({
            "translations": [{"language_code": "FI", "name": "Konsertti"}],
            "participants_per_invite": "FAMILY",
            "capacity_per_occurrence": 10
        });
        let (status, body) = send(
            &router,
            request("POST", "/api/events", Some((Uuid::new_v4(), false)), Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_staff_creates_and_publishes_event() {
        let (_env, router) = setup().await;
        let staff = Some((Uuid::new_v4(), true));
        let payload = json!({
            "translations": [
                {"language_code": "FI", "name": "Konsertti"},
                {"language_code": "EN", "name": "Concert"}
            ],
            "participants_per_invite": "CHILD_AND_GUARDIAN",
            "capacity_per_occurrence": 10
        });

        let (status, body) = send(&router, request("POST", "/api/events", staff, Some(payload))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["event"]["published_at"].is_null());
        let event_id = body["event"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/events/{}/publish", event_id);
        let (status, body) = send(&router, request("POST", &uri, staff, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["event"]["published_at"].is_string());

        let (status, body) = send(&router, request("POST", &uri, staff, None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let mut get = request("GET", &format!("/api/events/{}", event_id), staff, None);
        get.headers_mut()
            .insert("accept-language", HeaderValue::from_static("en-GB,en;q=0.9"));
        let (status, body) = send(&router, get).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Concert");
    }

    #[tokio::test]
    async fn test_enrolment_flow_over_http() {
        let (env, router) = setup().await;
        let guardian_id = Uuid::new_v4();
        let guardian = Some((guardian_id, false));

        let event = env.seed_event("Konsertti", 1).await.unwrap();
        let venue = env.seed_venue("Sali").await.unwrap();
        let occurrence = env
            .seed_occurrence(event.id, venue.id, Utc::now() + Duration::days(3), Language::Fi)
            .await
            .unwrap();
        let first = env.seed_child("Aino", guardian_id).await.unwrap();
        let second = env.seed_child("Eero", guardian_id).await.unwrap();

        let occurrence_token = to_global_id(NodeType::Occurrence, occurrence.id);
        let enrol = |child_id: Uuid| {
            json!({
                "child_id": to_global_id(NodeType::Child, child_id),
                "occurrence_id": occurrence_token,
            })
        };

        let (status, body) =
            send(&router, request("POST", "/api/enrolments", guardian, Some(enrol(first.id)))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["enrolment"]["occurrence_id"], occurrence_token.as_str());

        let (status, body) =
            send(&router, request("POST", "/api/enrolments", guardian, Some(enrol(second.id)))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CAPACITY_EXCEEDED");

        let uri = format!("/api/occurrences/{}", occurrence_token);
        let (_, body) = send(&router, request("GET", &uri, guardian, None)).await;
        assert_eq!(body["enrolment_count"], 1);
        assert_eq!(body["remaining_capacity"], 0);

        let uri = format!(
            "/api/children/{}/occurrences/{}",
            to_global_id(NodeType::Child, first.id),
            occurrence_token
        );
        let (status, _) = send(&router, request("DELETE", &uri, guardian, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) =
            send(&router, request("POST", "/api/enrolments", guardian, Some(enrol(second.id)))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_occurrence_language_filter_is_case_insensitive() {
        let (env, router) = setup().await;
        let user = Some((Uuid::new_v4(), false));
        let event = env.seed_event("Teatteri", 5).await.unwrap();
        let venue = env.seed_venue("Lava").await.unwrap();
        let start = Utc::now() + Duration::days(1);
        env.seed_occurrence(event.id, venue.id, start, Language::Fi).await.unwrap();
        env.seed_occurrence(event.id, venue.id, start, Language::Sv).await.unwrap();

        let (status, upper) = send(
            &router,
            request("GET", "/api/occurrences?occurrence_language=FI", user, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, lower) = send(
            &router,
            request("GET", "/api/occurrences?occurrence_language=fi", user, None),
        )
        .await;

        assert_eq!(upper["occurrences"].as_array().unwrap().len(), 1);
        assert_eq!(upper, lower);

        let (status, body) = send(
            &router,
            request("GET", "/api/occurrences?occurrence_language=de", user, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["occurrences"].as_array().unwrap().is_empty());
        assert_eq!(body["pagination"]["has_more"], false);
    }

    #[tokio::test]
    async fn test_time_filter_accepts_unescaped_plus() {
        let (env, router) = setup().await;
        let user = Some((Uuid::new_v4(), false));
        let event = env.seed_event("Teatteri", 5).await.unwrap();
        let venue = env.seed_venue("Lava").await.unwrap();
        for hour in [7, 8, 9] {
            let start = Utc::now() + Duration::days(1);
            let start = start.date_naive().and_hms_opt(hour, 0, 0).unwrap().and_utc();
            env.seed_occurrence(event.id, venue.id, start, Language::Fi).await.unwrap();
        }

        let (status, plain) =
            send(&router, request("GET", "/api/occurrences?time=10:00+02:00", user, None)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, escaped) =
            send(&router, request("GET", "/api/occurrences?time=10:00%2B02:00", user, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plain, escaped);
    }

    #[tokio::test]
    async fn test_malformed_ids_are_validation_errors() {
        let (_env, router) = setup().await;
        let user = Some((Uuid::new_v4(), false));

        let (status, body) =
            send(&router, request("GET", "/api/events/not-a-token", user, None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &router,
            request("GET", "/api/events/00000000-0000-0000-0000-000000000000", user, None),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let missing = to_global_id(NodeType::Event, Uuid::new_v4());
        let (status, body) =
            send(&router, request("GET", &format!("/api/events/{}", missing), user, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Event matching query does not exist");
    }

    #[tokio::test]
    async fn test_invalid_cors_origin_is_rejected() {
        let env = TestEnvironment::new().await.unwrap();
        let state = AppState::new(env.db.clone(), LocalTimeZone::default(), Arc::new(LogNotifier));
        assert!(create_router(state, "bad\norigin").is_err());
    }
}
