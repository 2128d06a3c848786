//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the event endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use event_tracker_core::domain::{Event, EventFilter, PublicEventView, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorResponse, ServiceError};
use crate::services::EventDraft;
use crate::web::auth::{self, AuthResponse, LoginRequest, SignupRequest};
use crate::web::{json_body, query_params};
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        create_event_handler,
        list_events_handler,
        get_event_handler,
        delete_event_handler,
        list_public_events_handler,
        get_public_event_handler,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            AuthResponse,
            CreateEventRequest,
            EventResponse,
            PublicEventResponse,
            ErrorResponse
        )
    ),
    tags(
        (
            name = "Event Tracker API",
            description = "Personal calendar events with optional public sharing."
        )
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
    pub date_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub share_public: Option<bool>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    /// `upcoming`, `past` or `all` (default).
    pub filter: Option<String>,
}

/// An event as its owner sees it.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub user_id: Uuid,
    pub public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            date_time: event.date_time,
            location: event.location,
            description: event.description,
            user_id: event.user_id,
            public_id: event.public_id,
            created_at: event.created_at,
        }
    }
}

/// A published event as anyone sees it. No owner, no internal id.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicEventResponse {
    pub public_id: String,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<PublicEventView> for PublicEventResponse {
    fn from(view: PublicEventView) -> Self {
        Self {
            public_id: view.public_id,
            title: view.title,
            date_time: view.date_time,
            location: view.location,
            description: view.description,
            created_at: view.created_at,
        }
    }
}

fn parse_event_id(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>().map_err(|_| {
        warn!(raw_id = %raw, "Rejected malformed event id");
        ServiceError::Validation("Invalid id".to_string())
    })
}

//=========================================================================================
// Private Event Handlers
//=========================================================================================

/// Create an event owned by the current user.
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Missing fields or invalid dateTime", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse)
    )
)]
pub async fn create_event_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let req = json_body(payload)?;
    info!(user_id = %user.id, "CreateEvent attempt");

    let draft = EventDraft {
        title: req.title,
        date_time: req.date_time,
        location: req.location,
        description: req.description,
        share_public: req.share_public.unwrap_or(false),
    };
    let event = state.events.create(&user, draft).await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// List the current user's events, ascending by date.
#[utoipa::path(
    get,
    path = "/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "The user's events", body = [EventResponse]),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse)
    )
)]
pub async fn list_events_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<Vec<EventResponse>>, ServiceError> {
    let query = query_params(query)?;
    let filter = EventFilter::parse(query.filter.as_deref());
    info!(user_id = %user.id, filter = filter.as_str(), "ListEvents requested");

    let events = state.events.list(&user, filter).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

/// Fetch one of the current user's events.
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Internal event id")),
    responses(
        (status = 200, description = "The event", body = EventResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Event belongs to someone else", body = ErrorResponse),
        (status = 404, description = "No such event", body = ErrorResponse)
    )
)]
pub async fn get_event_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
) -> Result<Json<EventResponse>, ServiceError> {
    let event_id = parse_event_id(&raw_id)?;
    info!(user_id = %user.id, event_id, "GetEvent requested");

    let event = state.events.get(&user, event_id).await?;
    Ok(Json(EventResponse::from(event)))
}

/// Permanently delete one of the current user's events.
#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Internal event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Event belongs to someone else", body = ErrorResponse),
        (status = 404, description = "No such event", body = ErrorResponse)
    )
)]
pub async fn delete_event_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let event_id = parse_event_id(&raw_id)?;
    info!(user_id = %user.id, event_id, "DeleteEvent requested");

    state.events.delete(&user, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Public Event Handlers (no session)
//=========================================================================================

/// List every published event, across all owners.
#[utoipa::path(
    get,
    path = "/events/public",
    responses(
        (status = 200, description = "Published events", body = [PublicEventResponse])
    )
)]
pub async fn list_public_events_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicEventResponse>>, ServiceError> {
    info!("GetPublicEvents requested");
    let views = state.events.list_public().await?;
    Ok(Json(views.into_iter().map(PublicEventResponse::from).collect()))
}

/// Fetch a published event by its public identifier.
#[utoipa::path(
    get,
    path = "/events/public/{public_id}",
    params(("public_id" = String, Path, description = "Public identifier handed out at creation")),
    responses(
        (status = 200, description = "The published event", body = PublicEventResponse),
        (status = 404, description = "No event with that public identifier", body = ErrorResponse)
    )
)]
pub async fn get_public_event_handler(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
) -> Result<Json<PublicEventResponse>, ServiceError> {
    info!(public_id = %public_id, "GetPublicEvent requested");
    let view = state.events.get_public(&public_id).await?;
    Ok(Json(PublicEventResponse::from(view)))
}
