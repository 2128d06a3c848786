pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query,
    },
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ServiceError;
use auth::{login_handler, logout_handler, me_handler, signup_handler};
use rest::{
    create_event_handler, delete_event_handler, get_event_handler, get_public_event_handler,
    list_events_handler, list_public_events_handler, ApiDoc,
};
pub use middleware::require_auth;
use state::AppState;

/// Largest accepted request body.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Unwraps a JSON body, turning a rejection into a 400 with the usual error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected request body");
        ServiceError::Validation(rejection.body_text())
    })
}

/// Unwraps a query string the same way `json_body` unwraps a body.
pub(crate) fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ServiceError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected query string");
        ServiceError::Validation(rejection.body_text())
    })
}

/// Builds the complete HTTP application: API routes, auth gate, CORS, tracing and Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.client_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/events/public", get(list_public_events_handler))
        .route("/events/public/{public_id}", get(get_public_event_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/events", post(create_event_handler).get(list_events_handler))
        .route("/events/{id}", get(get_event_handler).delete(delete_event_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
