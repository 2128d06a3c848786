//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and session lookup.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Duration;
use event_tracker_core::domain::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, ServiceError};
use crate::services::SESSION_TTL_DAYS;
use crate::web::json_body;
use crate::web::middleware::SESSION_COOKIE;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for AuthResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

//=========================================================================================
// Session Cookie
//=========================================================================================

/// `Set-Cookie` value carrying `token` for `max_age_secs`.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        max_age_secs,
        if secure { "; Secure" } else { "" }
    )
}

/// `Set-Cookie` value telling the browser to drop the session.
pub fn cleared_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (
            status = 400,
            description = "Missing fields or email already in use",
            body = ErrorResponse
        ),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let req = json_body(payload)?;
    info!(email = %req.email, "Signup attempt");

    let user = state.sessions.signup(&req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(user))))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let req = json_body(payload)?;
    info!(email = %req.email, "Login attempt");

    let session = state.sessions.login(&req.email, &req.password).await?;

    let cookie = session_cookie(
        &session.token,
        Duration::days(SESSION_TTL_DAYS).num_seconds(),
        state.config.secure_cookies,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(session.user)),
    ))
}

/// POST /auth/logout - Tell the client to discard its session cookie
///
/// Stateless: the token itself stays valid until it expires.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logout successful, cookie cleared"),
        (status = 401, description = "No valid session", body = ErrorResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> impl IntoResponse {
    info!(user_id = %user.id, "Logout");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie(state.config.secure_cookies))],
    )
}

/// GET /auth/me - The user behind the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "No valid session", body = ErrorResponse)
    )
)]
pub async fn me_handler(Extension(user): Extension<User>) -> Json<AuthResponse> {
    info!(user_id = %user.id, "Me requested");
    Json(AuthResponse::from(user))
}
