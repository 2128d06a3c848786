//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::ServiceError;
use crate::web::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Pulls the session token out of the `Cookie` header, if there is a non-empty one.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE).then_some(value)
        })
        .filter(|token| !token.is_empty())
}

/// Middleware that validates the session cookie and resolves the user.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// If missing or invalid, answers 401 before the handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = match session_token(req.headers()) {
        Some(token) => token.to_owned(),
        None => {
            debug!(path = %req.uri().path(), "Request without a session cookie");
            return Err(ServiceError::Unauthenticated);
        }
    };

    let user = state.sessions.validate_token(&token).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_the_token_among_other_cookies() {
        assert_eq!(session_token(&headers("theme=dark; token=abc.def; lang=en")), Some("abc.def"));
        assert_eq!(session_token(&headers("token=abc.def")), Some("abc.def"));
    }

    #[test]
    fn ignores_lookalikes_and_empty_values() {
        assert_eq!(session_token(&headers("xtoken=abc")), None);
        assert_eq!(session_token(&headers("token=")), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
