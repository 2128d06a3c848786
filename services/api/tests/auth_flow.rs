//! Signup, login, session gate and logout over HTTP.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::Duration;
use common::test_app;
use serde_json::json;

#[tokio::test]
async fn signup_returns_identity_without_secrets() {
    let app = test_app();
    let res = app.signup("a@x.com", "secret123").await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["email"], "a@x.com");
    assert!(res.body["id"].is_string());
    let fields: Vec<&String> = res.body.as_object().unwrap().keys().collect();
    assert_eq!(fields.len(), 2, "unexpected fields: {:?}", fields);
    assert!(res.set_cookie().is_none());
}

#[tokio::test]
async fn signup_rejects_missing_fields_and_duplicates() {
    let app = test_app();

    let missing = app
        .send(Method::POST, "/auth/signup", Some(json!({ "email": "a@x.com" })), None)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), "Email and password are required");

    assert_eq!(app.signup("a@x.com", "secret123").await.status, StatusCode::CREATED);
    let duplicate = app.signup("a@x.com", "other-password").await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.message(), "Email already in use");
}

#[tokio::test]
async fn concurrent_signups_for_one_email_admit_exactly_one() {
    let app = test_app();
    let (first, second) = tokio::join!(
        app.signup("a@x.com", "secret123"),
        app.signup("a@x.com", "other-password"),
    );

    let mut statuses = [first.status.as_u16(), second.status.as_u16()];
    statuses.sort();
    assert_eq!(statuses, [201, 400]);
    let loser = if first.status == StatusCode::BAD_REQUEST { &first } else { &second };
    assert_eq!(loser.message(), "Email already in use");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let res = app.send_request(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(!res.message().is_empty());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_get_the_same_answer() {
    let app = test_app();
    app.signup("a@x.com", "secret123").await;

    let wrong = app.login("a@x.com", "wrong").await;
    let unknown = app.login("nobody@x.com", "secret123").await;

    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.message(), "Invalid credentials");
    assert_eq!(wrong.body, unknown.body);
    assert!(wrong.set_cookie().is_none());
}

#[tokio::test]
async fn login_sets_an_http_only_week_long_cookie() {
    let app = test_app();
    app.signup("a@x.com", "secret123").await;

    let res = app.login("a@x.com", "secret123").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "a@x.com");

    let cookie = res.set_cookie().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"), "development config must not set Secure");
}

#[tokio::test]
async fn me_resolves_the_session_user() {
    let app = test_app();
    let cookie = app.session_for("a@x.com").await;

    let res = app.send(Method::GET, "/auth/me", None, Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "a@x.com");
}

#[tokio::test]
async fn gate_rejects_missing_and_forged_sessions() {
    let app = test_app();
    let cookie = app.session_for("a@x.com").await;

    let missing = app.send(Method::GET, "/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Unauthorized");

    let garbage = app.send(Method::GET, "/auth/me", None, Some("token=garbage")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    // Flip the last signature character.
    let mut forged = cookie.clone();
    let last = forged.pop().unwrap();
    forged.push(if last == 'A' { 'B' } else { 'A' });
    let tampered = app.send(Method::GET, "/auth/me", None, Some(&forged)).await;
    assert_eq!(tampered.status, StatusCode::UNAUTHORIZED);
    assert_eq!(tampered.body, missing.body);
}

#[tokio::test]
async fn expired_session_is_rejected_everywhere() {
    let app = test_app();
    let cookie = app.session_for("a@x.com").await;

    app.clock.advance(Duration::days(7) - Duration::seconds(1));
    assert_eq!(
        app.send(Method::GET, "/auth/me", None, Some(&cookie)).await.status,
        StatusCode::OK
    );

    app.clock.advance(Duration::seconds(1));
    for (method, uri) in [
        (Method::GET, "/auth/me"),
        (Method::GET, "/events"),
        (Method::GET, "/events/1"),
        (Method::DELETE, "/events/1"),
        (Method::POST, "/auth/logout"),
    ] {
        let res = app.send(method.clone(), uri, None, Some(&cookie)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
    let create = app
        .create_event(
            &cookie,
            json!({ "title": "t", "dateTime": "2030-01-01T10:00", "location": "" }),
        )
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_cookie_but_cannot_revoke_the_token() {
    let app = test_app();
    let cookie = app.session_for("a@x.com").await;

    let res = app.send(Method::POST, "/auth/logout", None, Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let cleared = res.set_cookie().unwrap();
    assert!(cleared.starts_with("token=;"));
    assert!(cleared.contains("Max-Age=0"));

    // Stateless sessions: a copy of the token kept by the client still works until expiry.
    let replay = app.send(Method::GET, "/auth/me", None, Some(&cookie)).await;
    assert_eq!(replay.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_requires_a_session() {
    let app = test_app();
    let res = app.send(Method::POST, "/auth/logout", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
