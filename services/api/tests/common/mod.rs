//! Shared harness: the real router over the in-memory store, a pinned clock
//! and cheap password hashing.

#![allow(dead_code)]

use api_lib::{
    adapters::MemoryDb,
    config::Config,
    services::PasswordHashing,
    web::{router, state::AppState},
};
use argon2::Params;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use event_tracker_core::clock::FixedClock;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789";

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<FixedClock>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

pub fn test_app() -> TestApp {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("memory://".to_string()),
        "SESSION_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .expect("test config");

    // 2029-12-01 09:00 UTC, a month before most fixtures are scheduled.
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2029, 12, 1, 9, 0, 0).unwrap(),
    ));
    let db = Arc::new(MemoryDb::new(clock.clone()));
    let hashing = PasswordHashing::with_params(Params::new(8, 1, 1, None).unwrap());
    let state = AppState::with_hashing(Arc::new(config), db, clock.clone(), hashing)
        .expect("app state");

    TestApp {
        router: router(Arc::new(state)),
        clock,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/signup",
            Some(serde_json::json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/login",
            Some(serde_json::json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Signs up, logs in and returns the `token=...` pair for the `Cookie` header.
    pub async fn session_for(&self, email: &str) -> String {
        let signup = self.signup(email, "secret123").await;
        assert_eq!(signup.status, StatusCode::CREATED);
        let login = self.login(email, "secret123").await;
        assert_eq!(login.status, StatusCode::OK);
        login
            .set_cookie()
            .and_then(|c| c.split(';').next())
            .expect("session cookie")
            .to_string()
    }

    pub async fn create_event(&self, cookie: &str, event: Value) -> TestResponse {
        self.send(Method::POST, "/events", Some(event), Some(cookie)).await
    }
}
