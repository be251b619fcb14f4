//! Common test utilities and harness for Mindwell API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use mindwell_api::accounts::{self, NewAccount};
use mindwell_api::{AppState, routes};
use mindwell_auth::JwtKeys;
use mindwell_core::{ClinicHours, Role, User};
use mindwell_mail::MemoryMailer;
use mindwell_storage::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";

/// Test harness: the full router over an in-memory store and mailbox.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<MemoryMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        let mailer = Arc::new(MemoryMailer::new());
        let state = Arc::new(AppState::new(
            Arc::new(MemoryStore::new()),
            mailer.clone(),
            JwtKeys::new(b"test-secret", Duration::hours(24)),
            ClinicHours::default(),
            Duration::minutes(60),
        ));
        Self {
            router: routes::router(state.clone()),
            state,
            mailer,
        }
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Register a patient through the API; returns `(token, user id)`.
    pub async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                serde_json::json!({
                    "name": "Pat",
                    "surname": "Ient",
                    "email": email,
                    "password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create an account directly in the store; returns `(token, user)`.
    pub async fn create_user(&self, role: Role, email: &str) -> (String, User) {
        let user = accounts::create_account(
            &self.state,
            NewAccount {
                name: "Test".to_string(),
                surname: role.as_str().to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                role,
                phone: None,
                bio: None,
                specialization: Some("Anxiety".to_string()),
            },
        )
        .await
        .unwrap();
        let token = self.state.jwt.issue(&user).unwrap();
        (token, user)
    }

    pub async fn admin(&self) -> (String, User) {
        self.create_user(Role::Admin, "admin@mindwell.test").await
    }

    pub async fn psychologist(&self) -> (String, User) {
        self.create_user(Role::Psychologist, "psy@mindwell.test").await
    }

    pub async fn patient(&self) -> (String, User) {
        self.create_user(Role::Patient, "patient@mindwell.test").await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// The Monday at least two weeks from today.
pub fn future_monday() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(14);
    while day.weekday() != Weekday::Mon {
        day += Duration::days(1);
    }
    day
}

/// `hour:00` UTC on `date` (the default clinic timezone is UTC).
pub fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

/// A future Monday slot at `hour`.
pub fn slot(hour: u32) -> DateTime<Utc> {
    at(future_monday(), hour)
}
