// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process backend used by the async tests.
//!
//! Mirrors the endpoints the client talks to. Only the access token of the
//! current refresh generation is accepted by `/energy-audit/`; anything else
//! gets the backend's expired-access rejection.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, RawQuery, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::HttpTransport;
use crate::auth::claims::test_tokens::access_token;

const USER_ID: i64 = 5;
const GOOD_PASSWORD: &str = "correct-horse";
const GOOD_VERIFICATION_TOKEN: &str = "good-token";
const GOOD_GOOGLE_CODE: &str = "good-code";
const TAKEN_EMAIL: &str = "taken@example.com";
const TARIFF_PER_KWH: f64 = 225.0;

struct MockState {
    base_exp: i64,
    generation: AtomicI64,
    refresh_calls: AtomicUsize,
    audit_calls: AtomicUsize,
    reject_audits: AtomicBool,
    last_audit_authorization: Mutex<Option<String>>,
    last_audit_body: Mutex<Option<Value>>,
    last_google_query: Mutex<Option<String>>,
}

impl MockState {
    fn current_access(&self) -> String {
        access_token(USER_ID, self.base_exp + self.generation.load(Ordering::SeqCst))
    }

    fn login_payload(&self, email: &str) -> Value {
        json!({
            "user": { "id": USER_ID, "name": "Ada Obi", "email": email },
            "tokens": { "access": self.current_access(), "refresh": MockBackend::VALID_REFRESH }
        })
    }
}

pub(crate) struct MockBackend {
    base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub const VALID_REFRESH: &'static str = "refresh-valid";
    pub const ROTATED_REFRESH: &'static str = "refresh-rotated";

    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            base_exp: Utc::now().timestamp() + 3600,
            generation: AtomicI64::new(0),
            refresh_calls: AtomicUsize::new(0),
            audit_calls: AtomicUsize::new(0),
            reject_audits: AtomicBool::new(false),
            last_audit_authorization: Mutex::new(None),
            last_audit_body: Mutex::new(None),
            last_google_query: Mutex::new(None),
        });

        let app = Router::new()
            .route("/auth/login/", post(login))
            .route("/auth/signup/", post(signup))
            .route("/auth/email-verify/", get(verify_email))
            .route("/auth/token/refresh/", post(refresh))
            .route("/auth/google/", get(google_exchange))
            .route("/energy-audit/", post(energy_audit))
            .route("/forbidden/", get(forbidden))
            .route("/server-error/", get(server_error))
            .route("/plain-unauthorized/", get(plain_unauthorized))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn google_exchange_url(&self) -> String {
        format!("{}/auth/google/", self.base_url)
    }

    pub fn transport(&self) -> HttpTransport {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpTransport::from_client(self.base_url.clone(), http).unwrap()
    }

    /// The only access token `/energy-audit/` currently accepts.
    pub fn current_access_token(&self) -> String {
        self.state.current_access()
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn audit_calls(&self) -> usize {
        self.state.audit_calls.load(Ordering::SeqCst)
    }

    pub fn last_audit_authorization(&self) -> Option<String> {
        self.state.last_audit_authorization.lock().unwrap().clone()
    }

    pub fn last_audit_body(&self) -> Option<Value> {
        self.state.last_audit_body.lock().unwrap().clone()
    }

    pub fn last_google_query(&self) -> Option<String> {
        self.state.last_google_query.lock().unwrap().clone()
    }

    /// Make `/energy-audit/` reject every token from now on.
    pub fn reject_all_audits(&self) {
        self.state.reject_audits.store(true, Ordering::SeqCst);
    }
}

fn expired_access_body() -> Value {
    json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid",
        "messages": [{
            "token_class": "AccessToken",
            "token_type": "access",
            "message": "Token is invalid or expired"
        }],
        "status_code": 401
    })
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != GOOD_PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        )
            .into_response();
    }
    Json(state.login_payload(email)).into_response()
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "email": ["user with this email already exists."] })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "name": body["name"], "email": body["email"] })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct VerifyQuery {
    token: Option<String>,
}

async fn verify_email(Query(query): Query<VerifyQuery>) -> Response {
    if query.token.as_deref() == Some(GOOD_VERIFICATION_TOKEN) {
        return Json(json!({ "email": "Successfully activated" })).into_response();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Activation link is invalid or expired" })),
    )
        .into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let accepted = [MockBackend::VALID_REFRESH, MockBackend::ROTATED_REFRESH];
    if !accepted.iter().any(|t| body["refresh"] == *t) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token is invalid or expired", "code": "token_not_valid" })),
        )
            .into_response();
    }

    state.generation.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "access": state.current_access(),
        "refresh": MockBackend::ROTATED_REFRESH
    }))
    .into_response()
}

async fn google_exchange(State(state): State<Arc<MockState>>, RawQuery(query): RawQuery) -> Response {
    *state.last_google_query.lock().unwrap() = query.clone();

    let has_good_code = query
        .as_deref()
        .unwrap_or_default()
        .split('&')
        .any(|pair| pair == format!("code={GOOD_GOOGLE_CODE}"));
    if !has_good_code {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Failed to exchange authorization code" })),
        )
            .into_response();
    }
    Json(state.login_payload("ada@gmail.com")).into_response()
}

async fn energy_audit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.audit_calls.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_audit_authorization.lock().unwrap() = authorization.clone();
    *state.last_audit_body.lock().unwrap() = Some(body.clone());

    let expected = format!("Bearer {}", state.current_access());
    if state.reject_audits.load(Ordering::SeqCst) || authorization.as_deref() != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(expired_access_body())).into_response();
    }

    Json(audit_report(&body)).into_response()
}

fn audit_report(request: &Value) -> Value {
    let mut total_energy = 0.0;
    let mut compartments = Vec::new();
    for compartment in request["compartments"].as_array().into_iter().flatten() {
        let mut compartment_energy = 0.0;
        let mut appliances = Vec::new();
        for appliance in compartment["appliances"].as_array().into_iter().flatten() {
            let power = appliance["power_rating"].as_f64().unwrap_or_default();
            let usage = appliance["usage_time"].as_f64().unwrap_or_default();
            let energy = power * usage / 1000.0;
            compartment_energy += energy;
            appliances.push(json!({
                "name": appliance["name"],
                "power_rating": power,
                "usage_time": usage,
                "total_energy_consumed": energy,
                "total_energy_cost": energy * TARIFF_PER_KWH
            }));
        }
        total_energy += compartment_energy;
        compartments.push(json!({
            "name": compartment["name"],
            "appliances": appliances,
            "total_energy_consumed": compartment_energy,
            "total_energy_cost": compartment_energy * TARIFF_PER_KWH
        }));
    }

    json!({
        "building_type": request["building_type"],
        "num_floors": request["num_floors"],
        "compartments": compartments,
        "recommendations": [{
            "category": "Lighting",
            "recommendations": ["Replace incandescent bulbs with LEDs"]
        }],
        "total_energy_consumed": total_energy,
        "total_energy_cost": total_energy * TARIFF_PER_KWH,
        "energy_consumption_score": 80
    })
}

async fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "detail": "You do not have permission to perform this action." })),
    )
        .into_response()
}

async fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn plain_unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Authentication credentials were not provided." })),
    )
        .into_response()
}
