//! Mock Spotify accounts and Web API server for integration tests
//!
//! Serves the token endpoint and the catalog endpoints the client uses on
//! an ephemeral loopback port. Every hit is counted so tests can assert how
//! many refreshes and replays happened.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use spotify_explorer::config::Config;

#[derive(Default)]
pub struct MockState {
    pub token_hits: AtomicUsize,
    pub api_hits: AtomicUsize,
    /// Access token the API currently accepts.
    pub valid_token: Mutex<String>,
    pub exchange_fails: AtomicBool,
    pub refresh_fails: AtomicBool,
    /// Reject every API request, even with a fresh token.
    pub always_unauthorized: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub last_token_form: Mutex<HashMap<String, String>>,
    pub last_query: Mutex<HashMap<String, String>>,
    issued: AtomicUsize,
}

impl MockState {
    pub fn token_hits(&self) -> usize {
        self.token_hits.load(Ordering::SeqCst)
    }

    pub fn api_hits(&self) -> usize {
        self.api_hits.load(Ordering::SeqCst)
    }

    pub fn accept_token(&self, token: &str) {
        *self.valid_token.lock().unwrap() = token.to_string();
    }

    pub fn last_query(&self, key: &str) -> Option<String> {
        self.last_query.lock().unwrap().get(key).cloned()
    }

    fn issue_token(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        let token = format!("access-{n}");
        self.accept_token(&token);
        token
    }
}

pub struct MockSpotify {
    pub state: Arc<MockState>,
    pub base_url: String,
}

impl MockSpotify {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/recommendations", get(recommendations))
            .route("/v1/recommendations/available-genre-seeds", get(genre_seeds))
            .route("/v1/browse/categories", get(categories))
            .route("/v1/tracks/:id", get(track))
            .route("/v1/me", get(me))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn config(&self) -> Config {
        Config {
            client_id: "test-client".to_string(),
            accounts_url: self.base_url.clone(),
            api_url: format!("{}/v1", self.base_url),
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        }
    }
}

pub fn track_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Track {id}"),
        "artists": [{"id": "ar1", "name": "Mock Artist"}],
        "album": {"name": "Mock Album", "images": [{"url": format!("https://img/{id}"), "width": 64, "height": 64}]},
        "preview_url": null,
        "duration_ms": 200000,
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{id}")}
    })
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_token_form.lock().unwrap() = form.clone();

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            if state.exchange_fails.load(Ordering::SeqCst) {
                return invalid_grant("Invalid authorization code");
            }
            let access = state.issue_token();
            Json(json!({
                "access_token": access,
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-0",
                "scope": "user-read-private user-read-email"
            }))
            .into_response()
        }
        Some("refresh_token") => {
            let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if state.refresh_fails.load(Ordering::SeqCst) {
                return invalid_grant("Refresh token revoked");
            }
            let access = state.issue_token();
            Json(json!({
                "access_token": access,
                "token_type": "Bearer",
                "expires_in": 3600
            }))
            .into_response()
        }
        _ => invalid_grant("unsupported grant type"),
    }
}

fn invalid_grant(description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "invalid_grant", "error_description": description})),
    )
        .into_response()
}

/// Count the hit and check the bearer token.
fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    state.api_hits.fetch_add(1, Ordering::SeqCst);
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    let valid = state.valid_token.lock().unwrap().clone();

    if state.always_unauthorized.load(Ordering::SeqCst) || valid.is_empty() || presented != valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"status": 401, "message": "The access token expired"}})),
        )
            .into_response());
    }
    Ok(())
}

fn record_query(state: &MockState, query: &HashMap<String, String>) {
    *state.last_query.lock().unwrap() = query.clone();
}

async fn search(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    record_query(&state, &query);
    let offset: u32 = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    Json(json!({
        "tracks": {
            "items": [track_json(&format!("s{offset}")), track_json(&format!("s{}", offset + 1))],
            "total": 45,
            "limit": 20,
            "offset": offset,
            "next": null,
            "previous": null
        }
    }))
    .into_response()
}

async fn recommendations(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    record_query(&state, &query);
    Json(json!({"tracks": [track_json("r1"), track_json("r2"), track_json("r3")]})).into_response()
}

async fn genre_seeds(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({"genres": ["acoustic", "hip-hop", "k-pop"]})).into_response()
}

async fn categories(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    record_query(&state, &query);
    Json(json!({
        "categories": {
            "items": [
                {"id": "toplists", "name": "Top Lists", "icons": []},
                {"id": "mood", "name": "Mood", "icons": [{"url": "https://img/mood"}]}
            ],
            "total": 2
        }
    }))
    .into_response()
}

async fn track(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"status": 404, "message": "Non existing id"}})),
        )
            .into_response();
    }
    Json(track_json(&id)).into_response()
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({"id": "user-1", "display_name": "Test User"})).into_response()
}
