//! Fake registry + token endpoint served by axum on a random local port.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub id: String,
    pub artifact_type: String,
    pub if_exists: Option<String>,
    pub body: String,
}

struct StoredArtifact {
    metadata: serde_json::Value,
    content: String,
}

#[derive(Default)]
struct FakeState {
    artifacts: Mutex<HashMap<String, StoredArtifact>>,
    created: Mutex<Vec<CreateRequest>>,
    required_auth: Mutex<Option<String>>,
    token_requests: AtomicUsize,
    last_token_form: Mutex<Option<String>>,
    token_fails: AtomicBool,
}

impl FakeState {
    fn reject(&self, headers: &HeaderMap) -> Option<Response> {
        let required = self.required_auth.lock().unwrap().clone()?;
        if header(headers, "authorization").as_deref() == Some(required.as_str()) {
            None
        } else {
            Some(StatusCode::UNAUTHORIZED.into_response())
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub struct FakeRegistry {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeRegistry {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let router = Router::new()
            .route("/apis/registry/v2/groups/{group}/artifacts", post(create))
            .route(
                "/apis/registry/v2/groups/{group}/artifacts/{id}",
                get(content).delete(remove),
            )
            .route(
                "/apis/registry/v2/groups/{group}/artifacts/{id}/meta",
                get(metadata),
            )
            .route("/token", post(token))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    /// Every registry call must carry exactly this Authorization header.
    pub fn requiring_auth(self, value: &str) -> Self {
        *self.state.required_auth.lock().unwrap() = Some(value.to_string());
        self
    }

    pub fn failing_token_endpoint(self) -> Self {
        self.state.token_fails.store(true, Ordering::SeqCst);
        self
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/apis/registry/v2", self.addr)
    }

    pub fn token_url(&self) -> String {
        format!("http://{}/token", self.addr)
    }

    pub fn created(&self) -> Vec<CreateRequest> {
        self.state.created.lock().unwrap().clone()
    }

    pub fn stored_len(&self) -> usize {
        self.state.artifacts.lock().unwrap().len()
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn last_token_form(&self) -> Option<String> {
        self.state.last_token_form.lock().unwrap().clone()
    }
}

async fn create(
    State(state): State<Arc<FakeState>>,
    Path(group): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Some(rejected) = state.reject(&headers) {
        return rejected;
    }
    let id = header(&headers, "x-registry-artifactid").unwrap_or_default();
    let artifact_type = header(&headers, "x-registry-artifacttype").unwrap_or_default();
    state.created.lock().unwrap().push(CreateRequest {
        id: id.clone(),
        artifact_type: artifact_type.clone(),
        if_exists: query.get("ifExists").cloned(),
        body: body.clone(),
    });

    let mut artifacts = state.artifacts.lock().unwrap();
    let stored = artifacts.entry(id.clone()).or_insert_with(|| StoredArtifact {
        metadata: json!({
            "groupId": group,
            "id": id,
            "type": artifact_type,
            "version": "1",
        }),
        content: body,
    });
    Json(stored.metadata.clone()).into_response()
}

async fn metadata(
    State(state): State<Arc<FakeState>>,
    Path((_group, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejected) = state.reject(&headers) {
        return rejected;
    }
    match state.artifacts.lock().unwrap().get(&id) {
        Some(stored) => Json(stored.metadata.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn content(
    State(state): State<Arc<FakeState>>,
    Path((_group, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejected) = state.reject(&headers) {
        return rejected;
    }
    match state.artifacts.lock().unwrap().get(&id) {
        Some(stored) => stored.content.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn remove(
    State(state): State<Arc<FakeState>>,
    Path((_group, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejected) = state.reject(&headers) {
        return rejected;
    }
    match state.artifacts.lock().unwrap().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn token(State(state): State<Arc<FakeState>>, body: String) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    *state.last_token_form.lock().unwrap() = Some(body);
    if state.token_fails.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, "invalid_client").into_response();
    }
    Json(json!({
        "access_token": format!("token-{n}"),
        "token_type": "Bearer",
        "expires_in": 300,
    }))
    .into_response()
}
