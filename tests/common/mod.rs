#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use trackshelf::clients::{CatalogClient, CatalogConfig, FirebaseStore, StoreConfig};

pub const TOKEN: &str = "test-token";

/// A request received by one of the mock servers
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

fn record(
    log: &Mutex<Vec<Recorded>>,
    path: String,
    query: HashMap<String, String>,
    headers: &HeaderMap,
) {
    log.lock().unwrap().push(Recorded {
        path,
        query,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
}

fn json_response(status: StatusCode, body: &str) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}

pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Canned catalog answers. Bodies are raw so tests can send broken JSON.
#[derive(Clone)]
pub struct CatalogState {
    pub search_status: StatusCode,
    pub search_body: String,
    pub top_tracks_status: StatusCode,
    pub top_tracks_body: String,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl CatalogState {
    pub fn new(search_body: Value, top_tracks_body: Value) -> Self {
        CatalogState {
            search_status: StatusCode::OK,
            search_body: search_body.to_string(),
            top_tracks_status: StatusCode::OK,
            top_tracks_body: top_tracks_body.to_string(),
            requests: Arc::default(),
        }
    }

    pub fn artist(id: &str) -> Value {
        json!({"artists": {"items": [{"id": id, "name": "whoever"}], "total": 1}})
    }

    pub fn no_artists() -> Value {
        json!({"artists": {"items": [], "total": 0}})
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn search(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state.requests, "/v1/search".into(), query, &headers);
    json_response(state.search_status, &state.search_body)
}

async fn top_tracks(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(
        &state.requests,
        format!("/v1/artists/{id}/top-tracks"),
        query,
        &headers,
    );
    json_response(state.top_tracks_status, &state.top_tracks_body)
}

/// Starts a mock catalog and returns a client pointed at it
pub async fn spawn_catalog(state: CatalogState) -> CatalogClient {
    let app = Router::new()
        .route("/v1/search", get(search))
        .route("/v1/artists/{id}/top-tracks", get(top_tracks))
        .with_state(state);
    let base_url = serve(app).await;
    CatalogClient::with_http(CatalogConfig::new(TOKEN).with_base_url(base_url), http())
}

/// In-memory stand-in for the Realtime Database REST API
#[derive(Clone, Default)]
pub struct DatabaseState {
    pub records: Arc<Mutex<BTreeMap<String, Value>>>,
    pub next_id: Arc<Mutex<u64>>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    pub fail: bool,
    pub fail_removes: bool,
}

impl DatabaseState {
    pub fn seeded(records: Value) -> Self {
        let state = DatabaseState::default();
        if let Value::Object(map) = records {
            state.records.lock().unwrap().extend(map);
        }
        state
    }

    pub fn failing() -> Self {
        DatabaseState {
            fail: true,
            ..Default::default()
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn unavailable() -> Response {
    json_response(
        StatusCode::SERVICE_UNAVAILABLE,
        r#"{"error":"service unavailable"}"#,
    )
}

async fn push(
    State(state): State<DatabaseState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(value): Json<Value>,
) -> Response {
    record(&state.requests, "POST /saved_tracks.json".into(), query, &headers);
    if state.fail {
        return unavailable();
    }
    let id = {
        let mut next = state.next_id.lock().unwrap();
        *next += 1;
        format!("-N{next:08}")
    };
    state.records.lock().unwrap().insert(id.clone(), value);
    json_response(StatusCode::OK, &json!({ "name": id }).to_string())
}

async fn read_all(
    State(state): State<DatabaseState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state.requests, "GET /saved_tracks.json".into(), query, &headers);
    if state.fail {
        return unavailable();
    }
    let records = state.records.lock().unwrap();
    if records.is_empty() {
        return json_response(StatusCode::OK, "null");
    }
    let body = Value::Object(records.clone().into_iter().collect());
    json_response(StatusCode::OK, &body.to_string())
}

async fn delete_one(
    State(state): State<DatabaseState>,
    Path(file): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(
        &state.requests,
        format!("DELETE /saved_tracks/{file}"),
        query,
        &headers,
    );
    if state.fail || state.fail_removes {
        return unavailable();
    }
    let id = file.trim_end_matches(".json");
    state.records.lock().unwrap().remove(id);
    json_response(StatusCode::OK, "null")
}

/// Starts a mock database and returns the base url
pub async fn spawn_database(state: DatabaseState) -> String {
    let app = Router::new()
        .route("/saved_tracks.json", get(read_all).post(push))
        .route("/saved_tracks/{file}", delete(delete_one))
        .with_state(state);
    serve(app).await
}

pub async fn spawn_store(state: DatabaseState) -> FirebaseStore {
    let base_url = spawn_database(state).await;
    FirebaseStore::with_http(StoreConfig::new(base_url), http())
}
