use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use backend::config::{AppConfig, LeaderboardConfig, RetryConfig, StorageConfig};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

/// Fixed clock for every test in this binary.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

/// A `contests` row relative to [`now`].
pub fn contest_row(id: Uuid, name: &str, status: &str, start_h: i64, end_h: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "start_date": (now() + ChronoDuration::hours(start_h)).to_rfc3339(),
        "end_date": (now() + ChronoDuration::hours(end_h)).to_rfc3339(),
        "created_at": "2025-03-01T00:00:00+00:00",
    })
}

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

/// Canned data and behavior of the stubbed storage and leaderboard services.
#[derive(Default)]
pub struct Stub {
    pub tables: HashMap<&'static str, Vec<Value>>,
    pub leaderboard: Vec<Value>,
    /// Delay before every leaderboard response.
    pub leaderboard_delay: Option<Duration>,
    /// Status to answer leaderboard calls with instead of 200.
    pub leaderboard_status: Option<u16>,
    /// Number of storage calls to fail with 503 before answering.
    pub storage_failures: Mutex<u32>,
    pub requests: Mutex<Vec<Recorded>>,
}

impl Stub {
    pub fn with_table(mut self, table: &'static str, rows: Vec<Value>) -> Self {
        self.tables.insert(table, rows);
        self
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, path: String, query: &HashMap<String, String>, headers: &HeaderMap) {
        self.requests.lock().unwrap().push(Recorded {
            path,
            query: query.clone(),
            headers: headers.clone(),
        });
    }
}

/// Evaluate the subset of PostgREST filters the clients send.
fn matches(row: &Value, column: &str, filter: &str) -> bool {
    let cell = match &row[column] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if let Some(v) = filter.strip_prefix("eq.") {
        return cell == v;
    }
    if let Some(list) = filter
        .strip_prefix("in.(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return list.split(',').any(|v| v.trim_matches('"') == cell);
    }
    true
}

async fn storage_table(
    State(stub): State<Arc<Stub>>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    stub.record(format!("/rest/v1/{table}"), &query, &headers);

    {
        let mut failures = stub.storage_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response();
        }
    }

    let rows = stub
        .tables
        .iter()
        .find(|(name, _)| **name == table)
        .map(|(_, rows)| rows.clone())
        .unwrap_or_default();

    let mut out: Vec<Value> = rows
        .into_iter()
        .filter(|row| {
            query
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
                .all(|(k, v)| matches(row, k, v))
        })
        .collect();
    if let Some(limit) = query.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        out.truncate(limit);
    }
    Json(out).into_response()
}

async fn leaderboard(
    State(stub): State<Arc<Stub>>,
    Path(id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    stub.record(
        format!("/api/v1/contests/{id}/leaderboard"),
        &query,
        &headers,
    );

    if let Some(delay) = stub.leaderboard_delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = stub.leaderboard_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "leaderboard unavailable").into_response();
    }

    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let board: Vec<Value> = stub.leaderboard.iter().take(limit).cloned().collect();
    Json(json!({ "success": true, "data": { "leaderboard": board } })).into_response()
}

/// Stub services listening on an ephemeral local port.
pub struct TestApp {
    pub url: String,
    pub stub: Arc<Stub>,
}

impl TestApp {
    pub async fn spawn(stub: Stub) -> Self {
        let stub = Arc::new(stub);
        let app = Router::new()
            .route("/rest/v1/{table}", get(storage_table))
            .route("/api/v1/contests/{id}/leaderboard", get(leaderboard))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            stub,
        }
    }

    /// Config pointing both services at this stub.
    pub fn config(&self) -> AppConfig {
        AppConfig {
            storage: StorageConfig {
                url: self.url.clone(),
                anon_key: "test-anon-key".into(),
                ..Default::default()
            },
            leaderboard: LeaderboardConfig {
                backend_url: Some(self.url.clone()),
                ..Default::default()
            },
            retry: RetryConfig {
                max_retries: 3,
                base_delay_ms: 10,
            },
        }
    }
}
