use std::time::Duration;

use backend::{BackendError, HttpLeaderboard, LeaderboardApi};
use serde_json::json;
use uuid::Uuid;

use crate::support::{Stub, TestApp};

fn board() -> Vec<serde_json::Value> {
    vec![
        json!({ "username": "mia", "full_name": "Mia Lee", "views": 5400, "previousRank": 2 }),
        json!({ "username": "jo", "views": 3100, "previousRank": 1 }),
        json!({ "username": "sam", "views": 900 }),
    ]
}

#[tokio::test]
async fn fetch_passes_limit_and_decodes_envelope() {
    let app = TestApp::spawn(Stub {
        leaderboard: board(),
        ..Default::default()
    })
    .await;
    let api = HttpLeaderboard::new(&app.url).unwrap();
    let id = Uuid::new_v4();

    let entries = api.fetch(id, 2, Duration::from_secs(5)).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].username.as_deref(), Some("mia"));
    assert_eq!(entries[1].previous_rank, Some(1));

    let reqs = app.stub.requests_to("/api/v1/contests/");
    assert_eq!(reqs[0].path, format!("/api/v1/contests/{id}/leaderboard"));
    assert_eq!(reqs[0].query["limit"], "2");
    assert_eq!(reqs[0].headers["content-type"], "application/json");
}

#[tokio::test]
async fn slow_service_times_out() {
    let app = TestApp::spawn(Stub {
        leaderboard: board(),
        leaderboard_delay: Some(Duration::from_millis(500)),
        ..Default::default()
    })
    .await;
    let api = HttpLeaderboard::new(&app.url).unwrap();

    let err = api
        .fetch(Uuid::new_v4(), 10, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Timeout(d) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn error_status_is_surfaced() {
    let app = TestApp::spawn(Stub {
        leaderboard_status: Some(500),
        ..Default::default()
    })
    .await;
    let api = HttpLeaderboard::new(&app.url).unwrap();

    let err = api
        .fetch(Uuid::new_v4(), 10, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BackendError::Status {
            service: "leaderboard",
            status: 500,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Nothing listens on port 1.
    let api = HttpLeaderboard::new("http://127.0.0.1:1").unwrap();
    let err = api
        .fetch(Uuid::new_v4(), 10, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_transient());
}
