use backend::storage::tables;
use backend::{BackendError, ContestStore, SupabaseStore};
use common::ContestStatus;
use serde_json::json;
use uuid::Uuid;

use crate::support::{Stub, TestApp, contest_row};

mod contest_reads {
    use super::*;

    #[tokio::test]
    async fn list_sends_status_filter_order_and_auth_headers() {
        let stub = Stub::default().with_table(
            tables::CONTESTS,
            vec![
                contest_row(Uuid::new_v4(), "Live", "active", -1, 1),
                contest_row(Uuid::new_v4(), "Soon", "draft", 1, 2),
                contest_row(Uuid::new_v4(), "Gone", "archived", -5, -4),
            ],
        );
        let app = TestApp::spawn(stub).await;
        let store = SupabaseStore::new(&app.config().storage).unwrap();

        let contests = store.list_contests(ContestStatus::LISTED).await.unwrap();
        let names: Vec<_> = contests.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Live", "Soon"]);

        let reqs = app.stub.requests_to("/rest/v1/contests");
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].query["status"], "in.(active,draft)");
        assert_eq!(reqs[0].query["order"], "created_at.desc");
        assert_eq!(reqs[0].query["select"], "*");
        assert_eq!(reqs[0].headers["apikey"], "test-anon-key");
        assert_eq!(reqs[0].headers["authorization"], "Bearer test-anon-key");
    }

    #[tokio::test]
    async fn find_contest_returns_none_when_missing() {
        let id = Uuid::new_v4();
        let stub = Stub::default().with_table(
            tables::CONTESTS,
            vec![contest_row(id, "Live", "active", -1, 1)],
        );
        let app = TestApp::spawn(stub).await;
        let store = SupabaseStore::new(&app.config().storage).unwrap();

        let found = store.find_contest(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Live");
        assert!(store.find_contest(Uuid::new_v4()).await.unwrap().is_none());

        let reqs = app.stub.requests_to("/rest/v1/contests");
        assert_eq!(reqs[0].query["id"], format!("eq.{id}"));
        assert_eq!(reqs[0].query["limit"], "1");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let stub = Stub {
            storage_failures: 1.into(),
            ..Default::default()
        };
        let app = TestApp::spawn(stub).await;
        let store = SupabaseStore::new(&app.config().storage).unwrap();

        let err = store.list_contests(ContestStatus::LISTED).await.unwrap_err();
        match &err {
            BackendError::Status { status, body, .. } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("expected Status, got {other:?}"),
        }
        assert!(err.is_transient());
    }
}

mod user_reads {
    use super::*;

    #[tokio::test]
    async fn submissions_and_tiktok_profile() {
        let user = Uuid::new_v4();
        let contest = Uuid::new_v4();
        let stub = Stub::default()
            .with_table(
                tables::CONTEST_LINKS,
                vec![
                    json!({
                        "id": Uuid::new_v4(),
                        "contest_id": contest,
                        "created_by": user,
                        "is_contest_submission": true,
                        "url": "https://www.tiktok.com/@mia/video/1",
                    }),
                    json!({
                        "id": Uuid::new_v4(),
                        "contest_id": null,
                        "created_by": user,
                        "is_contest_submission": false,
                    }),
                ],
            )
            .with_table(
                tables::TIKTOK_PROFILES,
                vec![json!({ "id": Uuid::new_v4(), "user_id": user, "username": "mia" })],
            );
        let app = TestApp::spawn(stub).await;
        let store = SupabaseStore::new(&app.config().storage).unwrap();

        let subs = store.user_submissions(user).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].contest_id, Some(contest));

        let one = store.user_submission(contest, user).await.unwrap();
        assert!(one.is_some());
        assert!(
            store
                .user_submission(Uuid::new_v4(), user)
                .await
                .unwrap()
                .is_none()
        );

        let tiktok = store.tiktok_profile(user).await.unwrap().unwrap();
        assert_eq!(tiktok.username.as_deref(), Some("mia"));
        assert!(store.tiktok_profile(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn joined_contests_embed_contest_rows() {
        let user = Uuid::new_v4();
        let stub = Stub::default().with_table(
            tables::CONTEST_PARTICIPANTS,
            vec![json!({
                "user_id": user,
                "joined_at": "2025-03-10T08:00:00+00:00",
                "contests": contest_row(Uuid::new_v4(), "Live", "active", -1, 1),
            })],
        );
        let app = TestApp::spawn(stub).await;
        let store = SupabaseStore::new(&app.config().storage).unwrap();

        let joined = store.joined_contests(user).await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].contest.as_ref().unwrap().name, "Live");

        let reqs = app.stub.requests_to("/rest/v1/contest_participants");
        assert_eq!(reqs[0].query["select"], "joined_at,contests(*)");
        assert_eq!(reqs[0].query["order"], "joined_at.desc");
        assert_eq!(reqs[0].query["user_id"], format!("eq.{user}"));
    }

    #[tokio::test]
    async fn profile_submissions_embed_contest_name() {
        let user = Uuid::new_v4();
        let stub = Stub::default().with_table(
            tables::SUBMISSIONS,
            vec![
                json!({
                    "id": Uuid::new_v4(),
                    "user_id": user,
                    "title": "Take 2",
                    "views": 2500,
                    "likes": 80,
                    "created_at": "2025-03-12T10:00:00+00:00",
                    "contests": { "name": "Summer Vocals" },
                }),
                json!({
                    "id": Uuid::new_v4(),
                    "user_id": user,
                    "title": "Take 1",
                    "views": 1500.0,
                    "contests": null,
                }),
                json!({ "id": Uuid::new_v4(), "user_id": Uuid::new_v4(), "views": 9 }),
            ],
        );
        let app = TestApp::spawn(stub).await;
        let store = SupabaseStore::new(&app.config().storage).unwrap();

        let subs = store.profile_submissions(user).await.unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].contest_name(), "Summer Vocals");
        assert_eq!(subs[1].contest_name(), "Unknown Contest");
        assert_eq!(
            common::SubmissionTotals::of(&subs),
            common::SubmissionTotals {
                count: 2,
                views: 4000
            }
        );

        let reqs = app.stub.requests_to("/rest/v1/submissions");
        assert_eq!(reqs[0].query["select"], "*,contests(name)");
        assert_eq!(reqs[0].query["user_id"], format!("eq.{user}"));
        assert_eq!(reqs[0].query["order"], "created_at.desc");
    }
}
