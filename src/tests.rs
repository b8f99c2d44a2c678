//! Integration tests for the admin backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::{init_database, LocalStorage};
use crate::store::Store;
use crate::{create_router, AppState};

async fn test_state(temp_dir: &TempDir, psk: Option<String>) -> AppState {
    let db_path = temp_dir.path().join("test.sqlite");
    let pool = init_database(&db_path).await.expect("Failed to init DB");
    let store = Arc::new(
        Store::open(LocalStorage::new(pool))
            .await
            .expect("Failed to open store"),
    );

    let config = Config {
        api_psk: psk,
        db_path,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
    };

    AppState {
        store,
        config: Arc::new(config),
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = create_router(test_state(&temp_dir, psk.clone()).await);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health_check() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_router(test_state(&temp_dir, Some("secret".to_string())).await);

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/courses"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/courses"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_bearer_token() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/courses"))
        .header("authorization", "Bearer test-api-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_auth_disabled_without_psk() {
    let fixture = TestFixture::with_psk(None).await;

    let (status, body) = fixture.get("/api/datastore").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_datastore_get() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/datastore").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["schemaVersion"], 1);
    assert_eq!(body["data"]["revisionId"], 0);
    for key in [
        "categories",
        "courses",
        "lectures",
        "jobs",
        "ebooks",
        "users",
        "subscriptions",
    ] {
        assert!(body["data"][key].as_array().unwrap().is_empty(), "{key}");
    }
}

#[tokio::test]
async fn test_datastore_revision() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/datastore/revision").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body["data"]["revisionId"].is_number());
    assert!(body["data"]["generatedAt"].is_string());
}

#[tokio::test]
async fn test_course_crud() {
    let fixture = TestFixture::new().await;

    let (status, created) = fixture
        .post(
            "/api/courses",
            json!({
                "title": "Rust Fundamentals",
                "category": "programming",
                "price": 49.0,
                "curriculum": [{
                    "title": "Getting started",
                    "lessons": [
                        { "title": "Install", "durationSeconds": 300 },
                        { "title": "Hello world", "durationSeconds": 420, "isPreview": true }
                    ]
                }]
            }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["status"], "draft");
    assert_eq!(created["data"]["version"], 1);
    let course_id = created["data"]["id"].as_str().unwrap().to_string();
    let revision_after_create = created["revisionId"].as_i64().unwrap();

    let (status, fetched) = fixture.get(&format!("/api/courses/{}", course_id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["title"], "Rust Fundamentals");
    assert!(fetched["data"]["curriculum"][0]["lessons"][1]["id"].is_string());

    let (status, updated) = fixture
        .put(
            &format!("/api/courses/{}", course_id),
            json!({ "status": "published", "expectedVersion": 1 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["data"]["status"], "published");
    assert_eq!(updated["data"]["title"], "Rust Fundamentals");
    assert_eq!(updated["data"]["version"], 2);
    let revision_after_update = updated["revisionId"].as_i64().unwrap();
    assert!(revision_after_update > revision_after_create);

    let (status, list) = fixture.get("/api/courses").await;
    assert_eq!(status, 200);
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let (status, deleted) = fixture.delete(&format!("/api/courses/{}", course_id)).await;
    assert_eq!(status, 200);
    assert!(deleted["revisionId"].as_i64().unwrap() > revision_after_update);

    let (status, missing) = fixture.get(&format!("/api/courses/{}", course_id)).await;
    assert_eq!(status, 404);
    assert_eq!(missing["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_course_summary() {
    let fixture = TestFixture::new().await;

    let (_, created) = fixture
        .post(
            "/api/courses",
            json!({
                "title": "Long course",
                "category": "programming",
                "curriculum": [
                    { "title": "One", "lessons": [{ "title": "a", "durationSeconds": 3000 }] },
                    { "title": "Two", "lessons": [
                        { "title": "b", "durationSeconds": 900 },
                        { "title": "c", "kind": "quiz" }
                    ]}
                ]
            }),
        )
        .await;
    let course_id = created["data"]["id"].as_str().unwrap();

    let (status, body) = fixture
        .get(&format!("/api/courses/{}/summary", course_id))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["sectionCount"], 2);
    assert_eq!(body["data"]["lessonCount"], 3);
    assert_eq!(body["data"]["totalDurationSeconds"], 3900);
    assert_eq!(body["data"]["duration"], "1:05:00");

    let (status, _) = fixture.get("/api/courses/missing/summary").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_required_fields_block_creation() {
    let fixture = TestFixture::new().await;

    let cases = [
        ("/api/categories", json!({ "name": "" })),
        ("/api/courses", json!({ "title": "No category" })),
        ("/api/lectures", json!({ "title": "No video" })),
        ("/api/jobs", json!({ "title": "", "company": "Acme" })),
        ("/api/ebooks", json!({ "title": "No author" })),
        ("/api/users", json!({ "name": "Ada", "email": "not-an-email" })),
        ("/api/subscriptions", json!({ "name": "Free" })),
    ];

    for (path, body) in cases {
        let (status, resp) = fixture.post(path, body).await;
        assert_eq!(status, 400, "{path}");
        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"]["code"], "VALIDATION_ERROR");
    }

    let (_, datastore) = fixture.get("/api/datastore").await;
    assert_eq!(datastore["data"]["revisionId"], 0);
    assert!(datastore["data"]["courses"].as_array().unwrap().is_empty());
    assert!(datastore["data"]["users"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_updates_only_target() {
    let fixture = TestFixture::new().await;

    let (_, first) = fixture
        .post("/api/jobs", json!({ "title": "Tutor", "company": "Acme" }))
        .await;
    let (_, second) = fixture
        .post("/api/jobs", json!({ "title": "Mentor", "company": "Globex" }))
        .await;
    let first_id = first["data"]["id"].as_str().unwrap();
    let second_id = second["data"]["id"].as_str().unwrap();
    assert_ne!(first_id, second_id);

    let (status, _) = fixture
        .put(
            &format!("/api/jobs/{}", first_id),
            json!({ "active": false, "employmentType": "contract" }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, other) = fixture.get(&format!("/api/jobs/{}", second_id)).await;
    assert_eq!(other["data"]["active"], true);
    assert_eq!(other["data"]["employmentType"], "fullTime");
    assert_eq!(other["data"]["version"], 1);
}

#[tokio::test]
async fn test_edit_with_blank_required_field_rejected() {
    let fixture = TestFixture::new().await;

    let (_, created) = fixture
        .post(
            "/api/ebooks",
            json!({ "title": "The Book", "author": "Someone" }),
        )
        .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = fixture
        .put(&format!("/api/ebooks/{}", id), json!({ "author": "  " }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, fetched) = fixture.get(&format!("/api/ebooks/{}", id)).await;
    assert_eq!(fetched["data"]["author"], "Someone");
    assert_eq!(fetched["data"]["version"], 1);
}

#[tokio::test]
async fn test_optimistic_concurrency_conflict() {
    let fixture = TestFixture::new().await;

    let (_, created) = fixture
        .post(
            "/api/users",
            json!({ "name": "Ada", "email": "ada@example.com" }),
        )
        .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = fixture
        .put(
            &format!("/api/users/{}", id),
            json!({ "name": "Should Fail", "expectedVersion": 999 }),
        )
        .await;

    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(body["error"]["details"]["currentVersion"], 1);
}

#[tokio::test]
async fn test_delete_removes_exactly_one() {
    let fixture = TestFixture::new().await;

    let mut ids = Vec::new();
    for name in ["Design", "Business", "Music"] {
        let (_, created) = fixture.post("/api/categories", json!({ "name": name })).await;
        ids.push(created["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = fixture.delete(&format!("/api/categories/{}", ids[1])).await;
    assert_eq!(status, 200);

    let (_, list) = fixture.get("/api/categories").await;
    let remaining: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(remaining, vec!["Design", "Music"]);

    let (status, body) = fixture.delete(&format!("/api/categories/{}", ids[1])).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_subscription_contents_after_course_delete() {
    let fixture = TestFixture::new().await;

    let (_, course) = fixture
        .post("/api/courses", json!({ "title": "Rust", "category": "dev" }))
        .await;
    let (_, ebook) = fixture
        .post("/api/ebooks", json!({ "title": "Book", "author": "Ann" }))
        .await;
    let course_id = course["data"]["id"].as_str().unwrap();
    let ebook_id = ebook["data"]["id"].as_str().unwrap();

    let (status, plan) = fixture
        .post(
            "/api/subscriptions",
            json!({
                "name": "All access",
                "price": 19.99,
                "courseIds": [course_id],
                "ebookIds": [ebook_id]
            }),
        )
        .await;
    assert_eq!(status, 200);
    let plan_id = plan["data"]["id"].as_str().unwrap();

    fixture.delete(&format!("/api/courses/{}", course_id)).await;

    let (status, contents) = fixture
        .get(&format!("/api/subscriptions/{}/contents", plan_id))
        .await;
    assert_eq!(status, 200);
    assert!(contents["data"]["courses"].as_array().unwrap().is_empty());
    assert_eq!(contents["data"]["missingCourseIds"][0], course_id);
    assert_eq!(contents["data"]["ebooks"][0]["id"], ebook_id);

    let (_, kept) = fixture
        .get(&format!("/api/subscriptions/{}", plan_id))
        .await;
    assert_eq!(kept["data"]["courseIds"][0], course_id);
}

#[tokio::test]
async fn test_import_datastore() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .put(
            "/api/datastore",
            json!({
                "categories": [
                    { "id": "1", "name": "Dev", "updatedAt": "2024-01-01T00:00:00Z" },
                    { "id": "1", "name": "Dup", "updatedAt": "2024-01-01T00:00:00Z" }
                ]
            }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture
        .put(
            "/api/datastore",
            json!({
                "categories": [
                    { "id": "1", "name": "Dev", "updatedAt": "2024-01-01T00:00:00Z", "version": 1 }
                ],
                "lectures": [{
                    "id": "l1", "title": "Intro", "videoUrl": "https://cdn/intro.mp4",
                    "updatedAt": "2024-01-01T00:00:00Z", "version": 1
                }]
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["revisionId"], 1);
    assert_eq!(body["data"]["categories"][0]["name"], "Dev");

    let (status, lecture) = fixture.get("/api/lectures/l1").await;
    assert_eq!(status, 200);
    assert_eq!(lecture["data"]["title"], "Intro");
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;

    let (_, initial) = fixture.get("/api/datastore/revision").await;
    let initial_revision = initial["data"]["revisionId"].as_i64().unwrap();

    let (_, created) = fixture
        .post(
            "/api/lectures",
            json!({ "title": "Intro", "videoUrl": "https://cdn/intro.mp4" }),
        )
        .await;
    assert_eq!(created["revisionId"], initial_revision + 1);
    let id = created["data"]["id"].as_str().unwrap();

    let (_, updated) = fixture
        .put(
            &format!("/api/lectures/{}", id),
            json!({ "durationSeconds": 120 }),
        )
        .await;
    assert_eq!(updated["revisionId"], initial_revision + 2);

    let (_, deleted) = fixture.delete(&format!("/api/lectures/{}", id)).await;
    assert_eq!(deleted["revisionId"], initial_revision + 3);
}
