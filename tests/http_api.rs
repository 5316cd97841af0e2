//! HTTP surface tests: status-outcome mapping per endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_search::api::{build_router, AppState};
use catalog_search::config::SearchConfig;
use catalog_search::ingest::CatalogService;
use catalog_search::search::TantivyGateway;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

fn test_app(dir: &TempDir) -> Router {
    let config = SearchConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let gateway = Arc::new(TantivyGateway::open(&config).unwrap());
    build_router(AppState::new(Arc::new(CatalogService::new(gateway))))
}

fn course_json() -> Value {
    json!({
        "id": "c1",
        "code": "CS F111",
        "name": "Computer Programming",
        "sections": [{
            "id": "c1-s1",
            "courseId": "c1",
            "type": "L",
            "number": 1,
            "instructors": ["Rahul Sharma"],
            "roomTime": ["L1:MON:08:09"],
            "createdAt": "2024-08-01T10:00:00Z"
        }],
        "midsemStartTime": null,
        "midsemEndTime": null,
        "compreStartTime": null,
        "compreEndTime": null,
        "archived": false,
        "acadYear": 2024,
        "semester": 1,
        "createdAt": "2024-08-01T10:00:00Z"
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn course_lifecycle_maps_outcomes_to_statuses() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // Create
    let response = app
        .clone()
        .oneshot(post_json("/course/add", &course_json()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate id
    let response = app
        .clone()
        .oneshot(post_json("/course/add", &course_json()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Search by code
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/course/search?code=CS%20F111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // No usable parameter
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/course/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Remove
    let response = app
        .clone()
        .oneshot(delete_json("/course/remove", &json!({"id": "c1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Remove again
    let response = app
        .clone()
        .oneshot(delete_json("/course/remove", &json!({"id": "c1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed remove body
    let response = app
        .oneshot(delete_json("/course/remove", &json!({"id": 42})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_course_is_rejected_with_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let mut bad = course_json();
    bad.as_object_mut().unwrap().remove("code");

    let response = app
        .oneshot(post_json("/course/add", &bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn timetable_search_tolerates_empty_parameters() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/timetable/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn timetable_with_missing_reference_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let timetable = json!({
        "id": "t1",
        "authorId": "user-1",
        "name": "My Sem 1",
        "degrees": ["A7"],
        "private": false,
        "draft": false,
        "archived": false,
        "year": 2,
        "acadYear": 2024,
        "semester": 1,
        "sections": [{
            "id": "t1-s1",
            "courseId": "ghost",
            "type": "L",
            "number": 1,
            "instructors": ["Rahul Sharma"],
            "roomTime": ["L1:MON:08:09"],
            "createdAt": "2024-08-01T10:00:00Z"
        }],
        "timings": [],
        "examTimes": [],
        "warnings": [],
        "createdAt": "2024-08-01T10:00:00Z",
        "lastUpdated": "2024-08-01T10:00:00Z"
    });

    let response = app
        .oneshot(post_json("/timetable/add", &timetable))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
