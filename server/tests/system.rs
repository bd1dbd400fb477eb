mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{TestApp, employee};
use serde_json::json;
use server::AppConfig;

#[tokio::test]
async fn health_reports_the_database() {
    let app = TestApp::new().await;
    for uri in ["/health", "/api/health"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "connected");
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn unknown_routes_are_json_404s() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/payroll").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "The requested endpoint does not exist");
}

#[tokio::test]
async fn capabilities_reflect_configuration() {
    let app = TestApp::with_config(AppConfig {
        employee_search: false,
        ..AppConfig::default()
    })
    .await;
    let (_, caps) = app.get("/api/capabilities").await;
    assert_eq!(caps, json!({"employeeSearch": false, "atomicWrites": false}));

    let (status, _) = app.get("/api/employees/search?q=x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;
    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn atomic_writes_commit_and_roll_back() {
    let app = TestApp::with_config(AppConfig {
        atomic_writes: true,
        ..AppConfig::default()
    })
    .await;
    let (_, caps) = app.get("/api/capabilities").await;
    assert_eq!(caps["atomicWrites"], true);

    let (status, _) = app.post("/api/employees", employee("TXN")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.count("employees").await, 1);

    let (status, _) = app.post("/api/employees", employee("TXN")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut orphan = employee("ORPHAN");
    orphan["departmentId"] = json!(12);
    let (status, _) = app.post("/api/employees", orphan).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("employees").await, 1);
}

#[tokio::test]
async fn configured_origins_may_send_credentials() {
    let app = TestApp::new().await;
    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .method(Method::GET)
            .uri("/api/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn undecodable_job_ids_get_the_error_body() {
    let app = TestApp::new().await;
    for uri in ["/api/jobs/%FF", "/api/jobs/%FF/description", "/api/jobs/%FF/employees"] {
        let (status, error) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error["code"], "VALIDATION_ERROR");
        assert_eq!(error["field"], "id");
    }
    let (status, error) = app.delete("/api/jobs/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["field"], "id");
}
