#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use serde_json::Value;
use server::{AppConfig, AppState, build_router};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// In-memory SQLite with the full migration set and a little reference
    /// data: jobs `IT_PROG` (4000-10000) and `AD_PRES` (20000-40000), location
    /// 1700 and department 60 "IT".
    pub async fn with_config(config: AppConfig) -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.expect("sqlite");
        Migrator::up(&db, None).await.expect("migrations");
        db.execute_unprepared(
            "INSERT INTO countries (country_id, country_name, region_name) VALUES ('US', 'United States of America', 'Americas');
             INSERT INTO locations (location_id, street_address, postal_code, city, state_province, country_id)
                 VALUES (1700, '2004 Charade Rd', '98199', 'Seattle', 'Washington', 'US');
             INSERT INTO jobs (job_id, job_title, min_salary, max_salary) VALUES ('IT_PROG', 'Programmer', 4000.0, 10000.0);
             INSERT INTO jobs (job_id, job_title, min_salary, max_salary) VALUES ('AD_PRES', 'President', 20000.0, 40000.0);
             INSERT INTO departments (department_id, department_name, location_id) VALUES (60, 'IT', 1700);",
        )
        .await
        .expect("fixtures");
        let router = build_router(AppState::new(db.clone(), config));
        Self { router, db }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn count(&self, table: &str) -> i64 {
        let row = self
            .db
            .query_one(sea_orm::Statement::from_string(
                self.db.get_database_backend(),
                format!("SELECT COUNT(*) AS n FROM {table}"),
            ))
            .await
            .expect("count")
            .expect("row");
        row.try_get("", "n").expect("n")
    }
}

pub fn employee(email: &str) -> Value {
    serde_json::json!({
        "firstName": "Nancy",
        "lastName": "Greenberg",
        "email": email,
        "phoneNumber": "515.124.4569",
        "hireDate": "2002-08-17",
        "jobId": "IT_PROG",
        "salary": 9000.0,
        "commissionPct": null,
        "managerId": null,
        "departmentId": 60
    })
}
