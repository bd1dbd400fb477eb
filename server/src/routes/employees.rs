use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use platform_api::ApiResult;
use products_hr::{
    Action, EmployeeInput, Listing, Target,
    employees::{self, EmployeeCreated, EmployeeRow, EmployeeStats},
};
use serde::Deserialize;

use super::{Data, Done, PageQuery, write_scope};
use crate::{config::AppConfig, http::AppState};

pub fn router(config: &AppConfig) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/hire", post(hire))
        .route("/{id}", get(fetch).put(update).delete(remove));
    if config.employee_search {
        router
            .route("/search", get(search))
            .route("/search/{term}", get(search_path))
    } else {
        // Keep `/search` from being parsed as an employee id.
        router.route("/search", get(crate::http::fallback_handler))
    }
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Listing<EmployeeRow>>> {
    let Query(query) = query?;
    Ok(Json(employees::list(&state.pool, query.request()).await?))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<EmployeeStats>> {
    Ok(Json(employees::stats(&state.pool).await?))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Data<Vec<EmployeeRow>>>> {
    let Query(query) = query?;
    let term = query.q.unwrap_or_default();
    let data = employees::search(&state.pool, &term).await?;
    Ok(Json(Data { data }))
}

async fn search_path(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Data<Vec<EmployeeRow>>>> {
    let Path(term) = path?;
    let data = employees::search(&state.pool, &term).await?;
    Ok(Json(Data { data }))
}

async fn fetch(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Data<EmployeeRow>>> {
    let Path(id) = path?;
    let data = employees::get(&state.pool, id).await?;
    Ok(Json(Data { data }))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Done<EmployeeCreated>>)> {
    let Json(input) = payload?;
    let created = write_scope!(state, |conn| employees::create(conn, &input))?;
    Ok((
        StatusCode::CREATED,
        Json(Done::with(Action::Create.message(Target::Employee), created)),
    ))
}

async fn hire(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Done<EmployeeCreated>>)> {
    let Json(input) = payload?;
    let hired = write_scope!(state, |conn| employees::hire(conn, &input))?;
    Ok((
        StatusCode::CREATED,
        Json(Done::with("Employee hired successfully".to_string(), hired)),
    ))
}

async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    write_scope!(state, |conn| employees::update(conn, id, &input))?;
    Ok(Json(Done::message(Action::Update.message(Target::Employee))))
}

async fn remove(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    write_scope!(state, |conn| employees::delete(conn, id))?;
    Ok(Json(Done::message(Action::Delete.message(Target::Employee))))
}
