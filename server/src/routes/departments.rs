use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use platform_api::ApiResult;
use products_hr::{
    Action, DepartmentInput, Target,
    departments::{self, DepartmentCreated, DepartmentDetail, DepartmentRow, DepartmentStats},
    employees::{self, EmployeeRow},
};

use super::{Data, Done, write_scope};
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/employees", get(staff))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Data<Vec<DepartmentRow>>>> {
    let data = departments::list(&state.pool).await?;
    Ok(Json(Data { data }))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<DepartmentStats>> {
    Ok(Json(departments::stats(&state.pool).await?))
}

async fn fetch(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Data<DepartmentDetail>>> {
    let Path(id) = path?;
    let data = departments::get(&state.pool, id).await?;
    Ok(Json(Data { data }))
}

async fn staff(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Data<Vec<EmployeeRow>>>> {
    let Path(id) = path?;
    let data = employees::in_department(&state.pool, id).await?;
    Ok(Json(Data { data }))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<DepartmentInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Done<DepartmentCreated>>)> {
    let Json(input) = payload?;
    let created = write_scope!(state, |conn| departments::create(conn, &input))?;
    Ok((
        StatusCode::CREATED,
        Json(Done::with(Action::Create.message(Target::Department), created)),
    ))
}

async fn update(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<DepartmentInput>, JsonRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    write_scope!(state, |conn| departments::update(conn, id, &input))?;
    Ok(Json(Done::message(Action::Update.message(Target::Department))))
}

async fn remove(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    write_scope!(state, |conn| departments::delete(conn, id))?;
    Ok(Json(Done::message(Action::Delete.message(Target::Department))))
}
