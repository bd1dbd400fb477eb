use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, post, put},
};
use platform_api::ApiResult;
use products_hr::{
    Action, JobInput, Target,
    employees::{self, EmployeeRow},
    jobs::{self, JobCreated, JobDescription, JobDetail, JobRow, JobStats},
};

use super::{Data, Done, write_scope};
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/new-job", post(new_job))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/employees", get(holders))
        .route("/{id}/description", get(description))
        .route("/{id}/update-info", put(update_info))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Data<Vec<JobRow>>>> {
    let data = jobs::list(&state.pool).await?;
    Ok(Json(Data { data }))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<JobStats>> {
    Ok(Json(jobs::stats(&state.pool).await?))
}

async fn fetch(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Data<JobDetail>>> {
    let Path(id) = path?;
    let data = jobs::get(&state.pool, &id).await?;
    Ok(Json(Data { data }))
}

async fn holders(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Data<Vec<EmployeeRow>>>> {
    let Path(id) = path?;
    let data = employees::holding_job(&state.pool, &id).await?;
    Ok(Json(Data { data }))
}

async fn description(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Data<JobDescription>>> {
    let Path(id) = path?;
    let data = jobs::description(&state.pool, &id).await?;
    Ok(Json(Data { data }))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Done<JobCreated>>)> {
    let Json(input) = payload?;
    let created = write_scope!(state, |conn| jobs::create(conn, &input))?;
    Ok((
        StatusCode::CREATED,
        Json(Done::with(Action::Create.message(Target::Job), created)),
    ))
}

async fn new_job(
    State(state): State<AppState>,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Done<JobCreated>>)> {
    let Json(input) = payload?;
    let created = write_scope!(state, |conn| jobs::new_job(conn, &input))?;
    Ok((
        StatusCode::CREATED,
        Json(Done::with(Action::Create.message(Target::Job), created)),
    ))
}

async fn update(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    write_scope!(state, |conn| jobs::update(conn, &id, &input))?;
    Ok(Json(Done::message(Action::Update.message(Target::Job))))
}

async fn update_info(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    write_scope!(state, |conn| jobs::update_info(conn, &id, &input))?;
    Ok(Json(Done::message(
        "Job information updated successfully".to_string(),
    )))
}

async fn remove(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Done<()>>> {
    let Path(id) = path?;
    write_scope!(state, |conn| jobs::delete(conn, &id))?;
    Ok(Json(Done::message(Action::Delete.message(Target::Job))))
}
