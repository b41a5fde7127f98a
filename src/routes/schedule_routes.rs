use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::schedule_controller::ScheduleController;
use crate::dto::common::ApiResponse;
use crate::dto::schedule_dto::{
    ChangeScheduleStatusRequest, ConflictsQuery, CreateScheduleRequest, PeriodQuery,
    ScheduleResponse, SweepReportResponse, UpdateScheduleRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_schedule_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_schedule))
        .route("/", get(list_schedules))
        .route("/current", get(list_current))
        .route("/future", get(list_future))
        .route("/period", get(list_in_period))
        .route("/conflicts", get(list_conflicts))
        .route("/check-expired", post(check_expired))
        .route("/driver/:id", get(list_by_driver))
        .route("/vehicle/:id", get(list_by_vehicle))
        .route("/date/:date", get(list_on_date))
        .route("/:id", get(get_schedule))
        .route("/:id", put(update_schedule))
        .route("/:id", delete(delete_schedule))
        .route("/:id/status", put(change_schedule_status))
}

fn controller(state: &AppState) -> ScheduleController {
    ScheduleController::new(state.pool.clone(), state.config.fleet_offset())
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, AppError> {
    let response = controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_all().await?;
    Ok(Json(response))
}

async fn list_current(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_current().await?;
    Ok(Json(response))
}

async fn list_future(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_future().await?;
    Ok(Json(response))
}

async fn list_by_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_by_driver(id).await?;
    Ok(Json(response))
}

async fn list_by_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_by_vehicle(id).await?;
    Ok(Json(response))
}

async fn list_on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_on_date(&date).await?;
    Ok(Json(response))
}

async fn list_in_period(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_in_period(query).await?;
    Ok(Json(response))
}

async fn list_conflicts(
    State(state): State<AppState>,
    Query(query): Query<ConflictsQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let response = controller(&state).list_conflicts(query).await?;
    Ok(Json(response))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, AppError> {
    let response = controller(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn change_schedule_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeScheduleStatusRequest>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, AppError> {
    let response = controller(&state).change_status(id, request).await?;
    Ok(Json(response))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}

async fn check_expired(
    State(state): State<AppState>,
) -> Result<Json<SweepReportResponse>, AppError> {
    let response = controller(&state).check_expired().await?;
    Ok(Json(response))
}
