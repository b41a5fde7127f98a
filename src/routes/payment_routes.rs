use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::payment_controller::PaymentController;
use crate::dto::common::ApiResponse;
use crate::dto::payment_dto::{
    ChangePaymentStatusRequest, CreatePaymentRequest, MissingDaysResponse, PaymentResponse,
    UpdatePaymentRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/schedule/:id", get(list_by_schedule))
        .route("/schedule/:id/missing", get(missing_days))
        .route("/:id", get(get_payment))
        .route("/:id", put(update_payment))
        .route("/:id", delete(delete_payment))
        .route("/:id/status", post(change_payment_status))
}

fn controller(state: &AppState) -> PaymentController {
    PaymentController::new(state.pool.clone(), state.config.fleet_offset())
}

async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let response = controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_by_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let response = controller(&state).list_by_schedule(id).await?;
    Ok(Json(response))
}

async fn missing_days(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MissingDaysResponse>, AppError> {
    let response = controller(&state).missing_days(id).await?;
    Ok(Json(response))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let response = controller(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn change_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangePaymentStatusRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let response = controller(&state).change_status(id, request).await?;
    Ok(Json(response))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}
