pub mod driver_routes;
pub mod payment_routes;
pub mod schedule_routes;
pub mod vehicle_routes;

use axum::Router;

use crate::state::AppState;

/// Crear el router principal de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/schedule", schedule_routes::create_schedule_router())
        .nest("/api/payment", payment_routes::create_payment_router())
        .nest("/api/driver", driver_routes::create_driver_router())
        .nest("/api/vehicle", vehicle_routes::create_vehicle_router())
}
