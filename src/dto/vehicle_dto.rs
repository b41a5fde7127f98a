//! DTOs de Vehicle

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vehicle::Vehicle;

/// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 5, max = 20))]
    pub license_plate: String,

    #[validate(length(min = 2, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub model: Option<String>,

    /// Meta de ingreso diario; ausente o 0 = sin meta
    pub daily_income_target: Option<Decimal>,
}

/// Request para cambiar el estado del vehículo
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleStatusRequest {
    pub status: String,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: String,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub status: String,
    pub current_driver_id: Option<String>,
    pub daily_income_target: String,
    pub created_at: String,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id.to_string(),
            license_plate: v.license_plate,
            brand: v.brand,
            model: v.model,
            status: v.status.as_str().to_string(),
            current_driver_id: v.current_driver_id.map(|d| d.to_string()),
            daily_income_target: v.daily_income_target.to_string(),
            created_at: v.created_at.to_rfc3339(),
        }
    }
}
