//! DTOs de Driver

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::driver::Driver;

/// Request para registrar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,

    #[validate(length(min = 2, max = 40))]
    pub license_number: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
}

/// Request para registrar la salida de un conductor
#[derive(Debug, Deserialize)]
pub struct DriverDepartureRequest {
    /// Formato YYYY-MM-DD
    pub departure_date: String,
}

/// Response de conductor para la API
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: String,
    pub full_name: String,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub departure_date: Option<String>,
    pub current_vehicle_id: Option<String>,
    pub created_at: String,
}

impl From<Driver> for DriverResponse {
    fn from(d: Driver) -> Self {
        Self {
            id: d.id.to_string(),
            full_name: d.full_name,
            license_number: d.license_number,
            phone: d.phone,
            departure_date: d.departure_date.map(|x| x.format("%Y-%m-%d").to_string()),
            current_vehicle_id: d.current_vehicle_id.map(|v| v.to_string()),
            created_at: d.created_at.to_rfc3339(),
        }
    }
}
