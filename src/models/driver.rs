//! Modelo de Driver
//!
//! Un conductor empleado de la flota. `departure_date` nula significa que
//! sigue empleado; una vez fijada, el conductor no puede recibir vehículo.
//! `current_vehicle_id` es el lado conductor→vehículo del puntero
//! bidireccional de asignación.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub current_vehicle_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Un conductor con fecha de salida registrada ya no es asignable
    pub fn is_employed(&self) -> bool {
        self.departure_date.is_none()
    }
}
