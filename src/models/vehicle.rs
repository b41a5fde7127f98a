//! Modelo de Vehicle
//!
//! Mapea a la tabla vehicles. Solo un vehículo `active` puede recibir
//! horarios o conductor. `current_driver_id` es el lado vehículo→conductor
//! del puntero bidireccional de asignación.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Inactive,
    Maintenance,
}

impl VehicleStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub status: VehicleStatus,
    pub current_driver_id: Option<Uuid>,
    /// Meta de ingreso diario; 0 = sin meta
    pub daily_income_target: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.status == VehicleStatus::Active
    }

    /// Un pago cumple la meta si el vehículo tiene meta (> 0) y el
    /// monto la alcanza
    pub fn meets_target(&self, amount: Decimal) -> bool {
        self.daily_income_target > Decimal::ZERO && amount >= self.daily_income_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vehicle_with_target(target: Decimal) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            license_plate: "ABC-123".to_string(),
            brand: None,
            model: None,
            status: VehicleStatus::Active,
            current_driver_id: None,
            daily_income_target: target,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_meets_target_with_target_set() {
        let vehicle = vehicle_with_target(Decimal::new(100, 0));
        assert!(vehicle.meets_target(Decimal::new(100, 0)));
        assert!(vehicle.meets_target(Decimal::new(150, 0)));
        assert!(!vehicle.meets_target(Decimal::new(99, 0)));
    }

    #[test]
    fn test_meets_target_without_target() {
        // Meta 0 = sin meta: ningún monto la "cumple"
        let vehicle = vehicle_with_target(Decimal::ZERO);
        assert!(!vehicle.meets_target(Decimal::new(500, 0)));
    }

    #[test]
    fn test_status_parse_round_trip() {
        for s in ["active", "inactive", "maintenance"] {
            assert_eq!(VehicleStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(VehicleStatus::parse("retired").is_none());
    }
}
