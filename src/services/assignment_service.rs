//! Coordinador de asignación conductor↔vehículo
//!
//! Mantiene el invariante de puntero bidireccional: `driver.current_vehicle_id`
//! y `vehicle.current_driver_id` se apuntan mutuamente exactamente cuando
//! existe un horario `assigned` entre ambos. No hay transacción que cubra
//! las dos escrituras; el unbind con guard y los barridos periódicos
//! compensan los estados intermedios.

use sqlx::PgPool;
use uuid::Uuid;

use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{AppError, AppResult};

pub struct AssignmentService {
    drivers: DriverRepository,
    vehicles: VehicleRepository,
}

impl AssignmentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            drivers: DriverRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    /// Ligar conductor y vehículo. Re-valida las reglas de negocio en el
    /// momento del bind: cualquier fallo es duro y el llamador debe
    /// revertir la operación que lo disparó.
    pub async fn bind(&self, driver_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;

        if !driver.is_employed() {
            return Err(AppError::Conflict(
                "El conductor ya no está empleado y no puede recibir vehículo".to_string(),
            ));
        }

        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if !vehicle.is_active() {
            return Err(AppError::Conflict(format!(
                "El vehículo no está activo (estado actual: {})",
                vehicle.status.as_str()
            )));
        }

        self.drivers
            .set_current_vehicle(driver_id, Some(vehicle_id))
            .await?;
        self.vehicles
            .set_current_driver(vehicle_id, Some(driver_id))
            .await?;

        log::info!(
            "🔗 Conductor {} ligado al vehículo {}",
            driver_id,
            vehicle_id
        );
        Ok(())
    }

    /// Soltar la pareja. Cada lado se limpia solo si todavía apunta al
    /// contraparte esperado: una operación concurrente pudo haberlo
    /// reasignado y ese puntero ya no nos pertenece.
    pub async fn unbind(&self, driver_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        let driver_cleared = self
            .drivers
            .clear_vehicle_if_matches(driver_id, vehicle_id)
            .await?;
        let vehicle_cleared = self
            .vehicles
            .clear_driver_if_matches(vehicle_id, driver_id)
            .await?;

        if !driver_cleared || !vehicle_cleared {
            log::warn!(
                "⚠️ Unbind parcial conductor {} / vehículo {}: algún puntero ya apuntaba a otra pareja",
                driver_id,
                vehicle_id
            );
        } else {
            log::info!(
                "🔓 Conductor {} y vehículo {} liberados",
                driver_id,
                vehicle_id
            );
        }
        Ok(())
    }
}
