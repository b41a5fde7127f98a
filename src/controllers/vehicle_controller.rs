//! Controller de vehículos
//!
//! Superficie mínima: alta, lecturas y cambio de estado. Un vehículo con
//! conductor ligado no puede salir del estado `active` hasta soltar la
//! asignación.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleStatusRequest, VehicleResponse};
use crate::models::audit::AuditEvent;
use crate::models::vehicle::VehicleStatus;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::audit_service::AuditService;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleController {
    vehicles: VehicleRepository,
    audit: AuditService,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            audit: AuditService::postgres(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        let target = request.daily_income_target.unwrap_or(Decimal::ZERO);
        if target < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "La meta de ingreso diario no puede ser negativa".to_string(),
            ));
        }

        if self
            .vehicles
            .license_plate_exists(&request.license_plate)
            .await?
        {
            return Err(AppError::Conflict(
                "La matrícula ya está registrada".to_string(),
            ));
        }

        let vehicle = self
            .vehicles
            .create(request.license_plate, request.brand, request.model, target)
            .await?;

        self.audit
            .record(AuditEvent::new(
                "vehicle_created",
                "vehicles",
                vehicle.id,
                format!("Vehículo '{}' registrado", vehicle.license_plate),
            ))
            .await;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehículo registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list_all(&self) -> AppResult<Vec<VehicleResponse>> {
        Ok(self
            .vehicles
            .find_all()
            .await?
            .into_iter()
            .map(VehicleResponse::from)
            .collect())
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateVehicleStatusRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        let new_status = VehicleStatus::parse(&request.status).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Estado inválido '{}': debe ser active, inactive o maintenance",
                request.status
            ))
        })?;

        let vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if new_status != VehicleStatus::Active && vehicle.current_driver_id.is_some() {
            return Err(AppError::Conflict(
                "El vehículo tiene un conductor asignado; libere la asignación antes de cambiar su estado".to_string(),
            ));
        }

        let updated = self.vehicles.update_status(id, new_status).await?;

        self.audit
            .record(AuditEvent::new(
                "vehicle_status_changed",
                "vehicles",
                id,
                format!(
                    "Estado del vehículo cambiado de {} a {}",
                    vehicle.status.as_str(),
                    new_status.as_str()
                ),
            ))
            .await;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(updated),
            "Estado del vehículo actualizado".to_string(),
        ))
    }
}
