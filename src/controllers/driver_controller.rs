//! Controller de conductores
//!
//! Superficie mínima: alta, lecturas y registro de salida. La salida
//! interactúa con el motor de horarios: un conductor con horario activo
//! no puede darse de baja.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverDepartureRequest, DriverResponse};
use crate::models::audit::AuditEvent;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::services::audit_service::AuditService;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{parse_date, require_not_empty};

pub struct DriverController {
    drivers: DriverRepository,
    schedules: ScheduleRepository,
    audit: AuditService,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            drivers: DriverRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool.clone()),
            audit: AuditService::postgres(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        request.validate()?;
        require_not_empty(&request.full_name, "full_name")?;

        let driver = self
            .drivers
            .create(
                request.full_name.trim().to_string(),
                request.license_number,
                request.phone,
            )
            .await?;

        self.audit
            .record(AuditEvent::new(
                "driver_created",
                "drivers",
                driver.id,
                format!("Conductor '{}' registrado", driver.full_name),
            ))
            .await;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from(driver),
            "Conductor registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<DriverResponse> {
        let driver = self
            .drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;
        Ok(DriverResponse::from(driver))
    }

    pub async fn list_all(&self) -> AppResult<Vec<DriverResponse>> {
        Ok(self
            .drivers
            .find_all()
            .await?
            .into_iter()
            .map(DriverResponse::from)
            .collect())
    }

    /// Registrar la salida del conductor. Con un horario `assigned`
    /// vigente la baja se rechaza: primero hay que cerrar la asignación.
    pub async fn set_departure(
        &self,
        id: Uuid,
        request: DriverDepartureRequest,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        let departure_date = parse_date(&request.departure_date, "departure_date")?;

        let driver = self
            .drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;

        let active = self.schedules.count_assigned_for_driver(id, None).await?;
        if active > 0 {
            return Err(AppError::Conflict(
                "El conductor tiene un horario activo; complete o cancele la asignación antes de registrar la salida".to_string(),
            ));
        }

        let updated = self.drivers.set_departure(id, departure_date).await?;

        self.audit
            .record(AuditEvent::new(
                "driver_departure",
                "drivers",
                id,
                format!(
                    "Salida del conductor '{}' registrada para {}",
                    driver.full_name, departure_date
                ),
            ))
            .await;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from(updated),
            "Salida registrada exitosamente".to_string(),
        ))
    }
}
