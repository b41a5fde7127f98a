//! Controller del ciclo de vida de horarios
//!
//! Dueño de la máquina de estados del Schedule. Cada creación,
//! actualización o cambio de estado consulta el detector de solapamientos
//! y conduce el coordinador de asignación; si el coordinador rechaza el
//! bind/unbind, la escritura primaria se revierte (borrado del recién
//! creado, restauración del snapshot previo): no hay éxito parcial.

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::ApiResponse;
use crate::dto::schedule_dto::{
    ChangeScheduleStatusRequest, ConflictsQuery, CreateScheduleRequest, PeriodQuery,
    ScheduleResponse, SweepReportResponse, UpdateScheduleRequest,
};
use crate::models::audit::AuditEvent;
use crate::models::schedule::{Schedule, ScheduleStatus};
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::payment_repository::PaymentRepository;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::assignment_service::AssignmentService;
use crate::services::audit_service::AuditService;
use crate::services::reconciliation_service::ReconciliationService;
use crate::services::sweep_service::SweepService;
use crate::utils::day_range;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{parse_date, parse_wall_clock};

pub struct ScheduleController {
    schedules: ScheduleRepository,
    payments: PaymentRepository,
    drivers: DriverRepository,
    vehicles: VehicleRepository,
    assignment: AssignmentService,
    reconciliation: ReconciliationService,
    sweeps: SweepService,
    audit: AuditService,
    offset: FixedOffset,
}

/// Ventana ya validada de una solicitud
struct ParsedWindow {
    schedule_date: NaiveDate,
    end_day: Option<NaiveDate>,
    shift_start: Option<NaiveTime>,
    shift_end: Option<NaiveTime>,
}

impl ScheduleController {
    pub fn new(pool: PgPool, offset: FixedOffset) -> Self {
        Self {
            schedules: ScheduleRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            assignment: AssignmentService::new(pool.clone()),
            reconciliation: ReconciliationService::new(pool.clone(), offset),
            sweeps: SweepService::new(pool.clone(), offset),
            audit: AuditService::postgres(pool),
            offset,
        }
    }

    /// Validar fechas y horas de la solicitud antes de tocar la base
    fn parse_window(
        schedule_date: &str,
        end_date: Option<&str>,
        shift_start: Option<&str>,
        shift_end: Option<&str>,
    ) -> AppResult<ParsedWindow> {
        let schedule_date = parse_date(schedule_date, "schedule_date")?;
        let end_day = end_date.map(|e| parse_date(e, "end_date")).transpose()?;
        if let Some(end) = end_day {
            if end < schedule_date {
                return Err(AppError::ValidationError(
                    "end_date no puede ser anterior a schedule_date".to_string(),
                ));
            }
        }
        let shift_start = shift_start
            .map(|t| parse_wall_clock(t, "shift_start"))
            .transpose()?;
        let shift_end = shift_end
            .map(|t| parse_wall_clock(t, "shift_end"))
            .transpose()?;
        Ok(ParsedWindow {
            schedule_date,
            end_day,
            shift_start,
            shift_end,
        })
    }

    /// El fin que se persiste: el último día con la hora de `shift_end`,
    /// o fin de día si el horario no define turno
    fn stamp_end(&self, end_day: Option<NaiveDate>, shift_end: Option<NaiveTime>) -> Option<chrono::DateTime<chrono::Utc>> {
        end_day.map(|day| {
            let time = shift_end.unwrap_or_else(day_range::end_of_day_time);
            day_range::local_datetime_to_utc(day, time, self.offset)
        })
    }

    async fn check_overlap(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
        schedule_date: NaiveDate,
        end_day: Option<NaiveDate>,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        let window_start = day_range::local_datetime_to_utc(schedule_date, NaiveTime::MIN, self.offset);
        if let Some(conflict) = self
            .schedules
            .find_first_overlapping(driver_id, vehicle_id, end_day, window_start, exclude)
            .await?
        {
            let response = ScheduleResponse::from(conflict);
            return Err(AppError::ScheduleOverlap {
                message: format!(
                    "La ventana solicitada se solapa con el horario {} ({} - {})",
                    response.id,
                    response.schedule_date,
                    response.end_date.as_deref().unwrap_or("abierto")
                ),
                conflict: json!(response),
            });
        }
        Ok(())
    }

    pub async fn create(
        &self,
        request: CreateScheduleRequest,
    ) -> AppResult<ApiResponse<ScheduleResponse>> {
        // Validación sincrónica: si el payload es inválido no se intenta
        // ninguna operación
        let window = Self::parse_window(
            &request.schedule_date,
            request.end_date.as_deref(),
            request.shift_start.as_deref(),
            request.shift_end.as_deref(),
        )?;

        let driver = self
            .drivers
            .find_by_id(request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;
        if !driver.is_employed() {
            return Err(AppError::Conflict(
                "El conductor ya no está empleado y no puede recibir horarios".to_string(),
            ));
        }

        let vehicle = self
            .vehicles
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        if !vehicle.is_active() {
            return Err(AppError::Conflict(format!(
                "Solo vehículos activos pueden recibir horarios (estado actual: {})",
                vehicle.status.as_str()
            )));
        }

        // Completar primero los horarios del conductor cuya ventana venció
        // en silencio: si no, bloquearían el chequeo de solapamiento
        self.sweeps.expire_driver_schedules(driver.id).await?;

        self.check_overlap(
            driver.id,
            vehicle.id,
            window.schedule_date,
            window.end_day,
            None,
        )
        .await?;

        let today = day_range::local_today(self.offset);
        let driver_busy = self
            .schedules
            .count_assigned_for_driver(driver.id, None)
            .await?
            > 0;
        let status = ScheduleStatus::initial(window.schedule_date, today, driver_busy);

        let schedule = self
            .schedules
            .create(
                driver.id,
                vehicle.id,
                window.schedule_date,
                self.stamp_end(window.end_day, window.shift_end),
                window.shift_start,
                window.shift_end,
                status,
                request.notes,
            )
            .await?;

        if status == ScheduleStatus::Assigned {
            // Sin éxito parcial: si el bind falla, el horario recién
            // creado se elimina y la operación entera falla
            if let Err(e) = self.assignment.bind(driver.id, vehicle.id).await {
                if let Err(cleanup) = self.schedules.delete(schedule.id).await {
                    log::error!(
                        "❌ No se pudo revertir el horario {} tras bind fallido: {}",
                        schedule.id,
                        cleanup
                    );
                }
                return Err(e);
            }
        }

        // La materialización inicial no es fatal: el barrido la reintenta
        if let Err(e) = self.reconciliation.materialize_daily_payments(&schedule).await {
            log::warn!(
                "⚠️ Horario {} creado pero la materialización inicial falló: {}",
                schedule.id,
                e
            );
        }

        self.audit
            .record(
                AuditEvent::new(
                    "schedule_created",
                    "schedules",
                    schedule.id,
                    format!(
                        "Horario creado para conductor {} y vehículo {}",
                        driver.id, vehicle.id
                    ),
                )
                .with_detail(json!({ "status": schedule.status.as_str() })),
            )
            .await;

        Ok(ApiResponse::success_with_message(
            ScheduleResponse::from(schedule),
            "Horario creado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateScheduleRequest,
    ) -> AppResult<ApiResponse<ScheduleResponse>> {
        // Parseo temprano de los campos de fecha/hora presentes
        let new_schedule_date = request
            .schedule_date
            .as_deref()
            .map(|d| parse_date(d, "schedule_date"))
            .transpose()?;
        let new_end_day = request
            .end_date
            .as_deref()
            .map(|d| parse_date(d, "end_date"))
            .transpose()?;
        let new_shift_start = request
            .shift_start
            .as_deref()
            .map(|t| parse_wall_clock(t, "shift_start"))
            .transpose()?;
        let new_shift_end = request
            .shift_end
            .as_deref()
            .map(|t| parse_wall_clock(t, "shift_end"))
            .transpose()?;

        let snapshot = self
            .schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;

        // Armar la fila resultante
        let mut next = snapshot.clone();
        if let Some(driver_id) = request.driver_id {
            next.driver_id = driver_id;
        }
        if let Some(vehicle_id) = request.vehicle_id {
            next.vehicle_id = vehicle_id;
        }
        if let Some(date) = new_schedule_date {
            next.schedule_date = date;
        }
        if let Some(shift_start) = new_shift_start {
            next.shift_start = Some(shift_start);
        }
        if let Some(shift_end) = new_shift_end {
            next.shift_end = Some(shift_end);
        }
        if request.clear_end_date == Some(true) {
            next.end_date = None;
        } else if let Some(end_day) = new_end_day {
            next.end_date = self.stamp_end(Some(end_day), next.shift_end);
        }
        if let Some(notes) = request.notes.clone() {
            next.notes = Some(notes);
        }

        if let Some(end_day) = next.end_day(self.offset) {
            if end_day < next.schedule_date {
                return Err(AppError::ValidationError(
                    "end_date no puede ser anterior a schedule_date".to_string(),
                ));
            }
        }

        // Re-validar participantes cambiados
        if next.driver_id != snapshot.driver_id {
            let driver = self
                .drivers
                .find_by_id(next.driver_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;
            if !driver.is_employed() {
                return Err(AppError::Conflict(
                    "El conductor ya no está empleado y no puede recibir horarios".to_string(),
                ));
            }
        }
        if next.vehicle_id != snapshot.vehicle_id {
            let vehicle = self
                .vehicles
                .find_by_id(next.vehicle_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
            if !vehicle.is_active() {
                return Err(AppError::Conflict(
                    "Solo vehículos activos pueden recibir horarios".to_string(),
                ));
            }
        }

        // Cambió la ventana o sus participantes → detector de
        // solapamientos, excluyendo el propio horario
        if request.touches_window() {
            self.check_overlap(
                next.driver_id,
                next.vehicle_id,
                next.schedule_date,
                next.end_day(self.offset),
                Some(id),
            )
            .await?;
        }

        // Recomputar estado según el movimiento de fechas
        let today = day_range::local_today(self.offset);
        if !next.status.is_terminal() {
            if next.schedule_date > today {
                next.status = ScheduleStatus::Pending;
            } else if snapshot.status == ScheduleStatus::Pending {
                let driver_busy = self
                    .schedules
                    .count_assigned_for_driver(next.driver_id, Some(id))
                    .await?
                    > 0;
                if !driver_busy {
                    next.status = ScheduleStatus::Assigned;
                }
            }
        }

        let updated = self.schedules.replace(&next).await?;

        // Conducir el coordinador simétricamente; cualquier fallo
        // restaura el snapshot previo y se propaga
        if let Err(e) = self.drive_assignment(&snapshot, &updated).await {
            if let Err(rollback) = self.schedules.replace(&snapshot).await {
                log::error!(
                    "❌ No se pudo restaurar el horario {} tras fallo del coordinador: {}",
                    id,
                    rollback
                );
            }
            return Err(e);
        }

        // Fechas cambiadas → re-materializar (idempotente)
        if request.touches_dates() {
            if let Err(e) = self.reconciliation.materialize_daily_payments(&updated).await {
                log::warn!(
                    "⚠️ Horario {} actualizado pero la re-materialización falló: {}",
                    id,
                    e
                );
            }
        }

        self.audit
            .record(
                AuditEvent::new(
                    "schedule_updated",
                    "schedules",
                    id,
                    "Horario actualizado".to_string(),
                )
                .with_detail(json!({
                    "before_status": snapshot.status.as_str(),
                    "after_status": updated.status.as_str(),
                })),
            )
            .await;

        Ok(ApiResponse::success_with_message(
            ScheduleResponse::from(updated),
            "Horario actualizado exitosamente".to_string(),
        ))
    }

    /// Bind/unbind según la transición observada entre dos versiones del
    /// horario
    async fn drive_assignment(&self, before: &Schedule, after: &Schedule) -> AppResult<()> {
        let was_assigned = before.status == ScheduleStatus::Assigned;
        let is_assigned = after.status == ScheduleStatus::Assigned;
        let pair_changed =
            before.driver_id != after.driver_id || before.vehicle_id != after.vehicle_id;

        if was_assigned && (!is_assigned || pair_changed) {
            self.assignment
                .unbind(before.driver_id, before.vehicle_id)
                .await?;
        }
        if is_assigned && (!was_assigned || pair_changed) {
            self.assignment
                .bind(after.driver_id, after.vehicle_id)
                .await?;
        }
        Ok(())
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        request: ChangeScheduleStatusRequest,
    ) -> AppResult<ApiResponse<ScheduleResponse>> {
        let new_status = ScheduleStatus::parse(&request.status).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Estado inválido '{}': debe ser pending, assigned, completed o canceled",
                request.status
            ))
        })?;

        let schedule = self
            .schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;

        if schedule.status == new_status {
            return Ok(ApiResponse::success(ScheduleResponse::from(schedule)));
        }

        if new_status == ScheduleStatus::Assigned {
            let driver_busy = self
                .schedules
                .count_assigned_for_driver(schedule.driver_id, Some(id))
                .await?
                > 0;
            if driver_busy {
                return Err(AppError::Conflict(
                    "El conductor ya tiene otro horario activo".to_string(),
                ));
            }
        }

        // Completar o cancelar sin fin definido estampa el fin ahora:
        // hoy con la hora de shift_end, o fin de día
        let today = day_range::local_today(self.offset);
        let stamp = if new_status.is_terminal() && schedule.end_date.is_none() {
            Some(schedule.completion_end_date(today, self.offset))
        } else {
            None
        };

        let updated = self.schedules.update_status(id, new_status, stamp).await?;

        if let Err(e) = self.drive_assignment(&schedule, &updated).await {
            if let Err(rollback) = self.schedules.replace(&schedule).await {
                log::error!(
                    "❌ No se pudo restaurar el horario {} tras fallo del coordinador: {}",
                    id,
                    rollback
                );
            }
            return Err(e);
        }

        // Al completar, pase final de materialización para cubrir los
        // días hasta el fin recién estampado
        if new_status == ScheduleStatus::Completed {
            if let Err(e) = self.reconciliation.materialize_daily_payments(&updated).await {
                log::warn!(
                    "⚠️ Horario {} completado pero la materialización final falló: {}",
                    id,
                    e
                );
            }
        }

        self.audit
            .record(
                AuditEvent::new(
                    "schedule_status_changed",
                    "schedules",
                    id,
                    format!(
                        "Estado cambiado de {} a {}",
                        schedule.status.as_str(),
                        new_status.as_str()
                    ),
                ),
            )
            .await;

        Ok(ApiResponse::success_with_message(
            ScheduleResponse::from(updated),
            "Estado actualizado exitosamente".to_string(),
        ))
    }

    /// Borrado incondicional con cascada: primero los pagos, luego la
    /// liberación de punteros si estaba activo, al final el horario
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let schedule = self
            .schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;

        let deleted_payments = self.payments.delete_by_schedule(id).await?;
        if schedule.status == ScheduleStatus::Assigned {
            self.assignment
                .unbind(schedule.driver_id, schedule.vehicle_id)
                .await?;
        }
        self.schedules.delete(id).await?;

        self.audit
            .record(
                AuditEvent::new(
                    "schedule_deleted",
                    "schedules",
                    id,
                    format!("Horario eliminado junto con {} pago(s)", deleted_payments),
                ),
            )
            .await;

        Ok(ApiResponse::message_only(
            "Horario eliminado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ScheduleResponse> {
        let schedule = self
            .schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;
        Ok(ScheduleResponse::from(schedule))
    }

    pub async fn list_all(&self) -> AppResult<Vec<ScheduleResponse>> {
        Ok(self
            .schedules
            .find_all()
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    /// Horarios actualmente activos (ocupando conductor y vehículo)
    pub async fn list_current(&self) -> AppResult<Vec<ScheduleResponse>> {
        Ok(self
            .schedules
            .find_assigned()
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    pub async fn list_future(&self) -> AppResult<Vec<ScheduleResponse>> {
        let today = day_range::local_today(self.offset);
        Ok(self
            .schedules
            .find_future(today)
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    pub async fn list_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<ScheduleResponse>> {
        Ok(self
            .schedules
            .find_by_driver(driver_id)
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    pub async fn list_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<ScheduleResponse>> {
        Ok(self
            .schedules
            .find_by_vehicle(vehicle_id)
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    pub async fn list_on_date(&self, date: &str) -> AppResult<Vec<ScheduleResponse>> {
        let day = parse_date(date, "date")?;
        let day_start = day_range::local_datetime_to_utc(day, NaiveTime::MIN, self.offset);
        Ok(self
            .schedules
            .find_active_on(day, day_start)
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    pub async fn list_in_period(&self, query: PeriodQuery) -> AppResult<Vec<ScheduleResponse>> {
        let from = parse_date(&query.from, "from")?;
        let to = parse_date(&query.to, "to")?;
        if to < from {
            return Err(AppError::ValidationError(
                "'to' no puede ser anterior a 'from'".to_string(),
            ));
        }
        let from_start = day_range::local_datetime_to_utc(from, NaiveTime::MIN, self.offset);
        Ok(self
            .schedules
            .find_in_period(to, from_start)
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    /// Camino de lectura que sí enumera todos los conflictos de una
    /// ventana propuesta
    pub async fn list_conflicts(&self, query: ConflictsQuery) -> AppResult<Vec<ScheduleResponse>> {
        let from = parse_date(&query.from, "from")?;
        let to = query.to.as_deref().map(|t| parse_date(t, "to")).transpose()?;
        if let Some(to_day) = to {
            if to_day < from {
                return Err(AppError::ValidationError(
                    "'to' no puede ser anterior a 'from'".to_string(),
                ));
            }
        }
        let from_start = day_range::local_datetime_to_utc(from, NaiveTime::MIN, self.offset);
        Ok(self
            .schedules
            .find_all_overlapping(query.driver_id, query.vehicle_id, to, from_start, query.exclude)
            .await?
            .into_iter()
            .map(ScheduleResponse::from)
            .collect())
    }

    /// Disparo manual del barrido de expiración
    pub async fn check_expired(&self) -> AppResult<SweepReportResponse> {
        let report = self.sweeps.run_expiration_sweep().await?;
        Ok(SweepReportResponse {
            examined: report.examined,
            affected: report.affected,
            errors: report.errors,
        })
    }
}
