//! Barridos de conciliación
//!
//! La mitad "dirigida por el reloj" de la máquina de estados: los horarios
//! deben transicionar aunque nadie llame a la API. Dos deberes
//! independientes: expirar horarios cuya ventana ya venció y materializar
//! los pagos diarios de los horarios vivos. Cada barrido itera en
//! secuencia y aísla los fallos por ítem: un horario roto se loguea y se
//! salta, nunca aborta el resto.

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::audit::AuditEvent;
use crate::models::schedule::{Schedule, ScheduleStatus};
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::services::assignment_service::AssignmentService;
use crate::services::audit_service::AuditService;
use crate::services::reconciliation_service::ReconciliationService;
use crate::utils::day_range;
use crate::utils::errors::AppResult;

/// Resultado de una pasada de barrido
#[derive(Debug, Default)]
pub struct SweepReport {
    pub examined: usize,
    pub affected: usize,
    pub errors: Vec<String>,
}

pub struct SweepService {
    schedules: ScheduleRepository,
    reconciliation: ReconciliationService,
    assignment: AssignmentService,
    audit: AuditService,
    offset: FixedOffset,
}

impl SweepService {
    pub fn new(pool: PgPool, offset: FixedOffset) -> Self {
        Self {
            schedules: ScheduleRepository::new(pool.clone()),
            reconciliation: ReconciliationService::new(pool.clone(), offset),
            assignment: AssignmentService::new(pool.clone()),
            audit: AuditService::postgres(pool),
            offset,
        }
    }

    /// Barrido de expiración: todo horario `assigned` cuyo fin efectivo ya
    /// pasó se fuerza a `completed`, igual que si un usuario hubiera
    /// pedido el cambio de estado.
    pub async fn run_expiration_sweep(&self) -> AppResult<SweepReport> {
        let now = Utc::now();
        let assigned = self.schedules.find_assigned().await?;
        let mut report = SweepReport {
            examined: assigned.len(),
            ..Default::default()
        };

        for schedule in &assigned {
            match self.expire_if_due(schedule, now).await {
                Ok(true) => report.affected += 1,
                Ok(false) => {}
                Err(e) => {
                    log::warn!(
                        "⚠️ Barrido de expiración: horario {} falló y se salta: {}",
                        schedule.id,
                        e
                    );
                    report.errors.push(format!("{}: {}", schedule.id, e));
                }
            }
        }

        if report.affected > 0 || !report.errors.is_empty() {
            tracing::info!(
                "⏰ Barrido de expiración: {} examinados, {} completados, {} errores",
                report.examined,
                report.affected,
                report.errors.len()
            );
        }
        Ok(report)
    }

    /// Versión acotada a un conductor: la creación de horarios la corre
    /// antes de evaluar solapamientos, para que una ventana silenciosamente
    /// vencida no bloquee la nueva asignación.
    pub async fn expire_driver_schedules(&self, driver_id: Uuid) -> AppResult<usize> {
        let now = Utc::now();
        let mut completed = 0;
        for schedule in self.schedules.find_assigned_for_driver(driver_id).await? {
            if self.expire_if_due(&schedule, now).await? {
                completed += 1;
            }
        }
        Ok(completed)
    }

    async fn expire_if_due(&self, schedule: &Schedule, now: DateTime<Utc>) -> AppResult<bool> {
        // Nota: un horario abierto (end_date nulo) sin shift_end vence al
        // final del día de schedule_date. Para asignaciones genuinamente
        // abiertas esto es discutible; se conserva el comportamiento
        // original y queda registrado como pregunta abierta en DESIGN.md.
        if !schedule.is_expired(now, self.offset) {
            return Ok(false);
        }

        let today = day_range::local_today(self.offset);
        let stamp = if schedule.end_date.is_none() {
            Some(schedule.completion_end_date(today, self.offset))
        } else {
            None
        };

        let completed = self
            .schedules
            .update_status(schedule.id, ScheduleStatus::Completed, stamp)
            .await?;
        self.assignment
            .unbind(schedule.driver_id, schedule.vehicle_id)
            .await?;

        // Pase final de materialización, como en el ChangeStatus manual;
        // si falla lo reintenta el próximo barrido de pagos
        if let Err(e) = self
            .reconciliation
            .materialize_daily_payments(&completed)
            .await
        {
            log::warn!(
                "⚠️ Horario {} expirado pero la materialización final falló: {}",
                schedule.id,
                e
            );
        }

        self.audit
            .record(
                AuditEvent::new(
                    "schedule_expired",
                    "schedules",
                    schedule.id,
                    "Horario completado por vencimiento de ventana".to_string(),
                )
                .with_detail(json!({
                    "driver_id": schedule.driver_id,
                    "vehicle_id": schedule.vehicle_id,
                    "effective_end": schedule.effective_end(self.offset).to_rfc3339(),
                })),
            )
            .await;

        tracing::info!(
            "⏰ Horario {} forzado a completed (ventana vencida)",
            schedule.id
        );
        Ok(true)
    }

    /// Barrido de generación de pagos: materializa los días de todo
    /// horario vivo (`pending`/`assigned` con fin nulo o vigente).
    pub async fn run_payment_sweep(&self) -> AppResult<SweepReport> {
        let now = Utc::now();
        let open = self.schedules.find_materializable(now).await?;
        let mut report = SweepReport {
            examined: open.len(),
            ..Default::default()
        };

        for schedule in &open {
            match self.reconciliation.materialize_daily_payments(schedule).await {
                Ok(created) if created > 0 => report.affected += 1,
                Ok(_) => {}
                Err(e) => {
                    log::warn!(
                        "⚠️ Barrido de pagos: horario {} falló y se salta: {}",
                        schedule.id,
                        e
                    );
                    report.errors.push(format!("{}: {}", schedule.id, e));
                }
            }
        }

        tracing::info!(
            "🧾 Barrido de pagos: {} horarios examinados, {} con días nuevos, {} errores",
            report.examined,
            report.affected,
            report.errors.len()
        );
        Ok(report)
    }
}
