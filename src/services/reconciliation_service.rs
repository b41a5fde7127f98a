//! Motor de conciliación de pagos
//!
//! Materializa un pago por día calendario activo de cada horario, calcula
//! los días impagos y promueve a `completed` los horarios con fin definido
//! cuyos días quedaron todos cubiertos. Todas las operaciones son
//! idempotentes: repetirlas nunca duplica un día.

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashSet;

use crate::models::payment::{PaymentStatus, PaymentType};
use crate::models::schedule::{Schedule, ScheduleStatus};
use crate::repositories::payment_repository::PaymentRepository;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::services::assignment_service::AssignmentService;
use crate::utils::day_range::{self, DayRange};
use crate::utils::errors::AppResult;

/// Días del rango sin cobertura, en orden ascendente
fn missing_days(range: &DayRange, covered: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    range.days().filter(|d| !covered.contains(d)).collect()
}

pub struct ReconciliationService {
    schedules: ScheduleRepository,
    payments: PaymentRepository,
    assignment: AssignmentService,
    offset: FixedOffset,
}

impl ReconciliationService {
    pub fn new(pool: PgPool, offset: FixedOffset) -> Self {
        Self {
            schedules: ScheduleRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            assignment: AssignmentService::new(pool),
            offset,
        }
    }

    /// Crear el pago placeholder (monto 0, `pending`) de cada día en
    /// `[schedule_date, min(end ?? hoy, hoy)]` que aún no tenga uno.
    /// Idempotente: los días ya ocupados se saltan, sin importar cuántas
    /// veces se dispare (creación, cambio de fechas, completado, barrido).
    pub async fn materialize_daily_payments(&self, schedule: &Schedule) -> AppResult<u32> {
        let today = day_range::local_today(self.offset);
        let range = match DayRange::clamped(
            schedule.schedule_date,
            schedule.end_day(self.offset),
            today,
        ) {
            Some(range) => range,
            // Horario futuro: todavía no hay días materializables
            None => return Ok(0),
        };

        let existing: HashSet<NaiveDate> = self
            .payments
            .list_dates(schedule.id, true)
            .await?
            .into_iter()
            .collect();

        let mut created = 0u32;
        for day in missing_days(&range, &existing) {
            self.payments
                .create(
                    schedule.id,
                    Decimal::ZERO,
                    day,
                    PaymentType::default(),
                    PaymentStatus::Pending,
                    true,
                    None,
                    Some("Generado automáticamente".to_string()),
                )
                .await?;
            created += 1;
        }

        if created > 0 {
            log::info!(
                "🧾 Horario {}: {} pago(s) diario(s) materializado(s)",
                schedule.id,
                created
            );
        }
        Ok(created)
    }

    /// ¿Existe ya un pago (de cualquier estado) para ese día del horario?
    pub async fn is_day_paid(&self, schedule: &Schedule, date: NaiveDate) -> AppResult<bool> {
        self.payments.exists_for_day(schedule.id, date, None).await
    }

    /// Días de `[schedule_date, end ?? hoy]` sin pago no-rechazado,
    /// ascendente
    pub async fn unpaid_days(&self, schedule: &Schedule) -> AppResult<Vec<NaiveDate>> {
        let today = day_range::local_today(self.offset);
        let end = schedule.end_day(self.offset).unwrap_or(today);
        let range = match DayRange::new(schedule.schedule_date, end) {
            Some(range) => range,
            None => return Ok(Vec::new()),
        };

        let covered: HashSet<NaiveDate> = self
            .payments
            .list_dates(schedule.id, false)
            .await?
            .into_iter()
            .collect();

        Ok(missing_days(&range, &covered))
    }

    /// ¿La fecha cae en o después del último día del horario? Un horario
    /// sin `end_date` nunca tiene "último pago": solo se completa con un
    /// cambio de estado explícito.
    pub fn is_last_payment_for_schedule(&self, schedule: &Schedule, date: NaiveDate) -> bool {
        match schedule.end_day(self.offset) {
            Some(end_day) => date >= end_day,
            None => false,
        }
    }

    /// Promover a `completed` si el horario está `assigned`, tiene fin
    /// definido y no le quedan días impagos. Es una transición directa,
    /// más estrecha que el Update completo, pero igual suelta los
    /// punteros de asignación.
    pub async fn complete_if_all_paid(&self, schedule: &Schedule) -> AppResult<bool> {
        if schedule.status != ScheduleStatus::Assigned || schedule.end_date.is_none() {
            return Ok(false);
        }
        if !self.unpaid_days(schedule).await?.is_empty() {
            return Ok(false);
        }

        self.schedules
            .update_status(schedule.id, ScheduleStatus::Completed, None)
            .await?;
        self.assignment
            .unbind(schedule.driver_id, schedule.vehicle_id)
            .await?;

        log::info!(
            "✅ Horario {} completado: todos sus días quedaron pagados",
            schedule.id
        );
        Ok(true)
    }

    /// Reabrir un horario `completed` cuyo conjunto de días impagos dejó
    /// de estar vacío (se borró o rechazó el pago que lo cerraba).
    pub async fn reopen_if_unpaid(&self, schedule: &Schedule) -> AppResult<bool> {
        if schedule.status != ScheduleStatus::Completed {
            return Ok(false);
        }
        if self.unpaid_days(schedule).await?.is_empty() {
            return Ok(false);
        }

        self.schedules
            .update_status(schedule.id, ScheduleStatus::Assigned, None)
            .await?;

        // Volver a `assigned` re-liga los punteros; si el bind ya no es
        // válido (conductor de salida, vehículo inactivo) queda para el
        // barrido, que re-deriva el estado correcto
        if let Err(e) = self
            .assignment
            .bind(schedule.driver_id, schedule.vehicle_id)
            .await
        {
            log::warn!(
                "⚠️ Horario {} reabierto pero el bind falló: {}",
                schedule.id,
                e
            );
        }

        log::info!(
            "↩️ Horario {} reabierto: volvió a tener días impagos",
            schedule.id
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_missing_days_skips_covered() {
        // Horario D1..D5 con pagos en D1, D2 y D4 → faltan D3 y D5
        let range = DayRange::new(d("2024-03-01"), d("2024-03-05")).unwrap();
        let covered: HashSet<NaiveDate> =
            [d("2024-03-01"), d("2024-03-02"), d("2024-03-04")].into_iter().collect();
        assert_eq!(
            missing_days(&range, &covered),
            vec![d("2024-03-03"), d("2024-03-05")]
        );
    }

    #[test]
    fn test_missing_days_empty_when_all_covered() {
        let range = DayRange::new(d("2024-03-01"), d("2024-03-03")).unwrap();
        let covered: HashSet<NaiveDate> =
            [d("2024-03-01"), d("2024-03-02"), d("2024-03-03")].into_iter().collect();
        assert!(missing_days(&range, &covered).is_empty());
    }

    #[test]
    fn test_missing_days_full_when_none_covered() {
        let range = DayRange::new(d("2024-03-01"), d("2024-03-02")).unwrap();
        let covered = HashSet::new();
        assert_eq!(
            missing_days(&range, &covered),
            vec![d("2024-03-01"), d("2024-03-02")]
        );
    }

    #[test]
    fn test_missing_days_is_idempotent_input() {
        // La materialización re-ejecutada parte del conjunto ya cubierto:
        // con todo cubierto no produce nada nuevo
        let range = DayRange::new(d("2024-03-01"), d("2024-03-05")).unwrap();
        let after_first_run: HashSet<NaiveDate> = range.days().collect();
        assert!(missing_days(&range, &after_first_run).is_empty());
    }
}
