//! Modelo de Schedule
//!
//! Un horario asigna un conductor a un vehículo sobre una ventana de
//! fechas. La máquina de estados es: `pending` (futuro o en espera),
//! `assigned` (ocupa conductor y vehículo), `completed` / `canceled`
//! (terminales). Invariante: a lo sumo un horario `assigned` por conductor
//! y por vehículo en cualquier instante.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::utils::day_range;

/// Estado del horario - mapea al ENUM schedule_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Pending,
    Assigned,
    Completed,
    Canceled,
}

impl ScheduleStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "assigned" => Some(Self::Assigned),
            "completed" => Some(Self::Completed),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Estado inicial al crear un horario: futuro → `pending`; de hoy o
    /// pasado → `assigned` solo si el conductor no tiene otro horario
    /// `assigned`, si no queda en espera como `pending`
    pub fn initial(schedule_date: NaiveDate, today: NaiveDate, driver_busy: bool) -> Self {
        if schedule_date > today {
            Self::Pending
        } else if driver_busy {
            Self::Pending
        } else {
            Self::Assigned
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    /// Inicio inclusivo, semántica de solo-fecha
    pub schedule_date: NaiveDate,
    /// Fin de la asignación; nulo = abierta hacia adelante
    pub end_date: Option<DateTime<Utc>>,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub status: ScheduleStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Día calendario local del fin, truncado a día
    pub fn end_day(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.end_date.map(|e| day_range::to_local_day(e, offset))
    }

    /// Instante en que la ventana del horario termina de hecho:
    /// `end_date` si existe; si no, `schedule_date` + `shift_end`; si
    /// tampoco hay turno, el fin del día calendario de `schedule_date`
    pub fn effective_end(&self, offset: FixedOffset) -> DateTime<Utc> {
        if let Some(end) = self.end_date {
            return end;
        }
        match self.shift_end {
            Some(shift_end) => {
                day_range::local_datetime_to_utc(self.schedule_date, shift_end, offset)
            }
            None => day_range::end_of_day_utc(self.schedule_date, offset),
        }
    }

    /// ¿La ventana ya venció a este instante?
    pub fn is_expired(&self, now: DateTime<Utc>, offset: FixedOffset) -> bool {
        self.effective_end(offset) < now
    }

    /// Fecha de fin que se estampa al completar/cancelar un horario sin
    /// `end_date`: hoy, con `shift_end` como hora si existe, si no fin
    /// de día
    pub fn completion_end_date(&self, today: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
        let time = self.shift_end.unwrap_or_else(day_range::end_of_day_time);
        day_range::local_datetime_to_utc(today, time, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn schedule(date: &str, end: Option<DateTime<Utc>>, shift_end: Option<NaiveTime>) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            schedule_date: d(date),
            end_date: end,
            shift_start: None,
            shift_end,
            status: ScheduleStatus::Assigned,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_initial_status_future_is_pending() {
        assert_eq!(
            ScheduleStatus::initial(d("2024-01-20"), d("2024-01-10"), false),
            ScheduleStatus::Pending
        );
    }

    #[test]
    fn test_initial_status_today_free_driver_is_assigned() {
        assert_eq!(
            ScheduleStatus::initial(d("2024-01-10"), d("2024-01-10"), false),
            ScheduleStatus::Assigned
        );
        // También fecha pasada
        assert_eq!(
            ScheduleStatus::initial(d("2024-01-05"), d("2024-01-10"), false),
            ScheduleStatus::Assigned
        );
    }

    #[test]
    fn test_initial_status_busy_driver_waits() {
        assert_eq!(
            ScheduleStatus::initial(d("2024-01-10"), d("2024-01-10"), true),
            ScheduleStatus::Pending
        );
    }

    #[test]
    fn test_effective_end_prefers_end_date() {
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let s = schedule("2024-01-10", Some(end), Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(s.effective_end(offset), end);
    }

    #[test]
    fn test_effective_end_uses_shift_end() {
        let s = schedule("2024-01-10", None, Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            s.effective_end(offset),
            Utc.with_ymd_and_hms(2024, 1, 10, 18, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_effective_end_falls_back_to_end_of_day() {
        let s = schedule("2024-01-10", None, None);
        let offset = FixedOffset::east_opt(0).unwrap();
        let end = s.effective_end(offset);
        assert_eq!(end.date_naive(), d("2024-01-10"));
        // Pasadas las 23:59:59 del día ya venció
        let next_day = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        assert!(s.is_expired(next_day, offset));
        let same_day = Utc.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap();
        assert!(!s.is_expired(same_day, offset));
    }

    #[test]
    fn test_completion_end_date_stamps_shift_end() {
        // Completar sin end_date con shift_end=18:00 estampa hoy a las 18:00
        let s = schedule("2024-01-01", None, Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
        let offset = FixedOffset::east_opt(0).unwrap();
        let stamped = s.completion_end_date(d("2024-03-05"), offset);
        assert_eq!(stamped, Utc.with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_completion_end_date_defaults_to_end_of_day() {
        let s = schedule("2024-01-01", None, None);
        let offset = FixedOffset::east_opt(0).unwrap();
        let stamped = s.completion_end_date(d("2024-03-05"), offset);
        assert_eq!(stamped.date_naive(), d("2024-03-05"));
        assert_eq!(stamped.time(), day_range::end_of_day_time());
    }
}
