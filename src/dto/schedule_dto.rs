//! DTOs de Schedule
//!
//! Los payloads de entrada llevan fechas como strings `YYYY-MM-DD` y horas
//! de pared `HH:MM`; los controllers los validan y convierten antes de
//! tocar la base. `UpdateScheduleRequest` enumera explícitamente qué
//! campos pueden cambiar y qué re-validación implica cada uno.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::schedule::Schedule;

/// Request para crear un horario
#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    /// Inicio inclusivo, formato YYYY-MM-DD
    pub schedule_date: String,
    /// Último día de la asignación; ausente = abierta hacia adelante
    pub end_date: Option<String>,
    /// Hora de pared HH:MM
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub notes: Option<String>,
}

/// Request de actualización parcial: cada campo presente dispara su
/// re-validación (conductor/vehículo → existencia y reglas de negocio;
/// fechas → detector de solapamientos y re-materialización de pagos)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduleRequest {
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub schedule_date: Option<String>,
    pub end_date: Option<String>,
    /// Borrar el fin y volver la asignación abierta
    pub clear_end_date: Option<bool>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub notes: Option<String>,
}

impl UpdateScheduleRequest {
    /// ¿El cambio afecta la ventana o sus participantes? En ese caso hay
    /// que re-correr el detector de solapamientos
    pub fn touches_window(&self) -> bool {
        self.driver_id.is_some()
            || self.vehicle_id.is_some()
            || self.schedule_date.is_some()
            || self.end_date.is_some()
            || self.clear_end_date == Some(true)
    }

    pub fn touches_dates(&self) -> bool {
        self.schedule_date.is_some() || self.end_date.is_some() || self.clear_end_date == Some(true)
    }
}

/// Request para transición de estado
#[derive(Debug, Deserialize)]
pub struct ChangeScheduleStatusRequest {
    pub status: String,
}

/// Query del listado por período
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub from: String,
    pub to: String,
}

/// Query del listado de conflictos (camino de lectura que sí enumera
/// todos los solapamientos, usado por la planificación de mantenimiento)
#[derive(Debug, Deserialize)]
pub struct ConflictsQuery {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub from: String,
    pub to: Option<String>,
    pub exclude: Option<Uuid>,
}

/// Response de horario para la API
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub schedule_date: String,
    pub end_date: Option<String>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Schedule> for ScheduleResponse {
    fn from(s: Schedule) -> Self {
        Self {
            id: s.id.to_string(),
            driver_id: s.driver_id.to_string(),
            vehicle_id: s.vehicle_id.to_string(),
            schedule_date: s.schedule_date.format("%Y-%m-%d").to_string(),
            end_date: s.end_date.map(|e| e.to_rfc3339()),
            shift_start: s.shift_start.map(|t| t.format("%H:%M").to_string()),
            shift_end: s.shift_end.map(|t| t.format("%H:%M").to_string()),
            status: s.status.as_str().to_string(),
            notes: s.notes,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

/// Resultado del barrido de expiración disparado manualmente
#[derive(Debug, Serialize)]
pub struct SweepReportResponse {
    pub examined: usize,
    pub affected: usize,
    pub errors: Vec<String>,
}
