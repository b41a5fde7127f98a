//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos en los payloads de la API.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

/// Validar y convertir string a UUID
pub fn parse_uuid(value: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| AppError::ValidationError(format!("El campo '{}' no es un UUID válido", field)))
}

/// Validar y convertir string a fecha (YYYY-MM-DD)
pub fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::ValidationError(format!(
            "El campo '{}' debe tener formato YYYY-MM-DD, se recibió '{}'",
            field, value
        ))
    })
}

/// Validar y convertir string a hora de pared (HH:MM o HH:MM:SS)
pub fn parse_wall_clock(value: &str, field: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            AppError::ValidationError(format!(
                "El campo '{}' debe tener formato HH:MM, se recibió '{}'",
                field, value
            ))
        })
}

/// Validar que un string no esté vacío
pub fn require_not_empty(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!(
            "El campo '{}' es requerido",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_valid() {
        let date = parse_date("2024-01-15", "schedule_date").unwrap();
        assert_eq!(date.to_string(), "2024-01-15");
    }

    #[test]
    fn test_parse_date_invalid_format() {
        assert!(parse_date("15/01/2024", "schedule_date").is_err());
        assert!(parse_date("2024-13-01", "schedule_date").is_err());
    }

    #[test]
    fn test_parse_wall_clock_accepts_both_formats() {
        assert_eq!(
            parse_wall_clock("18:00", "shift_end").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
        assert_eq!(
            parse_wall_clock("06:30:15", "shift_start").unwrap(),
            NaiveTime::from_hms_opt(6, 30, 15).unwrap()
        );
        assert!(parse_wall_clock("25:00", "shift_end").is_err());
    }

    #[test]
    fn test_require_not_empty() {
        assert!(require_not_empty("  ", "notes").is_err());
        assert!(require_not_empty("ok", "notes").is_ok());
    }
}
