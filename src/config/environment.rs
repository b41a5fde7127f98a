//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración, incluidos los intervalos de los barridos periódicos y
//! la zona horaria de operación de la flota.

use chrono::FixedOffset;
use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// Intervalo del barrido de expiración, en minutos
    pub expiration_sweep_minutes: u64,
    /// Minutos después de medianoche local para el barrido diario de pagos
    pub payment_sweep_minutes_after_midnight: u32,
    /// Desplazamiento UTC de la zona de operación de la flota, en horas
    pub fleet_utc_offset_hours: i32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            expiration_sweep_minutes: env::var("EXPIRATION_SWEEP_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            payment_sweep_minutes_after_midnight: env::var("PAYMENT_SWEEP_MINUTES_AFTER_MIDNIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            fleet_utc_offset_hours: env::var("FLEET_UTC_OFFSET_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Zona horaria fija de la flota; un desplazamiento fuera de rango
    /// cae a UTC
    pub fn fleet_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.fleet_utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset is always valid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_offset_out_of_range_falls_back_to_utc() {
        let config = EnvironmentConfig {
            environment: "test".to_string(),
            port: 0,
            host: String::new(),
            cors_origins: vec![],
            expiration_sweep_minutes: 10,
            payment_sweep_minutes_after_midnight: 10,
            fleet_utc_offset_hours: 99,
        };
        assert_eq!(config.fleet_offset().local_minus_utc(), 0);
    }
}
