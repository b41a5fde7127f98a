//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod audit;
pub mod driver;
pub mod payment;
pub mod schedule;
pub mod vehicle;
