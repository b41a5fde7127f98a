//! Repositorios de acceso a datos
//!
//! Un repositorio por tabla; sentencias únicas, sin transacciones
//! multi-entidad.

pub mod driver_repository;
pub mod payment_repository;
pub mod schedule_repository;
pub mod vehicle_repository;
