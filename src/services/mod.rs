//! Services module
//!
//! Este módulo contiene la lógica de negocio que cruza varios modelos:
//! la coordinación de asignación conductor↔vehículo, el motor de
//! conciliación de pagos, los barridos periódicos y el sink de auditoría.

pub mod assignment_service;
pub mod audit_service;
pub mod reconciliation_service;
pub mod sweep_service;
pub mod task_runner;
