//! Controllers de la API
//!
//! Orquestan validación, repositorios y servicios por recurso. El de
//! horarios es el dueño de la máquina de estados.

pub mod driver_controller;
pub mod payment_controller;
pub mod schedule_controller;
pub mod vehicle_controller;
