//! Backend de programación de flota
//!
//! Asigna conductores a vehículos sobre ventanas de fechas (horarios),
//! materializa un pago de recaudación por día activo de cada horario y
//! mantiene consistentes horarios, pagos y punteros de asignación con
//! barridos periódicos de conciliación.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
