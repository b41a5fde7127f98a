//! Modelo de registro de auditoría
//!
//! El núcleo emite un evento después de cada operación mutante exitosa.
//! Escribirlo es best-effort: un fallo del sink nunca hace fallar la
//! operación que lo disparó.

use serde::Serialize;
use uuid::Uuid;

/// Evento a registrar en el sink de auditoría
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event_type: String,
    pub module: String,
    pub entity_id: String,
    pub description: String,
    pub actor: Option<String>,
    pub detail: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(event_type: &str, module: &str, entity_id: Uuid, description: String) -> Self {
        Self {
            event_type: event_type.to_string(),
            module: module.to_string(),
            entity_id: entity_id.to_string(),
            description,
            actor: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}
