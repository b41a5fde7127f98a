//! Sink de auditoría
//!
//! El núcleo registra un evento tras cada mutación exitosa. La escritura
//! es best-effort: si el sink falla se deja constancia en el log y la
//! operación disparadora sigue su curso.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::audit::AuditEvent;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: &AuditEvent) -> AppResult<()>;
}

/// Sink respaldado en la tabla audit_logs
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, event: &AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, event_type, module, entity_id, description, actor, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.event_type)
        .bind(&event.module)
        .bind(&event.entity_id)
        .bind(&event.description)
        .bind(&event.actor)
        .bind(&event.detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error writing audit log: {}", e)))?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct AuditService {
    sink: Arc<dyn AuditSink>,
}

impl AuditService {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            sink: Arc::new(PgAuditSink::new(pool)),
        }
    }

    pub fn with_sink(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Registrar el evento; un fallo nunca se propaga al llamador
    pub async fn record(&self, event: AuditEvent) {
        if let Err(e) = self.sink.record(&event).await {
            log::warn!(
                "⚠️ No se pudo escribir el registro de auditoría {}/{}: {}",
                event.module,
                event.event_type,
                e
            );
        }
    }
}
