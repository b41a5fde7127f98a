//! DTOs de Payment

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::payment::Payment;

/// Request para crear un pago manual. El día ya puede estar ocupado por
/// un pago generado automáticamente; en ese caso la creación se rechaza
/// y corresponde editar el existente.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub schedule_id: Uuid,
    pub amount: Decimal,
    /// Formato YYYY-MM-DD
    pub payment_date: String,
    pub payment_type: Option<String>,
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
}

/// Request de actualización parcial de un pago
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentRequest {
    pub amount: Option<Decimal>,
    pub payment_date: Option<String>,
    pub payment_type: Option<String>,
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
}

/// Request para confirmar o rechazar un pago
#[derive(Debug, Deserialize)]
pub struct ChangePaymentStatusRequest {
    pub status: String,
}

/// Response de pago para la API
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub schedule_id: String,
    pub amount: String,
    pub payment_date: String,
    pub payment_type: String,
    pub status: String,
    pub auto_generated: bool,
    /// Derivado: monto ≥ meta diaria del vehículo (cuando hay meta)
    pub is_meeting_target: bool,
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PaymentResponse {
    pub fn from_payment(p: Payment, is_meeting_target: bool) -> Self {
        Self {
            id: p.id.to_string(),
            schedule_id: p.schedule_id.to_string(),
            amount: p.amount.to_string(),
            payment_date: p.payment_date.format("%Y-%m-%d").to_string(),
            payment_type: p.payment_type.as_str().to_string(),
            status: p.status.as_str().to_string(),
            auto_generated: p.auto_generated,
            is_meeting_target,
            evidence_url: p.evidence_url,
            notes: p.notes,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Días del horario sin pago no-rechazado, en orden ascendente
#[derive(Debug, Serialize)]
pub struct MissingDaysResponse {
    pub schedule_id: String,
    pub missing_days: Vec<String>,
    pub count: usize,
}
