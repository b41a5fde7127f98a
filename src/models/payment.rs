//! Modelo de Payment
//!
//! Un pago por día calendario activo de un horario. El motor de
//! conciliación materializa uno con monto 0 y estado `pending` por cada
//! día faltante; el usuario luego lo confirma, edita o rechaza. Un pago
//! rechazado no cuenta para "todos los días pagados".

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del pago - mapea al ENUM payment_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }
}

/// Tipo de pago - mapea al ENUM payment_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Transfer,
    Card,
    Other,
}

impl PaymentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "card" => Some(Self::Card),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Card => "card",
            Self::Other => "other",
        }
    }
}

impl Default for PaymentType {
    fn default() -> Self {
        Self::Cash
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub amount: Decimal,
    /// Granularidad de solo-fecha: un pago por horario por día calendario
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    /// Marcador de "generado automáticamente" por la materialización
    pub auto_generated: bool,
    pub evidence_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Un día queda cubierto por cualquier pago no rechazado
    pub fn counts_as_paid(&self) -> bool {
        self.status != PaymentStatus::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn payment_with_status(status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            amount: Decimal::ZERO,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            payment_type: PaymentType::default(),
            status,
            auto_generated: true,
            evidence_url: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rejected_payment_does_not_cover_its_day() {
        assert!(payment_with_status(PaymentStatus::Pending).counts_as_paid());
        assert!(payment_with_status(PaymentStatus::Confirmed).counts_as_paid());
        assert!(!payment_with_status(PaymentStatus::Rejected).counts_as_paid());
    }

    #[test]
    fn test_status_parse_round_trip() {
        for s in ["pending", "confirmed", "rejected"] {
            assert_eq!(PaymentStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(PaymentStatus::parse("refunded").is_none());
    }

    #[test]
    fn test_type_parse_defaults() {
        for s in ["cash", "transfer", "card", "other"] {
            assert_eq!(PaymentType::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(PaymentType::default(), PaymentType::Cash);
    }
}
