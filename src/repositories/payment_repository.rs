//! Repositorio de Payment
//!
//! La unicidad "un pago por horario por día calendario" no es un índice
//! único: la mantienen el algoritmo de materialización y las
//! validaciones de los controllers.

use crate::models::payment::{Payment, PaymentStatus, PaymentType};
use crate::utils::errors::AppError;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        schedule_id: Uuid,
        amount: Decimal,
        payment_date: NaiveDate,
        payment_type: PaymentType,
        status: PaymentStatus,
        auto_generated: bool,
        evidence_url: Option<String>,
        notes: Option<String>,
    ) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, schedule_id, amount, payment_date, payment_type, status, auto_generated, evidence_url, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(schedule_id)
        .bind(amount)
        .bind(payment_date)
        .bind(payment_type)
        .bind(status)
        .bind(auto_generated)
        .bind(evidence_url)
        .bind(notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating payment: {}", e)))?;

        Ok(payment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding payment: {}", e)))?;

        Ok(payment)
    }

    pub async fn find_by_schedule(&self, schedule_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE schedule_id = $1 ORDER BY payment_date ASC",
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing payments: {}", e)))?;

        Ok(payments)
    }

    pub async fn find_by_schedule_and_date(
        &self,
        schedule_id: Uuid,
        payment_date: NaiveDate,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE schedule_id = $1 AND payment_date = $2 LIMIT 1",
        )
        .bind(schedule_id)
        .bind(payment_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error finding payment by date: {}", e)))?;

        Ok(payment)
    }

    /// ¿El día ya está ocupado por un pago de este horario? Cualquier
    /// estado ocupa el día; el rechazo solo se excluye en el cómputo de
    /// días impagos.
    pub async fn exists_for_day(
        &self,
        schedule_id: Uuid,
        payment_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM payments
                WHERE schedule_id = $1 AND payment_date = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(schedule_id)
        .bind(payment_date)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error checking payment day: {}", e)))?;

        Ok(exists)
    }

    /// Fechas con pago para un horario; con `include_rejected` en false
    /// devuelve solo los días cubiertos por pagos no rechazados
    pub async fn list_dates(
        &self,
        schedule_id: Uuid,
        include_rejected: bool,
    ) -> Result<Vec<NaiveDate>, AppError> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT payment_date FROM payments
            WHERE schedule_id = $1 AND ($2 OR status <> 'rejected')
            ORDER BY payment_date ASC
            "#,
        )
        .bind(schedule_id)
        .bind(include_rejected)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing payment dates: {}", e)))?;

        Ok(dates)
    }

    pub async fn replace(&self, payment: &Payment) -> Result<Payment, AppError> {
        let updated = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $2, payment_date = $3, payment_type = $4, status = $5,
                evidence_url = $6, notes = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(payment.payment_type)
        .bind(payment.status)
        .bind(payment.evidence_url.clone())
        .bind(payment.notes.clone())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating payment: {}", e)))?;

        Ok(updated)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating payment status: {}", e)))?;

        Ok(payment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error deleting payment: {}", e)))?;

        Ok(())
    }

    /// Cascada de borrado al eliminar un horario
    pub async fn delete_by_schedule(&self, schedule_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE schedule_id = $1")
            .bind(schedule_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error deleting schedule payments: {}", e)))?;

        Ok(result.rows_affected())
    }
}
