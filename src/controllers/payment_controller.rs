//! Controller de pagos
//!
//! CRUD de pagos diarios enganchado al motor de conciliación: crear o
//! confirmar el pago del último día puede completar el horario; borrar o
//! rechazar un pago puede reabrirlo.

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::ApiResponse;
use crate::dto::payment_dto::{
    ChangePaymentStatusRequest, CreatePaymentRequest, MissingDaysResponse, PaymentResponse,
    UpdatePaymentRequest,
};
use crate::models::audit::AuditEvent;
use crate::models::payment::{Payment, PaymentStatus, PaymentType};
use crate::repositories::payment_repository::PaymentRepository;
use crate::repositories::schedule_repository::ScheduleRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::audit_service::AuditService;
use crate::services::reconciliation_service::ReconciliationService;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::parse_date;

pub struct PaymentController {
    payments: PaymentRepository,
    schedules: ScheduleRepository,
    vehicles: VehicleRepository,
    reconciliation: ReconciliationService,
    audit: AuditService,
}

impl PaymentController {
    pub fn new(pool: PgPool, offset: FixedOffset) -> Self {
        Self {
            payments: PaymentRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            reconciliation: ReconciliationService::new(pool.clone(), offset),
            audit: AuditService::postgres(pool),
        }
    }

    fn parse_type(value: Option<&str>) -> AppResult<PaymentType> {
        match value {
            None => Ok(PaymentType::default()),
            Some(raw) => PaymentType::parse(raw).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Tipo de pago inválido '{}': debe ser cash, transfer, card u other",
                    raw
                ))
            }),
        }
    }

    /// ¿El monto alcanza la meta diaria del vehículo del horario?
    async fn meets_target(&self, vehicle_id: Uuid, amount: Decimal) -> bool {
        match self.vehicles.find_by_id(vehicle_id).await {
            Ok(Some(vehicle)) => vehicle.meets_target(amount),
            _ => false,
        }
    }

    async fn to_response(&self, payment: Payment) -> PaymentResponse {
        let meets = match self.schedules.find_by_id(payment.schedule_id).await {
            Ok(Some(schedule)) => self.meets_target(schedule.vehicle_id, payment.amount).await,
            _ => false,
        };
        PaymentResponse::from_payment(payment, meets)
    }

    pub async fn create(
        &self,
        request: CreatePaymentRequest,
    ) -> AppResult<ApiResponse<PaymentResponse>> {
        // Validación sincrónica antes de cualquier acceso a datos
        if request.amount <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "El monto debe ser mayor a cero".to_string(),
            ));
        }
        let payment_date = parse_date(&request.payment_date, "payment_date")?;
        let payment_type = Self::parse_type(request.payment_type.as_deref())?;

        let schedule = self
            .schedules
            .find_by_id(request.schedule_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;

        // Un pago por horario por día: el día puede estar ocupado incluso
        // por un placeholder generado; en ese caso se edita el existente
        if self.reconciliation.is_day_paid(&schedule, payment_date).await? {
            return Err(AppError::Conflict(format!(
                "Ya existe un pago del horario {} para el día {}",
                schedule.id, payment_date
            )));
        }

        let payment = self
            .payments
            .create(
                schedule.id,
                request.amount,
                payment_date,
                payment_type,
                PaymentStatus::Confirmed,
                false,
                request.evidence_url,
                request.notes,
            )
            .await?;

        // Pago del último día → el horario puede quedar completo
        if self
            .reconciliation
            .is_last_payment_for_schedule(&schedule, payment_date)
        {
            self.reconciliation.complete_if_all_paid(&schedule).await?;
        }

        self.audit
            .record(
                AuditEvent::new(
                    "payment_created",
                    "payments",
                    payment.id,
                    format!(
                        "Pago de {} registrado para el día {}",
                        payment.amount, payment.payment_date
                    ),
                )
                .with_detail(json!({ "schedule_id": schedule.id })),
            )
            .await;

        let meets = self.meets_target(schedule.vehicle_id, payment.amount).await;
        Ok(ApiResponse::success_with_message(
            PaymentResponse::from_payment(payment, meets),
            "Pago registrado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePaymentRequest,
    ) -> AppResult<ApiResponse<PaymentResponse>> {
        if let Some(amount) = request.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::ValidationError(
                    "El monto debe ser mayor a cero".to_string(),
                ));
            }
        }
        let new_date = request
            .payment_date
            .as_deref()
            .map(|d| parse_date(d, "payment_date"))
            .transpose()?;
        let new_type = request
            .payment_type
            .as_deref()
            .map(|t| Self::parse_type(Some(t)))
            .transpose()?;

        let payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;

        // Mover el pago de día re-valida la unicidad por día
        if let Some(date) = new_date {
            if date != payment.payment_date
                && self
                    .payments
                    .exists_for_day(payment.schedule_id, date, Some(id))
                    .await?
            {
                return Err(AppError::Conflict(format!(
                    "Ya existe un pago del horario {} para el día {}",
                    payment.schedule_id, date
                )));
            }
        }

        let mut next = payment.clone();
        if let Some(amount) = request.amount {
            next.amount = amount;
        }
        if let Some(date) = new_date {
            next.payment_date = date;
        }
        if let Some(payment_type) = new_type {
            next.payment_type = payment_type;
        }
        if let Some(evidence_url) = request.evidence_url.clone() {
            next.evidence_url = Some(evidence_url);
        }
        if let Some(notes) = request.notes.clone() {
            next.notes = Some(notes);
        }

        let updated = self.payments.replace(&next).await?;

        // Editar el pago del último día puede cerrar el horario
        if let Some(schedule) = self.schedules.find_by_id(updated.schedule_id).await? {
            if self
                .reconciliation
                .is_last_payment_for_schedule(&schedule, updated.payment_date)
            {
                self.reconciliation.complete_if_all_paid(&schedule).await?;
            }
        }

        self.audit
            .record(AuditEvent::new(
                "payment_updated",
                "payments",
                id,
                "Pago actualizado".to_string(),
            ))
            .await;

        let response = self.to_response(updated).await;
        Ok(ApiResponse::success_with_message(
            response,
            "Pago actualizado exitosamente".to_string(),
        ))
    }

    /// Confirmar o rechazar un pago. Confirmar el último día puede
    /// completar el horario; rechazar puede revertir un completado.
    pub async fn change_status(
        &self,
        id: Uuid,
        request: ChangePaymentStatusRequest,
    ) -> AppResult<ApiResponse<PaymentResponse>> {
        let new_status = PaymentStatus::parse(&request.status).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Estado inválido '{}': debe ser pending, confirmed o rejected",
                request.status
            ))
        })?;

        let payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;

        let updated = self.payments.update_status(id, new_status).await?;

        if let Some(schedule) = self.schedules.find_by_id(updated.schedule_id).await? {
            match new_status {
                PaymentStatus::Confirmed => {
                    if self
                        .reconciliation
                        .is_last_payment_for_schedule(&schedule, updated.payment_date)
                    {
                        self.reconciliation.complete_if_all_paid(&schedule).await?;
                    }
                }
                // Un rechazo deja su día impago: un horario completado
                // vuelve a assigned
                PaymentStatus::Rejected => {
                    self.reconciliation.reopen_if_unpaid(&schedule).await?;
                }
                PaymentStatus::Pending => {}
            }
        }

        self.audit
            .record(AuditEvent::new(
                "payment_status_changed",
                "payments",
                id,
                format!(
                    "Estado del pago cambiado de {} a {}",
                    payment.status.as_str(),
                    new_status.as_str()
                ),
            ))
            .await;

        let response = self.to_response(updated).await;
        Ok(ApiResponse::success_with_message(
            response,
            "Estado del pago actualizado".to_string(),
        ))
    }

    /// Borrar un pago puede reabrir el horario que ese pago cerraba
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;

        self.payments.delete(id).await?;

        if let Some(schedule) = self.schedules.find_by_id(payment.schedule_id).await? {
            self.reconciliation.reopen_if_unpaid(&schedule).await?;
        }

        self.audit
            .record(
                AuditEvent::new(
                    "payment_deleted",
                    "payments",
                    id,
                    format!("Pago del día {} eliminado", payment.payment_date),
                )
                .with_detail(json!({ "schedule_id": payment.schedule_id })),
            )
            .await;

        Ok(ApiResponse::message_only(
            "Pago eliminado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<PaymentResponse> {
        let payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;
        Ok(self.to_response(payment).await)
    }

    pub async fn list_by_schedule(&self, schedule_id: Uuid) -> AppResult<Vec<PaymentResponse>> {
        let schedule = self
            .schedules
            .find_by_id(schedule_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;

        let vehicle = self.vehicles.find_by_id(schedule.vehicle_id).await?;
        let payments = self.payments.find_by_schedule(schedule_id).await?;
        Ok(payments
            .into_iter()
            .map(|payment| {
                let meets = vehicle
                    .as_ref()
                    .map(|v| v.meets_target(payment.amount))
                    .unwrap_or(false);
                PaymentResponse::from_payment(payment, meets)
            })
            .collect())
    }

    /// Días del horario sin pago no-rechazado (GetUnpaidDays)
    pub async fn missing_days(&self, schedule_id: Uuid) -> AppResult<MissingDaysResponse> {
        let schedule = self
            .schedules
            .find_by_id(schedule_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Horario no encontrado".to_string()))?;

        let days = self.reconciliation.unpaid_days(&schedule).await?;
        Ok(MissingDaysResponse {
            schedule_id: schedule_id.to_string(),
            count: days.len(),
            missing_days: days
                .into_iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
        })
    }
}
