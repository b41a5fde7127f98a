//! Repositorio de Schedule
//!
//! Todas las escrituras son sentencias únicas: la capa de persistencia
//! solo garantiza atomicidad por fila, nunca envolvemos el horario y los
//! punteros conductor/vehículo en una misma transacción. La consistencia
//! entre entidades se re-deriva con los barridos periódicos.

use crate::models::schedule::{Schedule, ScheduleStatus};
use crate::utils::errors::AppError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
        schedule_date: NaiveDate,
        end_date: Option<DateTime<Utc>>,
        shift_start: Option<NaiveTime>,
        shift_end: Option<NaiveTime>,
        status: ScheduleStatus,
        notes: Option<String>,
    ) -> Result<Schedule, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            INSERT INTO schedules (id, driver_id, vehicle_id, schedule_date, end_date, shift_start, shift_end, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(driver_id)
        .bind(vehicle_id)
        .bind(schedule_date)
        .bind(end_date)
        .bind(shift_start)
        .bind(shift_end)
        .bind(status)
        .bind(notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating schedule: {}", e)))?;

        Ok(schedule)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Schedule>, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding schedule: {}", e)))?;

        Ok(schedule)
    }

    pub async fn find_all(&self) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules ORDER BY schedule_date DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing schedules: {}", e)))?;

        Ok(schedules)
    }

    /// Reemplazo de fila completa. Lo usa la actualización normal y también
    /// la restauración del snapshot previo cuando el coordinador de
    /// asignación rechaza el cambio.
    pub async fn replace(&self, schedule: &Schedule) -> Result<Schedule, AppError> {
        let updated = sqlx::query_as::<_, Schedule>(
            r#"
            UPDATE schedules
            SET driver_id = $2, vehicle_id = $3, schedule_date = $4, end_date = $5,
                shift_start = $6, shift_end = $7, status = $8, notes = $9, updated_at = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(schedule.id)
        .bind(schedule.driver_id)
        .bind(schedule.vehicle_id)
        .bind(schedule.schedule_date)
        .bind(schedule.end_date)
        .bind(schedule.shift_start)
        .bind(schedule.shift_end)
        .bind(schedule.status)
        .bind(schedule.notes.clone())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating schedule: {}", e)))?;

        Ok(updated)
    }

    /// Cambiar estado; `end_date` presente también estampa el fin
    /// (COALESCE conserva el existente cuando llega NULL)
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ScheduleStatus,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Schedule, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            UPDATE schedules
            SET status = $2, end_date = COALESCE($3, end_date), updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(end_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating schedule status: {}", e)))?;

        Ok(schedule)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error deleting schedule: {}", e)))?;

        Ok(())
    }

    /// Primer horario no-terminal que comparte conductor o vehículo y cuya
    /// ventana intersecta la solicitada. `window_end` nulo = abierta hacia
    /// adelante; `window_start_instant` es el inicio del primer día en UTC.
    pub async fn find_first_overlapping(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
        window_end: Option<NaiveDate>,
        window_start_instant: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Option<Schedule>, AppError> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules s
            WHERE s.status IN ('pending', 'assigned')
              AND (s.driver_id = $1 OR s.vehicle_id = $2)
              AND ($3::date IS NULL OR s.schedule_date <= $3)
              AND (s.end_date IS NULL OR s.end_date >= $4)
              AND ($5::uuid IS NULL OR s.id <> $5)
            ORDER BY s.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(driver_id)
        .bind(vehicle_id)
        .bind(window_end)
        .bind(window_start_instant)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error checking overlaps: {}", e)))?;

        Ok(schedule)
    }

    /// Variante que enumera todos los conflictos (camino de lectura)
    pub async fn find_all_overlapping(
        &self,
        driver_id: Uuid,
        vehicle_id: Uuid,
        window_end: Option<NaiveDate>,
        window_start_instant: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules s
            WHERE s.status IN ('pending', 'assigned')
              AND (s.driver_id = $1 OR s.vehicle_id = $2)
              AND ($3::date IS NULL OR s.schedule_date <= $3)
              AND (s.end_date IS NULL OR s.end_date >= $4)
              AND ($5::uuid IS NULL OR s.id <> $5)
            ORDER BY s.schedule_date ASC, s.created_at ASC
            "#,
        )
        .bind(driver_id)
        .bind(vehicle_id)
        .bind(window_end)
        .bind(window_start_instant)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing overlaps: {}", e)))?;

        Ok(schedules)
    }

    pub async fn count_assigned_for_driver(
        &self,
        driver_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM schedules
            WHERE driver_id = $1 AND status = 'assigned'
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(driver_id)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error counting assigned schedules: {}", e)))?;

        Ok(count)
    }

    pub async fn find_assigned_for_driver(
        &self,
        driver_id: Uuid,
    ) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE driver_id = $1 AND status = 'assigned' ORDER BY schedule_date ASC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error finding assigned schedules: {}", e)))?;

        Ok(schedules)
    }

    /// Todos los horarios actualmente `assigned` (entrada del barrido de
    /// expiración)
    pub async fn find_assigned(&self) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE status = 'assigned' ORDER BY driver_id, schedule_date ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing assigned schedules: {}", e)))?;

        Ok(schedules)
    }

    /// Horarios vivos para el barrido de generación de pagos: no
    /// terminales y con fin nulo o todavía vigente
    pub async fn find_materializable(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules
            WHERE status IN ('pending', 'assigned')
              AND (end_date IS NULL OR end_date >= $1)
            ORDER BY schedule_date ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing open schedules: {}", e)))?;

        Ok(schedules)
    }

    pub async fn find_by_driver(&self, driver_id: Uuid) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE driver_id = $1 ORDER BY schedule_date DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing driver schedules: {}", e)))?;

        Ok(schedules)
    }

    pub async fn find_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE vehicle_id = $1 ORDER BY schedule_date DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing vehicle schedules: {}", e)))?;

        Ok(schedules)
    }

    /// Horarios cuya ventana contiene el día dado
    pub async fn find_active_on(
        &self,
        day: NaiveDate,
        day_start_instant: DateTime<Utc>,
    ) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules
            WHERE schedule_date <= $1
              AND (end_date IS NULL OR end_date >= $2)
              AND status IN ('pending', 'assigned')
            ORDER BY schedule_date ASC
            "#,
        )
        .bind(day)
        .bind(day_start_instant)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing schedules for date: {}", e)))?;

        Ok(schedules)
    }

    /// Horarios futuros todavía no terminales
    pub async fn find_future(&self, today: NaiveDate) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules
            WHERE schedule_date > $1 AND status IN ('pending', 'assigned')
            ORDER BY schedule_date ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing future schedules: {}", e)))?;

        Ok(schedules)
    }

    /// Horarios cuya ventana intersecta el período `[from, to]`
    pub async fn find_in_period(
        &self,
        period_end: NaiveDate,
        period_start_instant: DateTime<Utc>,
    ) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT * FROM schedules
            WHERE schedule_date <= $1
              AND (end_date IS NULL OR end_date >= $2)
            ORDER BY schedule_date ASC
            "#,
        )
        .bind(period_end)
        .bind(period_start_instant)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing schedules in period: {}", e)))?;

        Ok(schedules)
    }
}
