use crate::models::driver::Driver;
use crate::utils::errors::AppError;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        full_name: String,
        license_number: Option<String>,
        phone: Option<String>,
    ) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, full_name, license_number, phone, departure_date, current_vehicle_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NULL, NULL, $5, $5)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(license_number)
        .bind(phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating driver: {}", e)))?;

        Ok(driver)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding driver: {}", e)))?;

        Ok(driver)
    }

    pub async fn find_all(&self) -> Result<Vec<Driver>, AppError> {
        let drivers =
            sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Error listing drivers: {}", e)))?;

        Ok(drivers)
    }

    pub async fn set_departure(&self, id: Uuid, date: NaiveDate) -> Result<Driver, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET departure_date = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error setting departure: {}", e)))?;

        Ok(driver)
    }

    /// Fijar el puntero conductor→vehículo (lado conductor del bind)
    pub async fn set_current_vehicle(
        &self,
        id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE drivers SET current_vehicle_id = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(vehicle_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error assigning vehicle: {}", e)))?;

        Ok(())
    }

    /// Limpiar el puntero solo si todavía apunta al vehículo esperado.
    /// El guard evita pisar una reasignación concurrente.
    pub async fn clear_vehicle_if_matches(
        &self,
        id: Uuid,
        expected_vehicle: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE drivers
            SET current_vehicle_id = NULL, updated_at = $3
            WHERE id = $1 AND current_vehicle_id = $2
            "#,
        )
        .bind(id)
        .bind(expected_vehicle)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error releasing vehicle: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
