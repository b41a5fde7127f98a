use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::utils::errors::AppError;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        license_plate: String,
        brand: Option<String>,
        model: Option<String>,
        daily_income_target: Decimal,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, license_plate, brand, model, status, current_driver_id, daily_income_target, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'active', NULL, $5, $6, $6)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(license_plate)
        .bind(brand)
        .bind(model)
        .bind(daily_income_target)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating vehicle: {}", e)))?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding vehicle: {}", e)))?;

        Ok(vehicle)
    }

    pub async fn find_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Error listing vehicles: {}", e)))?;

        Ok(vehicles)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Error checking license plate: {}", e)))?;

        Ok(exists)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
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
        .map_err(|e| AppError::DatabaseError(format!("Error updating vehicle status: {}", e)))?;

        Ok(vehicle)
    }

    /// Fijar el puntero vehículo→conductor (lado vehículo del bind)
    pub async fn set_current_driver(
        &self,
        id: Uuid,
        driver_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE vehicles SET current_driver_id = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(driver_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error assigning driver: {}", e)))?;

        Ok(())
    }

    /// Limpiar el puntero solo si todavía apunta al conductor esperado
    pub async fn clear_driver_if_matches(
        &self,
        id: Uuid,
        expected_driver: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET current_driver_id = NULL, updated_at = $3
            WHERE id = $1 AND current_driver_id = $2
            "#,
        )
        .bind(id)
        .bind(expected_driver)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error releasing driver: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
