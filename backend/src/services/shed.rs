//! Shed management service for storage buildings

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DoorPlacement, Shed};
use shared::validation::validate_name;

/// Shed service for managing storage buildings
#[derive(Clone)]
pub struct ShedService {
    db: PgPool,
}

/// Input for creating a shed
#[derive(Debug, Deserialize)]
pub struct CreateShedInput {
    pub name: String,
    pub width: Decimal,
    pub height: Decimal,
    pub description: Option<String>,
    pub doors: Option<Vec<DoorPlacement>>,
}

type ShedRow = (
    Uuid,
    String,
    Decimal,
    Decimal,
    Option<String>,
    Option<serde_json::Value>,
);

fn shed_from_row(row: ShedRow) -> Shed {
    Shed {
        id: row.0,
        name: row.1,
        width: row.2,
        height: row.3,
        description: row.4,
        doors: row.5.and_then(|v| serde_json::from_value(v).ok()),
    }
}

impl ShedService {
    /// Create a new ShedService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new shed
    pub async fn create_shed(&self, input: CreateShedInput) -> AppResult<Shed> {
        validate_name(&input.name).map_err(|message| AppError::Validation {
            field: "name".to_string(),
            message: message.to_string(),
        })?;
        if input.width <= Decimal::ZERO || input.height <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "dimensions".to_string(),
                message: "Shed dimensions must be positive".to_string(),
            });
        }

        let doors = input
            .doors
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(e.into()))?;

        let row = sqlx::query_as::<_, ShedRow>(
            r#"
            INSERT INTO sheds (id, name, width, height, description, doors)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, width, height, description, doors
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.width)
        .bind(input.height)
        .bind(&input.description)
        .bind(doors)
        .fetch_one(&self.db)
        .await?;

        Ok(shed_from_row(row))
    }

    /// Get all sheds
    pub async fn get_sheds(&self) -> AppResult<Vec<Shed>> {
        let rows = sqlx::query_as::<_, ShedRow>(
            r#"
            SELECT id, name, width, height, description, doors
            FROM sheds
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(shed_from_row).collect())
    }

    /// Get a shed by ID
    pub async fn get_shed(&self, shed_id: Uuid) -> AppResult<Shed> {
        let row = sqlx::query_as::<_, ShedRow>(
            r#"
            SELECT id, name, width, height, description, doors
            FROM sheds
            WHERE id = $1
            "#,
        )
        .bind(shed_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shed".to_string()))?;

        Ok(shed_from_row(row))
    }

    /// Delete a shed and all of its zones
    pub async fn delete_shed(&self, shed_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // Zones cascade via the schema, but the intake records hanging off
        // those zones cascade with them; deleting inside one transaction
        // keeps a failed delete from stranding half a shed.
        let result = sqlx::query("DELETE FROM sheds WHERE id = $1")
            .bind(shed_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shed".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
