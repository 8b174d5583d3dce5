//! Field management service for harvested crop batches

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CropClass, Field};
use shared::validation::{normalize_grades, validate_harvest_year, validate_name};

/// Field service for managing harvested crop batches
#[derive(Clone)]
pub struct FieldService {
    db: PgPool,
}

/// Input for creating a field
#[derive(Debug, Deserialize)]
pub struct CreateFieldInput {
    pub name: String,
    pub area: String,
    pub crop_type: String,
    pub variety: Option<String>,
    pub harvest_year: i32,
    #[serde(default)]
    pub grades: Vec<String>,
    pub crop_class: Option<CropClass>,
}

type FieldRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    i32,
    Vec<String>,
    Option<String>,
    DateTime<Utc>,
);

fn field_from_row(row: FieldRow) -> Field {
    Field {
        id: row.0,
        name: row.1,
        area: row.2,
        crop_type: row.3,
        variety: row.4,
        harvest_year: row.5,
        grades: row.6,
        crop_class: row.7.as_deref().and_then(CropClass::from_str),
        created_at: row.8,
    }
}

impl FieldService {
    /// Create a new FieldService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new field
    pub async fn create_field(&self, input: CreateFieldInput) -> AppResult<Field> {
        validate_name(&input.name).map_err(|message| AppError::Validation {
            field: "name".to_string(),
            message: message.to_string(),
        })?;
        validate_name(&input.area).map_err(|message| AppError::Validation {
            field: "area".to_string(),
            message: message.to_string(),
        })?;
        validate_name(&input.crop_type).map_err(|message| AppError::Validation {
            field: "crop_type".to_string(),
            message: message.to_string(),
        })?;
        validate_harvest_year(input.harvest_year).map_err(|message| AppError::Validation {
            field: "harvest_year".to_string(),
            message: message.to_string(),
        })?;

        let grades = normalize_grades(input.grades);

        let row = sqlx::query_as::<_, FieldRow>(
            r#"
            INSERT INTO fields (id, name, area, crop_type, variety, harvest_year, grades, crop_class)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, area, crop_type, variety, harvest_year, grades, crop_class, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.area.trim())
        .bind(input.crop_type.trim())
        .bind(&input.variety)
        .bind(input.harvest_year)
        .bind(&grades)
        .bind(input.crop_class.map(|c| c.as_str()))
        .fetch_one(&self.db)
        .await?;

        Ok(field_from_row(row))
    }

    /// Get all fields
    pub async fn get_fields(&self) -> AppResult<Vec<Field>> {
        let rows = sqlx::query_as::<_, FieldRow>(
            r#"
            SELECT id, name, area, crop_type, variety, harvest_year, grades, crop_class, created_at
            FROM fields
            ORDER BY harvest_year DESC, name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(field_from_row).collect())
    }

    /// Get a field by ID
    pub async fn get_field(&self, field_id: Uuid) -> AppResult<Field> {
        let row = sqlx::query_as::<_, FieldRow>(
            r#"
            SELECT id, name, area, crop_type, variety, harvest_year, grades, crop_class, created_at
            FROM fields
            WHERE id = $1
            "#,
        )
        .bind(field_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Field".to_string()))?;

        Ok(field_from_row(row))
    }

    /// Delete a field
    ///
    /// Intake and movement records keep the denormalized field name, so
    /// history stays readable after deletion.
    pub async fn delete_field(&self, field_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(field_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Field".to_string()));
        }

        Ok(())
    }
}
