//! Zone management service for storage locations inside sheds
//!
//! Zone totals are only ever mutated through atomic SQL increments (the
//! allocator and orchestrator do this inside their transactions) or the
//! explicit admin override here. No read-then-set anywhere.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{default_max_capacity, Zone};
use shared::allocation::{compute_capacity, CapacitySummary};
use shared::validation::validate_name;

/// Zone service for managing storage locations
#[derive(Clone)]
pub struct ZoneService {
    db: PgPool,
}

/// Input for creating a zone
#[derive(Debug, Deserialize)]
pub struct CreateZoneInput {
    pub shed_id: Uuid,
    pub name: String,
    pub x: Decimal,
    pub y: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub max_capacity: Option<Decimal>,
}

/// Input for updating zone geometry or capacity
#[derive(Debug, Deserialize)]
pub struct UpdateZoneInput {
    pub name: Option<String>,
    pub x: Option<Decimal>,
    pub y: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub max_capacity: Option<Decimal>,
}

pub(crate) type ZoneRow = (
    Uuid,
    Uuid,
    String,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
);

pub(crate) fn zone_from_row(row: ZoneRow) -> Zone {
    Zone {
        id: row.0,
        shed_id: row.1,
        name: row.2,
        x: row.3,
        y: row.4,
        width: row.5,
        height: row.6,
        total_quantity: row.7,
        max_capacity: row.8,
    }
}

pub(crate) const ZONE_COLUMNS: &str =
    "id, shed_id, name, x, y, width, height, total_quantity, max_capacity";

impl ZoneService {
    /// Create a new ZoneService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new zone in a shed
    pub async fn create_zone(&self, input: CreateZoneInput) -> AppResult<Zone> {
        validate_name(&input.name).map_err(|message| AppError::Validation {
            field: "name".to_string(),
            message: message.to_string(),
        })?;

        let max_capacity = input.max_capacity.unwrap_or_else(default_max_capacity);
        if max_capacity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "max_capacity".to_string(),
                message: "Capacity must be positive".to_string(),
            });
        }

        // Shed must exist; the foreign key would also catch this but a
        // NotFound is the useful answer.
        let shed_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sheds WHERE id = $1)")
                .bind(input.shed_id)
                .fetch_one(&self.db)
                .await?;
        if !shed_exists {
            return Err(AppError::NotFound("Shed".to_string()));
        }

        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            r#"
            INSERT INTO zones (id, shed_id, name, x, y, width, height, total_quantity, max_capacity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
            RETURNING {ZONE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(input.shed_id)
        .bind(input.name.trim())
        .bind(input.x)
        .bind(input.y)
        .bind(input.width)
        .bind(input.height)
        .bind(max_capacity)
        .fetch_one(&self.db)
        .await?;

        Ok(zone_from_row(row))
    }

    /// Get zones, optionally filtered by shed
    pub async fn get_zones(&self, shed_id: Option<Uuid>) -> AppResult<Vec<Zone>> {
        let rows = match shed_id {
            Some(shed_id) => {
                sqlx::query_as::<_, ZoneRow>(&format!(
                    "SELECT {ZONE_COLUMNS} FROM zones WHERE shed_id = $1 ORDER BY name"
                ))
                .bind(shed_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, ZoneRow>(&format!(
                    "SELECT {ZONE_COLUMNS} FROM zones ORDER BY name"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(zone_from_row).collect())
    }

    /// Get a zone by ID
    pub async fn get_zone(&self, zone_id: Uuid) -> AppResult<Zone> {
        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE id = $1"
        ))
        .bind(zone_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone".to_string()))?;

        Ok(zone_from_row(row))
    }

    /// Available capacity for a zone
    pub async fn get_capacity(&self, zone_id: Uuid) -> AppResult<CapacitySummary> {
        let zone = self.get_zone(zone_id).await?;
        Ok(compute_capacity(std::slice::from_ref(&zone)))
    }

    /// Fetch zones by id, preserving the caller's selection order.
    ///
    /// Fill plans are order-sensitive (the last selected zone absorbs the
    /// remainder), so the database's row order cannot be used.
    pub async fn get_zones_in_order(&self, zone_ids: &[Uuid]) -> AppResult<Vec<Zone>> {
        let rows = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE id = ANY($1)"
        ))
        .bind(zone_ids)
        .fetch_all(&self.db)
        .await?;

        let fetched: Vec<Zone> = rows.into_iter().map(zone_from_row).collect();
        let mut ordered = Vec::with_capacity(zone_ids.len());
        for id in zone_ids {
            let zone = fetched
                .iter()
                .find(|z| z.id == *id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Zone".to_string()))?;
            ordered.push(zone);
        }

        Ok(ordered)
    }

    /// Update zone geometry or capacity
    pub async fn update_zone(&self, zone_id: Uuid, input: UpdateZoneInput) -> AppResult<Zone> {
        let existing = self.get_zone(zone_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let x = input.x.unwrap_or(existing.x);
        let y = input.y.unwrap_or(existing.y);
        let width = input.width.unwrap_or(existing.width);
        let height = input.height.unwrap_or(existing.height);
        let max_capacity = input.max_capacity.unwrap_or(existing.max_capacity);

        if max_capacity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "max_capacity".to_string(),
                message: "Capacity must be positive".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            r#"
            UPDATE zones
            SET name = $1, x = $2, y = $3, width = $4, height = $5, max_capacity = $6
            WHERE id = $7
            RETURNING {ZONE_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(x)
        .bind(y)
        .bind(width)
        .bind(height)
        .bind(max_capacity)
        .bind(zone_id)
        .fetch_one(&self.db)
        .await?;

        Ok(zone_from_row(row))
    }

    /// Admin override: set a zone's total quantity directly.
    ///
    /// Bypasses intake bookkeeping, so the zone's provenance no longer
    /// matches its total until corrected. Logged loudly for that reason.
    pub async fn override_quantity(&self, zone_id: Uuid, quantity: Decimal) -> AppResult<Zone> {
        if quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must not be negative".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            r#"
            UPDATE zones
            SET total_quantity = $1
            WHERE id = $2
            RETURNING {ZONE_COLUMNS}
            "#,
        ))
        .bind(quantity)
        .bind(zone_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone".to_string()))?;

        tracing::warn!(
            zone_id = %zone_id,
            quantity = %quantity,
            "zone total overridden by admin; intake records not adjusted"
        );

        Ok(zone_from_row(row))
    }

    /// Delete a zone (intake records cascade)
    pub async fn delete_zone(&self, zone_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM zones WHERE id = $1")
            .bind(zone_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Zone".to_string()));
        }

        Ok(())
    }
}
