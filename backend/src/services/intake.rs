//! Intake allocation service
//!
//! Distributes an incoming quantity across the selected zones per the fill
//! plan, creating one provenance record per receiving zone and bumping
//! zone totals atomically, all inside one transaction.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::StockIntake;
use shared::allocation::plan_fill;
use shared::types::Location;
use shared::validation::validate_grade;

/// In-process latch against double-submitted intake requests.
///
/// Intake is not idempotent: a retried call books the stock twice. The
/// latch rejects a second invocation carrying the same request id while
/// the first is still in flight. It deliberately does not remember
/// completed ids; a genuine re-submission after completion is a new
/// booking.
#[derive(Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl SubmissionGuard {
    /// Claim a request id, releasing it when the token drops.
    fn begin(&self, request_id: Uuid) -> Option<SubmissionToken> {
        let mut in_flight = self.in_flight.lock().expect("submission latch poisoned");
        if !in_flight.insert(request_id) {
            return None;
        }
        Some(SubmissionToken {
            guard: self.clone(),
            request_id,
        })
    }
}

struct SubmissionToken {
    guard: SubmissionGuard,
    request_id: Uuid,
}

impl Drop for SubmissionToken {
    fn drop(&mut self) {
        let mut in_flight = self
            .guard
            .in_flight
            .lock()
            .expect("submission latch poisoned");
        in_flight.remove(&self.request_id);
    }
}

/// Intake service distributing incoming stock across zones
#[derive(Clone)]
pub struct IntakeService {
    db: PgPool,
    submissions: SubmissionGuard,
}

/// Input for an allocating intake
#[derive(Debug, Deserialize)]
pub struct IntakeInput {
    /// Client-generated id for the logical submit action; repeat
    /// invocations with the same id are rejected while one is in flight.
    pub request_id: Uuid,
    pub field_id: Uuid,
    pub grade: String,
    pub quantity: Decimal,
    /// Zones in fill order; all but the last fill to capacity, the last
    /// absorbs the remainder.
    pub zone_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub employee_number: Option<String>,
}

impl IntakeService {
    /// Create a new IntakeService instance
    pub fn new(db: PgPool, submissions: SubmissionGuard) -> Self {
        Self { db, submissions }
    }

    /// Book an intake, distributing the quantity across the selected zones.
    pub async fn intake(&self, input: IntakeInput) -> AppResult<Vec<StockIntake>> {
        let _token = self
            .submissions
            .begin(input.request_id)
            .ok_or_else(|| AppError::Validation {
                field: "request_id".to_string(),
                message: "This intake is already being submitted".to_string(),
            })?;

        if input.quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must not be negative".to_string(),
            });
        }
        if input.quantity.is_zero() {
            // No-op by contract: nothing is created, nothing fails.
            return Ok(Vec::new());
        }
        if input.zone_ids.is_empty() {
            return Err(AppError::Validation {
                field: "zone_ids".to_string(),
                message: "At least one zone must be selected".to_string(),
            });
        }

        let field = crate::services::FieldService::new(self.db.clone())
            .get_field(input.field_id)
            .await?;
        validate_grade(&field, &input.grade).map_err(|message| AppError::Validation {
            field: "grade".to_string(),
            message: message.to_string(),
        })?;

        let zones = crate::services::ZoneService::new(self.db.clone())
            .get_zones_in_order(&input.zone_ids)
            .await?;
        let plan = plan_fill(&zones, input.quantity)?;

        // Apply the whole plan in one transaction: all intake rows land and
        // all zone totals move, or none do.
        let mut tx = self.db.begin().await?;
        let mut created = Vec::with_capacity(plan.len());

        for fill in &plan {
            let zone = zones
                .iter()
                .find(|z| z.id == fill.zone_id)
                .ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!(
                        "fill plan referenced a zone outside the selection"
                    ))
                })?;

            let intake = StockIntake {
                id: Uuid::new_v4(),
                field_id: field.id,
                field_name: field.name.clone(),
                zone_id: zone.id,
                shed_id: zone.shed_id,
                quantity: fill.quantity,
                grade: input.grade.clone(),
                date: input.date,
                created_at: Utc::now(),
            };

            sqlx::query(
                r#"
                INSERT INTO stock_intakes (id, field_id, field_name, zone_id, shed_id, quantity, grade, date, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(intake.id)
            .bind(intake.field_id)
            .bind(&intake.field_name)
            .bind(intake.zone_id)
            .bind(intake.shed_id)
            .bind(intake.quantity)
            .bind(&intake.grade)
            .bind(intake.date)
            .bind(intake.created_at)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE zones SET total_quantity = total_quantity + $1 WHERE id = $2")
                .bind(fill.quantity)
                .bind(zone.id)
                .execute(&mut *tx)
                .await?;

            created.push(intake);
        }

        tx.commit().await?;

        tracing::info!(
            field = %field.name,
            grade = %input.grade,
            quantity = %input.quantity,
            zones = plan.len(),
            "stock intake booked"
        );

        // Audit trail: one arrival entry per receiving zone, sourced from
        // outside tracked storage. Best effort only; the intake has
        // already committed.
        self.log_arrivals(&created, &input).await;

        Ok(created)
    }

    /// List intake records, optionally restricted to one zone
    pub async fn get_intakes(&self, zone_id: Option<Uuid>) -> AppResult<Vec<StockIntake>> {
        let intakes = match zone_id {
            Some(zone_id) => self.get_zone_intakes(zone_id).await?,
            None => {
                let rows = sqlx::query_as::<_, IntakeRow>(
                    r#"
                    SELECT id, field_id, field_name, zone_id, shed_id, quantity, grade, date, created_at
                    FROM stock_intakes
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.db)
                .await?;
                rows.into_iter().map(intake_from_row).collect()
            }
        };

        Ok(intakes)
    }

    /// Intake records for a zone
    pub async fn get_zone_intakes(&self, zone_id: Uuid) -> AppResult<Vec<StockIntake>> {
        let rows = sqlx::query_as::<_, IntakeRow>(
            r#"
            SELECT id, field_id, field_name, zone_id, shed_id, quantity, grade, date, created_at
            FROM stock_intakes
            WHERE zone_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(zone_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(intake_from_row).collect())
    }

    async fn log_arrivals(&self, created: &[StockIntake], input: &IntakeInput) {
        for intake in created {
            let result = sqlx::query(
                r#"
                INSERT INTO stock_movements
                    (id, from_zone, to_zone, from_shed, to_shed, quantity, date, employee_number, field_id, field_name, grade, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(Location::NoLocation.as_string())
            .bind(Location::from(intake.zone_id).as_string())
            .bind(Location::NoLocation.as_string())
            .bind(Location::from(intake.shed_id).as_string())
            .bind(intake.quantity)
            .bind(intake.date)
            .bind(&input.employee_number)
            .bind(intake.field_id)
            .bind(&intake.field_name)
            .bind(&intake.grade)
            .bind(intake.created_at)
            .execute(&self.db)
            .await;

            if let Err(e) = result {
                // The audit write never fails the booked intake.
                tracing::error!(
                    zone_id = %intake.zone_id,
                    quantity = %intake.quantity,
                    error = %e,
                    "failed to write intake arrival to the movement log"
                );
            }
        }
    }
}

pub(crate) type IntakeRow = (
    Uuid,
    Uuid,
    String,
    Uuid,
    Uuid,
    Decimal,
    String,
    NaiveDate,
    chrono::DateTime<Utc>,
);

pub(crate) fn intake_from_row(row: IntakeRow) -> StockIntake {
    StockIntake {
        id: row.0,
        field_id: row.1,
        field_name: row.2,
        zone_id: row.3,
        shed_id: row.4,
        quantity: row.5,
        grade: row.6,
        date: row.7,
        created_at: row.8,
    }
}
