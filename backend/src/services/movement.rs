//! Movement orchestration service
//!
//! Coordinates source-to-destination transfers: zone to zone, zone to an
//! external sink (grader/customer), and positional bulk moves. Withdrawal
//! planning is pure ([`shared::allocation`]); this service applies plans
//! inside a single transaction so a crash can never leave a source debited
//! without its destination credited.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{StockMovement, Zone};
use crate::services::intake::{intake_from_row, IntakeRow};
use crate::services::zone::{zone_from_row, ZoneRow, ZONE_COLUMNS};
use shared::allocation::{plan_withdrawal, IntakeAdjustment, WithdrawalPlan};
use shared::types::{ExternalSink, Location};

/// Movement service orchestrating stock transfers
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
    timeout: Duration,
}

/// Input for a zone-to-zone move
#[derive(Debug, Clone, Deserialize)]
pub struct MoveInput {
    pub source_zone_id: Uuid,
    pub dest_zone_id: Uuid,
    pub quantity: Decimal,
    /// Required when the source zone holds stock from more than one field.
    pub field_id: Option<Uuid>,
    pub date: NaiveDate,
    pub employee_number: Option<String>,
}

/// Input for a move out of tracked storage
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalMoveInput {
    pub source_zone_id: Uuid,
    pub quantity: Decimal,
    pub field_id: Option<Uuid>,
    pub sink: ExternalSink,
    pub date: NaiveDate,
    pub employee_number: Option<String>,
}

/// Input for a positional bulk move: the i-th source pairs with the i-th
/// destination.
#[derive(Debug, Deserialize)]
pub struct BulkMoveInput {
    pub source_zone_ids: Vec<Uuid>,
    pub dest_zone_ids: Vec<Uuid>,
    /// Quantity to move out of each source zone. Missing entries move
    /// nothing.
    pub quantities: HashMap<Uuid, Decimal>,
    /// Field selection per source zone; required for zones holding more
    /// than one field.
    #[serde(default)]
    pub field_selections: HashMap<Uuid, Uuid>,
    pub date: NaiveDate,
    pub employee_number: Option<String>,
}

/// Filters for the movement log
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub employee_number: Option<String>,
    pub from_shed: Option<String>,
    pub to_shed: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Move stock from one zone to another.
    ///
    /// The destination ends up with the source zone's current field mix
    /// (or only the filtered field), merged into existing destination
    /// records where the (field, grade) pair already exists there.
    pub async fn move_to_zone(&self, input: MoveInput) -> AppResult<StockMovement> {
        if input.source_zone_id == input.dest_zone_id {
            return Err(AppError::Validation {
                field: "dest_zone_id".to_string(),
                message: "Source and destination zones must differ".to_string(),
            });
        }
        self.validate_quantity(input.quantity)?;

        tokio::time::timeout(self.timeout, self.move_to_zone_inner(input))
            .await
            .map_err(|_| AppError::OperationTimedOut)?
    }

    async fn move_to_zone_inner(&self, input: MoveInput) -> AppResult<StockMovement> {
        let source = self.fetch_zone(input.source_zone_id).await?;
        let dest = self.fetch_zone(input.dest_zone_id).await?;

        // Snapshot the source's provenance and plan the split before
        // touching anything.
        let intakes = self.fetch_zone_intakes(source.id).await?;
        let plan = plan_withdrawal(&intakes, input.quantity, input.field_id)?;

        let mut tx = self.db.begin().await?;

        self.apply_withdrawal(&mut tx, &source, &plan).await?;

        // Credit the destination from the moved shares: merge into an
        // existing (field, grade) record, or create a fresh one dated
        // with the movement.
        for share in &plan.moved_shares {
            let existing = sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT id FROM stock_intakes
                WHERE zone_id = $1 AND field_id = $2 AND grade = $3
                ORDER BY created_at
                LIMIT 1
                "#,
            )
            .bind(dest.id)
            .bind(share.field_id)
            .bind(&share.grade)
            .fetch_optional(&mut *tx)
            .await?;

            match existing {
                Some(intake_id) => {
                    sqlx::query("UPDATE stock_intakes SET quantity = quantity + $1 WHERE id = $2")
                        .bind(share.quantity)
                        .bind(intake_id)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO stock_intakes (id, field_id, field_name, zone_id, shed_id, quantity, grade, date, created_at)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                        "#,
                    )
                    .bind(Uuid::new_v4())
                    .bind(share.field_id)
                    .bind(&share.field_name)
                    .bind(dest.id)
                    .bind(dest.shed_id)
                    .bind(share.quantity)
                    .bind(&share.grade)
                    .bind(input.date)
                    .bind(Utc::now())
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        sqlx::query("UPDATE zones SET total_quantity = total_quantity + $1 WHERE id = $2")
            .bind(plan.quantity)
            .bind(dest.id)
            .execute(&mut *tx)
            .await?;

        let movement = self
            .insert_movement(
                &mut tx,
                &plan,
                Location::from(source.id),
                Location::from(dest.id),
                Location::from(source.shed_id),
                Location::from(dest.shed_id),
                input.date,
                input.employee_number,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            from = %source.name,
            to = %dest.name,
            quantity = %movement.quantity,
            "stock moved between zones"
        );

        Ok(movement)
    }

    /// Move stock out of tracked storage to a grader or customer.
    pub async fn move_to_external(&self, input: ExternalMoveInput) -> AppResult<StockMovement> {
        self.validate_quantity(input.quantity)?;

        tokio::time::timeout(self.timeout, self.move_to_external_inner(input))
            .await
            .map_err(|_| AppError::OperationTimedOut)?
    }

    async fn move_to_external_inner(&self, input: ExternalMoveInput) -> AppResult<StockMovement> {
        let source = self.fetch_zone(input.source_zone_id).await?;

        let intakes = self.fetch_zone_intakes(source.id).await?;
        let plan = plan_withdrawal(&intakes, input.quantity, input.field_id)?;

        let sink = input.sink.location();
        let mut tx = self.db.begin().await?;

        self.apply_withdrawal(&mut tx, &source, &plan).await?;

        let movement = self
            .insert_movement(
                &mut tx,
                &plan,
                Location::from(source.id),
                sink,
                Location::from(source.shed_id),
                sink,
                input.date,
                input.employee_number,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            from = %source.name,
            sink = input.sink.as_str(),
            quantity = %movement.quantity,
            "stock dispatched out of storage"
        );

        Ok(movement)
    }

    /// Positional bulk move: each source pairs with the destination at the
    /// same index.
    ///
    /// Pairs are processed independently; a failing pair never rolls back
    /// the pairs committed before it. Failures are collected and surfaced
    /// together for manual reconciliation.
    pub async fn bulk_move(&self, input: BulkMoveInput) -> AppResult<Vec<StockMovement>> {
        if input.source_zone_ids.len() != input.dest_zone_ids.len() {
            return Err(AppError::Validation {
                field: "dest_zone_ids".to_string(),
                message: format!(
                    "Destination count {} does not match source count {}",
                    input.dest_zone_ids.len(),
                    input.source_zone_ids.len()
                ),
            });
        }

        let total: Decimal = input.quantities.values().copied().sum();
        if total <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantities".to_string(),
                message: "Total quantity to move must be greater than zero".to_string(),
            });
        }

        // All validation happens before the first pair mutates anything:
        // every mixed-field source with stock to move needs a field choice.
        for source_id in &input.source_zone_ids {
            let quantity = input
                .quantities
                .get(source_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if quantity.is_zero() || input.field_selections.contains_key(source_id) {
                continue;
            }

            let intakes = self.fetch_zone_intakes(*source_id).await?;
            let distinct_fields: HashSet<Uuid> = intakes
                .iter()
                .filter(|i| i.quantity > Decimal::ZERO)
                .map(|i| i.field_id)
                .collect();
            if distinct_fields.len() > 1 {
                return Err(AppError::FieldSelectionRequired {
                    zone_id: *source_id,
                });
            }
        }

        let mut movements = Vec::new();
        let mut failures = Vec::new();

        for (source_id, dest_id) in input
            .source_zone_ids
            .iter()
            .zip(input.dest_zone_ids.iter())
        {
            let quantity = input
                .quantities
                .get(source_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if quantity.is_zero() {
                continue;
            }

            let result = self
                .move_to_zone(MoveInput {
                    source_zone_id: *source_id,
                    dest_zone_id: *dest_id,
                    quantity,
                    field_id: input.field_selections.get(source_id).copied(),
                    date: input.date,
                    employee_number: input.employee_number.clone(),
                })
                .await;

            match result {
                Ok(movement) => movements.push(movement),
                Err(e) => {
                    tracing::error!(
                        source_zone = %source_id,
                        dest_zone = %dest_id,
                        quantity = %quantity,
                        error = %e,
                        "bulk move pair failed; earlier pairs remain applied"
                    );
                    failures.push(format!(
                        "{} -> {} ({} units): {}",
                        source_id, dest_id, quantity, e
                    ));
                }
            }
        }

        if failures.is_empty() {
            Ok(movements)
        } else {
            Err(AppError::PartialFailure {
                completed: movements.len(),
                failed: failures,
            })
        }
    }

    /// List movements, newest first, with optional filters
    pub async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, from_zone, to_zone, from_shed, to_shed, quantity, date,
                   employee_number, field_id, field_name, grade, created_at
            FROM stock_movements
            WHERE ($1::text IS NULL OR employee_number = $1)
              AND ($2::text IS NULL OR from_shed = $2)
              AND ($3::text IS NULL OR to_shed = $3)
              AND ($4::date IS NULL OR date >= $4)
              AND ($5::date IS NULL OR date <= $5)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(&filter.employee_number)
        .bind(&filter.from_shed)
        .bind(&filter.to_shed)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(movement_from_row).collect()
    }

    fn validate_quantity(&self, quantity: Decimal) -> AppResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_zone(&self, zone_id: Uuid) -> AppResult<Zone> {
        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE id = $1"
        ))
        .bind(zone_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Zone".to_string()))?;

        Ok(zone_from_row(row))
    }

    async fn fetch_zone_intakes(
        &self,
        zone_id: Uuid,
    ) -> AppResult<Vec<crate::models::StockIntake>> {
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

    /// Apply a withdrawal plan to the source zone: reduce or delete intake
    /// records, then debit the zone total with a guarded atomic update.
    async fn apply_withdrawal(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: &Zone,
        plan: &WithdrawalPlan,
    ) -> AppResult<()> {
        for adjustment in &plan.adjustments {
            match adjustment {
                IntakeAdjustment::Reduce {
                    intake_id,
                    new_quantity,
                } => {
                    sqlx::query("UPDATE stock_intakes SET quantity = $1 WHERE id = $2")
                        .bind(new_quantity)
                        .bind(intake_id)
                        .execute(&mut **tx)
                        .await?;
                }
                IntakeAdjustment::Remove { intake_id } => {
                    sqlx::query("DELETE FROM stock_intakes WHERE id = $1")
                        .bind(intake_id)
                        .execute(&mut **tx)
                        .await?;
                }
            }
        }

        // The guard clause turns a concurrent drain of the same zone into
        // a clean rejection instead of a negative total.
        let debited = sqlx::query(
            "UPDATE zones SET total_quantity = total_quantity - $1 WHERE id = $2 AND total_quantity >= $1",
        )
        .bind(plan.quantity)
        .bind(source.id)
        .execute(&mut **tx)
        .await?;

        if debited.rows_affected() == 0 {
            return Err(AppError::InsufficientStock {
                requested: plan.quantity,
                available: source.total_quantity,
            });
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_movement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        plan: &WithdrawalPlan,
        from_zone: Location,
        to_zone: Location,
        from_shed: Location,
        to_shed: Location,
        date: NaiveDate,
        employee_number: Option<String>,
    ) -> AppResult<StockMovement> {
        // Attribute the movement to a field/grade only when the moved
        // stock carries exactly one.
        let field_ids: HashSet<Uuid> = plan.moved_shares.iter().map(|s| s.field_id).collect();
        let (field_id, field_name) = if field_ids.len() == 1 {
            let share = &plan.moved_shares[0];
            (Some(share.field_id), Some(share.field_name.clone()))
        } else {
            (None, None)
        };
        let grades: HashSet<&str> = plan.moved_shares.iter().map(|s| s.grade.as_str()).collect();
        let grade = if grades.len() == 1 {
            Some(plan.moved_shares[0].grade.clone())
        } else {
            None
        };

        let movement = StockMovement {
            id: Uuid::new_v4(),
            from_zone,
            to_zone,
            from_shed,
            to_shed,
            quantity: plan.quantity,
            date,
            employee_number,
            field_id,
            field_name,
            grade,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO stock_movements
                (id, from_zone, to_zone, from_shed, to_shed, quantity, date, employee_number, field_id, field_name, grade, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(movement.id)
        .bind(movement.from_zone.as_string())
        .bind(movement.to_zone.as_string())
        .bind(movement.from_shed.as_string())
        .bind(movement.to_shed.as_string())
        .bind(movement.quantity)
        .bind(movement.date)
        .bind(&movement.employee_number)
        .bind(movement.field_id)
        .bind(&movement.field_name)
        .bind(&movement.grade)
        .bind(movement.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(movement)
    }
}

type MovementRow = (
    Uuid,
    String,
    String,
    String,
    String,
    Decimal,
    NaiveDate,
    Option<String>,
    Option<Uuid>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

fn movement_from_row(row: MovementRow) -> AppResult<StockMovement> {
    let parse = |s: String| {
        Location::parse(&s).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("invalid location {:?} in movement log: {}", s, e))
        })
    };

    Ok(StockMovement {
        id: row.0,
        from_zone: parse(row.1)?,
        to_zone: parse(row.2)?,
        from_shed: parse(row.3)?,
        to_shed: parse(row.4)?,
        quantity: row.5,
        date: row.6,
        employee_number: row.7,
        field_id: row.8,
        field_name: row.9,
        grade: row.10,
        created_at: row.11,
    })
}
