//! Reporting service for stock aggregation views
//!
//! Field quantities in mixed zones are estimated by scaling each intake
//! record to its zone's live total, so the report reflects the zone's
//! current proportions even after withdrawals and admin overrides.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CropClass, Field, StockIntake, Zone};
use crate::services::intake::{intake_from_row, IntakeRow};
use crate::services::zone::{zone_from_row, ZoneRow, ZONE_COLUMNS};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Per-field stock breakdown within a shed
#[derive(Debug, Clone, Serialize)]
pub struct FieldStockDetail {
    pub field_id: Uuid,
    pub field_name: String,
    pub crop_type: String,
    pub harvest_year: Option<i32>,
    /// Estimated quantity per grade
    pub grades: HashMap<String, Decimal>,
    pub total_quantity: Decimal,
}

/// Stock report for one shed
#[derive(Debug, Clone, Serialize)]
pub struct ShedStockReport {
    pub shed_id: Uuid,
    pub shed_name: String,
    /// Sum of the shed's zone totals (authoritative)
    pub total_quantity: Decimal,
    /// Estimated per-field attribution
    pub fields: Vec<FieldStockDetail>,
}

/// Totals per crop classification and grade
#[derive(Debug, Clone, Serialize)]
pub struct CropClassSummary {
    pub crop_class: CropClass,
    pub grades: HashMap<String, Decimal>,
    pub total_quantity: Decimal,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Stock breakdown for one shed
    pub async fn shed_stock_details(&self, shed_id: Uuid) -> AppResult<ShedStockReport> {
        let shed_name = sqlx::query_scalar::<_, String>("SELECT name FROM sheds WHERE id = $1")
            .bind(shed_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Shed".to_string()))?;

        let zones = self.fetch_shed_zones(shed_id).await?;
        let intakes = self.fetch_shed_intakes(shed_id).await?;
        let fields = self.fetch_fields().await?;

        Ok(build_shed_report(
            shed_id, shed_name, &zones, &intakes, &fields,
        ))
    }

    /// Stock breakdown for every shed
    pub async fn stock_overview(&self) -> AppResult<Vec<ShedStockReport>> {
        let sheds = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM sheds ORDER BY name")
            .fetch_all(&self.db)
            .await?;
        let fields = self.fetch_fields().await?;

        let mut reports = Vec::with_capacity(sheds.len());
        for (shed_id, shed_name) in sheds {
            let zones = self.fetch_shed_zones(shed_id).await?;
            let intakes = self.fetch_shed_intakes(shed_id).await?;
            reports.push(build_shed_report(
                shed_id, shed_name, &zones, &intakes, &fields,
            ));
        }

        Ok(reports)
    }

    /// Totals per crop classification and grade, across all storage
    pub async fn crop_class_summary(&self) -> AppResult<Vec<CropClassSummary>> {
        let zones = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE total_quantity > 0"
        ))
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(zone_from_row)
        .collect::<Vec<Zone>>();

        let intakes = sqlx::query_as::<_, IntakeRow>(
            r#"
            SELECT id, field_id, field_name, zone_id, shed_id, quantity, grade, date, created_at
            FROM stock_intakes
            "#,
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(intake_from_row)
        .collect::<Vec<StockIntake>>();

        let fields = self.fetch_fields().await?;
        let class_by_field: HashMap<Uuid, CropClass> = fields
            .iter()
            .filter_map(|f| f.crop_class.map(|c| (f.id, c)))
            .collect();

        let mut summaries: HashMap<CropClass, CropClassSummary> = HashMap::new();

        for zone in &zones {
            let zone_intakes: Vec<&StockIntake> =
                intakes.iter().filter(|i| i.zone_id == zone.id).collect();
            let intake_total: Decimal = zone_intakes.iter().map(|i| i.quantity).sum();
            if intake_total.is_zero() {
                continue;
            }

            for intake in zone_intakes {
                let Some(class) = class_by_field.get(&intake.field_id).copied() else {
                    continue;
                };

                let actual = zone.total_quantity * (intake.quantity / intake_total);
                let summary = summaries.entry(class).or_insert_with(|| CropClassSummary {
                    crop_class: class,
                    grades: HashMap::new(),
                    total_quantity: Decimal::ZERO,
                });
                *summary.grades.entry(intake.grade.clone()).or_default() += actual;
                summary.total_quantity += actual;
            }
        }

        let mut result: Vec<CropClassSummary> = summaries.into_values().collect();
        result.sort_by_key(|s| s.crop_class.as_str());
        Ok(result)
    }

    async fn fetch_shed_zones(&self, shed_id: Uuid) -> AppResult<Vec<Zone>> {
        let rows = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE shed_id = $1"
        ))
        .bind(shed_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(zone_from_row).collect())
    }

    async fn fetch_shed_intakes(&self, shed_id: Uuid) -> AppResult<Vec<StockIntake>> {
        let rows = sqlx::query_as::<_, IntakeRow>(
            r#"
            SELECT id, field_id, field_name, zone_id, shed_id, quantity, grade, date, created_at
            FROM stock_intakes
            WHERE shed_id = $1
            "#,
        )
        .bind(shed_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(intake_from_row).collect())
    }

    async fn fetch_fields(&self) -> AppResult<Vec<Field>> {
        crate::services::FieldService::new(self.db.clone())
            .get_fields()
            .await
    }
}

/// Attribute a shed's live zone totals back to fields and grades via each
/// zone's intake proportions.
fn build_shed_report(
    shed_id: Uuid,
    shed_name: String,
    zones: &[Zone],
    intakes: &[StockIntake],
    fields: &[Field],
) -> ShedStockReport {
    let total_quantity: Decimal = zones.iter().map(|z| z.total_quantity).sum();
    let mut groups: HashMap<Uuid, FieldStockDetail> = HashMap::new();

    for zone in zones.iter().filter(|z| z.total_quantity > Decimal::ZERO) {
        let zone_intakes: Vec<&StockIntake> =
            intakes.iter().filter(|i| i.zone_id == zone.id).collect();
        let intake_total: Decimal = zone_intakes.iter().map(|i| i.quantity).sum();
        if intake_total.is_zero() {
            continue;
        }

        for intake in zone_intakes {
            let field = fields.iter().find(|f| f.id == intake.field_id);
            let actual = zone.total_quantity * (intake.quantity / intake_total);

            let group = groups
                .entry(intake.field_id)
                .or_insert_with(|| FieldStockDetail {
                    field_id: intake.field_id,
                    field_name: intake.field_name.clone(),
                    crop_type: field
                        .map(|f| f.crop_type.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    harvest_year: field.map(|f| f.harvest_year),
                    grades: HashMap::new(),
                    total_quantity: Decimal::ZERO,
                });
            *group.grades.entry(intake.grade.clone()).or_default() += actual;
            group.total_quantity += actual;
        }
    }

    let mut details: Vec<FieldStockDetail> = groups
        .into_values()
        .filter(|g| g.total_quantity > Decimal::ZERO)
        .collect();
    details.sort_by(|a, b| a.field_name.cmp(&b.field_name));

    ShedStockReport {
        shed_id,
        shed_name,
        total_quantity,
        fields: details,
    }
}
