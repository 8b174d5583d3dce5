//! Provenance splitting for withdrawals
//!
//! When stock leaves a zone the underlying intake records are reduced
//! proportionally, so a mixed zone keeps the same field/grade ratio it had
//! before the withdrawal. The plan produced here is applied by the caller;
//! the zone's `total_quantity` is also the caller's responsibility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::StockIntake;

use super::AllocationError;

/// Records reduced below this quantity are deleted outright instead of
/// lingering as near-zero rows.
pub fn dust_threshold() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// A single intake-record change required by a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeAdjustment {
    Reduce {
        intake_id: Uuid,
        new_quantity: Decimal,
    },
    Remove {
        intake_id: Uuid,
    },
}

impl IntakeAdjustment {
    pub fn intake_id(&self) -> Uuid {
        match self {
            IntakeAdjustment::Reduce { intake_id, .. } => *intake_id,
            IntakeAdjustment::Remove { intake_id } => *intake_id,
        }
    }
}

/// How much of the withdrawn quantity belongs to one `(field, grade)`
/// pair. Used as the destination template on zone-to-zone moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedShare {
    pub field_id: Uuid,
    pub field_name: String,
    pub grade: String,
    pub quantity: Decimal,
}

/// The full result of planning a withdrawal against a zone snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    pub quantity: Decimal,
    pub adjustments: Vec<IntakeAdjustment>,
    pub moved_shares: Vec<MovedShare>,
}

impl WithdrawalPlan {
    fn empty() -> Self {
        WithdrawalPlan {
            quantity: Decimal::ZERO,
            adjustments: Vec::new(),
            moved_shares: Vec::new(),
        }
    }
}

/// Stock available for withdrawal in a zone snapshot, optionally
/// restricted to one field.
pub fn available_stock(intakes: &[StockIntake], field_filter: Option<Uuid>) -> Decimal {
    intakes
        .iter()
        .filter(|i| field_filter.map_or(true, |f| i.field_id == f))
        .filter(|i| i.quantity > Decimal::ZERO)
        .map(|i| i.quantity)
        .sum()
}

/// Plan the removal of `quantity` from a zone's intake records.
///
/// With a field filter only that field's records are touched; otherwise
/// every record in the zone shrinks by the same ratio. Each matching
/// record's share of the withdrawal is proportional to its share of the
/// matching total at the moment of planning, which is what makes a moved
/// mix land at the destination in the source zone's current ratio.
///
/// Rejected before any mutation when `quantity` exceeds the matching
/// records' sum. No silent clamping.
pub fn plan_withdrawal(
    intakes: &[StockIntake],
    quantity: Decimal,
    field_filter: Option<Uuid>,
) -> Result<WithdrawalPlan, AllocationError> {
    if quantity < Decimal::ZERO {
        return Err(AllocationError::NegativeQuantity);
    }
    if quantity.is_zero() {
        return Ok(WithdrawalPlan::empty());
    }

    let matching: Vec<&StockIntake> = intakes
        .iter()
        .filter(|i| field_filter.map_or(true, |f| i.field_id == f))
        .filter(|i| i.quantity > Decimal::ZERO)
        .collect();
    let matching_sum: Decimal = matching.iter().map(|i| i.quantity).sum();

    if quantity > matching_sum {
        return Err(AllocationError::InsufficientStock {
            requested: quantity,
            available: matching_sum,
        });
    }

    let ratio = quantity / matching_sum;
    let mut adjustments = Vec::with_capacity(matching.len());
    let mut shares: Vec<MovedShare> = Vec::new();
    let mut taken = Decimal::ZERO;

    for (idx, intake) in matching.iter().enumerate() {
        // Last record takes the remainder so the shares sum exactly to
        // the requested quantity despite division rounding.
        let share = if idx == matching.len() - 1 {
            quantity - taken
        } else {
            intake.quantity * ratio
        };
        taken += share;

        let new_quantity = intake.quantity - share;
        if new_quantity < dust_threshold() {
            adjustments.push(IntakeAdjustment::Remove {
                intake_id: intake.id,
            });
        } else {
            adjustments.push(IntakeAdjustment::Reduce {
                intake_id: intake.id,
                new_quantity,
            });
        }

        if share > Decimal::ZERO {
            match shares
                .iter_mut()
                .find(|s| s.field_id == intake.field_id && s.grade == intake.grade)
            {
                Some(existing) => existing.quantity += share,
                None => shares.push(MovedShare {
                    field_id: intake.field_id,
                    field_name: intake.field_name.clone(),
                    grade: intake.grade.clone(),
                    quantity: share,
                }),
            }
        }
    }

    Ok(WithdrawalPlan {
        quantity,
        adjustments,
        moved_shares: shares,
    })
}
