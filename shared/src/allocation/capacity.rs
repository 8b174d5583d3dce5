//! Capacity calculation and fill planning

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Zone;

use super::AllocationError;

/// Available capacity across a zone selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacitySummary {
    pub available_by_zone: HashMap<Uuid, Decimal>,
    pub total_available: Decimal,
}

/// One entry of a fill plan: how much of an intake lands in a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneFill {
    pub zone_id: Uuid,
    pub quantity: Decimal,
}

/// Compute per-zone available capacity and the selection total.
pub fn compute_capacity(zones: &[Zone]) -> CapacitySummary {
    let available_by_zone: HashMap<Uuid, Decimal> = zones
        .iter()
        .map(|z| (z.id, z.available_capacity()))
        .collect();
    let total_available = available_by_zone.values().copied().sum();

    CapacitySummary {
        available_by_zone,
        total_available,
    }
}

/// Distribute `quantity` across `zones` in selection order.
///
/// Every zone except the last is filled to its available capacity; the
/// last zone takes the entire remainder, even past its nominal capacity.
/// The operator selected those zones and the total was checked up front,
/// so the final zone absorbs overflow instead of the intake being
/// rejected.
///
/// Zones that end up with nothing are omitted from the plan. A zero
/// quantity yields an empty plan and no error.
pub fn plan_fill(zones: &[Zone], quantity: Decimal) -> Result<Vec<ZoneFill>, AllocationError> {
    if quantity < Decimal::ZERO {
        return Err(AllocationError::NegativeQuantity);
    }
    if quantity.is_zero() {
        return Ok(Vec::new());
    }

    let summary = compute_capacity(zones);
    if quantity > summary.total_available {
        return Err(AllocationError::CapacityExceeded {
            requested: quantity,
            available: summary.total_available,
        });
    }

    let mut plan = Vec::new();
    let mut remaining = quantity;

    for (idx, zone) in zones.iter().enumerate() {
        if remaining.is_zero() {
            break;
        }

        let share = if idx == zones.len() - 1 {
            remaining
        } else {
            zone.available_capacity().min(remaining)
        };

        if share > Decimal::ZERO {
            plan.push(ZoneFill {
                zone_id: zone.id,
                quantity: share,
            });
            remaining -= share;
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(total: i64, cap: i64) -> Zone {
        Zone {
            id: Uuid::new_v4(),
            shed_id: Uuid::new_v4(),
            name: "Z".to_string(),
            x: Decimal::ZERO,
            y: Decimal::ZERO,
            width: Decimal::from(2),
            height: Decimal::from(2),
            total_quantity: Decimal::from(total),
            max_capacity: Decimal::from(cap),
        }
    }

    #[test]
    fn single_zone_exact_fill() {
        let zones = vec![zone(0, 6)];
        let plan = plan_fill(&zones, Decimal::from(6)).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].quantity, Decimal::from(6));
    }

    #[test]
    fn last_zone_takes_remainder() {
        let zones = vec![zone(0, 6), zone(0, 6)];
        let plan = plan_fill(&zones, Decimal::from(10)).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].quantity, Decimal::from(6));
        assert_eq!(plan[1].quantity, Decimal::from(4));
    }

    #[test]
    fn partially_filled_zones_use_available_room() {
        let zones = vec![zone(4, 6), zone(1, 6)];
        let plan = plan_fill(&zones, Decimal::from(7)).unwrap();
        assert_eq!(plan[0].quantity, Decimal::from(2));
        assert_eq!(plan[1].quantity, Decimal::from(5));
    }

    #[test]
    fn rejects_when_selection_too_small() {
        let zones = vec![zone(0, 6), zone(0, 6)];
        let err = plan_fill(&zones, Decimal::from(13)).unwrap_err();
        assert_eq!(
            err,
            AllocationError::CapacityExceeded {
                requested: Decimal::from(13),
                available: Decimal::from(12),
            }
        );
    }

    #[test]
    fn zero_quantity_is_a_no_op() {
        let zones = vec![zone(0, 6)];
        assert!(plan_fill(&zones, Decimal::ZERO).unwrap().is_empty());
        assert!(plan_fill(&[], Decimal::ZERO).unwrap().is_empty());
    }

    #[test]
    fn empty_selection_with_quantity_is_capacity_exceeded() {
        let err = plan_fill(&[], Decimal::ONE).unwrap_err();
        assert!(matches!(err, AllocationError::CapacityExceeded { .. }));
    }

    #[test]
    fn negative_quantity_rejected() {
        let zones = vec![zone(0, 6)];
        assert_eq!(
            plan_fill(&zones, Decimal::from(-1)).unwrap_err(),
            AllocationError::NegativeQuantity
        );
    }

    #[test]
    fn full_zones_are_skipped() {
        let zones = vec![zone(6, 6), zone(0, 6)];
        let plan = plan_fill(&zones, Decimal::from(3)).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].zone_id, zones[1].id);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn zones_strategy() -> impl Strategy<Value = Vec<Zone>> {
            prop::collection::vec((0i64..=10, 1i64..=20), 1..8).prop_map(|specs| {
                specs
                    .into_iter()
                    .map(|(total, cap)| zone(total.min(cap), cap))
                    .collect()
            })
        }

        proptest! {
            /// A fill plan always distributes exactly the requested quantity.
            #[test]
            fn plan_conserves_quantity(zones in zones_strategy(), qty in 0i64..=40) {
                let qty = Decimal::from(qty);
                if let Ok(plan) = plan_fill(&zones, qty) {
                    let planned: Decimal = plan.iter().map(|f| f.quantity).sum();
                    prop_assert_eq!(planned, qty);
                }
            }

            /// Every zone except the last stays within its nominal capacity.
            #[test]
            fn only_last_zone_may_overflow(zones in zones_strategy(), qty in 1i64..=40) {
                let qty = Decimal::from(qty);
                if let Ok(plan) = plan_fill(&zones, qty) {
                    for fill in plan.iter().rev().skip(1) {
                        let zone = zones.iter().find(|z| z.id == fill.zone_id).unwrap();
                        prop_assert!(zone.total_quantity + fill.quantity <= zone.max_capacity);
                    }
                }
            }

            /// Planning never hands a zone a zero or negative share.
            #[test]
            fn plan_entries_are_positive(zones in zones_strategy(), qty in 0i64..=40) {
                if let Ok(plan) = plan_fill(&zones, Decimal::from(qty)) {
                    for fill in &plan {
                        prop_assert!(fill.quantity > Decimal::ZERO);
                    }
                }
            }

            /// The plan is rejected exactly when the selection cannot hold
            /// the quantity.
            #[test]
            fn rejection_matches_available_total(zones in zones_strategy(), qty in 1i64..=40) {
                let qty = Decimal::from(qty);
                let summary = compute_capacity(&zones);
                match plan_fill(&zones, qty) {
                    Ok(_) => prop_assert!(qty <= summary.total_available),
                    Err(AllocationError::CapacityExceeded { .. }) => {
                        prop_assert!(qty > summary.total_available)
                    }
                    Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                }
            }
        }
    }
}
