//! Movement orchestration tests
//!
//! Simulates the orchestrator's transaction steps over an in-memory store
//! (the same plan-then-apply sequence the service runs against Postgres):
//! - conservation of quantity on zone-to-zone moves
//! - destination merging by (field, grade)
//! - destination inheriting the source's live field mix
//! - external-sink dispatch draining a zone
//! - bulk-move pairing and partial-failure independence

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::allocation::{plan_withdrawal, AllocationError, IntakeAdjustment};
use shared::models::{StockIntake, Zone};
use shared::types::{ExternalSink, Location};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn zone(name: &str, total: &str) -> Zone {
    Zone {
        id: Uuid::new_v4(),
        shed_id: Uuid::new_v4(),
        name: name.to_string(),
        x: Decimal::ZERO,
        y: Decimal::ZERO,
        width: Decimal::from(2),
        height: Decimal::from(2),
        total_quantity: dec(total),
        max_capacity: Decimal::from(6),
    }
}

fn intake_in(zone: &Zone, field_id: Uuid, field_name: &str, grade: &str, qty: &str) -> StockIntake {
    StockIntake {
        id: Uuid::new_v4(),
        field_id,
        field_name: field_name.to_string(),
        zone_id: zone.id,
        shed_id: zone.shed_id,
        quantity: dec(qty),
        grade: grade.to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        created_at: chrono::Utc::now(),
    }
}

/// A recorded transfer in the simulated store.
struct SimMovement {
    from_zone: Location,
    to_zone: Location,
    quantity: Decimal,
}

/// In-memory stand-in for the zones + stock_intakes tables, applying
/// withdrawal plans the way the orchestrator's transaction does.
struct SimStore {
    zones: Vec<Zone>,
    intakes: Vec<StockIntake>,
    movements: Vec<SimMovement>,
}

impl SimStore {
    fn new(zones: Vec<Zone>, intakes: Vec<StockIntake>) -> Self {
        Self {
            zones,
            intakes,
            movements: Vec::new(),
        }
    }

    fn zone_total(&self, zone_id: Uuid) -> Decimal {
        self.zones
            .iter()
            .find(|z| z.id == zone_id)
            .map(|z| z.total_quantity)
            .unwrap()
    }

    fn zone_intakes(&self, zone_id: Uuid) -> Vec<StockIntake> {
        self.intakes
            .iter()
            .filter(|i| i.zone_id == zone_id)
            .cloned()
            .collect()
    }

    fn move_to_zone(
        &mut self,
        source_id: Uuid,
        dest_id: Uuid,
        quantity: Decimal,
        field_filter: Option<Uuid>,
    ) -> Result<(), AllocationError> {
        let snapshot = self.zone_intakes(source_id);
        let plan = plan_withdrawal(&snapshot, quantity, field_filter)?;

        self.apply_withdrawal(source_id, &plan.adjustments, plan.quantity);

        // Credit destination: merge into an existing (field, grade)
        // record, or create one.
        let dest_shed = self.zones.iter().find(|z| z.id == dest_id).unwrap().shed_id;
        for share in &plan.moved_shares {
            match self.intakes.iter_mut().find(|i| {
                i.zone_id == dest_id && i.field_id == share.field_id && i.grade == share.grade
            }) {
                Some(existing) => existing.quantity += share.quantity,
                None => {
                    let record = StockIntake {
                        id: Uuid::new_v4(),
                        field_id: share.field_id,
                        field_name: share.field_name.clone(),
                        zone_id: dest_id,
                        shed_id: dest_shed,
                        quantity: share.quantity,
                        grade: share.grade.clone(),
                        date: chrono::NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
                        created_at: chrono::Utc::now(),
                    };
                    self.intakes.push(record);
                }
            }
        }

        let dest = self.zones.iter_mut().find(|z| z.id == dest_id).unwrap();
        dest.total_quantity += plan.quantity;

        self.movements.push(SimMovement {
            from_zone: Location::from(source_id),
            to_zone: Location::from(dest_id),
            quantity: plan.quantity,
        });
        Ok(())
    }

    fn move_to_external(
        &mut self,
        source_id: Uuid,
        quantity: Decimal,
        field_filter: Option<Uuid>,
        sink: ExternalSink,
    ) -> Result<(), AllocationError> {
        let snapshot = self.zone_intakes(source_id);
        let plan = plan_withdrawal(&snapshot, quantity, field_filter)?;

        self.apply_withdrawal(source_id, &plan.adjustments, plan.quantity);

        self.movements.push(SimMovement {
            from_zone: Location::from(source_id),
            to_zone: sink.location(),
            quantity: plan.quantity,
        });
        Ok(())
    }

    fn apply_withdrawal(
        &mut self,
        source_id: Uuid,
        adjustments: &[IntakeAdjustment],
        quantity: Decimal,
    ) {
        for adjustment in adjustments {
            match adjustment {
                IntakeAdjustment::Reduce {
                    intake_id,
                    new_quantity,
                } => {
                    if let Some(record) = self.intakes.iter_mut().find(|i| i.id == *intake_id) {
                        record.quantity = *new_quantity;
                    }
                }
                IntakeAdjustment::Remove { intake_id } => {
                    self.intakes.retain(|i| i.id != *intake_id);
                }
            }
        }

        let source = self.zones.iter_mut().find(|z| z.id == source_id).unwrap();
        source.total_quantity -= quantity;
    }
}

// ============================================================================
// Zone-to-zone moves
// ============================================================================

#[cfg(test)]
mod move_tests {
    use super::*;

    /// Conservation: the source loses exactly what the destination gains.
    #[test]
    fn test_move_conserves_quantity() {
        let source = zone("Z1", "6");
        let dest = zone("Z2", "2");
        let field = Uuid::new_v4();
        let intakes = vec![
            intake_in(&source, field, "FieldA", "A", "6"),
            intake_in(&dest, field, "FieldA", "A", "2"),
        ];
        let mut store = SimStore::new(vec![source.clone(), dest.clone()], intakes);

        store
            .move_to_zone(source.id, dest.id, dec("4"), None)
            .unwrap();

        assert_eq!(store.zone_total(source.id), dec("2"));
        assert_eq!(store.zone_total(dest.id), dec("6"));
        // Zone totals still match the sum of their intake records.
        let source_sum: Decimal = store.zone_intakes(source.id).iter().map(|i| i.quantity).sum();
        let dest_sum: Decimal = store.zone_intakes(dest.id).iter().map(|i| i.quantity).sum();
        assert_eq!(source_sum, dec("2"));
        assert_eq!(dest_sum, dec("6"));
    }

    /// An existing destination record with the same (field, grade) is
    /// incremented instead of duplicated.
    #[test]
    fn test_destination_merges_matching_record() {
        let source = zone("Z1", "6");
        let dest = zone("Z2", "2");
        let field = Uuid::new_v4();
        let intakes = vec![
            intake_in(&source, field, "FieldA", "A", "6"),
            intake_in(&dest, field, "FieldA", "A", "2"),
        ];
        let mut store = SimStore::new(vec![source.clone(), dest.clone()], intakes);

        store
            .move_to_zone(source.id, dest.id, dec("3"), None)
            .unwrap();

        let dest_records = store.zone_intakes(dest.id);
        assert_eq!(dest_records.len(), 1);
        assert_eq!(dest_records[0].quantity, dec("5"));
    }

    /// A different grade at the destination gets its own record.
    #[test]
    fn test_destination_new_record_for_new_grade() {
        let source = zone("Z1", "6");
        let dest = zone("Z2", "2");
        let field = Uuid::new_v4();
        let intakes = vec![
            intake_in(&source, field, "FieldA", "A", "6"),
            intake_in(&dest, field, "FieldA", "B", "2"),
        ];
        let mut store = SimStore::new(vec![source.clone(), dest.clone()], intakes);

        store
            .move_to_zone(source.id, dest.id, dec("3"), None)
            .unwrap();

        let dest_records = store.zone_intakes(dest.id);
        assert_eq!(dest_records.len(), 2);
    }

    /// Mixed-zone move with field filter: FieldA's 10 units move out
    /// entirely, FieldB's 5 stay put.
    #[test]
    fn test_filtered_move_from_mixed_zone() {
        let source = zone("Z1", "15");
        let dest = zone("Z2", "0");
        let field_a = Uuid::new_v4();
        let field_b = Uuid::new_v4();
        let intakes = vec![
            intake_in(&source, field_a, "FieldA", "A", "10"),
            intake_in(&source, field_b, "FieldB", "B", "5"),
        ];
        let mut store = SimStore::new(vec![source.clone(), dest.clone()], intakes);

        store
            .move_to_zone(source.id, dest.id, dec("10"), Some(field_a))
            .unwrap();

        assert_eq!(store.zone_total(source.id), dec("5"));
        assert_eq!(store.zone_total(dest.id), dec("10"));

        let source_records = store.zone_intakes(source.id);
        assert_eq!(source_records.len(), 1);
        assert_eq!(source_records[0].field_id, field_b);

        let dest_records = store.zone_intakes(dest.id);
        assert_eq!(dest_records.len(), 1);
        assert_eq!(dest_records[0].field_id, field_a);
        assert_eq!(dest_records[0].quantity, dec("10"));
    }

    /// An unfiltered move out of a mixed zone lands at the destination in
    /// the source's current mix ratio.
    #[test]
    fn test_unfiltered_move_inherits_source_mix() {
        let source = zone("Z1", "40");
        let dest = zone("Z2", "0");
        let field_a = Uuid::new_v4();
        let field_b = Uuid::new_v4();
        let intakes = vec![
            intake_in(&source, field_a, "FieldA", "A", "30"),
            intake_in(&source, field_b, "FieldB", "B", "10"),
        ];
        let mut store = SimStore::new(vec![source.clone(), dest.clone()], intakes);

        store
            .move_to_zone(source.id, dest.id, dec("8"), None)
            .unwrap();

        let dest_records = store.zone_intakes(dest.id);
        let a_qty = dest_records
            .iter()
            .find(|i| i.field_id == field_a)
            .unwrap()
            .quantity;
        let b_qty = dest_records
            .iter()
            .find(|i| i.field_id == field_b)
            .unwrap()
            .quantity;
        // 3:1 ratio carried over.
        assert_eq!(a_qty, dec("6"));
        assert_eq!(b_qty, dec("2"));
    }

    #[test]
    fn test_overdraw_leaves_store_untouched() {
        let source = zone("Z1", "6");
        let dest = zone("Z2", "0");
        let field = Uuid::new_v4();
        let intakes = vec![intake_in(&source, field, "FieldA", "A", "6")];
        let mut store = SimStore::new(vec![source.clone(), dest.clone()], intakes);

        let err = store
            .move_to_zone(source.id, dest.id, dec("7"), None)
            .unwrap_err();
        assert!(matches!(err, AllocationError::InsufficientStock { .. }));
        assert_eq!(store.zone_total(source.id), dec("6"));
        assert_eq!(store.zone_total(dest.id), dec("0"));
        assert!(store.movements.is_empty());
    }
}

// ============================================================================
// External sinks
// ============================================================================

#[cfg(test)]
mod external_tests {
    use super::*;

    /// External sink scenario: dispatching a zone's full 8 units to a
    /// customer drains the zone, deletes its record, and logs the
    /// movement against the CUSTOMER sentinel.
    #[test]
    fn test_dispatch_to_customer_drains_zone() {
        let source = zone("Z1", "8");
        let field = Uuid::new_v4();
        let intakes = vec![intake_in(&source, field, "FieldA", "A", "8")];
        let mut store = SimStore::new(vec![source.clone()], intakes);

        store
            .move_to_external(source.id, dec("8"), None, ExternalSink::Customer)
            .unwrap();

        assert_eq!(store.zone_total(source.id), Decimal::ZERO);
        assert!(store.zone_intakes(source.id).is_empty());
        assert_eq!(store.movements.len(), 1);
        assert_eq!(store.movements[0].from_zone, Location::from(source.id));
        assert_eq!(store.movements[0].to_zone, Location::Customer);
        assert_eq!(store.movements[0].quantity, dec("8"));
    }

    #[test]
    fn test_grader_dispatch_with_field_filter() {
        let source = zone("Z1", "15");
        let field_a = Uuid::new_v4();
        let field_b = Uuid::new_v4();
        let intakes = vec![
            intake_in(&source, field_a, "FieldA", "A", "10"),
            intake_in(&source, field_b, "FieldB", "B", "5"),
        ];
        let mut store = SimStore::new(vec![source.clone()], intakes);

        store
            .move_to_external(source.id, dec("4"), Some(field_a), ExternalSink::Grader)
            .unwrap();

        assert_eq!(store.zone_total(source.id), dec("11"));
        let records = store.zone_intakes(source.id);
        assert_eq!(
            records.iter().find(|i| i.field_id == field_a).unwrap().quantity,
            dec("6")
        );
        assert_eq!(
            records.iter().find(|i| i.field_id == field_b).unwrap().quantity,
            dec("5")
        );
        assert_eq!(store.movements[0].to_zone, Location::Grader);
    }

    /// Dispatching more than the zone holds is rejected up front.
    #[test]
    fn test_external_overdraw_rejected() {
        let source = zone("Z1", "8");
        let field = Uuid::new_v4();
        let intakes = vec![intake_in(&source, field, "FieldA", "A", "8")];
        let mut store = SimStore::new(vec![source.clone()], intakes);

        let err = store
            .move_to_external(source.id, dec("9"), None, ExternalSink::Customer)
            .unwrap_err();
        assert!(matches!(err, AllocationError::InsufficientStock { .. }));
        assert_eq!(store.zone_total(source.id), dec("8"));
    }
}

// ============================================================================
// Bulk moves
// ============================================================================

#[cfg(test)]
mod bulk_tests {
    use super::*;

    /// Positional pairing: source i goes to destination i.
    #[test]
    fn test_bulk_pairs_positionally() {
        let s1 = zone("S1", "4");
        let s2 = zone("S2", "5");
        let d1 = zone("D1", "0");
        let d2 = zone("D2", "0");
        let field = Uuid::new_v4();
        let intakes = vec![
            intake_in(&s1, field, "FieldA", "A", "4"),
            intake_in(&s2, field, "FieldA", "A", "5"),
        ];
        let mut store = SimStore::new(
            vec![s1.clone(), s2.clone(), d1.clone(), d2.clone()],
            intakes,
        );

        for (source, dest, qty) in [(&s1, &d1, "4"), (&s2, &d2, "5")] {
            store
                .move_to_zone(source.id, dest.id, dec(qty), None)
                .unwrap();
        }

        assert_eq!(store.zone_total(d1.id), dec("4"));
        assert_eq!(store.zone_total(d2.id), dec("5"));
        assert_eq!(store.movements.len(), 2);
    }

    /// Partial failure independence: when the second pair overdraws, the
    /// first pair's committed transfer stays applied.
    #[test]
    fn test_failed_pair_does_not_roll_back_earlier_pairs() {
        let s1 = zone("S1", "4");
        let s2 = zone("S2", "2");
        let d1 = zone("D1", "0");
        let d2 = zone("D2", "0");
        let field = Uuid::new_v4();
        let intakes = vec![
            intake_in(&s1, field, "FieldA", "A", "4"),
            intake_in(&s2, field, "FieldA", "A", "2"),
        ];
        let mut store = SimStore::new(
            vec![s1.clone(), s2.clone(), d1.clone(), d2.clone()],
            intakes,
        );

        store.move_to_zone(s1.id, d1.id, dec("4"), None).unwrap();
        let err = store.move_to_zone(s2.id, d2.id, dec("3"), None).unwrap_err();

        assert!(matches!(err, AllocationError::InsufficientStock { .. }));
        // Pair one remains applied.
        assert_eq!(store.zone_total(d1.id), dec("4"));
        assert_eq!(store.zone_total(s1.id), Decimal::ZERO);
        // Pair two untouched.
        assert_eq!(store.zone_total(s2.id), dec("2"));
        assert_eq!(store.zone_total(d2.id), Decimal::ZERO);
        assert_eq!(store.movements.len(), 1);
    }

    /// Mixed-field sources are detectable up front, which is what forces
    /// the field-selection requirement before any pair runs.
    #[test]
    fn test_mixed_zone_detection() {
        let s1 = zone("S1", "15");
        let field_a = Uuid::new_v4();
        let field_b = Uuid::new_v4();
        let intakes = vec![
            intake_in(&s1, field_a, "FieldA", "A", "10"),
            intake_in(&s1, field_b, "FieldB", "B", "5"),
        ];
        let store = SimStore::new(vec![s1.clone()], intakes);

        let distinct: std::collections::HashSet<Uuid> = store
            .zone_intakes(s1.id)
            .iter()
            .filter(|i| i.quantity > Decimal::ZERO)
            .map(|i| i.field_id)
            .collect();
        assert!(distinct.len() > 1);
    }
}
