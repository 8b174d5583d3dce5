//! Validation utilities for the Stock Control Platform
//!
//! Pure input checks shared by the backend handlers and the WASM preview
//! bindings. Anything involving stored state (capacity, provenance) lives
//! in [`crate::allocation`] instead.

use rust_decimal::Decimal;

use crate::models::Field;

/// Validate a stock quantity for intake or movement (strictly positive).
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate a grade label against the field's declared grades.
///
/// Fields with no declared grades accept any non-empty label.
pub fn validate_grade(field: &Field, grade: &str) -> Result<(), &'static str> {
    if grade.trim().is_empty() {
        return Err("Grade is required");
    }
    if !field.accepts_grade(grade) {
        return Err("Grade is not offered by this field");
    }
    Ok(())
}

/// Validate an entity name (non-empty after trimming).
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    Ok(())
}

/// Validate a harvest year is plausible.
pub fn validate_harvest_year(year: i32) -> Result<(), &'static str> {
    if !(1900..=2100).contains(&year) {
        return Err("Harvest year out of range");
    }
    Ok(())
}

/// Deduplicate a grade list, preserving first-seen order.
pub fn normalize_grades(grades: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for grade in grades {
        let trimmed = grade.trim().to_string();
        if !trimmed.is_empty() && !seen.contains(&trimmed) {
            seen.push(trimmed);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn field_with_grades(grades: &[&str]) -> Field {
        Field {
            id: Uuid::new_v4(),
            name: "Euston".to_string(),
            area: "36 Acres Maincrop Potato".to_string(),
            crop_type: "Potato".to_string(),
            variety: Some("Marfona".to_string()),
            harvest_year: 2025,
            grades: grades.iter().map(|g| g.to_string()).collect(),
            crop_class: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_positive_quantity(Decimal::ONE).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::from(-3)).is_err());
    }

    #[test]
    fn declared_grades_are_enforced() {
        let field = field_with_grades(&["A", "B"]);
        assert!(validate_grade(&field, "A").is_ok());
        assert!(validate_grade(&field, "C").is_err());
        assert!(validate_grade(&field, "").is_err());
    }

    #[test]
    fn ungraded_fields_accept_any_label() {
        let field = field_with_grades(&[]);
        assert!(validate_grade(&field, "Premium").is_ok());
        assert!(validate_grade(&field, " ").is_err());
    }

    #[test]
    fn grades_are_deduplicated_in_order() {
        let grades = vec![
            "A".to_string(),
            "B".to_string(),
            "A".to_string(),
            " ".to_string(),
        ];
        assert_eq!(normalize_grades(grades), vec!["A", "B"]);
    }

    #[test]
    fn harvest_year_bounds() {
        assert!(validate_harvest_year(2025).is_ok());
        assert!(validate_harvest_year(1850).is_err());
        assert!(validate_harvest_year(3000).is_err());
    }
}
