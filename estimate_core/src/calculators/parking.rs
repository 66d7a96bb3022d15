//! # Parking Calculator
//!
//! Required parking spaces from built area and building use, with the
//! reserved share for accessible and elderly users.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, M2, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

pub const ACCESSIBLE_SHARE: f64 = 0.02;
pub const ELDERLY_SHARE: f64 = 0.05;
/// Stall size (2.5 m × 5.0 m)
pub const SPACE_AREA: f64 = 12.5;
/// Aisles and maneuvering, as a fraction of stall area
pub const CIRCULATION_FACTOR: f64 = 1.0;

/// Built area (m²) that requires one space, per building use.
pub const AREA_PER_SPACE: &[(&str, f64)] = &[
    ("residential", 100.0),
    ("commercial", 50.0),
    ("office", 35.0),
    ("retail", 25.0),
    ("industrial", 150.0),
    ("healthcare", 40.0),
];

pub fn area_per_space(key: &str) -> Option<f64> {
    AREA_PER_SPACE.iter().find(|(k, _)| *k == key).map(|(_, a)| *a)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingInput {
    /// Built area (m²)
    pub building_area: f64,
    pub use_type: String,
}

impl Default for ParkingInput {
    fn default() -> Self {
        ParkingInput {
            building_area: 0.0,
            use_type: "residential".to_string(),
        }
    }
}

impl ParkingInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("buildingArea").label("Building area").required().range(1.0, 1_000_000.0),
            ValidationRule::new("useType").label("Building use").text(),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = ParkingInput::default();
        ParkingInput {
            building_area: inputs.number_or("buildingArea", d.building_area),
            use_type: inputs.text_or("useType", &d.use_type),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("buildingArea", self.building_area)
            .with("useType", self.use_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingResult {
    pub total_spaces: ResultEntry,
    pub accessible_spaces: ResultEntry,
    pub elderly_spaces: ResultEntry,
    pub regular_spaces: ResultEntry,
    pub parking_area: ResultEntry,
    pub area_per_space: ResultEntry,
}

impl ResultEntries for ParkingResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("totalSpaces", &self.total_spaces),
            ("accessibleSpaces", &self.accessible_spaces),
            ("elderlySpaces", &self.elderly_spaces),
            ("regularSpaces", &self.regular_spaces),
            ("parkingArea", &self.parking_area),
            ("areaPerSpace", &self.area_per_space),
        ]
    }
}

pub fn calculate(input: &ParkingInput) -> CalcResult<Outcome<ParkingResult>> {
    validate(&input.to_inputs(), &ParkingInput::rules()).into_result()?;

    let Some(per_space) = area_per_space(&input.use_type) else {
        return Ok(Outcome::not_found("useType", input.use_type.as_str()));
    };

    let area = sanitize_number(input.building_area, 0.0);
    let required = ceil_count(area / per_space);
    let accessible = ceil_count(required * ACCESSIBLE_SHARE).max(1.0);
    let elderly = ceil_count(required * ELDERLY_SHARE).max(1.0);
    // reserved spaces are never dropped, even when they exceed the requirement
    let total = required.max(accessible + elderly);
    let regular = total - accessible - elderly;

    Ok(Outcome::Computed(ParkingResult {
        total_spaces: ResultEntry::primary(total, UN).highlighted(),
        accessible_spaces: ResultEntry::primary(accessible, UN),
        elderly_spaces: ResultEntry::primary(elderly, UN),
        regular_spaces: ResultEntry::secondary(regular, UN),
        parking_area: ResultEntry::secondary(round_quantity(total * SPACE_AREA * (1.0 + CIRCULATION_FACTOR)), M2),
        area_per_space: ResultEntry::info(per_space, M2),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<ParkingResult>> {
    validate(inputs, &ParkingInput::rules()).into_result()?;
    calculate(&ParkingInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building(area: f64, use_type: &str) -> ParkingInput {
        ParkingInput {
            building_area: area,
            use_type: use_type.to_string(),
        }
    }

    #[test]
    fn test_commercial_building() {
        let result = calculate(&building(1000.0, "commercial")).unwrap().computed().unwrap();
        assert_eq!(result.total_spaces.number(), 20.0);
        assert_eq!(result.accessible_spaces.number(), 1.0);
        assert_eq!(result.elderly_spaces.number(), 1.0);
        assert_eq!(result.regular_spaces.number(), 18.0);
        assert_eq!(result.parking_area.number(), 500.0);
    }

    #[test]
    fn test_large_retail_reserves_shares() {
        // 10000 / 25 = 400 spaces
        let result = calculate(&building(10_000.0, "retail")).unwrap().computed().unwrap();
        assert_eq!(result.total_spaces.number(), 400.0);
        assert_eq!(result.accessible_spaces.number(), 8.0);
        assert_eq!(result.elderly_spaces.number(), 20.0);
        assert_eq!(result.regular_spaces.number(), 372.0);
    }

    #[test]
    fn test_small_building_keeps_reserved_spaces() {
        let result = calculate(&building(80.0, "residential")).unwrap().computed().unwrap();
        assert_eq!(result.total_spaces.number(), 2.0);
        assert_eq!(result.regular_spaces.number(), 0.0);
    }

    #[test]
    fn test_unknown_use_type() {
        assert!(!calculate(&building(1000.0, "stadium")).unwrap().is_computed());
    }
}
