//! # Masonry Calculator
//!
//! Brick count and laying mortar for a wall of a given area.
//!
//! - bricksNeeded = ceil(area × bricks per m²)
//! - bricksWithWaste = ceil(bricksNeeded × (1 + waste/100))
//! - mortarVolume = area × mortar per m²

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, M2, M3, SACK, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Cement sacks per m³ of laying mortar
pub const CEMENT_SACKS_PER_M3_MORTAR: f64 = 3.6;
/// Sand volume per m³ of laying mortar
pub const SAND_PER_M3_MORTAR: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickType {
    pub key: &'static str,
    pub name: &'static str,
    pub bricks_per_m2: f64,
    /// Laying mortar (m³ per m² of wall)
    pub mortar_m3_per_m2: f64,
}

pub const BRICK_TYPES: &[BrickType] = &[
    BrickType { key: "ceramic6holes", name: "Ceramic brick, 6 holes", bricks_per_m2: 25.0, mortar_m3_per_m2: 0.015 },
    BrickType { key: "ceramic8holes", name: "Ceramic brick, 8 holes", bricks_per_m2: 22.0, mortar_m3_per_m2: 0.016 },
    BrickType { key: "concreteBlock", name: "Concrete block", bricks_per_m2: 12.5, mortar_m3_per_m2: 0.012 },
    BrickType { key: "solidBrick", name: "Solid brick", bricks_per_m2: 78.0, mortar_m3_per_m2: 0.03 },
];

pub fn brick_type(key: &str) -> Option<&'static BrickType> {
    BRICK_TYPES.iter().find(|b| b.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasonryInput {
    /// Wall area (m²)
    pub area: f64,
    pub brick_type: String,
    pub waste_percentage: f64,
}

impl Default for MasonryInput {
    fn default() -> Self {
        MasonryInput {
            area: 0.0,
            brick_type: "ceramic6holes".to_string(),
            waste_percentage: 5.0,
        }
    }
}

impl MasonryInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("area").label("Wall area").required().range(0.01, 10_000.0),
            ValidationRule::new("brickType").label("Brick type").text().required(),
            ValidationRule::new("wastePercentage").label("Waste percentage").range(0.0, 50.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = MasonryInput::default();
        MasonryInput {
            area: inputs.number_or("area", d.area),
            brick_type: inputs.text_or("brickType", &d.brick_type),
            waste_percentage: inputs.number_or("wastePercentage", d.waste_percentage),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("area", self.area)
            .with("brickType", self.brick_type.as_str())
            .with("wastePercentage", self.waste_percentage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasonryResult {
    pub bricks_needed: ResultEntry,
    pub bricks_with_waste: ResultEntry,
    pub mortar_volume: ResultEntry,
    pub cement_bags: ResultEntry,
    pub sand: ResultEntry,
    pub wall_area: ResultEntry,
}

impl ResultEntries for MasonryResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("bricksNeeded", &self.bricks_needed),
            ("bricksWithWaste", &self.bricks_with_waste),
            ("mortarVolume", &self.mortar_volume),
            ("cementBags", &self.cement_bags),
            ("sand", &self.sand),
            ("wallArea", &self.wall_area),
        ]
    }
}

pub fn calculate(input: &MasonryInput) -> CalcResult<Outcome<MasonryResult>> {
    validate(&input.to_inputs(), &MasonryInput::rules()).into_result()?;

    let Some(brick) = brick_type(&input.brick_type) else {
        return Ok(Outcome::not_found("brickType", input.brick_type.as_str()));
    };

    let area = sanitize_number(input.area, 0.0);
    let waste = sanitize_number(input.waste_percentage, 0.0);

    let bricks = ceil_count(area * brick.bricks_per_m2);
    let bricks_with_waste = ceil_count(bricks * (1.0 + waste / 100.0));
    let mortar = round_quantity(area * brick.mortar_m3_per_m2);

    Ok(Outcome::Computed(MasonryResult {
        bricks_needed: ResultEntry::primary(bricks, UN),
        bricks_with_waste: ResultEntry::primary(bricks_with_waste, UN).highlighted(),
        mortar_volume: ResultEntry::secondary(mortar, M3),
        cement_bags: ResultEntry::secondary(ceil_count(mortar * CEMENT_SACKS_PER_M3_MORTAR), SACK),
        sand: ResultEntry::secondary(round_quantity(mortar * SAND_PER_M3_MORTAR), M3),
        wall_area: ResultEntry::info(round_quantity(area), M2),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<MasonryResult>> {
    validate(inputs, &MasonryInput::rules()).into_result()?;
    calculate(&MasonryInput::from_inputs(inputs))
}
