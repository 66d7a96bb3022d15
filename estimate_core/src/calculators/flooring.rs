//! # Flooring Calculator
//!
//! Tile count, boxes, adhesive mortar and grout for a rectangular room.
//!
//! ## Formulas
//!
//! - area = length × width
//! - areaWithWaste = area × (1 + waste/100)
//! - tilesNeeded = ceil(areaWithWaste / tileArea)
//! - boxesNeeded = ceil(areaWithWaste / boxArea)
//! - mortar, grout = area × per-floor-type consumption (kg/m²)
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculators::flooring::{calculate, FlooringInput};
//!
//! let input = FlooringInput {
//!     room_length: 5.0,
//!     room_width: 4.0,
//!     ..FlooringInput::default()
//! };
//! let result = calculate(&input).unwrap().computed().unwrap();
//! assert_eq!(result.tiles_needed.number(), 62.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, KG, M, M2, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Adhesive mortar and grout consumption (kg/m²) for a floor type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorType {
    pub key: &'static str,
    pub mortar_kg_per_m2: f64,
    pub grout_kg_per_m2: f64,
}

pub const FLOOR_TYPES: &[FloorType] = &[
    FloorType { key: "ceramic", mortar_kg_per_m2: 4.0, grout_kg_per_m2: 0.3 },
    FloorType { key: "porcelain", mortar_kg_per_m2: 5.0, grout_kg_per_m2: 0.25 },
    FloorType { key: "stone", mortar_kg_per_m2: 6.0, grout_kg_per_m2: 0.5 },
    FloorType { key: "vinyl", mortar_kg_per_m2: 0.0, grout_kg_per_m2: 0.0 },
    FloorType { key: "laminate", mortar_kg_per_m2: 0.0, grout_kg_per_m2: 0.0 },
];

pub fn floor_type(key: &str) -> Option<&'static FloorType> {
    FLOOR_TYPES.iter().find(|t| t.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlooringInput {
    /// Room length (m)
    pub room_length: f64,
    /// Room width (m)
    pub room_width: f64,
    /// Tile length (cm)
    pub tile_length: f64,
    /// Tile width (cm)
    pub tile_width: f64,
    pub floor_type: String,
    pub waste_percentage: f64,
    /// Floor area covered by one box (m²)
    pub box_area: f64,
}

impl Default for FlooringInput {
    fn default() -> Self {
        FlooringInput {
            room_length: 0.0,
            room_width: 0.0,
            tile_length: 60.0,
            tile_width: 60.0,
            floor_type: "ceramic".to_string(),
            waste_percentage: 10.0,
            box_area: 2.0,
        }
    }
}

impl FlooringInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("roomLength").label("Room length").required().range(0.1, 1000.0),
            ValidationRule::new("roomWidth").label("Room width").required().range(0.1, 1000.0),
            ValidationRule::new("tileLength").label("Tile length").range(1.0, 300.0),
            ValidationRule::new("tileWidth").label("Tile width").range(1.0, 300.0),
            ValidationRule::new("floorType").label("Floor type").text(),
            ValidationRule::new("wastePercentage").label("Waste percentage").range(0.0, 50.0),
            ValidationRule::new("boxArea").label("Box area").min(0.01),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = FlooringInput::default();
        FlooringInput {
            room_length: inputs.number_or("roomLength", d.room_length),
            room_width: inputs.number_or("roomWidth", d.room_width),
            tile_length: inputs.number_or("tileLength", d.tile_length),
            tile_width: inputs.number_or("tileWidth", d.tile_width),
            floor_type: inputs.text_or("floorType", &d.floor_type),
            waste_percentage: inputs.number_or("wastePercentage", d.waste_percentage),
            box_area: inputs.number_or("boxArea", d.box_area),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("roomLength", self.room_length)
            .with("roomWidth", self.room_width)
            .with("tileLength", self.tile_length)
            .with("tileWidth", self.tile_width)
            .with("floorType", self.floor_type.as_str())
            .with("wastePercentage", self.waste_percentage)
            .with("boxArea", self.box_area)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlooringResult {
    pub area: ResultEntry,
    pub area_with_waste: ResultEntry,
    pub tiles_needed: ResultEntry,
    pub boxes_needed: ResultEntry,
    pub adhesive_mortar: ResultEntry,
    pub grout: ResultEntry,
    pub skirting: ResultEntry,
}

impl ResultEntries for FlooringResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("area", &self.area),
            ("areaWithWaste", &self.area_with_waste),
            ("tilesNeeded", &self.tiles_needed),
            ("boxesNeeded", &self.boxes_needed),
            ("adhesiveMortar", &self.adhesive_mortar),
            ("grout", &self.grout),
            ("skirting", &self.skirting),
        ]
    }
}

pub fn calculate(input: &FlooringInput) -> CalcResult<Outcome<FlooringResult>> {
    validate(&input.to_inputs(), &FlooringInput::rules()).into_result()?;

    let Some(floor) = floor_type(&input.floor_type) else {
        return Ok(Outcome::not_found("floorType", input.floor_type.as_str()));
    };

    let length = sanitize_number(input.room_length, 0.0);
    let width = sanitize_number(input.room_width, 0.0);
    let waste = sanitize_number(input.waste_percentage, 0.0);
    let tile_area = sanitize_number(input.tile_length, 0.0) * sanitize_number(input.tile_width, 0.0) / 10_000.0;
    let box_area = sanitize_number(input.box_area, 0.0);

    let area = round_quantity(length * width);
    let area_with_waste = round_quantity(area * (1.0 + waste / 100.0));
    let tiles = if tile_area > 0.0 { ceil_count(area_with_waste / tile_area) } else { 0.0 };
    let boxes = if box_area > 0.0 { ceil_count(area_with_waste / box_area) } else { 0.0 };

    Ok(Outcome::Computed(FlooringResult {
        area: ResultEntry::primary(area, M2),
        area_with_waste: ResultEntry::primary(area_with_waste, M2),
        tiles_needed: ResultEntry::primary(tiles, UN).highlighted(),
        boxes_needed: ResultEntry::primary(boxes, UN),
        adhesive_mortar: ResultEntry::secondary(round_quantity(area * floor.mortar_kg_per_m2), KG),
        grout: ResultEntry::secondary(round_quantity(area * floor.grout_kg_per_m2), KG),
        skirting: ResultEntry::info(round_quantity(2.0 * (length + width)), M),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<FlooringResult>> {
    validate(inputs, &FlooringInput::rules()).into_result()?;
    calculate(&FlooringInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(length: f64, width: f64) -> FlooringInput {
        FlooringInput {
            room_length: length,
            room_width: width,
            ..FlooringInput::default()
        }
    }

    #[test]
    fn test_ceramic_room() {
        let result = calculate(&room(5.0, 4.0)).unwrap().computed().unwrap();
        assert_eq!(result.area.number(), 20.0);
        assert!((result.area_with_waste.number() - 22.0).abs() < 1e-9);
        // 22 / 0.36 = 61.1
        assert_eq!(result.tiles_needed.number(), 62.0);
        assert_eq!(result.boxes_needed.number(), 11.0);
        assert!((result.adhesive_mortar.number() - 80.0).abs() < 1e-9);
        assert!((result.grout.number() - 6.0).abs() < 1e-9);
        assert!((result.skirting.number() - 18.0).abs() < 1e-9);
        assert!(result.tiles_needed.highlight);
    }

    #[test]
    fn test_laminate_needs_no_mortar() {
        let input = FlooringInput {
            floor_type: "laminate".into(),
            ..room(3.0, 3.0)
        };
        let result = calculate(&input).unwrap().computed().unwrap();
        assert_eq!(result.adhesive_mortar.number(), 0.0);
        assert_eq!(result.grout.number(), 0.0);
    }

    #[test]
    fn test_unknown_floor_type() {
        let input = FlooringInput {
            floor_type: "carpet".into(),
            ..room(3.0, 3.0)
        };
        match calculate(&input).unwrap() {
            Outcome::NotFound(miss) => {
                assert_eq!(miss.field, "floorType");
                assert_eq!(miss.value, "carpet");
            }
            other => panic!("expected lookup miss, got {:?}", other),
        }
    }

    #[test]
    fn test_requires_dimensions() {
        let err = calculate_inputs(&Inputs::new().with("roomWidth", 4.0)).unwrap_err();
        assert_eq!(err.user_messages(), vec!["Room length is required".to_string()]);
    }

    #[test]
    fn test_text_numbers_are_coerced() {
        let inputs = Inputs::new().with("roomLength", "5,0").with("roomWidth", "4");
        let result = calculate_inputs(&inputs).unwrap().computed().unwrap();
        assert_eq!(result.area.number(), 20.0);
    }
}
