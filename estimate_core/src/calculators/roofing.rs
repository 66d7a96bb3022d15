//! # Roofing Calculator
//!
//! Converts a roof's horizontal projection into its real (sloped) area and
//! counts tiles.
//!
//! - angle = atan(slope% / 100)
//! - realArea = projectionArea / cos(angle)
//! - tilesNeeded = ceil(tilesPerM2 × (1 + wasteFactor) × realArea)
//!
//! Each tile model also carries a minimum slope; roofs flatter than that are
//! flagged but still counted.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_money, round_quantity, DEG, M2, PERCENT, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Ridge tiles per linear meter of ridge
pub const RIDGE_TILES_PER_M: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileType {
    pub key: &'static str,
    pub tiles_per_m2: f64,
    /// Minimum roof slope (%)
    pub min_slope: f64,
}

pub const TILE_TYPES: &[TileType] = &[
    TileType { key: "colonial", tiles_per_m2: 24.0, min_slope: 25.0 },
    TileType { key: "portuguese", tiles_per_m2: 17.0, min_slope: 30.0 },
    TileType { key: "roman", tiles_per_m2: 16.0, min_slope: 30.0 },
    TileType { key: "french", tiles_per_m2: 15.0, min_slope: 35.0 },
    TileType { key: "american", tiles_per_m2: 12.0, min_slope: 30.0 },
    TileType { key: "concrete", tiles_per_m2: 10.5, min_slope: 30.0 },
];

pub fn tile_type(key: &str) -> Option<&'static TileType> {
    TILE_TYPES.iter().find(|t| t.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofingInput {
    /// Horizontal projection of the roof (m²)
    pub projection_area: f64,
    /// Roof slope (%)
    pub slope: f64,
    pub tile_type: String,
    /// Extra tiles for cuts and breakage (%)
    pub waste_factor: f64,
    /// Ridge length (m)
    pub ridge_length: f64,
}

impl Default for RoofingInput {
    fn default() -> Self {
        RoofingInput {
            projection_area: 0.0,
            slope: 30.0,
            tile_type: "roman".to_string(),
            waste_factor: 10.0,
            ridge_length: 0.0,
        }
    }
}

impl RoofingInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("projectionArea").label("Projection area").required().range(0.01, 100_000.0),
            ValidationRule::new("slope").label("Slope").range(0.0, 200.0),
            ValidationRule::new("tileType").label("Tile type").text(),
            ValidationRule::new("wasteFactor").label("Waste factor").range(0.0, 50.0),
            ValidationRule::new("ridgeLength").label("Ridge length").min(0.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = RoofingInput::default();
        RoofingInput {
            projection_area: inputs.number_or("projectionArea", d.projection_area),
            slope: inputs.number_or("slope", d.slope),
            tile_type: inputs.text_or("tileType", &d.tile_type),
            waste_factor: inputs.number_or("wasteFactor", d.waste_factor),
            ridge_length: inputs.number_or("ridgeLength", d.ridge_length),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("projectionArea", self.projection_area)
            .with("slope", self.slope)
            .with("tileType", self.tile_type.as_str())
            .with("wasteFactor", self.waste_factor)
            .with("ridgeLength", self.ridge_length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofingResult {
    pub real_area: ResultEntry,
    pub tiles_needed: ResultEntry,
    pub ridge_tiles: ResultEntry,
    pub slope_angle: ResultEntry,
    pub area_increase: ResultEntry,
    pub slope_compliant: ResultEntry,
}

impl ResultEntries for RoofingResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("realArea", &self.real_area),
            ("tilesNeeded", &self.tiles_needed),
            ("ridgeTiles", &self.ridge_tiles),
            ("slopeAngle", &self.slope_angle),
            ("areaIncrease", &self.area_increase),
            ("slopeCompliant", &self.slope_compliant),
        ]
    }
}

pub fn calculate(input: &RoofingInput) -> CalcResult<Outcome<RoofingResult>> {
    validate(&input.to_inputs(), &RoofingInput::rules()).into_result()?;

    let Some(tile) = tile_type(&input.tile_type) else {
        return Ok(Outcome::not_found("tileType", input.tile_type.as_str()));
    };

    let projection = sanitize_number(input.projection_area, 0.0);
    let slope = sanitize_number(input.slope, 0.0);
    let waste = sanitize_number(input.waste_factor, 0.0) / 100.0;
    let ridge = sanitize_number(input.ridge_length, 0.0);

    let angle = (slope / 100.0).atan();
    let real_area = round_quantity(projection / angle.cos());
    let tiles = ceil_count(tile.tiles_per_m2 * (1.0 + waste) * real_area);
    let increase = if projection > 0.0 { (real_area / projection - 1.0) * 100.0 } else { 0.0 };

    Ok(Outcome::Computed(RoofingResult {
        real_area: ResultEntry::primary(real_area, M2),
        tiles_needed: ResultEntry::primary(tiles, UN).highlighted(),
        ridge_tiles: ResultEntry::secondary(ceil_count(ridge * RIDGE_TILES_PER_M), UN),
        slope_angle: ResultEntry::info(round_money(angle.to_degrees()), DEG),
        area_increase: ResultEntry::info(round_money(increase), PERCENT),
        slope_compliant: ResultEntry::info(slope >= tile.min_slope, ""),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<RoofingResult>> {
    validate(inputs, &RoofingInput::rules()).into_result()?;
    calculate(&RoofingInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roof(projection: f64) -> RoofingInput {
        RoofingInput {
            projection_area: projection,
            ..RoofingInput::default()
        }
    }

    #[test]
    fn test_roman_tiles_at_thirty_percent() {
        let result = calculate(&roof(100.0)).unwrap().computed().unwrap();
        // 100 × sqrt(1.09)
        assert!((result.real_area.number() - 104.403).abs() < 1e-9);
        // 16 × 1.1 × 104.403 = 1837.49
        assert_eq!(result.tiles_needed.number(), 1838.0);
        assert!((result.slope_angle.number() - 16.7).abs() < 1e-9);
        assert_eq!(result.slope_compliant.value.as_flag(), Some(true));
    }

    #[test]
    fn test_flat_roof_keeps_projection() {
        let input = RoofingInput {
            slope: 0.0,
            waste_factor: 0.0,
            ..roof(50.0)
        };
        let result = calculate(&input).unwrap().computed().unwrap();
        assert_eq!(result.real_area.number(), 50.0);
        assert_eq!(result.tiles_needed.number(), 800.0);
        assert_eq!(result.area_increase.number(), 0.0);
        assert_eq!(result.slope_compliant.value.as_flag(), Some(false));
    }

    #[test]
    fn test_steeper_roof_needs_more_tiles() {
        let shallow = calculate(&roof(80.0)).unwrap().computed().unwrap();
        let steep = calculate(&RoofingInput { slope: 60.0, ..roof(80.0) }).unwrap().computed().unwrap();
        assert!(steep.tiles_needed.number() > shallow.tiles_needed.number());
    }

    #[test]
    fn test_ridge_tiles() {
        let input = RoofingInput {
            ridge_length: 8.5,
            ..roof(100.0)
        };
        let result = calculate(&input).unwrap().computed().unwrap();
        assert_eq!(result.ridge_tiles.number(), 26.0);
    }

    #[test]
    fn test_unknown_tile_type() {
        let input = RoofingInput {
            tile_type: "slate".into(),
            ..roof(100.0)
        };
        assert!(!calculate(&input).unwrap().is_computed());
    }
}
