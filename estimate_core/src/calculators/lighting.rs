//! # Lighting Calculator
//!
//! Fixture count by the lumen method:
//!
//! ```text
//! lumens   = illuminance × area / (utilization × maintenance)
//! fixtures = ceil(lumens / (fixtureWatts × lumensPerWatt))
//! ```
//!
//! Luminous efficacy defaults to 80 lm/W (typical LED) and can be overridden
//! per calculation.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_money, LM, LUX, M2, UN, W, W_PER_M2};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

pub const DEFAULT_LUMENS_PER_WATT: f64 = 80.0;
pub const UTILIZATION_FACTOR: f64 = 0.6;
pub const MAINTENANCE_FACTOR: f64 = 0.8;

/// Recommended illuminance (lux) per room type.
pub const ROOM_ILLUMINANCE: &[(&str, f64)] = &[
    ("living", 150.0),
    ("bedroom", 150.0),
    ("kitchen", 300.0),
    ("bathroom", 200.0),
    ("office", 500.0),
    ("garage", 100.0),
    ("classroom", 300.0),
];

pub fn room_illuminance(key: &str) -> Option<f64> {
    ROOM_ILLUMINANCE.iter().find(|(k, _)| *k == key).map(|(_, lux)| *lux)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingInput {
    /// Floor area (m²)
    pub area: f64,
    pub room_type: String,
    pub fixture_watts: f64,
    pub lumens_per_watt: f64,
}

impl Default for LightingInput {
    fn default() -> Self {
        LightingInput {
            area: 0.0,
            room_type: "living".to_string(),
            fixture_watts: 12.0,
            lumens_per_watt: DEFAULT_LUMENS_PER_WATT,
        }
    }
}

impl LightingInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("area").label("Area").required().range(0.01, 10_000.0),
            ValidationRule::new("roomType").label("Room type").text(),
            ValidationRule::new("fixtureWatts").label("Fixture power").range(1.0, 1000.0),
            ValidationRule::new("lumensPerWatt").label("Luminous efficacy").range(1.0, 250.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = LightingInput::default();
        LightingInput {
            area: inputs.number_or("area", d.area),
            room_type: inputs.text_or("roomType", &d.room_type),
            fixture_watts: inputs.number_or("fixtureWatts", d.fixture_watts),
            lumens_per_watt: inputs.number_or("lumensPerWatt", d.lumens_per_watt),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("area", self.area)
            .with("roomType", self.room_type.as_str())
            .with("fixtureWatts", self.fixture_watts)
            .with("lumensPerWatt", self.lumens_per_watt)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingResult {
    pub total_lumens: ResultEntry,
    pub fixtures_needed: ResultEntry,
    pub total_power: ResultEntry,
    pub power_density: ResultEntry,
    pub illuminance: ResultEntry,
    pub lumens_per_fixture: ResultEntry,
    pub area: ResultEntry,
}

impl ResultEntries for LightingResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("totalLumens", &self.total_lumens),
            ("fixturesNeeded", &self.fixtures_needed),
            ("totalPower", &self.total_power),
            ("powerDensity", &self.power_density),
            ("illuminance", &self.illuminance),
            ("lumensPerFixture", &self.lumens_per_fixture),
            ("area", &self.area),
        ]
    }
}

pub fn calculate(input: &LightingInput) -> CalcResult<Outcome<LightingResult>> {
    validate(&input.to_inputs(), &LightingInput::rules()).into_result()?;

    let Some(lux) = room_illuminance(&input.room_type) else {
        return Ok(Outcome::not_found("roomType", input.room_type.as_str()));
    };

    let area = sanitize_number(input.area, 0.0);
    let watts = sanitize_number(input.fixture_watts, 0.0);
    let per_fixture = watts * sanitize_number(input.lumens_per_watt, 0.0);

    let lumens = lux * area / (UTILIZATION_FACTOR * MAINTENANCE_FACTOR);
    let fixtures = if per_fixture > 0.0 { ceil_count(lumens / per_fixture) } else { 0.0 };
    let power = fixtures * watts;
    let density = if area > 0.0 { power / area } else { 0.0 };

    Ok(Outcome::Computed(LightingResult {
        total_lumens: ResultEntry::primary(lumens.round(), LM),
        fixtures_needed: ResultEntry::primary(fixtures, UN).highlighted(),
        total_power: ResultEntry::secondary(round_money(power), W),
        power_density: ResultEntry::secondary(round_money(density), W_PER_M2),
        illuminance: ResultEntry::info(lux, LUX),
        lumens_per_fixture: ResultEntry::info(per_fixture.round(), LM),
        area: ResultEntry::info(area, M2),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<LightingResult>> {
    validate(inputs, &LightingInput::rules()).into_result()?;
    calculate(&LightingInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(area: f64, room_type: &str) -> LightingInput {
        LightingInput {
            area,
            room_type: room_type.to_string(),
            ..LightingInput::default()
        }
    }

    #[test]
    fn test_office_lumen_method() {
        let result = calculate(&room(20.0, "office")).unwrap().computed().unwrap();
        // 500 × 20 / 0.48
        assert_eq!(result.total_lumens.number(), 20833.0);
        // 20833.3 / 960 = 21.7
        assert_eq!(result.fixtures_needed.number(), 22.0);
        assert_eq!(result.total_power.number(), 264.0);
        assert!((result.power_density.number() - 13.2).abs() < 1e-9);
        assert_eq!(result.lumens_per_fixture.number(), 960.0);
    }

    #[test]
    fn test_efficacy_is_configurable() {
        let efficient = LightingInput {
            lumens_per_watt: 160.0,
            ..room(20.0, "office")
        };
        let result = calculate(&efficient).unwrap().computed().unwrap();
        // 20833.3 / 1920 = 10.85
        assert_eq!(result.fixtures_needed.number(), 11.0);
    }

    #[test]
    fn test_unknown_room_type() {
        match calculate(&room(20.0, "ballroom")).unwrap() {
            Outcome::NotFound(miss) => assert_eq!(miss.field, "roomType"),
            other => panic!("expected lookup miss, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_from_raw_inputs() {
        let inputs = Inputs::new().with("area", 12.0);
        let result = calculate_inputs(&inputs).unwrap().computed().unwrap();
        assert_eq!(result.illuminance.number(), 150.0);
        // 150 × 12 / 0.48 = 3750 lm over 960 lm fixtures
        assert_eq!(result.fixtures_needed.number(), 4.0);
    }
}
