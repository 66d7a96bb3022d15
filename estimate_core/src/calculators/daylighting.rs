//! # Daylighting Calculator
//!
//! Minimum window area as a share of floor area, tiered by how long people
//! stay in the room:
//!
//! - transient (halls, stairs): 8%
//! - service (kitchens, bathrooms, laundry): 12%
//! - long stay (bedrooms, living rooms, offices): 16%

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{round_money, round_quantity, M2, PERCENT};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Required window-to-floor ratio (%) per room usage.
pub const USAGE_RATIOS: &[(&str, f64)] = &[("transient", 8.0), ("service", 12.0), ("longStay", 16.0)];

pub fn usage_ratio(key: &str) -> Option<f64> {
    USAGE_RATIOS.iter().find(|(k, _)| *k == key).map(|(_, r)| *r)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaylightingInput {
    pub floor_area: f64,
    /// Existing or planned glazed area (m²)
    pub window_area: f64,
    pub room_usage: String,
}

impl Default for DaylightingInput {
    fn default() -> Self {
        DaylightingInput {
            floor_area: 0.0,
            window_area: 0.0,
            room_usage: "longStay".to_string(),
        }
    }
}

impl DaylightingInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("floorArea").label("Floor area").required().range(0.01, 10_000.0),
            ValidationRule::new("windowArea").label("Window area").min(0.0),
            ValidationRule::new("roomUsage").label("Room usage").text(),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = DaylightingInput::default();
        DaylightingInput {
            floor_area: inputs.number_or("floorArea", d.floor_area),
            window_area: inputs.number_or("windowArea", d.window_area),
            room_usage: inputs.text_or("roomUsage", &d.room_usage),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("floorArea", self.floor_area)
            .with("windowArea", self.window_area)
            .with("roomUsage", self.room_usage.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaylightingResult {
    pub required_ratio: ResultEntry,
    pub required_window_area: ResultEntry,
    pub actual_ratio: ResultEntry,
    pub window_deficit: ResultEntry,
    pub compliant: ResultEntry,
}

impl ResultEntries for DaylightingResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("requiredRatio", &self.required_ratio),
            ("requiredWindowArea", &self.required_window_area),
            ("actualRatio", &self.actual_ratio),
            ("windowDeficit", &self.window_deficit),
            ("compliant", &self.compliant),
        ]
    }
}

pub fn calculate(input: &DaylightingInput) -> CalcResult<Outcome<DaylightingResult>> {
    validate(&input.to_inputs(), &DaylightingInput::rules()).into_result()?;

    let Some(ratio) = usage_ratio(&input.room_usage) else {
        return Ok(Outcome::not_found("roomUsage", input.room_usage.as_str()));
    };

    let floor = sanitize_number(input.floor_area, 0.0);
    let window = round_quantity(sanitize_number(input.window_area, 0.0));

    let required = round_quantity(floor * ratio / 100.0);
    let actual = if floor > 0.0 { window / floor * 100.0 } else { 0.0 };
    let deficit = round_quantity(sanitize_number(required - window, 0.0));

    Ok(Outcome::Computed(DaylightingResult {
        required_ratio: ResultEntry::info(ratio, PERCENT),
        required_window_area: ResultEntry::primary(required, M2).highlighted(),
        actual_ratio: ResultEntry::primary(round_money(actual), PERCENT),
        window_deficit: ResultEntry::secondary(deficit, M2),
        compliant: ResultEntry::primary(window >= required, ""),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<DaylightingResult>> {
    validate(inputs, &DaylightingInput::rules()).into_result()?;
    calculate(&DaylightingInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(window: f64, usage: &str) -> DaylightingInput {
        DaylightingInput {
            floor_area: 20.0,
            window_area: window,
            room_usage: usage.to_string(),
        }
    }

    #[test]
    fn test_long_stay_room_short_of_glass() {
        let result = calculate(&room(2.4, "longStay")).unwrap().computed().unwrap();
        assert!((result.required_window_area.number() - 3.2).abs() < 1e-9);
        assert!((result.actual_ratio.number() - 12.0).abs() < 1e-9);
        assert!((result.window_deficit.number() - 0.8).abs() < 1e-9);
        assert_eq!(result.compliant.value.as_flag(), Some(false));
    }

    #[test]
    fn test_ratio_tiers() {
        let transient = calculate(&room(0.0, "transient")).unwrap().computed().unwrap();
        let service = calculate(&room(0.0, "service")).unwrap().computed().unwrap();
        assert!((transient.required_window_area.number() - 1.6).abs() < 1e-9);
        assert!((service.required_window_area.number() - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_exact_ratio_is_compliant() {
        let result = calculate(&room(2.4, "service")).unwrap().computed().unwrap();
        assert_eq!(result.compliant.value.as_flag(), Some(true));
        assert_eq!(result.window_deficit.number(), 0.0);
    }

    #[test]
    fn test_unknown_usage() {
        assert!(!calculate(&room(2.0, "storage")).unwrap().is_computed());
    }
}
