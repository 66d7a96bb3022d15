//! # Ventilation Calculator
//!
//! Required airflow from air changes per hour, plus the minimum natural
//! ventilation opening as a fraction of floor area.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, M2, M3, M3_PER_H};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Commercial fan sizes step in 50 m³/h
pub const FAN_SIZE_STEP: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VentilationNeed {
    pub key: &'static str,
    pub air_changes_per_hour: f64,
    /// Opening area as a fraction of floor area
    pub opening_ratio: f64,
}

pub const ROOM_VENTILATION: &[VentilationNeed] = &[
    VentilationNeed { key: "living", air_changes_per_hour: 4.0, opening_ratio: 1.0 / 12.0 },
    VentilationNeed { key: "bedroom", air_changes_per_hour: 3.0, opening_ratio: 1.0 / 12.0 },
    VentilationNeed { key: "kitchen", air_changes_per_hour: 15.0, opening_ratio: 1.0 / 16.0 },
    VentilationNeed { key: "bathroom", air_changes_per_hour: 8.0, opening_ratio: 1.0 / 16.0 },
    VentilationNeed { key: "office", air_changes_per_hour: 6.0, opening_ratio: 1.0 / 12.0 },
    VentilationNeed { key: "garage", air_changes_per_hour: 6.0, opening_ratio: 1.0 / 20.0 },
];

pub fn ventilation_need(key: &str) -> Option<&'static VentilationNeed> {
    ROOM_VENTILATION.iter().find(|v| v.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VentilationInput {
    pub room_length: f64,
    pub room_width: f64,
    pub ceiling_height: f64,
    pub room_type: String,
}

impl Default for VentilationInput {
    fn default() -> Self {
        VentilationInput {
            room_length: 0.0,
            room_width: 0.0,
            ceiling_height: 2.7,
            room_type: "living".to_string(),
        }
    }
}

impl VentilationInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("roomLength").label("Room length").required().range(0.1, 1000.0),
            ValidationRule::new("roomWidth").label("Room width").required().range(0.1, 1000.0),
            ValidationRule::new("ceilingHeight").label("Ceiling height").range(1.5, 20.0),
            ValidationRule::new("roomType").label("Room type").text(),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = VentilationInput::default();
        VentilationInput {
            room_length: inputs.number_or("roomLength", d.room_length),
            room_width: inputs.number_or("roomWidth", d.room_width),
            ceiling_height: inputs.number_or("ceilingHeight", d.ceiling_height),
            room_type: inputs.text_or("roomType", &d.room_type),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("roomLength", self.room_length)
            .with("roomWidth", self.room_width)
            .with("ceilingHeight", self.ceiling_height)
            .with("roomType", self.room_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VentilationResult {
    pub airflow: ResultEntry,
    pub opening_area: ResultEntry,
    pub fan_capacity: ResultEntry,
    pub room_volume: ResultEntry,
    pub air_changes: ResultEntry,
}

impl ResultEntries for VentilationResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("airflow", &self.airflow),
            ("openingArea", &self.opening_area),
            ("fanCapacity", &self.fan_capacity),
            ("roomVolume", &self.room_volume),
            ("airChanges", &self.air_changes),
        ]
    }
}

pub fn calculate(input: &VentilationInput) -> CalcResult<Outcome<VentilationResult>> {
    validate(&input.to_inputs(), &VentilationInput::rules()).into_result()?;

    let Some(need) = ventilation_need(&input.room_type) else {
        return Ok(Outcome::not_found("roomType", input.room_type.as_str()));
    };

    let floor = round_quantity(sanitize_number(input.room_length, 0.0) * sanitize_number(input.room_width, 0.0));
    let volume = round_quantity(floor * sanitize_number(input.ceiling_height, 0.0));
    let airflow = round_quantity(volume * need.air_changes_per_hour);
    let fan = ceil_count(airflow / FAN_SIZE_STEP) * FAN_SIZE_STEP;

    Ok(Outcome::Computed(VentilationResult {
        airflow: ResultEntry::primary(airflow, M3_PER_H).highlighted(),
        opening_area: ResultEntry::primary(round_quantity(floor * need.opening_ratio), M2),
        fan_capacity: ResultEntry::secondary(fan, M3_PER_H),
        room_volume: ResultEntry::info(volume, M3),
        air_changes: ResultEntry::info(need.air_changes_per_hour, "1/h"),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<VentilationResult>> {
    validate(inputs, &VentilationInput::rules()).into_result()?;
    calculate(&VentilationInput::from_inputs(inputs))
}
