//! # Stairs Calculator
//!
//! Splits a floor-to-floor height into equal risers and checks the resulting
//! step against the Blondel comfort formula:
//!
//! ```text
//! 63 cm <= 2 × riser + tread <= 67 cm
//! ```
//!
//! Both bounds are inclusive. The check runs on the value rounded to two
//! decimals, the same figure that is displayed.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{round_money, CM, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Target riser height used to pick the number of steps (cm)
pub const TARGET_RISER: f64 = 17.0;
pub const MIN_RISER: f64 = 16.0;
pub const MAX_RISER: f64 = 18.0;
pub const BLONDEL_MIN: f64 = 63.0;
pub const BLONDEL_MAX: f64 = 67.0;
/// Midpoint of the Blondel range, used for the ideal tread
pub const BLONDEL_TARGET: f64 = 64.0;

/// Comfort class of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlondelClass {
    /// Below 63 cm
    Steep,
    Comfortable,
    /// Above 67 cm
    Shallow,
}

impl BlondelClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlondelClass::Steep => "steep",
            BlondelClass::Comfortable => "comfortable",
            BlondelClass::Shallow => "shallow",
        }
    }
}

/// Classify a Blondel value (2 × riser + tread, cm).
pub fn classify_blondel(value: f64) -> BlondelClass {
    if value < BLONDEL_MIN {
        BlondelClass::Steep
    } else if value > BLONDEL_MAX {
        BlondelClass::Shallow
    } else {
        BlondelClass::Comfortable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StairsInput {
    /// Floor-to-floor height (cm)
    pub total_height: f64,
    /// Horizontal run available for the flight (cm)
    pub available_length: f64,
    /// Flight width (cm)
    pub stair_width: f64,
}

impl Default for StairsInput {
    fn default() -> Self {
        StairsInput {
            total_height: 0.0,
            available_length: 0.0,
            stair_width: 80.0,
        }
    }
}

impl StairsInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("totalHeight").label("Total height").required().range(10.0, 1000.0),
            ValidationRule::new("availableLength").label("Available length").required().range(10.0, 5000.0),
            ValidationRule::new("stairWidth").label("Stair width").range(50.0, 500.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = StairsInput::default();
        StairsInput {
            total_height: inputs.number_or("totalHeight", d.total_height),
            available_length: inputs.number_or("availableLength", d.available_length),
            stair_width: inputs.number_or("stairWidth", d.stair_width),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("totalHeight", self.total_height)
            .with("availableLength", self.available_length)
            .with("stairWidth", self.stair_width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StairsResult {
    pub num_steps: ResultEntry,
    pub riser_height: ResultEntry,
    pub tread_depth: ResultEntry,
    pub blondel: ResultEntry,
    pub comfort: ResultEntry,
    pub num_treads: ResultEntry,
    pub ideal_tread: ResultEntry,
    pub required_length: ResultEntry,
    pub riser_within_limits: ResultEntry,
    pub stair_width: ResultEntry,
}

impl ResultEntries for StairsResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("numSteps", &self.num_steps),
            ("riserHeight", &self.riser_height),
            ("treadDepth", &self.tread_depth),
            ("blondel", &self.blondel),
            ("comfort", &self.comfort),
            ("numTreads", &self.num_treads),
            ("idealTread", &self.ideal_tread),
            ("requiredLength", &self.required_length),
            ("riserWithinLimits", &self.riser_within_limits),
            ("stairWidth", &self.stair_width),
        ]
    }
}

pub fn calculate(input: &StairsInput) -> CalcResult<Outcome<StairsResult>> {
    validate(&input.to_inputs(), &StairsInput::rules()).into_result()?;

    let height = sanitize_number(input.total_height, 0.0);
    let length = sanitize_number(input.available_length, 0.0);

    let steps = (height / TARGET_RISER).round().max(1.0);
    let riser = height / steps;
    let treads = (steps - 1.0).max(1.0);
    let tread = length / treads;

    let blondel = round_money(2.0 * riser + tread);
    let class = classify_blondel(blondel);
    let ideal_tread = BLONDEL_TARGET - 2.0 * riser;

    Ok(Outcome::Computed(StairsResult {
        num_steps: ResultEntry::primary(steps, UN),
        riser_height: ResultEntry::primary(round_money(riser), CM).highlighted(),
        tread_depth: ResultEntry::primary(round_money(tread), CM),
        blondel: ResultEntry::secondary(blondel, CM),
        comfort: ResultEntry::secondary(class.as_str(), ""),
        num_treads: ResultEntry::secondary(treads, UN),
        ideal_tread: ResultEntry::info(round_money(ideal_tread), CM),
        required_length: ResultEntry::info(round_money(ideal_tread * treads), CM),
        riser_within_limits: ResultEntry::info((MIN_RISER..=MAX_RISER).contains(&riser), ""),
        stair_width: ResultEntry::info(sanitize_number(input.stair_width, 0.0), CM),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<StairsResult>> {
    validate(inputs, &StairsInput::rules()).into_result()?;
    calculate(&StairsInput::from_inputs(inputs))
}
