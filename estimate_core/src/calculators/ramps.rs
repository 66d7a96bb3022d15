//! # Accessible Ramp Calculator
//!
//! Ramp length, segmentation and landings for a given rise. The allowed rise
//! per segment depends on the slope tier; slopes above 8.33% are not
//! accessible at all.
//!
//! | max slope | max rise per segment |
//! |-----------|----------------------|
//! | 5.00%     | 1.50 m               |
//! | 6.25%     | 1.00 m               |
//! | 8.33%     | 0.80 m               |

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, M, M2, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// (max slope %, max rise per segment in m), ordered by slope
pub const SLOPE_TIERS: &[(f64, f64)] = &[(5.0, 1.5), (6.25, 1.0), (8.33, 0.8)];
/// Length of an intermediate landing (m)
pub const LANDING_LENGTH: f64 = 1.2;

/// Maximum rise per segment for a slope, or `None` above the steepest tier.
pub fn max_segment_rise(slope_percent: f64) -> Option<f64> {
    SLOPE_TIERS
        .iter()
        .find(|(max_slope, _)| slope_percent <= *max_slope)
        .map(|(_, rise)| *rise)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RampInput {
    /// Height to overcome (m)
    pub height: f64,
    pub slope_percent: f64,
    /// Ramp width (m)
    pub width: f64,
}

impl Default for RampInput {
    fn default() -> Self {
        RampInput {
            height: 0.0,
            slope_percent: 8.33,
            width: 1.2,
        }
    }
}

impl RampInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("height").label("Height").required().range(0.01, 10.0),
            ValidationRule::new("slopePercent").label("Slope").range(0.1, 100.0),
            ValidationRule::new("width").label("Width").range(0.5, 10.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = RampInput::default();
        RampInput {
            height: inputs.number_or("height", d.height),
            slope_percent: inputs.number_or("slopePercent", d.slope_percent),
            width: inputs.number_or("width", d.width),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("height", self.height)
            .with("slopePercent", self.slope_percent)
            .with("width", self.width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RampResult {
    pub horizontal_length: ResultEntry,
    pub ramp_length: ResultEntry,
    pub segments: ResultEntry,
    pub intermediate_landings: ResultEntry,
    pub total_length: ResultEntry,
    pub ramp_area: ResultEntry,
    pub compliant: ResultEntry,
    pub max_segment_rise: ResultEntry,
}

impl ResultEntries for RampResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("horizontalLength", &self.horizontal_length),
            ("rampLength", &self.ramp_length),
            ("segments", &self.segments),
            ("intermediateLandings", &self.intermediate_landings),
            ("totalLength", &self.total_length),
            ("rampArea", &self.ramp_area),
            ("compliant", &self.compliant),
            ("maxSegmentRise", &self.max_segment_rise),
        ]
    }
}

pub fn calculate(input: &RampInput) -> CalcResult<Outcome<RampResult>> {
    validate(&input.to_inputs(), &RampInput::rules()).into_result()?;

    let height = sanitize_number(input.height, 0.0);
    let slope = sanitize_number(input.slope_percent, 0.1);
    let width = sanitize_number(input.width, 0.0);

    let horizontal = height / (slope / 100.0);
    let ramp_length = (height * height + horizontal * horizontal).sqrt();

    let tier_rise = max_segment_rise(slope);
    // a non-compliant ramp is reported as one continuous run
    let segments = match tier_rise {
        Some(rise) => ceil_count(height / rise).max(1.0),
        None => 1.0,
    };
    let landings = segments - 1.0;

    Ok(Outcome::Computed(RampResult {
        horizontal_length: ResultEntry::primary(round_quantity(horizontal), M),
        ramp_length: ResultEntry::primary(round_quantity(ramp_length), M),
        segments: ResultEntry::primary(segments, UN),
        intermediate_landings: ResultEntry::secondary(landings, UN),
        total_length: ResultEntry::primary(round_quantity(horizontal + landings * LANDING_LENGTH), M).highlighted(),
        ramp_area: ResultEntry::secondary(round_quantity(ramp_length * width), M2),
        compliant: ResultEntry::info(tier_rise.is_some(), ""),
        max_segment_rise: ResultEntry::info(tier_rise.unwrap_or(0.0), M),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<RampResult>> {
    validate(inputs, &RampInput::rules()).into_result()?;
    calculate(&RampInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(height: f64, slope: f64) -> RampInput {
        RampInput {
            height,
            slope_percent: slope,
            ..RampInput::default()
        }
    }

    #[test]
    fn test_two_segment_ramp() {
        let result = calculate(&ramp(1.2, 6.25)).unwrap().computed().unwrap();
        assert!((result.horizontal_length.number() - 19.2).abs() < 1e-9);
        assert!((result.ramp_length.number() - 19.237).abs() < 1e-9);
        assert_eq!(result.segments.number(), 2.0);
        assert_eq!(result.intermediate_landings.number(), 1.0);
        assert!((result.total_length.number() - 20.4).abs() < 1e-9);
        assert_eq!(result.compliant.value.as_flag(), Some(true));
        assert_eq!(result.max_segment_rise.number(), 1.0);
    }

    #[test]
    fn test_gentle_ramp_single_run() {
        let result = calculate(&ramp(0.6, 5.0)).unwrap().computed().unwrap();
        assert!((result.horizontal_length.number() - 12.0).abs() < 1e-9);
        assert_eq!(result.segments.number(), 1.0);
        assert_eq!(result.intermediate_landings.number(), 0.0);
    }

    #[test]
    fn test_slope_tiers() {
        assert_eq!(max_segment_rise(4.0), Some(1.5));
        assert_eq!(max_segment_rise(5.0), Some(1.5));
        assert_eq!(max_segment_rise(6.0), Some(1.0));
        assert_eq!(max_segment_rise(8.33), Some(0.8));
        assert_eq!(max_segment_rise(8.34), None);
    }

    #[test]
    fn test_steep_ramp_not_compliant() {
        let result = calculate(&ramp(0.5, 12.0)).unwrap().computed().unwrap();
        assert_eq!(result.compliant.value.as_flag(), Some(false));
        assert_eq!(result.segments.number(), 1.0);
    }

    #[test]
    fn test_default_slope() {
        let result = calculate_inputs(&Inputs::new().with("height", 0.6)).unwrap().computed().unwrap();
        // 0.6 / 0.0833
        assert!((result.horizontal_length.number() - 7.203).abs() < 1e-9);
        assert_eq!(result.segments.number(), 1.0);
    }
}
