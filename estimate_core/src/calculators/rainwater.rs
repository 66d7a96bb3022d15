//! # Rainwater Harvesting Calculator
//!
//! Harvestable volume from a roof and the cistern size needed to ride out a
//! dry spell.
//!
//! - annual volume (L) = roof area × annual rainfall (mm) × runoff coefficient
//! - cistern (m³) = daily demand × dry days / 1000, capped at the annual harvest
//! - first flush (L) = roof area × 2 mm

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{round_money, round_quantity, L, M3, PERCENT};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Rain diverted before collection starts (mm)
pub const FIRST_FLUSH_MM: f64 = 2.0;
pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainwaterInput {
    /// Collecting roof area (m²)
    pub roof_area: f64,
    /// Annual rainfall (mm)
    pub annual_rainfall: f64,
    pub runoff_coefficient: f64,
    /// Non-potable demand (L/day)
    pub daily_demand: f64,
    /// Longest expected dry period (days)
    pub dry_days: f64,
}

impl Default for RainwaterInput {
    fn default() -> Self {
        RainwaterInput {
            roof_area: 0.0,
            annual_rainfall: 1400.0,
            runoff_coefficient: 0.8,
            daily_demand: 200.0,
            dry_days: 30.0,
        }
    }
}

impl RainwaterInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("roofArea").label("Roof area").required().range(1.0, 100_000.0),
            ValidationRule::new("annualRainfall").label("Annual rainfall").range(0.0, 10_000.0),
            ValidationRule::new("runoffCoefficient").label("Runoff coefficient").range(0.1, 1.0),
            ValidationRule::new("dailyDemand").label("Daily demand").min(0.0),
            ValidationRule::new("dryDays").label("Dry days").range(0.0, 365.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = RainwaterInput::default();
        RainwaterInput {
            roof_area: inputs.number_or("roofArea", d.roof_area),
            annual_rainfall: inputs.number_or("annualRainfall", d.annual_rainfall),
            runoff_coefficient: inputs.number_or("runoffCoefficient", d.runoff_coefficient),
            daily_demand: inputs.number_or("dailyDemand", d.daily_demand),
            dry_days: inputs.number_or("dryDays", d.dry_days),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("roofArea", self.roof_area)
            .with("annualRainfall", self.annual_rainfall)
            .with("runoffCoefficient", self.runoff_coefficient)
            .with("dailyDemand", self.daily_demand)
            .with("dryDays", self.dry_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainwaterResult {
    pub annual_volume: ResultEntry,
    pub monthly_volume: ResultEntry,
    pub reservoir_volume: ResultEntry,
    pub demand_coverage: ResultEntry,
    pub first_flush: ResultEntry,
    pub annual_demand: ResultEntry,
}

impl ResultEntries for RainwaterResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("annualVolume", &self.annual_volume),
            ("monthlyVolume", &self.monthly_volume),
            ("reservoirVolume", &self.reservoir_volume),
            ("demandCoverage", &self.demand_coverage),
            ("firstFlush", &self.first_flush),
            ("annualDemand", &self.annual_demand),
        ]
    }
}

pub fn calculate(input: &RainwaterInput) -> CalcResult<Outcome<RainwaterResult>> {
    validate(&input.to_inputs(), &RainwaterInput::rules()).into_result()?;

    let area = sanitize_number(input.roof_area, 0.0);
    let rainfall = sanitize_number(input.annual_rainfall, 0.0);
    let runoff = sanitize_number(input.runoff_coefficient, 0.0);
    let demand = sanitize_number(input.daily_demand, 0.0);
    let dry_days = sanitize_number(input.dry_days, 0.0);

    let annual = (area * rainfall * runoff).round();
    let annual_demand = demand * DAYS_PER_YEAR;
    let coverage = if annual_demand > 0.0 { (annual / annual_demand * 100.0).min(100.0) } else { 100.0 };
    let reservoir = (demand * dry_days).min(annual) / 1000.0;

    Ok(Outcome::Computed(RainwaterResult {
        annual_volume: ResultEntry::primary(annual, L),
        monthly_volume: ResultEntry::primary((annual / 12.0).round(), L),
        reservoir_volume: ResultEntry::primary(round_quantity(reservoir), M3).highlighted(),
        demand_coverage: ResultEntry::secondary(round_money(coverage), PERCENT),
        first_flush: ResultEntry::secondary(round_quantity(area * FIRST_FLUSH_MM), L),
        annual_demand: ResultEntry::info(annual_demand, L),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<RainwaterResult>> {
    validate(inputs, &RainwaterInput::rules()).into_result()?;
    calculate(&RainwaterInput::from_inputs(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roof(area: f64) -> RainwaterInput {
        RainwaterInput {
            roof_area: area,
            ..RainwaterInput::default()
        }
    }

    #[test]
    fn test_hundred_square_meter_roof() {
        let result = calculate(&roof(100.0)).unwrap().computed().unwrap();
        assert_eq!(result.annual_volume.number(), 112_000.0);
        assert_eq!(result.monthly_volume.number(), 9333.0);
        assert!((result.reservoir_volume.number() - 6.0).abs() < 1e-9);
        assert_eq!(result.demand_coverage.number(), 100.0);
        assert_eq!(result.first_flush.number(), 200.0);
    }

    #[test]
    fn test_partial_coverage() {
        // 20 × 1400 × 0.8 = 22400 L against 73000 L/yr
        let result = calculate(&roof(20.0)).unwrap().computed().unwrap();
        assert!((result.demand_coverage.number() - 30.68).abs() < 1e-9);
    }

    #[test]
    fn test_reservoir_capped_by_harvest() {
        let input = RainwaterInput {
            annual_rainfall: 10.0,
            ..roof(100.0)
        };
        let result = calculate(&input).unwrap().computed().unwrap();
        // 100 × 10 × 0.8 = 800 L harvested per year
        assert!((result.reservoir_volume.number() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_runoff_coefficient_bounds() {
        let input = RainwaterInput {
            runoff_coefficient: 1.5,
            ..roof(100.0)
        };
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.user_messages(), vec!["Runoff coefficient must be at most 1".to_string()]);
    }
}
