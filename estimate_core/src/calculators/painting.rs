//! # Painting Calculator
//!
//! Paint volume, cans, primer and spackle for a wall, net of openings.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, KG, L, M2, UN};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Primer coverage (m² per liter, single coat)
pub const PRIMER_COVERAGE: f64 = 10.0;
/// Spackle consumption (kg/m²)
pub const SPACKLE_KG_PER_M2: f64 = 0.5;

/// Paint coverage in m² per liter per coat.
pub const PAINT_COVERAGE: &[(&str, f64)] = &[("acrylic", 10.0), ("pva", 8.0), ("enamel", 12.0), ("epoxy", 6.0)];

pub fn paint_coverage(key: &str) -> Option<f64> {
    PAINT_COVERAGE.iter().find(|(k, _)| *k == key).map(|(_, c)| *c)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintingInput {
    pub wall_length: f64,
    pub wall_height: f64,
    /// Doors and windows (m²)
    pub openings_area: f64,
    pub coats: f64,
    pub paint_type: String,
    /// Liters per can
    pub can_size: f64,
}

impl Default for PaintingInput {
    fn default() -> Self {
        PaintingInput {
            wall_length: 0.0,
            wall_height: 0.0,
            openings_area: 0.0,
            coats: 2.0,
            paint_type: "acrylic".to_string(),
            can_size: 18.0,
        }
    }
}

impl PaintingInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("wallLength").label("Wall length").required().range(0.1, 1000.0),
            ValidationRule::new("wallHeight").label("Wall height").required().range(0.1, 100.0),
            ValidationRule::new("openingsArea").label("Openings area").min(0.0),
            ValidationRule::new("coats").label("Coats").range(1.0, 5.0),
            ValidationRule::new("paintType").label("Paint type").text(),
            ValidationRule::new("canSize").label("Can size").min(0.1),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = PaintingInput::default();
        PaintingInput {
            wall_length: inputs.number_or("wallLength", d.wall_length),
            wall_height: inputs.number_or("wallHeight", d.wall_height),
            openings_area: inputs.number_or("openingsArea", d.openings_area),
            coats: inputs.number_or("coats", d.coats),
            paint_type: inputs.text_or("paintType", &d.paint_type),
            can_size: inputs.number_or("canSize", d.can_size),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("wallLength", self.wall_length)
            .with("wallHeight", self.wall_height)
            .with("openingsArea", self.openings_area)
            .with("coats", self.coats)
            .with("paintType", self.paint_type.as_str())
            .with("canSize", self.can_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintingResult {
    pub net_area: ResultEntry,
    pub paint_liters: ResultEntry,
    pub cans_needed: ResultEntry,
    pub primer_liters: ResultEntry,
    pub spackle: ResultEntry,
    pub gross_area: ResultEntry,
}

impl ResultEntries for PaintingResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("netArea", &self.net_area),
            ("paintLiters", &self.paint_liters),
            ("cansNeeded", &self.cans_needed),
            ("primerLiters", &self.primer_liters),
            ("spackle", &self.spackle),
            ("grossArea", &self.gross_area),
        ]
    }
}

pub fn calculate(input: &PaintingInput) -> CalcResult<Outcome<PaintingResult>> {
    validate(&input.to_inputs(), &PaintingInput::rules()).into_result()?;

    let Some(coverage) = paint_coverage(&input.paint_type) else {
        return Ok(Outcome::not_found("paintType", input.paint_type.as_str()));
    };

    let gross = round_quantity(sanitize_number(input.wall_length, 0.0) * sanitize_number(input.wall_height, 0.0));
    // openings larger than the wall leave nothing to paint
    let net = round_quantity(sanitize_number(gross - sanitize_number(input.openings_area, 0.0), 0.0));
    let coats = sanitize_number(input.coats, 0.0);
    let can_size = sanitize_number(input.can_size, 0.0);

    let liters = round_quantity(net * coats / coverage);
    let cans = if can_size > 0.0 { ceil_count(liters / can_size) } else { 0.0 };

    Ok(Outcome::Computed(PaintingResult {
        net_area: ResultEntry::primary(net, M2),
        paint_liters: ResultEntry::primary(liters, L).highlighted(),
        cans_needed: ResultEntry::primary(cans, UN),
        primer_liters: ResultEntry::secondary(round_quantity(net / PRIMER_COVERAGE), L),
        spackle: ResultEntry::secondary(round_quantity(net * SPACKLE_KG_PER_M2), KG),
        gross_area: ResultEntry::info(gross, M2),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<PaintingResult>> {
    validate(inputs, &PaintingInput::rules()).into_result()?;
    calculate(&PaintingInput::from_inputs(inputs))
}
