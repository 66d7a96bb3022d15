//! # Concrete Calculator
//!
//! Slab volume and site-mix materials per characteristic strength class.

use serde::{Deserialize, Serialize};

use super::{Outcome, ResultEntries, ResultEntry};
use crate::errors::CalcResult;
use crate::units::{ceil_count, round_quantity, Centimeters, Meters, L, M2, M3, SACK};
use crate::validation::{sanitize_number, validate, Inputs, ValidationRule};

/// Material consumption per m³ of concrete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcreteMix {
    pub key: &'static str,
    /// Characteristic strength (MPa)
    pub fck: f64,
    /// 50 kg cement sacks per m³
    pub cement_sacks: f64,
    /// Sand (m³ per m³)
    pub sand: f64,
    /// Gravel (m³ per m³)
    pub gravel: f64,
    /// Water (L per m³)
    pub water: f64,
}

pub const CONCRETE_MIXES: &[ConcreteMix] = &[
    ConcreteMix { key: "fck20", fck: 20.0, cement_sacks: 6.0, sand: 0.60, gravel: 0.85, water: 190.0 },
    ConcreteMix { key: "fck25", fck: 25.0, cement_sacks: 7.0, sand: 0.56, gravel: 0.84, water: 185.0 },
    ConcreteMix { key: "fck30", fck: 30.0, cement_sacks: 8.0, sand: 0.52, gravel: 0.83, water: 180.0 },
    ConcreteMix { key: "fck35", fck: 35.0, cement_sacks: 9.0, sand: 0.48, gravel: 0.82, water: 175.0 },
];

pub fn concrete_mix(key: &str) -> Option<&'static ConcreteMix> {
    CONCRETE_MIXES.iter().find(|m| m.key == key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteInput {
    /// Slab length (m)
    pub length: f64,
    /// Slab width (m)
    pub width: f64,
    /// Slab thickness (cm)
    pub thickness: f64,
    pub concrete_type: String,
    pub waste_percentage: f64,
}

impl Default for ConcreteInput {
    fn default() -> Self {
        ConcreteInput {
            length: 0.0,
            width: 0.0,
            thickness: 10.0,
            concrete_type: "fck25".to_string(),
            waste_percentage: 5.0,
        }
    }
}

impl ConcreteInput {
    pub fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("length").label("Length").required().range(0.1, 1000.0),
            ValidationRule::new("width").label("Width").required().range(0.1, 1000.0),
            ValidationRule::new("thickness").label("Thickness").range(5.0, 100.0),
            ValidationRule::new("concreteType").label("Concrete type").text(),
            ValidationRule::new("wastePercentage").label("Waste percentage").range(0.0, 50.0),
        ]
    }

    pub fn from_inputs(inputs: &Inputs) -> Self {
        let d = ConcreteInput::default();
        ConcreteInput {
            length: inputs.number_or("length", d.length),
            width: inputs.number_or("width", d.width),
            thickness: inputs.number_or("thickness", d.thickness),
            concrete_type: inputs.text_or("concreteType", &d.concrete_type),
            waste_percentage: inputs.number_or("wastePercentage", d.waste_percentage),
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        Inputs::new()
            .with("length", self.length)
            .with("width", self.width)
            .with("thickness", self.thickness)
            .with("concreteType", self.concrete_type.as_str())
            .with("wastePercentage", self.waste_percentage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteResult {
    pub volume: ResultEntry,
    pub volume_with_waste: ResultEntry,
    pub cement_bags: ResultEntry,
    pub sand: ResultEntry,
    pub gravel: ResultEntry,
    pub water: ResultEntry,
    pub slab_area: ResultEntry,
    pub strength: ResultEntry,
}

impl ResultEntries for ConcreteResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        vec![
            ("volume", &self.volume),
            ("volumeWithWaste", &self.volume_with_waste),
            ("cementBags", &self.cement_bags),
            ("sand", &self.sand),
            ("gravel", &self.gravel),
            ("water", &self.water),
            ("slabArea", &self.slab_area),
            ("strength", &self.strength),
        ]
    }
}

pub fn calculate(input: &ConcreteInput) -> CalcResult<Outcome<ConcreteResult>> {
    validate(&input.to_inputs(), &ConcreteInput::rules()).into_result()?;

    let Some(mix) = concrete_mix(&input.concrete_type) else {
        return Ok(Outcome::not_found("concreteType", input.concrete_type.as_str()));
    };

    let area = round_quantity(sanitize_number(input.length, 0.0) * sanitize_number(input.width, 0.0));
    let thickness: Meters = Centimeters(sanitize_number(input.thickness, 0.0)).into();
    let waste = sanitize_number(input.waste_percentage, 0.0);

    let volume = round_quantity(area * thickness.value());
    let with_waste = round_quantity(volume * (1.0 + waste / 100.0));

    Ok(Outcome::Computed(ConcreteResult {
        volume: ResultEntry::primary(volume, M3),
        volume_with_waste: ResultEntry::primary(with_waste, M3).highlighted(),
        cement_bags: ResultEntry::secondary(ceil_count(with_waste * mix.cement_sacks), SACK),
        sand: ResultEntry::secondary(round_quantity(with_waste * mix.sand), M3),
        gravel: ResultEntry::secondary(round_quantity(with_waste * mix.gravel), M3),
        water: ResultEntry::secondary((with_waste * mix.water).round(), L),
        slab_area: ResultEntry::info(area, M2),
        strength: ResultEntry::info(mix.fck, "MPa"),
    }))
}

pub fn calculate_inputs(inputs: &Inputs) -> CalcResult<Outcome<ConcreteResult>> {
    validate(inputs, &ConcreteInput::rules()).into_result()?;
    calculate(&ConcreteInput::from_inputs(inputs))
}
