//! # Per-Category Calculators
//!
//! Quick calculators that do not go through the composition tables of the
//! estimation engine. Each module follows the same pattern:
//!
//! - `*Input` - typed input record (camelCase JSON)
//! - `*Input::rules()` - validation rules checked before computing
//! - `*Input::from_inputs(&Inputs)` - sanitized record from raw inputs
//! - `*Result` - one [`ResultEntry`] per output key
//! - `calculate(&*Input) -> CalcResult<Outcome<*Result>>` - pure calculation
//!
//! A select value missing from a calculator's lookup table is answered with
//! [`Outcome::NotFound`] instead of a guessed default.
//!
//! ## Available Calculators
//!
//! - [`flooring`] - tiles, boxes, adhesive mortar and grout
//! - [`painting`] - paint, cans and primer
//! - [`masonry`] - bricks and mortar
//! - [`roofing`] - real roof area and tile count from slope
//! - [`drywall`] - boards, studs, tracks and finishing
//! - [`lighting`] - fixture count by the lumen method
//! - [`concrete`] - volume and mix materials
//! - [`stairs`] - risers, treads and Blondel comfort check
//! - [`ramps`] - accessible ramp length and landings
//! - [`parking`] - required spaces by building use
//! - [`rainwater`] - harvest volume and cistern size
//! - [`ventilation`] - airflow and opening area
//! - [`daylighting`] - window-to-floor ratio tiers
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculators::{CalculatorRegistry, Outcome};
//! use estimate_core::validation::Inputs;
//!
//! let registry = CalculatorRegistry::new();
//! let inputs = Inputs::new().with("area", 20.0).with("brickType", "ceramic6holes");
//!
//! match registry.calculate("masonry", &inputs).unwrap() {
//!     Outcome::Computed(result) => {
//!         let json = serde_json::to_value(&result).unwrap();
//!         assert_eq!(json["bricksNeeded"]["value"], 500.0);
//!     }
//!     Outcome::NotFound(miss) => panic!("{:?}", miss),
//! }
//! ```

pub mod concrete;
pub mod daylighting;
pub mod drywall;
pub mod flooring;
pub mod lighting;
pub mod masonry;
pub mod painting;
pub mod parking;
pub mod rainwater;
pub mod ramps;
pub mod roofing;
pub mod stairs;
pub mod ventilation;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::validation::{Inputs, ValidationRule};

// ============================================================================
// Result Entries
// ============================================================================

/// Grouping of an output value in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCategory {
    Primary,
    Secondary,
    Info,
}

/// Value of a result entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl ResultValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResultValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ResultValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResultValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for ResultValue {
    fn from(n: f64) -> Self {
        ResultValue::Number(n)
    }
}

impl From<bool> for ResultValue {
    fn from(b: bool) -> Self {
        ResultValue::Flag(b)
    }
}

impl From<&str> for ResultValue {
    fn from(s: &str) -> Self {
        ResultValue::Text(s.to_string())
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Number(n) => write!(f, "{}", n),
            ResultValue::Flag(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            ResultValue::Text(s) => write!(f, "{}", s),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One output value with its unit and grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub value: ResultValue,
    pub unit: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlight: bool,
    pub category: ResultCategory,
}

impl ResultEntry {
    pub fn new(value: impl Into<ResultValue>, unit: &str, category: ResultCategory) -> Self {
        ResultEntry {
            value: value.into(),
            unit: unit.to_string(),
            highlight: false,
            category,
        }
    }

    pub fn primary(value: impl Into<ResultValue>, unit: &str) -> Self {
        ResultEntry::new(value, unit, ResultCategory::Primary)
    }

    pub fn secondary(value: impl Into<ResultValue>, unit: &str) -> Self {
        ResultEntry::new(value, unit, ResultCategory::Secondary)
    }

    pub fn info(value: impl Into<ResultValue>, unit: &str) -> Self {
        ResultEntry::new(value, unit, ResultCategory::Info)
    }

    /// Mark the entry as the headline figure
    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    /// Numeric value, or NaN for flags and text
    pub fn number(&self) -> f64 {
        self.value.as_number().unwrap_or(f64::NAN)
    }
}

/// Access to a result's entries in declaration order.
pub trait ResultEntries {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)>;

    /// Entries grouped by category, primary first
    fn group_by_category(&self) -> BTreeMap<ResultCategory, Vec<(&'static str, &ResultEntry)>> {
        let mut groups: BTreeMap<ResultCategory, Vec<(&'static str, &ResultEntry)>> = BTreeMap::new();
        for (key, entry) in self.entries() {
            groups.entry(entry.category).or_default().push((key, entry));
        }
        groups
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Error-shaped result for a select value with no table entry.
///
/// Serializes as `{"error": "not found", "field": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupMiss {
    pub error: String,
    pub field: String,
    pub value: String,
}

impl LookupMiss {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        let miss = LookupMiss {
            error: "not found".to_string(),
            field: field.into(),
            value: value.into(),
        };
        tracing::warn!(field = %miss.field, value = %miss.value, "lookup miss");
        miss
    }
}

/// Result of a calculator: computed values, or a lookup miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    NotFound(LookupMiss),
    Computed(T),
}

impl<T> Outcome<T> {
    pub fn not_found(field: impl Into<String>, value: impl Into<String>) -> Self {
        Outcome::NotFound(LookupMiss::new(field, value))
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }

    /// The computed value, if any
    pub fn computed(self) -> Option<T> {
        match self {
            Outcome::Computed(value) => Some(value),
            Outcome::NotFound(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Computed(value) => Outcome::Computed(f(value)),
            Outcome::NotFound(miss) => Outcome::NotFound(miss),
        }
    }
}

// ============================================================================
// Categories and Dispatch
// ============================================================================

/// Calculator categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Flooring,
    Painting,
    Masonry,
    Roofing,
    Drywall,
    Lighting,
    Concrete,
    Stairs,
    Ramps,
    Parking,
    Rainwater,
    Ventilation,
    Daylighting,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Flooring,
        Category::Painting,
        Category::Masonry,
        Category::Roofing,
        Category::Drywall,
        Category::Lighting,
        Category::Concrete,
        Category::Stairs,
        Category::Ramps,
        Category::Parking,
        Category::Rainwater,
        Category::Ventilation,
        Category::Daylighting,
    ];

    /// Stable key used for dispatch and persistence
    pub fn key(&self) -> &'static str {
        match self {
            Category::Flooring => "flooring",
            Category::Painting => "painting",
            Category::Masonry => "masonry",
            Category::Roofing => "roofing",
            Category::Drywall => "drywall",
            Category::Lighting => "lighting",
            Category::Concrete => "concrete",
            Category::Stairs => "stairs",
            Category::Ramps => "ramps",
            Category::Parking => "parking",
            Category::Rainwater => "rainwater",
            Category::Ventilation => "ventilation",
            Category::Daylighting => "daylighting",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Flooring => "Flooring",
            Category::Painting => "Painting",
            Category::Masonry => "Masonry",
            Category::Roofing => "Roofing",
            Category::Drywall => "Drywall",
            Category::Lighting => "Lighting",
            Category::Concrete => "Concrete",
            Category::Stairs => "Stairs",
            Category::Ramps => "Accessible ramps",
            Category::Parking => "Parking",
            Category::Rainwater => "Rainwater harvesting",
            Category::Ventilation => "Ventilation",
            Category::Daylighting => "Daylighting",
        }
    }

    /// Validation rules for this category's raw inputs
    pub fn rules(&self) -> Vec<ValidationRule> {
        match self {
            Category::Flooring => flooring::FlooringInput::rules(),
            Category::Painting => painting::PaintingInput::rules(),
            Category::Masonry => masonry::MasonryInput::rules(),
            Category::Roofing => roofing::RoofingInput::rules(),
            Category::Drywall => drywall::DrywallInput::rules(),
            Category::Lighting => lighting::LightingInput::rules(),
            Category::Concrete => concrete::ConcreteInput::rules(),
            Category::Stairs => stairs::StairsInput::rules(),
            Category::Ramps => ramps::RampInput::rules(),
            Category::Parking => parking::ParkingInput::rules(),
            Category::Rainwater => rainwater::RainwaterInput::rules(),
            Category::Ventilation => ventilation::VentilationInput::rules(),
            Category::Daylighting => daylighting::DaylightingInput::rules(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Result of any calculator, serialized as its flat result-key map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryResult {
    Flooring(flooring::FlooringResult),
    Painting(painting::PaintingResult),
    Masonry(masonry::MasonryResult),
    Roofing(roofing::RoofingResult),
    Drywall(drywall::DrywallResult),
    Lighting(lighting::LightingResult),
    Concrete(concrete::ConcreteResult),
    Stairs(stairs::StairsResult),
    Ramps(ramps::RampResult),
    Parking(parking::ParkingResult),
    Rainwater(rainwater::RainwaterResult),
    Ventilation(ventilation::VentilationResult),
    Daylighting(daylighting::DaylightingResult),
}

impl CategoryResult {
    pub fn category(&self) -> Category {
        match self {
            CategoryResult::Flooring(_) => Category::Flooring,
            CategoryResult::Painting(_) => Category::Painting,
            CategoryResult::Masonry(_) => Category::Masonry,
            CategoryResult::Roofing(_) => Category::Roofing,
            CategoryResult::Drywall(_) => Category::Drywall,
            CategoryResult::Lighting(_) => Category::Lighting,
            CategoryResult::Concrete(_) => Category::Concrete,
            CategoryResult::Stairs(_) => Category::Stairs,
            CategoryResult::Ramps(_) => Category::Ramps,
            CategoryResult::Parking(_) => Category::Parking,
            CategoryResult::Rainwater(_) => Category::Rainwater,
            CategoryResult::Ventilation(_) => Category::Ventilation,
            CategoryResult::Daylighting(_) => Category::Daylighting,
        }
    }

    /// Look up one entry by its result key
    pub fn get(&self, key: &str) -> Option<&ResultEntry> {
        self.entries().into_iter().find(|(k, _)| *k == key).map(|(_, e)| e)
    }
}

impl ResultEntries for CategoryResult {
    fn entries(&self) -> Vec<(&'static str, &ResultEntry)> {
        match self {
            CategoryResult::Flooring(r) => r.entries(),
            CategoryResult::Painting(r) => r.entries(),
            CategoryResult::Masonry(r) => r.entries(),
            CategoryResult::Roofing(r) => r.entries(),
            CategoryResult::Drywall(r) => r.entries(),
            CategoryResult::Lighting(r) => r.entries(),
            CategoryResult::Concrete(r) => r.entries(),
            CategoryResult::Stairs(r) => r.entries(),
            CategoryResult::Ramps(r) => r.entries(),
            CategoryResult::Parking(r) => r.entries(),
            CategoryResult::Rainwater(r) => r.entries(),
            CategoryResult::Ventilation(r) => r.entries(),
            CategoryResult::Daylighting(r) => r.entries(),
        }
    }
}

/// Uniform calculator signature over raw inputs
pub type CalculatorFn = fn(&Inputs) -> CalcResult<Outcome<CategoryResult>>;

fn flooring_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(flooring::calculate_inputs(inputs)?.map(CategoryResult::Flooring))
}

fn painting_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(painting::calculate_inputs(inputs)?.map(CategoryResult::Painting))
}

fn masonry_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(masonry::calculate_inputs(inputs)?.map(CategoryResult::Masonry))
}

fn roofing_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(roofing::calculate_inputs(inputs)?.map(CategoryResult::Roofing))
}

fn drywall_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(drywall::calculate_inputs(inputs)?.map(CategoryResult::Drywall))
}

fn lighting_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(lighting::calculate_inputs(inputs)?.map(CategoryResult::Lighting))
}

fn concrete_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(concrete::calculate_inputs(inputs)?.map(CategoryResult::Concrete))
}

fn stairs_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(stairs::calculate_inputs(inputs)?.map(CategoryResult::Stairs))
}

fn ramps_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(ramps::calculate_inputs(inputs)?.map(CategoryResult::Ramps))
}

fn parking_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(parking::calculate_inputs(inputs)?.map(CategoryResult::Parking))
}

fn rainwater_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(rainwater::calculate_inputs(inputs)?.map(CategoryResult::Rainwater))
}

fn ventilation_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(ventilation::calculate_inputs(inputs)?.map(CategoryResult::Ventilation))
}

fn daylighting_fn(inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
    Ok(daylighting::calculate_inputs(inputs)?.map(CategoryResult::Daylighting))
}

/// Dispatch table from category to calculator, built once.
#[derive(Debug, Clone)]
pub struct CalculatorRegistry {
    table: BTreeMap<Category, CalculatorFn>,
}

impl CalculatorRegistry {
    pub fn new() -> Self {
        let mut table: BTreeMap<Category, CalculatorFn> = BTreeMap::new();
        table.insert(Category::Flooring, flooring_fn);
        table.insert(Category::Painting, painting_fn);
        table.insert(Category::Masonry, masonry_fn);
        table.insert(Category::Roofing, roofing_fn);
        table.insert(Category::Drywall, drywall_fn);
        table.insert(Category::Lighting, lighting_fn);
        table.insert(Category::Concrete, concrete_fn);
        table.insert(Category::Stairs, stairs_fn);
        table.insert(Category::Ramps, ramps_fn);
        table.insert(Category::Parking, parking_fn);
        table.insert(Category::Rainwater, rainwater_fn);
        table.insert(Category::Ventilation, ventilation_fn);
        table.insert(Category::Daylighting, daylighting_fn);
        CalculatorRegistry { table }
    }

    /// Registered categories, in key order
    pub fn categories(&self) -> Vec<Category> {
        self.table.keys().copied().collect()
    }

    /// Run the calculator for a category.
    pub fn run(&self, category: Category, inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
        match self.table.get(&category) {
            Some(calculator) => {
                tracing::debug!(category = category.key(), "running calculator");
                calculator(inputs)
            }
            None => Ok(Outcome::not_found("category", category.key())),
        }
    }

    /// Run the calculator for a category key. Unknown keys answer
    /// `Outcome::NotFound` rather than falling back to any calculator.
    pub fn calculate(&self, key: &str, inputs: &Inputs) -> CalcResult<Outcome<CategoryResult>> {
        match Category::from_key(key) {
            Some(category) => self.run(category, inputs),
            None => Ok(Outcome::not_found("category", key)),
        }
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        CalculatorRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    #[test]
    fn test_registry_covers_every_category() {
        let registry = CalculatorRegistry::new();
        assert_eq!(registry.categories().len(), Category::ALL.len());
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        let registry = CalculatorRegistry::new();
        let outcome = registry.calculate("plumbing", &Inputs::new()).unwrap();
        assert_eq!(
            outcome,
            Outcome::NotFound(LookupMiss {
                error: "not found".into(),
                field: "category".into(),
                value: "plumbing".into(),
            })
        );
    }

    #[test]
    fn test_dispatch_validates_raw_inputs() {
        let registry = CalculatorRegistry::new();
        let inputs = Inputs::new().with("area", "twenty").with("brickType", "ceramic6holes");
        match registry.calculate("masonry", &inputs) {
            Err(CalcError::ValidationFailed { errors }) => {
                assert_eq!(errors, vec!["Wall area must be a valid number".to_string()])
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_lookup_miss_shape() {
        let registry = CalculatorRegistry::new();
        let inputs = Inputs::new().with("area", 20.0).with("brickType", "adobe");
        let outcome = registry.calculate("masonry", &inputs).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "not found");
        assert_eq!(json["field"], "brickType");
    }

    #[test]
    fn test_result_entry_serialization() {
        let entry = ResultEntry::primary(500.0, "un").highlighted();
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"value":500.0,"unit":"un","highlight":true,"category":"primary"}"#
        );
        let plain = ResultEntry::info("comfortable", "");
        assert_eq!(
            serde_json::to_string(&plain).unwrap(),
            r#"{"value":"comfortable","unit":"","category":"info"}"#
        );
    }

    #[test]
    fn test_group_by_category() {
        let registry = CalculatorRegistry::new();
        let inputs = Inputs::new().with("area", 20.0).with("brickType", "ceramic6holes");
        let result = registry.calculate("masonry", &inputs).unwrap().computed().unwrap();
        assert_eq!(result.category(), Category::Masonry);

        let groups = result.group_by_category();
        let first = groups.keys().next().copied();
        assert_eq!(first, Some(ResultCategory::Primary));
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, result.entries().len());
        assert!(groups[&ResultCategory::Primary].iter().any(|(k, _)| *k == "bricksNeeded"));
    }

    #[test]
    fn test_every_calculator_runs_on_minimal_inputs() {
        let registry = CalculatorRegistry::new();
        let cases: Vec<(&str, Inputs)> = vec![
            ("flooring", Inputs::new().with("roomLength", 5.0).with("roomWidth", 4.0)),
            ("painting", Inputs::new().with("wallLength", 5.0).with("wallHeight", 2.8)),
            ("masonry", Inputs::new().with("area", 20.0).with("brickType", "ceramic6holes")),
            ("roofing", Inputs::new().with("projectionArea", 100.0)),
            ("drywall", Inputs::new().with("wallLength", 4.0).with("wallHeight", 2.7)),
            ("lighting", Inputs::new().with("area", 20.0)),
            ("concrete", Inputs::new().with("length", 10.0).with("width", 5.0)),
            ("stairs", Inputs::new().with("totalHeight", 280.0).with("availableLength", 350.0)),
            ("ramps", Inputs::new().with("height", 0.6)),
            ("parking", Inputs::new().with("buildingArea", 1000.0)),
            ("rainwater", Inputs::new().with("roofArea", 100.0)),
            ("ventilation", Inputs::new().with("roomLength", 4.0).with("roomWidth", 3.0)),
            ("daylighting", Inputs::new().with("floorArea", 20.0)),
        ];
        for (key, inputs) in cases {
            let outcome = registry.calculate(key, &inputs).unwrap();
            let result = outcome.computed().unwrap_or_else(|| panic!("{} did not compute", key));
            assert_eq!(result.category().key(), key);
            assert!(result.entries().iter().any(|(_, e)| e.highlight), "{} has no highlight", key);
            for (name, entry) in result.entries() {
                if let Some(n) = entry.value.as_number() {
                    assert!(n.is_finite() && n >= 0.0, "{}.{} = {}", key, name, n);
                }
            }
        }
    }
}
