//! # Estimation Engine
//!
//! Turns a material selection plus raw inputs into an itemized bill of
//! materials, labor cost, overhead and per-unit price.
//!
//! ## Algorithm
//!
//! 1. Look up the [`MaterialDefinition`]
//! 2. Derive the base quantity from the inputs
//! 3. `adjusted = base × (1 + waste% / 100)`
//! 4. For each composition line `i`: `quantity = adjusted × rate` (3 dp),
//!    `unit price = override(material, i) ?? default`,
//!    `total = quantity × unit price` (2 dp)
//! 5. Material subtotal = sum of material + auxiliary line totals
//! 6. Labor = `adjusted / productivity × hours/day × hourly rate × complexity`
//! 7. Overhead over the direct subtotal, total, and cost per base unit
//!
//! Every line is rounded before it is summed.
//!
//! The engine is a pure function of its arguments. Callers validate first with
//! [`validate_request`]; [`estimate`] only re-checks that the base quantity is
//! positive so it never divides by zero.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::catalog::Catalog;
//! use estimate_core::estimate::{estimate, validate_request, EstimateRequest};
//! use estimate_core::overrides::NoOverrides;
//! use estimate_core::validation::Inputs;
//!
//! let catalog = Catalog::builtin().unwrap();
//! let request = EstimateRequest::new("concrete", Inputs::new().with("area", 50.0));
//!
//! assert!(validate_request(&catalog, &request).unwrap().ok);
//! let result = estimate(&catalog, &request, &NoOverrides).unwrap();
//! assert_eq!(result.line_items[0].quantity, 55.125);
//! assert_eq!(result.line_items[0].total, 1543.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CompositionCategory, MaterialDefinition};
use crate::complexity::ComplexityLevel;
use crate::errors::{CalcError, CalcResult};
use crate::overrides::PriceLookup;
use crate::units::{round_money, round_quantity};
use crate::validation::{validate, Inputs, ValidationResult};

/// Overhead (BDI) applied when a request does not specify one
pub const DEFAULT_OVERHEAD_PERCENTAGE: f64 = 20.0;

/// Complexity key applied when a request does not specify one
pub const DEFAULT_COMPLEXITY: &str = "simple";

/// Upper sanity bound on the base quantity, to catch unit mix-ups
pub const MAX_BASE_QUANTITY: f64 = 10_000.0;

fn default_overhead() -> f64 {
    DEFAULT_OVERHEAD_PERCENTAGE
}

fn default_complexity() -> String {
    DEFAULT_COMPLEXITY.to_string()
}

/// Everything the engine needs besides the catalog and the price overrides.
///
/// ## JSON Example
///
/// ```json
/// {
///   "materialKey": "concrete",
///   "inputs": { "area": 50.0, "thickness": 15.0, "concreteType": "fck25" },
///   "complexity": "simple",
///   "overheadPercentage": 20.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub material_key: String,
    #[serde(default)]
    pub inputs: Inputs,
    /// Complexity level key
    #[serde(default = "default_complexity")]
    pub complexity: String,
    #[serde(default = "default_overhead")]
    pub overhead_percentage: f64,
}

impl EstimateRequest {
    /// Request with the default complexity and overhead
    pub fn new(material_key: impl Into<String>, inputs: Inputs) -> Self {
        EstimateRequest {
            material_key: material_key.into(),
            inputs,
            complexity: default_complexity(),
            overhead_percentage: DEFAULT_OVERHEAD_PERCENTAGE,
        }
    }

    pub fn with_complexity(mut self, complexity: impl Into<String>) -> Self {
        self.complexity = complexity.into();
        self
    }

    pub fn with_overhead(mut self, overhead_percentage: f64) -> Self {
        self.overhead_percentage = overhead_percentage;
        self
    }
}

/// One priced composition line of an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub total: f64,
    pub category: CompositionCategory,
}

/// Complete, internally consistent estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    /// Material display name
    pub material: String,
    pub material_key: String,
    /// Base quantity before waste (area, volume or count)
    pub base_quantity: f64,
    pub base_unit: String,
    /// Base quantity including waste
    pub adjusted_quantity: f64,
    pub waste_percentage: f64,
    pub complexity_name: String,
    pub complexity_factor: f64,
    /// One entry per composition line, in catalog order
    pub line_items: Vec<LineItem>,
    pub material_subtotal: f64,
    pub labor_days: f64,
    pub labor_hours: f64,
    pub labor_subtotal: f64,
    pub subtotal: f64,
    pub overhead_percentage: f64,
    pub overhead_amount: f64,
    pub total_cost: f64,
    pub cost_per_base_unit: f64,
}

impl EstimationResult {
    /// Sum of the informational labor-category lines
    pub fn labor_lines_total(&self) -> f64 {
        round_money(
            self.line_items
                .iter()
                .filter(|l| l.category == CompositionCategory::Labor)
                .map(|l| l.total)
                .sum(),
        )
    }
}

/// Check a base quantity and overhead percentage against the sanity bounds.
///
/// Returns one message per violation; empty means the values are usable.
pub fn validate_estimation_inputs(base_quantity: f64, overhead_percentage: f64) -> Vec<String> {
    let mut errors = base_quantity_errors(base_quantity);
    if !(0.0..=100.0).contains(&overhead_percentage) {
        errors.push("Overhead percentage must be between 0 and 100".to_string());
    }
    errors
}

fn base_quantity_errors(base_quantity: f64) -> Vec<String> {
    if !(base_quantity > 0.0) {
        vec!["Base quantity must be greater than zero".to_string()]
    } else if base_quantity > MAX_BASE_QUANTITY {
        vec![format!("Base quantity must be at most {}", MAX_BASE_QUANTITY)]
    } else {
        Vec::new()
    }
}

/// Full pre-flight check of a request: the material's field rules, then the
/// derived base quantity and the overhead percentage.
///
/// Fails outright only for caller bugs (unknown material or complexity key);
/// user-input problems come back as messages in the [`ValidationResult`].
pub fn validate_request(catalog: &Catalog, request: &EstimateRequest) -> CalcResult<ValidationResult> {
    let material = catalog.material(&request.material_key)?;
    catalog.complexity(&request.complexity)?;

    let mut errors = validate(&request.inputs, &material.input_rules()).errors;
    if errors.is_empty() {
        errors.extend(base_quantity_errors(material.derive_base_quantity(&request.inputs)));
    }
    if !(0.0..=100.0).contains(&request.overhead_percentage) {
        errors.push("Overhead percentage must be between 0 and 100".to_string());
    }
    Ok(ValidationResult::from_errors(errors))
}

/// Compute an estimate.
///
/// # Errors
///
/// * `UnknownMaterial` - the material key is not in the catalog
/// * `UnknownComplexity` - the complexity key is not in the table
/// * `InvalidInput` - the derived base quantity is not positive
pub fn estimate(catalog: &Catalog, request: &EstimateRequest, overrides: &dyn PriceLookup) -> CalcResult<EstimationResult> {
    let material = catalog.material(&request.material_key)?;
    let complexity = catalog.complexity(&request.complexity)?;

    let base_quantity = material.derive_base_quantity(&request.inputs);
    if !(base_quantity > 0.0) || !base_quantity.is_finite() {
        return Err(CalcError::invalid_input(
            "baseQuantity",
            base_quantity.to_string(),
            "Base quantity must be greater than zero",
        ));
    }

    let result = compute(material, complexity, base_quantity, request.overhead_percentage, overrides);
    tracing::debug!(
        material = %result.material_key,
        base_quantity = result.base_quantity,
        total_cost = result.total_cost,
        "estimate computed"
    );
    Ok(result)
}

/// Validate a request and, if it passes, estimate it.
///
/// Convenience for callers that do not need to show messages before
/// computing; validation failures come back as `ValidationFailed`.
pub fn estimate_checked(
    catalog: &Catalog,
    request: &EstimateRequest,
    overrides: &dyn PriceLookup,
) -> CalcResult<EstimationResult> {
    validate_request(catalog, request)?.into_result()?;
    estimate(catalog, request, overrides)
}

fn compute(
    material: &MaterialDefinition,
    complexity: &ComplexityLevel,
    base_quantity: f64,
    overhead_percentage: f64,
    overrides: &dyn PriceLookup,
) -> EstimationResult {
    let adjusted_quantity = base_quantity * (1.0 + material.waste_percentage / 100.0);

    let line_items: Vec<LineItem> = material
        .compositions
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let quantity = round_quantity(adjusted_quantity * line.consumption_rate);
            let unit_price = overrides
                .unit_price(&material.key, i)
                .unwrap_or(line.default_unit_price);
            LineItem {
                name: line.name.clone(),
                quantity,
                unit: line.unit.clone(),
                unit_price,
                total: round_money(quantity * unit_price),
                category: line.category,
            }
        })
        .collect();

    let material_subtotal = round_money(
        line_items
            .iter()
            .filter(|l| l.category.counts_as_material())
            .map(|l| l.total)
            .sum(),
    );

    let labor_days = adjusted_quantity / material.labor_productivity;
    let labor_hours = labor_days * material.hours_per_day;
    let labor_subtotal = round_money(labor_hours * material.labor_hour_rate * complexity.factor);

    let subtotal = material_subtotal + labor_subtotal;
    let total_cost = round_money(subtotal * (1.0 + overhead_percentage / 100.0));
    let overhead_amount = round_money(total_cost - subtotal);

    EstimationResult {
        material: material.name.clone(),
        material_key: material.key.clone(),
        base_quantity: round_quantity(base_quantity),
        base_unit: material.base_unit.clone(),
        adjusted_quantity: round_quantity(adjusted_quantity),
        waste_percentage: material.waste_percentage,
        complexity_name: complexity.name.clone(),
        complexity_factor: complexity.factor,
        line_items,
        material_subtotal,
        labor_days: round_quantity(labor_days),
        labor_hours: round_quantity(labor_hours),
        labor_subtotal,
        subtotal,
        overhead_percentage,
        overhead_amount,
        total_cost,
        cost_per_base_unit: round_money(total_cost / base_quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{NoOverrides, PriceOverrides};

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    /// Concrete slab, 50 m² at the default 15 cm, fck25, simple, 20% overhead
    fn scenario_a() -> EstimateRequest {
        EstimateRequest::new(
            "concrete",
            Inputs::new().with("area", 50.0).with("concreteType", "fck25"),
        )
        .with_complexity("simple")
        .with_overhead(20.0)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.005
    }

    #[test]
    fn test_scenario_a_concrete_simple() {
        let result = estimate(&catalog(), &scenario_a(), &NoOverrides).unwrap();

        assert!(close(result.base_quantity, 7.5));
        assert!(close(result.adjusted_quantity, 7.875));

        let cement = &result.line_items[0];
        assert_eq!(cement.quantity, 55.125);
        assert_eq!(cement.unit_price, 28.0);
        assert_eq!(cement.total, 1543.5);

        // sand 4.41 × 120, gravel 6.615 × 110, vibrator 3.938 × 15
        assert!(close(result.line_items[1].total, 529.20));
        assert!(close(result.line_items[2].total, 727.65));
        assert!(close(result.line_items[3].total, 59.07));
        assert!(close(result.material_subtotal, 2859.42));

        assert_eq!(result.labor_days, 0.984);
        assert_eq!(result.labor_hours, 7.875);
        assert!(close(result.labor_subtotal, 189.00));

        assert!(close(result.subtotal, 3048.42));
        assert!(close(result.overhead_amount, 609.68));
        assert!(close(result.total_cost, 3658.10));
        assert!(close(result.cost_per_base_unit, 487.75));
        assert_eq!(result.complexity_name, "Simple");
    }

    #[test]
    fn test_scenario_b_complex_scales_labor_only() {
        let simple = estimate(&catalog(), &scenario_a(), &NoOverrides).unwrap();
        let complex = estimate(&catalog(), &scenario_a().with_complexity("complex"), &NoOverrides).unwrap();

        assert!(close(complex.labor_subtotal, simple.labor_subtotal * 1.8));
        assert_eq!(complex.material_subtotal, simple.material_subtotal);
        assert_eq!(complex.line_items, simple.line_items);
        assert_eq!(complex.complexity_factor, 1.8);
    }

    #[test]
    fn test_deterministic() {
        let mut overrides = PriceOverrides::new();
        overrides.set("concrete", 2, 101.37).unwrap();
        let request = scenario_a().with_complexity("medium").with_overhead(17.5);

        let first = estimate(&catalog(), &request, &overrides).unwrap();
        for _ in 0..10 {
            assert_eq!(estimate(&catalog(), &request, &overrides).unwrap(), first);
        }
    }

    #[test]
    fn test_every_material_is_non_negative_and_consistent() {
        let catalog = catalog();
        for material in catalog.list_materials() {
            for level in catalog.list_complexity_levels() {
                for overhead in [0.0, 12.5, 20.0, 100.0] {
                    let request = EstimateRequest::new(&material.key, Inputs::new().with("area", 37.3))
                        .with_complexity(&level.key)
                        .with_overhead(overhead);
                    assert!(validate_request(&catalog, &request).unwrap().ok);
                    let r = estimate(&catalog, &request, &NoOverrides).unwrap();

                    assert_eq!(r.line_items.len(), material.compositions.len());
                    for (item, line) in r.line_items.iter().zip(&material.compositions) {
                        assert_eq!(item.name, line.name);
                        assert!(item.quantity >= 0.0 && item.total >= 0.0 && item.unit_price >= 0.0);
                    }
                    for value in [
                        r.material_subtotal,
                        r.labor_subtotal,
                        r.subtotal,
                        r.overhead_amount,
                        r.total_cost,
                        r.cost_per_base_unit,
                    ] {
                        assert!(value >= 0.0 && value.is_finite(), "{} produced {}", material.key, value);
                    }

                    assert_eq!(r.subtotal, r.material_subtotal + r.labor_subtotal);
                    assert_eq!(r.total_cost, round_money(r.subtotal * (1.0 + overhead / 100.0)));
                    assert!(close(r.subtotal + r.overhead_amount, r.total_cost));
                }
            }
        }
    }

    #[test]
    fn test_override_precedence() {
        let catalog = catalog();
        let concrete = catalog.material("concrete").unwrap();
        let mut overrides = PriceOverrides::new();
        for i in 0..concrete.compositions.len() {
            overrides.set("concrete", i, 10.0 + i as f64).unwrap();
        }

        let result = estimate(&catalog, &scenario_a(), &overrides).unwrap();
        for (i, item) in result.line_items.iter().enumerate() {
            assert_eq!(item.unit_price, 10.0 + i as f64);
            assert_eq!(item.total, round_money(item.quantity * item.unit_price));
        }
    }

    #[test]
    fn test_overrides_for_other_materials_are_ignored() {
        let mut overrides = PriceOverrides::new();
        overrides.set("masonry", 0, 999.0).unwrap();
        let with = estimate(&catalog(), &scenario_a(), &overrides).unwrap();
        let without = estimate(&catalog(), &scenario_a(), &NoOverrides).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_waste_monotonicity() {
        let base = catalog();
        let mut previous: Option<EstimationResult> = None;
        for waste in [0.0, 5.0, 10.0, 25.0] {
            let mut concrete = base.material("concrete").unwrap().clone();
            concrete.waste_percentage = waste;
            let catalog = Catalog::new(vec![concrete], ComplexityLevel::defaults()).unwrap();
            let result = estimate(&catalog, &scenario_a(), &NoOverrides).unwrap();

            if let Some(prev) = &previous {
                for (now, before) in result.line_items.iter().zip(&prev.line_items) {
                    assert!(now.quantity > before.quantity);
                    assert!(now.total > before.total);
                }
            }
            previous = Some(result);
        }
    }

    #[test]
    fn test_zero_base_quantity_is_rejected() {
        let request = EstimateRequest::new("ceramic_flooring", Inputs::new().with("area", 0.0));
        let error = estimate(&catalog(), &request, &NoOverrides).unwrap_err();
        assert_eq!(error.error_code(), "INVALID_INPUT");

        let missing = EstimateRequest::new("ceramic_flooring", Inputs::new());
        assert!(matches!(
            estimate(&catalog(), &missing, &NoOverrides),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unknown_material_and_complexity() {
        let request = EstimateRequest::new("granite", Inputs::new().with("area", 10.0));
        assert_eq!(
            estimate(&catalog(), &request, &NoOverrides).unwrap_err(),
            CalcError::unknown_material("granite")
        );
        assert!(validate_request(&catalog(), &request).is_err());

        let request = scenario_a().with_complexity("heroic");
        assert_eq!(
            estimate(&catalog(), &request, &NoOverrides).unwrap_err(),
            CalcError::unknown_complexity("heroic")
        );
    }

    #[test]
    fn test_labor_lines_excluded_from_material_subtotal() {
        let result = estimate(&catalog(), &scenario_a(), &NoOverrides).unwrap();
        let laborer = result.line_items.last().unwrap();
        assert_eq!(laborer.category, CompositionCategory::Labor);
        assert!(close(laborer.total, 850.50));
        assert!(close(result.labor_lines_total(), 850.50));
        let summed: f64 = result.line_items[..4].iter().map(|l| l.total).sum();
        assert!(close(result.material_subtotal, summed));
    }

    #[test]
    fn test_lighting_estimate_uses_fixture_count() {
        let request = EstimateRequest::new("led_lighting", Inputs::new().with("area", 20.0));
        let result = estimate(&catalog(), &request, &NoOverrides).unwrap();
        assert_eq!(result.base_quantity, 9.0);
        assert_eq!(result.base_unit, "un");
        assert_eq!(result.line_items[0].quantity, 9.0);
    }

    #[test]
    fn test_validate_estimation_inputs() {
        assert!(validate_estimation_inputs(50.0, 20.0).is_empty());
        assert!(validate_estimation_inputs(10_000.0, 0.0).is_empty());
        assert_eq!(validate_estimation_inputs(0.0, 20.0).len(), 1);
        assert_eq!(validate_estimation_inputs(10_000.5, 20.0).len(), 1);
        assert_eq!(validate_estimation_inputs(-1.0, 150.0).len(), 2);
        assert_eq!(validate_estimation_inputs(f64::NAN, -0.1).len(), 2);
    }

    #[test]
    fn test_validate_request_collects_all_messages() {
        let request = EstimateRequest::new(
            "concrete",
            Inputs::new().with("area", "abc").with("concreteType", "fck90"),
        )
        .with_overhead(150.0);
        let result = validate_request(&catalog(), &request).unwrap();
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec![
                "Area must be a valid number".to_string(),
                "Concrete class has an unsupported option: fck90".to_string(),
                "Overhead percentage must be between 0 and 100".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_request_catches_derived_bound() {
        // Every field is in range, but the derived fixture count is not
        let request = EstimateRequest::new(
            "led_lighting",
            Inputs::new().with("area", 10_000.0).with("illuminance", 2000.0).with("fixtureWatts", 1.0),
        );
        let result = validate_request(&catalog(), &request).unwrap();
        assert_eq!(result.errors, vec!["Base quantity must be at most 10000".to_string()]);
    }

    #[test]
    fn test_estimate_checked() {
        let bad = EstimateRequest::new("ceramic_flooring", Inputs::new()).with_overhead(20.0);
        match estimate_checked(&catalog(), &bad, &NoOverrides) {
            Err(CalcError::ValidationFailed { errors }) => assert_eq!(errors, vec!["Area is required".to_string()]),
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert!(estimate_checked(&catalog(), &scenario_a(), &NoOverrides).is_ok());
    }

    #[test]
    fn test_result_wire_shape() {
        let result = estimate(&catalog(), &scenario_a(), &NoOverrides).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        for key in [
            "material",
            "baseQuantity",
            "complexityName",
            "lineItems",
            "materialSubtotal",
            "laborSubtotal",
            "subtotal",
            "overheadAmount",
            "totalCost",
            "costPerBaseUnit",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        let item = &json["lineItems"][0];
        for key in ["name", "quantity", "unit", "unitPrice", "total", "category"] {
            assert!(item.get(key).is_some(), "missing line item {}", key);
        }
        assert_eq!(item["category"], "material");

        let roundtrip: EstimationResult = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip, result);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: EstimateRequest =
            serde_json::from_str(r#"{"materialKey":"masonry","inputs":{"area":20}}"#).unwrap();
        assert_eq!(request.complexity, "simple");
        assert_eq!(request.overhead_percentage, 20.0);
        assert_eq!(request.inputs.number("area"), Some(20.0));
    }
}
