//! # Input Validation
//!
//! Raw user inputs arrive as a flat map of field key to number-or-text
//! ([`Inputs`]). Before any calculation runs, the map is checked against a
//! list of [`ValidationRule`]s with [`validate`], which collects every
//! violation across every field and returns them as data.
//!
//! Per-field checks short-circuit in this order:
//!
//! 1. Missing or empty value: one "is required" error if the rule is required,
//!    and no further checks for that field either way
//! 2. Numeric coercion failure: one "must be a valid number" error, min/max
//!    skipped
//! 3. `min`, `max`, option set and custom predicate each add their own error
//!
//! [`sanitize`] is the defensive counterpart used by calculators right before
//! arithmetic: anything that is not a finite number becomes 0, then the value
//! is clamped to the floor.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::validation::{validate, Inputs, ValidationRule};
//!
//! let inputs = Inputs::new().with("area", 0.0).with("bdi", 150.0);
//! let rules = vec![
//!     ValidationRule::new("area").label("Area").required().min(0.01),
//!     ValidationRule::new("bdi").label("BDI").range(0.0, 100.0),
//! ];
//!
//! let result = validate(&inputs, &rules);
//! assert!(!result.ok);
//! assert_eq!(result.errors.len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Input Values
// ============================================================================

/// A single raw input value: either a number or free text (select options,
/// or numbers typed as text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    /// True for blank text. Numbers (including zero) are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            InputValue::Number(_) => false,
            InputValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Coerce to a finite number.
    ///
    /// Text accepts either `.` or `,` as the decimal separator.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            InputValue::Number(n) => *n,
            InputValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Text form of the value (numbers are formatted).
    pub fn as_text(&self) -> String {
        match self {
            InputValue::Number(n) => n.to_string(),
            InputValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Number(n)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

/// Raw inputs keyed by field key.
///
/// Ordered so serialized inputs are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, InputValue>);

impl Inputs {
    /// Create an empty input set
    pub fn new() -> Self {
        Inputs(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InputValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value for a key
    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.0.get(key)
    }

    /// Coerced number for a key; `None` when absent, blank or not numeric
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(InputValue::as_number)
    }

    /// Sanitized number for a key (floor 0), falling back to `default` when
    /// the key is absent or blank.
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(value) if !value.is_empty() => sanitize(value, 0.0),
            _ => sanitize_number(default, 0.0),
        }
    }

    /// Text for a key, falling back to `default` when absent or blank
    pub fn text_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(value) if !value.is_empty() => value.as_text(),
            _ => default.to_string(),
        }
    }

    /// Iterate over all entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.0.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no inputs are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<InputValue>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Inputs(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// Sanitization
// ============================================================================

/// Coerce a raw value to a number, treating anything non-numeric as 0 and
/// clamping the result to be at least `floor`.
pub fn sanitize(value: &InputValue, floor: f64) -> f64 {
    sanitize_number(value.as_number().unwrap_or(0.0), floor)
}

/// Numeric form of [`sanitize`] for already-typed fields.
pub fn sanitize_number(value: f64, floor: f64) -> f64 {
    let value = if value.is_finite() { value } else { 0.0 };
    value.max(floor)
}

// ============================================================================
// Rules
// ============================================================================

/// Custom check returning an error message, or `None` when the value passes.
pub type CustomCheck = Arc<dyn Fn(&InputValue) -> Option<String> + Send + Sync>;

/// Validation rule for a single field.
#[derive(Clone)]
pub struct ValidationRule {
    /// Input key the rule applies to
    pub field: String,
    /// Human-readable name used in messages
    pub label: String,
    pub required: bool,
    /// Whether the value must coerce to a number
    pub numeric: bool,
    /// Inclusive lower bound
    pub min: Option<f64>,
    /// Inclusive upper bound
    pub max: Option<f64>,
    /// Allowed values for select fields
    pub options: Option<Vec<String>>,
    pub custom: Option<CustomCheck>,
}

impl ValidationRule {
    /// New optional numeric rule; the label defaults to the field key.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        ValidationRule {
            label: field.clone(),
            field,
            required: false,
            numeric: true,
            min: None,
            max: None,
            options: None,
            custom: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as free text (no numeric coercion, no min/max)
    pub fn text(mut self) -> Self {
        self.numeric = false;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    /// Restrict a text field to a fixed option set
    pub fn one_of<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric = false;
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&InputValue) -> Option<String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Check one value against this rule, appending any violations.
    fn check(&self, value: Option<&InputValue>, errors: &mut Vec<String>) {
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                if self.required {
                    errors.push(format!("{} is required", self.label));
                }
                return;
            }
        };

        if self.numeric {
            let Some(number) = value.as_number() else {
                errors.push(format!("{} must be a valid number", self.label));
                return;
            };
            if let Some(min) = self.min {
                if number < min {
                    errors.push(format!("{} must be at least {}", self.label, min));
                }
            }
            if let Some(max) = self.max {
                if number > max {
                    errors.push(format!("{} must be at most {}", self.label, max));
                }
            }
        }

        if let Some(options) = &self.options {
            let text = value.as_text();
            if !options.iter().any(|o| *o == text) {
                errors.push(format!("{} has an unsupported option: {}", self.label, text));
            }
        }

        if let Some(check) = &self.custom {
            if let Some(message) = check(value) {
                errors.push(message);
            }
        }
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("field", &self.field)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("numeric", &self.numeric)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("options", &self.options)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Build from collected messages
    pub fn from_errors(errors: Vec<String>) -> Self {
        ValidationResult {
            ok: errors.is_empty(),
            errors,
        }
    }

    /// Convert into a `CalcResult`, failing with `ValidationFailed` if any
    /// rule was violated.
    pub fn into_result(self) -> CalcResult<()> {
        if self.ok {
            Ok(())
        } else {
            Err(CalcError::validation(self.errors))
        }
    }
}

/// Check `inputs` against every rule and collect all violations.
pub fn validate(inputs: &Inputs, rules: &[ValidationRule]) -> ValidationResult {
    let mut errors = Vec::new();
    for rule in rules {
        rule.check(inputs.get(&rule.field), &mut errors);
    }
    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_errors_across_fields() {
        // bdi out of range and area below its minimum must both be reported
        let inputs = Inputs::new().with("area", 0.0).with("bdi", 150.0);
        let rules = vec![
            ValidationRule::new("area").label("Area").required().min(0.01),
            ValidationRule::new("bdi").label("BDI").range(0.0, 100.0),
        ];

        let result = validate(&inputs, &rules);
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec!["Area must be at least 0.01".to_string(), "BDI must be at most 100".to_string()]
        );
    }

    #[test]
    fn test_required_short_circuits_field() {
        let rules = vec![ValidationRule::new("area")
            .label("Area")
            .required()
            .min(1.0)
            .custom(|_| Some("custom failed".to_string()))];

        let result = validate(&Inputs::new(), &rules);
        assert_eq!(result.errors, vec!["Area is required".to_string()]);

        let blank = Inputs::new().with("area", "   ");
        assert_eq!(validate(&blank, &rules).errors, vec!["Area is required".to_string()]);
    }

    #[test]
    fn test_missing_optional_field_is_skipped() {
        let rules = vec![ValidationRule::new("openings").min(0.0)];
        assert!(validate(&Inputs::new(), &rules).ok);
    }

    #[test]
    fn test_coercion_failure_skips_min_max() {
        let inputs = Inputs::new().with("area", "abc");
        let rules = vec![ValidationRule::new("area").label("Area").required().range(1.0, 10.0)];
        let result = validate(&inputs, &rules);
        assert_eq!(result.errors, vec!["Area must be a valid number".to_string()]);
    }

    #[test]
    fn test_min_and_custom_both_fire() {
        let inputs = Inputs::new().with("coats", 0.0);
        let rules = vec![ValidationRule::new("coats")
            .label("Coats")
            .min(1.0)
            .custom(|v| (v.as_number() != Some(2.0)).then(|| "Coats should be 2".to_string()))];
        let result = validate(&inputs, &rules);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_text_numbers_accept_comma_decimal() {
        let inputs = Inputs::new().with("area", "12,5");
        assert_eq!(inputs.number("area"), Some(12.5));
        let rules = vec![ValidationRule::new("area").required().max(12.0)];
        assert_eq!(validate(&inputs, &rules).errors.len(), 1);
    }

    #[test]
    fn test_option_set() {
        let rules = vec![ValidationRule::new("brickType")
            .label("Brick type")
            .one_of(["ceramic6holes", "concreteBlock"])];
        assert!(validate(&Inputs::new().with("brickType", "concreteBlock"), &rules).ok);
        let result = validate(&Inputs::new().with("brickType", "adobe"), &rules);
        assert_eq!(result.errors, vec!["Brick type has an unsupported option: adobe".to_string()]);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(&InputValue::from("abc"), 0.0), 0.0);
        assert_eq!(sanitize(&InputValue::from(-5.0), 0.0), 0.0);
        assert_eq!(sanitize(&InputValue::from(f64::NAN), 0.0), 0.0);
        assert_eq!(sanitize(&InputValue::from("7.5"), 0.0), 7.5);
        assert_eq!(sanitize(&InputValue::from(0.5), 1.0), 1.0);
        assert_eq!(sanitize_number(f64::INFINITY, 0.0), 0.0);
    }

    #[test]
    fn test_number_or_defaults() {
        let inputs = Inputs::new().with("area", 50.0).with("thickness", "");
        assert_eq!(inputs.number_or("area", 1.0), 50.0);
        assert_eq!(inputs.number_or("thickness", 15.0), 15.0);
        assert_eq!(inputs.number_or("missing", 8.0), 8.0);
        assert_eq!(inputs.text_or("concreteType", "fck25"), "fck25");
    }

    #[test]
    fn test_inputs_serialize_as_flat_map() {
        let inputs = Inputs::new().with("area", 50.0).with("concreteType", "fck25");
        let json = serde_json::to_string(&inputs).unwrap();
        assert_eq!(json, r#"{"area":50.0,"concreteType":"fck25"}"#);
        let roundtrip: Inputs = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, inputs);
    }

    #[test]
    fn test_into_result() {
        let failed = ValidationResult::from_errors(vec!["Area is required".into()]);
        assert!(matches!(failed.into_result(), Err(CalcError::ValidationFailed { .. })));
        assert!(ValidationResult::from_errors(vec![]).into_result().is_ok());
    }
}
