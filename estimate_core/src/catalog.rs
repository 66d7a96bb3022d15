//! # Material Catalog
//!
//! The catalog is the fixed registry of [`MaterialDefinition`]s plus the
//! complexity table. It is built once at startup, either from the embedded
//! `data/catalog.toml` ([`Catalog::builtin`]) or from an application-supplied
//! TOML document ([`Catalog::from_toml_str`]), and is then shared by reference.
//! Nothing mutates it afterwards.
//!
//! ## Material Definitions
//!
//! Each definition declares:
//! - the input fields the UI collects (number or select)
//! - how the base quantity is derived from those inputs ([`BaseQuantityRule`])
//! - the composition lines: sub-items consumed per unit of base quantity
//! - labor productivity (base units per working day) and hourly rate
//! - a waste percentage added to the base quantity before expansion
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::catalog::Catalog;
//!
//! let catalog = Catalog::builtin().unwrap();
//! let concrete = catalog.material("concrete").unwrap();
//! assert_eq!(concrete.base_unit, "m³");
//! assert_eq!(catalog.list_complexity_levels().len(), 3);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::complexity::ComplexityLevel;
use crate::errors::{CalcError, CalcResult};
use crate::units::{ceil_count, Centimeters, Meters};
use crate::validation::{InputValue, Inputs, ValidationRule};

/// Embedded default catalog
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// Working hours per day when a definition does not say otherwise
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

fn default_hours_per_day() -> f64 {
    DEFAULT_HOURS_PER_DAY
}

// ============================================================================
// Input Fields
// ============================================================================

/// Kind of input widget a field needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Select,
}

/// One option of a select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Descriptor for one input the UI collects for a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<InputValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Display unit (e.g. "m²", "cm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl InputField {
    /// Numeric default, if the field has one
    pub fn default_number(&self) -> Option<f64> {
        self.default.as_ref().and_then(InputValue::as_number)
    }

    /// Validation rule equivalent to this descriptor
    pub fn rule(&self) -> ValidationRule {
        let mut rule = ValidationRule::new(&self.key).label(&self.label);
        if self.required {
            rule = rule.required();
        }
        match self.kind {
            FieldKind::Number => {
                if let Some(min) = self.min {
                    rule = rule.min(min);
                }
                if let Some(max) = self.max {
                    rule = rule.max(max);
                }
            }
            FieldKind::Select => {
                rule = rule.one_of(self.options.iter().map(|o| o.value.clone()));
            }
        }
        rule
    }
}

// ============================================================================
// Composition
// ============================================================================

/// How a composition line counts toward the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionCategory {
    /// Raw material, part of the material subtotal
    Material,
    /// Supplies and consumables, part of the material subtotal
    Auxiliary,
    /// Crew hours shown for reference; not part of the material subtotal
    Labor,
}

impl CompositionCategory {
    /// Whether line totals in this category sum into the material subtotal
    pub fn counts_as_material(&self) -> bool {
        matches!(self, CompositionCategory::Material | CompositionCategory::Auxiliary)
    }
}

/// One sub-item consumed per unit of base quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionLine {
    pub name: String,
    pub unit: String,
    /// Quantity of this item per unit of base quantity
    pub consumption_rate: f64,
    pub default_unit_price: f64,
    pub category: CompositionCategory,
}

// ============================================================================
// Base Quantity Rules
// ============================================================================

/// How the base quantity is derived from raw inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum BaseQuantityRule {
    /// Use one input directly (the `area` field unless configured otherwise)
    Field { field: String },
    /// Volume in m³ from an area in m² and a thickness in cm
    AreaTimesThickness {
        #[serde(rename = "areaField")]
        area_field: String,
        #[serde(rename = "thicknessField")]
        thickness_field: String,
    },
    /// Fixture count from the lumen method:
    /// `ceil(area × lux / (watts × lumensPerWatt × utilization × maintenance))`
    LightingFixtures {
        #[serde(rename = "areaField")]
        area_field: String,
        #[serde(rename = "illuminanceField")]
        illuminance_field: String,
        #[serde(rename = "wattsField")]
        watts_field: String,
        #[serde(rename = "lumensPerWatt")]
        lumens_per_watt: f64,
        #[serde(rename = "utilizationFactor")]
        utilization_factor: f64,
        #[serde(rename = "maintenanceFactor")]
        maintenance_factor: f64,
    },
}

impl Default for BaseQuantityRule {
    fn default() -> Self {
        BaseQuantityRule::Field {
            field: "area".to_string(),
        }
    }
}

// ============================================================================
// Material Definition
// ============================================================================

/// Static, catalog-owned description of one estimable material/service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDefinition {
    pub key: String,
    pub name: String,
    /// Unit of the base quantity (area or volume, or pieces)
    pub base_unit: String,
    #[serde(default)]
    pub input_fields: Vec<InputField>,
    pub compositions: Vec<CompositionLine>,
    /// Base units producible per working day
    pub labor_productivity: f64,
    /// Currency per hour
    pub labor_hour_rate: f64,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,
    pub waste_percentage: f64,
    #[serde(default)]
    pub base_quantity: BaseQuantityRule,
}

impl MaterialDefinition {
    /// Look up an input field descriptor by key
    pub fn field(&self, key: &str) -> Option<&InputField> {
        self.input_fields.iter().find(|f| f.key == key)
    }

    /// Sanitized numeric input, falling back to the field's declared default
    fn number_input(&self, inputs: &Inputs, key: &str) -> f64 {
        let default = self.field(key).and_then(InputField::default_number).unwrap_or(0.0);
        inputs.number_or(key, default)
    }

    /// Derive the base quantity (area, volume or count) from raw inputs.
    ///
    /// Returns 0 when the inputs cannot produce a quantity; the engine
    /// refuses to estimate from a non-positive base quantity.
    pub fn derive_base_quantity(&self, inputs: &Inputs) -> f64 {
        match &self.base_quantity {
            BaseQuantityRule::Field { field } => self.number_input(inputs, field),
            BaseQuantityRule::AreaTimesThickness {
                area_field,
                thickness_field,
            } => {
                let area = self.number_input(inputs, area_field);
                let thickness: Meters = Centimeters(self.number_input(inputs, thickness_field)).into();
                area * thickness.value()
            }
            BaseQuantityRule::LightingFixtures {
                area_field,
                illuminance_field,
                watts_field,
                lumens_per_watt,
                utilization_factor,
                maintenance_factor,
            } => {
                let area = self.number_input(inputs, area_field);
                let lux = self.number_input(inputs, illuminance_field);
                let watts = self.number_input(inputs, watts_field);
                let lumens_per_fixture = watts * lumens_per_watt * utilization_factor * maintenance_factor;
                if lumens_per_fixture <= 0.0 {
                    return 0.0;
                }
                ceil_count(area * lux / lumens_per_fixture)
            }
        }
    }

    /// Validation rules for this material's input fields, in field order
    pub fn input_rules(&self) -> Vec<ValidationRule> {
        self.input_fields.iter().map(InputField::rule).collect()
    }

    /// Check the definition for values the engine cannot compute with.
    fn check(&self) -> CalcResult<()> {
        let fail = |reason: String| Err(CalcError::catalog(format!("material '{}': {}", self.key, reason)));

        if self.compositions.is_empty() {
            return fail("has no composition lines".to_string());
        }
        if !(self.labor_productivity > 0.0) {
            return fail("labor productivity must be positive".to_string());
        }
        if !(self.hours_per_day > 0.0) {
            return fail("hours per day must be positive".to_string());
        }
        if !(self.labor_hour_rate >= 0.0) || !(self.waste_percentage >= 0.0) {
            return fail("labor rate and waste percentage must be non-negative".to_string());
        }
        for (i, line) in self.compositions.iter().enumerate() {
            if !(line.consumption_rate >= 0.0) || !(line.default_unit_price >= 0.0) {
                return fail(format!("composition line {} has a negative rate or price", i));
            }
        }
        for field in &self.input_fields {
            if field.kind == FieldKind::Select {
                if field.options.is_empty() {
                    return fail(format!("select field '{}' has no options", field.key));
                }
                if let Some(default) = &field.default {
                    let default = default.as_text();
                    if !field.options.iter().any(|o| o.value == default) {
                        return fail(format!("select field '{}' default '{}' is not an option", field.key, default));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// On-disk layout of a catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    complexity: Vec<ComplexityLevel>,
    #[serde(default)]
    material: Vec<MaterialDefinition>,
}

/// Immutable registry of materials and complexity levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    materials: Vec<MaterialDefinition>,
    complexity_levels: Vec<ComplexityLevel>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate keys and unusable definitions.
    ///
    /// An empty complexity list falls back to [`ComplexityLevel::defaults`].
    pub fn new(materials: Vec<MaterialDefinition>, complexity_levels: Vec<ComplexityLevel>) -> CalcResult<Self> {
        let complexity_levels = if complexity_levels.is_empty() {
            ComplexityLevel::defaults()
        } else {
            complexity_levels
        };

        let mut seen = HashSet::new();
        for material in &materials {
            if !seen.insert(material.key.as_str()) {
                return Err(CalcError::catalog(format!("duplicate material key '{}'", material.key)));
            }
            material.check()?;
        }

        let mut seen = HashSet::new();
        for level in &complexity_levels {
            if !seen.insert(level.key.as_str()) {
                return Err(CalcError::catalog(format!("duplicate complexity key '{}'", level.key)));
            }
            if !(level.factor > 0.0) {
                return Err(CalcError::catalog(format!("complexity '{}' factor must be positive", level.key)));
            }
        }

        Ok(Catalog {
            materials,
            complexity_levels,
        })
    }

    /// Parse a catalog from a TOML document
    pub fn from_toml_str(source: &str) -> CalcResult<Self> {
        let file: CatalogFile = toml::from_str(source).map_err(|e| CalcError::catalog(e.to_string()))?;
        let catalog = Catalog::new(file.material, file.complexity)?;
        tracing::debug!(
            materials = catalog.materials.len(),
            complexity_levels = catalog.complexity_levels.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> CalcResult<Self> {
        Catalog::from_toml_str(BUILTIN_CATALOG)
    }

    /// All materials, in catalog order
    pub fn list_materials(&self) -> &[MaterialDefinition] {
        &self.materials
    }

    /// All complexity levels, in table order
    pub fn list_complexity_levels(&self) -> &[ComplexityLevel] {
        &self.complexity_levels
    }

    /// Look up a material, or `None` if the key is unknown
    pub fn find_material(&self, key: &str) -> Option<&MaterialDefinition> {
        self.materials.iter().find(|m| m.key == key)
    }

    /// Look up a material, failing with `UnknownMaterial`
    pub fn material(&self, key: &str) -> CalcResult<&MaterialDefinition> {
        self.find_material(key).ok_or_else(|| CalcError::unknown_material(key))
    }

    /// Look up a complexity level, failing with `UnknownComplexity`
    pub fn complexity(&self, key: &str) -> CalcResult<&ComplexityLevel> {
        self.complexity_levels
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| CalcError::unknown_complexity(key))
    }
}
