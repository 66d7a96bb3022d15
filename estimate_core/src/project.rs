//! # Project Data Structures
//!
//! The `Project` struct groups the calculations saved for one job.
//! Projects serialize to `.tly` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, name, client, timestamps)
//! ├── settings: ProjectSettings (default overhead, complexity, currency)
//! └── items: HashMap<Uuid, CalculationItem> (saved calculations)
//! ```
//!
//! Estimates are stored with a snapshot of their result, because the result
//! depends on catalog prices and overrides at the time it was made. Category
//! calculations are stored as raw inputs only and recomputed when opened.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::project::Project;
//!
//! let project = Project::new("Smith house", "Ana Smith", "J. Builder");
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("Smith house"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculators::{CalculatorRegistry, Category, CategoryResult, Outcome};
use crate::catalog::Catalog;
use crate::errors::CalcResult;
use crate::estimate::{estimate_checked, EstimateRequest, EstimationResult, DEFAULT_COMPLEXITY, DEFAULT_OVERHEAD_PERCENTAGE};
use crate::overrides::PriceLookup;
use crate::validation::Inputs;

/// Current schema version for .tly files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// Items are stored in a flat UUID-keyed map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub settings: ProjectSettings,
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use estimate_core::project::Project;
    ///
    /// let project = Project::new("Warehouse", "Client Corp", "Jane Doe");
    /// assert_eq!(project.meta.client, "Client Corp");
    /// ```
    pub fn new(name: impl Into<String>, client: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                client: client.into(),
                author: author.into(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a calculation item to the project.
    ///
    /// Returns the UUID assigned to the item.
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Run an estimate and store it with its result snapshot.
    ///
    /// Nothing is stored when validation or the estimate fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use estimate_core::catalog::Catalog;
    /// use estimate_core::estimate::EstimateRequest;
    /// use estimate_core::overrides::NoOverrides;
    /// use estimate_core::project::Project;
    /// use estimate_core::validation::Inputs;
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// let mut project = Project::new("Garage slab", "", "");
    /// let request = EstimateRequest::new("concrete", Inputs::new().with("area", 50.0));
    ///
    /// let id = project.add_estimate(&catalog, "Slab", request, &NoOverrides).unwrap();
    /// assert!(project.get_item(&id).unwrap().estimate_result().is_some());
    /// ```
    pub fn add_estimate(
        &mut self,
        catalog: &Catalog,
        label: impl Into<String>,
        request: EstimateRequest,
        overrides: &dyn PriceLookup,
    ) -> CalcResult<Uuid> {
        let result = estimate_checked(catalog, &request, overrides)?;
        Ok(self.add_item(CalculationItem::Estimate(EstimateRecord {
            label: label.into(),
            request,
            result,
        })))
    }

    /// Store a category calculation by its inputs.
    pub fn add_calculation(&mut self, label: impl Into<String>, category: Category, inputs: Inputs) -> Uuid {
        self.add_item(CalculationItem::Calculation(CalculationRecord {
            label: label.into(),
            category,
            inputs,
        }))
    }

    /// Start an estimate request using this project's defaults.
    pub fn new_request(&self, material_key: impl Into<String>, inputs: Inputs) -> EstimateRequest {
        EstimateRequest::new(material_key, inputs)
            .with_complexity(self.settings.default_complexity.clone())
            .with_overhead(self.settings.default_overhead_percentage)
    }

    /// Remove a calculation item by UUID.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Get a mutable reference to a calculation item by UUID.
    ///
    /// Marks the project as modified when the item exists.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items sorted by label, for stable listings
    pub fn sorted_items(&self) -> Vec<(&Uuid, &CalculationItem)> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|a, b| a.1.label().cmp(b.1.label()).then(a.0.cmp(b.0)));
        items
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub name: String,
    pub client: String,
    /// Who prepared the estimates
    pub author: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Defaults applied to new estimates in this project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub default_overhead_percentage: f64,
    pub default_complexity: String,
    /// ISO currency code, display only
    pub currency: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        ProjectSettings {
            default_overhead_percentage: DEFAULT_OVERHEAD_PERCENTAGE,
            default_complexity: DEFAULT_COMPLEXITY.to_string(),
            currency: "BRL".to_string(),
        }
    }
}

/// A saved estimate: the request and the result it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub label: String,
    pub request: EstimateRequest,
    pub result: EstimationResult,
}

/// A saved category calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub label: String,
    pub category: Category,
    pub inputs: Inputs,
}

impl CalculationRecord {
    /// Recompute the result from the stored inputs.
    pub fn result(&self, registry: &CalculatorRegistry) -> CalcResult<Outcome<CategoryResult>> {
        registry.run(self.category, &self.inputs)
    }
}

/// Any item stored in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    Estimate(EstimateRecord),
    Calculation(CalculationRecord),
}

impl CalculationItem {
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Estimate(e) => &e.label,
            CalculationItem::Calculation(c) => &c.label,
        }
    }

    /// Material name for estimates, category name for calculations
    pub fn calc_type(&self) -> &str {
        match self {
            CalculationItem::Estimate(e) => &e.result.material,
            CalculationItem::Calculation(c) => c.category.display_name(),
        }
    }

    pub fn estimate_result(&self) -> Option<&EstimationResult> {
        match self {
            CalculationItem::Estimate(e) => Some(&e.result),
            CalculationItem::Calculation(_) => None,
        }
    }
}
