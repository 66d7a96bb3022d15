//! # Price Overrides
//!
//! Users can replace the catalog's default unit price of any composition line.
//! Overrides are keyed by `(material key, composition line index)` and are
//! persisted per user by the surrounding application (see
//! [`crate::file_io::save_user_settings`] for the local-file form).
//!
//! The engine only ever reads overrides through [`PriceLookup`], as a
//! point-in-time snapshot supplied by the caller.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::overrides::{PriceLookup, PriceOverrides};
//!
//! let mut overrides = PriceOverrides::new();
//! overrides.set("concrete", 0, 32.0).unwrap();
//!
//! assert_eq!(overrides.unit_price("concrete", 0), Some(32.0));
//! assert_eq!(overrides.unit_price("concrete", 1), None);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CompositionCategory, MaterialDefinition};
use crate::errors::{CalcError, CalcResult};

/// Read-only source of custom unit prices.
pub trait PriceLookup {
    /// Custom unit price for a composition line, or `None` to use the
    /// catalog default.
    fn unit_price(&self, material_key: &str, composition_index: usize) -> Option<f64>;
}

/// Lookup that never overrides anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl PriceLookup for NoOverrides {
    fn unit_price(&self, _material_key: &str, _composition_index: usize) -> Option<f64> {
        None
    }
}

/// A single persisted override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOverride {
    pub material_key: String,
    pub composition_index: usize,
    pub unit_price: f64,
}

/// In-memory override map: material key -> line index -> unit price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceOverrides(BTreeMap<String, BTreeMap<usize, f64>>);

impl PriceOverrides {
    pub fn new() -> Self {
        PriceOverrides(BTreeMap::new())
    }

    /// Build from a flat list of entries. Later entries win.
    pub fn from_entries(entries: impl IntoIterator<Item = PriceOverride>) -> CalcResult<Self> {
        let mut overrides = PriceOverrides::new();
        for entry in entries {
            overrides.set(entry.material_key, entry.composition_index, entry.unit_price)?;
        }
        Ok(overrides)
    }

    /// Set or replace the custom price of one composition line.
    pub fn set(&mut self, material_key: impl Into<String>, composition_index: usize, unit_price: f64) -> CalcResult<()> {
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(CalcError::invalid_input(
                "unitPrice",
                unit_price.to_string(),
                "Unit price must be a non-negative number",
            ));
        }
        self.0
            .entry(material_key.into())
            .or_default()
            .insert(composition_index, unit_price);
        Ok(())
    }

    /// Remove one override, returning the price it held.
    pub fn remove(&mut self, material_key: &str, composition_index: usize) -> Option<f64> {
        let lines = self.0.get_mut(material_key)?;
        let removed = lines.remove(&composition_index);
        if lines.is_empty() {
            self.0.remove(material_key);
        }
        removed
    }

    /// Remove every override of one material (revert to catalog prices).
    pub fn clear_material(&mut self, material_key: &str) {
        self.0.remove(material_key);
    }

    /// Number of overridden lines across all materials
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat list of entries, ordered by material key then line index
    pub fn entries(&self) -> Vec<PriceOverride> {
        self.0
            .iter()
            .flat_map(|(key, lines)| {
                lines.iter().map(move |(index, price)| PriceOverride {
                    material_key: key.clone(),
                    composition_index: *index,
                    unit_price: *price,
                })
            })
            .collect()
    }

    /// Drop overrides whose material or line no longer exists in the catalog.
    ///
    /// Returns the entries that were removed.
    pub fn prune(&mut self, catalog: &Catalog) -> Vec<PriceOverride> {
        let stale: Vec<PriceOverride> = self
            .entries()
            .into_iter()
            .filter(|entry| match catalog.find_material(&entry.material_key) {
                Some(material) => entry.composition_index >= material.compositions.len(),
                None => true,
            })
            .collect();
        for entry in &stale {
            tracing::warn!(
                material = %entry.material_key,
                index = entry.composition_index,
                "dropping stale price override"
            );
            self.remove(&entry.material_key, entry.composition_index);
        }
        stale
    }
}

impl PriceLookup for PriceOverrides {
    fn unit_price(&self, material_key: &str, composition_index: usize) -> Option<f64> {
        self.0.get(material_key)?.get(&composition_index).copied()
    }
}

impl<T: PriceLookup + ?Sized> PriceLookup for &T {
    fn unit_price(&self, material_key: &str, composition_index: usize) -> Option<f64> {
        (**self).unit_price(material_key, composition_index)
    }
}

/// Price of one composition line after merging defaults and overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePrice {
    pub composition_index: usize,
    pub name: String,
    pub unit: String,
    pub category: CompositionCategory,
    pub default_unit_price: f64,
    pub override_unit_price: Option<f64>,
    pub unit_price: f64,
}

/// Merge a material's default prices with the user's overrides, in catalog
/// order.
pub fn effective_prices(material: &MaterialDefinition, overrides: &dyn PriceLookup) -> Vec<EffectivePrice> {
    material
        .compositions
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let custom = overrides.unit_price(&material.key, i);
            EffectivePrice {
                composition_index: i,
                name: line.name.clone(),
                unit: line.unit.clone(),
                category: line.category,
                default_unit_price: line.default_unit_price,
                override_unit_price: custom,
                unit_price: custom.unwrap_or(line.default_unit_price),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_lookup() {
        let mut overrides = PriceOverrides::new();
        overrides.set("concrete", 0, 32.0).unwrap();
        overrides.set("concrete", 2, 100.0).unwrap();
        overrides.set("concrete", 0, 30.0).unwrap();

        assert_eq!(overrides.unit_price("concrete", 0), Some(30.0));
        assert_eq!(overrides.unit_price("concrete", 1), None);
        assert_eq!(overrides.unit_price("masonry", 0), None);
        assert_eq!(overrides.len(), 2);
    }

    #[test]
    fn test_rejects_negative_price() {
        let mut overrides = PriceOverrides::new();
        assert!(overrides.set("concrete", 0, -1.0).is_err());
        assert!(overrides.set("concrete", 0, f64::NAN).is_err());
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_remove_cleans_up_material() {
        let mut overrides = PriceOverrides::new();
        overrides.set("masonry", 1, 29.0).unwrap();
        assert_eq!(overrides.remove("masonry", 1), Some(29.0));
        assert_eq!(overrides.remove("masonry", 1), None);
        assert!(overrides.is_empty());
        assert_eq!(serde_json::to_string(&overrides).unwrap(), "{}");
    }

    #[test]
    fn test_entries_roundtrip() {
        let entries = vec![
            PriceOverride {
                material_key: "wall_painting".into(),
                composition_index: 0,
                unit_price: 22.5,
            },
            PriceOverride {
                material_key: "concrete".into(),
                composition_index: 1,
                unit_price: 130.0,
            },
        ];
        let overrides = PriceOverrides::from_entries(entries).unwrap();
        let flat = overrides.entries();
        assert_eq!(flat[0].material_key, "concrete");
        assert_eq!(flat[1].unit_price, 22.5);

        let json = serde_json::to_string(&overrides).unwrap();
        assert_eq!(json, r#"{"concrete":{"1":130.0},"wall_painting":{"0":22.5}}"#);
        let roundtrip: PriceOverrides = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, overrides);
    }

    #[test]
    fn test_prune_stale_entries() {
        let catalog = Catalog::builtin().unwrap();
        let mut overrides = PriceOverrides::new();
        overrides.set("concrete", 0, 30.0).unwrap();
        overrides.set("concrete", 99, 1.0).unwrap();
        overrides.set("marble", 0, 300.0).unwrap();

        let removed = overrides.prune(&catalog);
        assert_eq!(removed.len(), 2);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.unit_price("concrete", 0), Some(30.0));
    }

    #[test]
    fn test_effective_prices() {
        let catalog = Catalog::builtin().unwrap();
        let concrete = catalog.material("concrete").unwrap();
        let mut overrides = PriceOverrides::new();
        overrides.set("concrete", 1, 135.0).unwrap();

        let prices = effective_prices(concrete, &overrides);
        assert_eq!(prices.len(), concrete.compositions.len());
        assert_eq!(prices[0].unit_price, 28.0);
        assert_eq!(prices[0].override_unit_price, None);
        assert_eq!(prices[1].default_unit_price, 120.0);
        assert_eq!(prices[1].unit_price, 135.0);

        let defaults = effective_prices(concrete, &NoOverrides);
        assert!(defaults.iter().all(|p| p.unit_price == p.default_unit_price));
    }
}
