//! # estimate_core - Construction Cost and Material Estimation Engine
//!
//! `estimate_core` is the computational heart of Tally. It turns a material
//! selection plus measured inputs into an itemized bill of materials, labor
//! cost, overhead and per-unit price, and hosts a family of quick
//! per-category calculators (flooring, roofing, stairs, ...). All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: the catalog is an immutable value passed by reference;
//!   every calculation is a pure function of its arguments
//! - **JSON-First**: all types implement Serialize/Deserialize with the
//!   camelCase field names of the persisted wire shape
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::catalog::Catalog;
//! use estimate_core::estimate::{estimate, EstimateRequest};
//! use estimate_core::overrides::NoOverrides;
//! use estimate_core::validation::Inputs;
//!
//! let catalog = Catalog::builtin().unwrap();
//! let request = EstimateRequest::new("concrete", Inputs::new().with("area", 50.0));
//!
//! let result = estimate(&catalog, &request, &NoOverrides).unwrap();
//! assert_eq!(result.adjusted_quantity, 7.875);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Material definitions and complexity table, loaded from TOML
//! - [`estimate`] - The estimation engine
//! - [`calculators`] - Per-category calculators and their dispatch registry
//! - [`validation`] - Raw inputs, validation rules and sanitization
//! - [`overrides`] - User price overrides
//! - [`project`] - Project container for saved calculations
//! - [`file_io`] - Atomic saves and locking for projects and user settings
//! - [`units`] - Unit labels and the rounding policy
//! - [`errors`] - Structured error types

pub mod calculators;
pub mod catalog;
pub mod complexity;
pub mod errors;
pub mod estimate;
pub mod file_io;
pub mod overrides;
pub mod project;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculators::{CalculatorRegistry, Category, CategoryResult, LookupMiss, Outcome, ResultEntry};
pub use catalog::{Catalog, MaterialDefinition};
pub use complexity::ComplexityLevel;
pub use errors::{CalcError, CalcResult};
pub use estimate::{estimate, validate_request, EstimateRequest, EstimationResult};
pub use file_io::{load_project, load_user_settings, save_project, save_user_settings, FileLock, UserSettings};
pub use overrides::{NoOverrides, PriceLookup, PriceOverrides};
pub use project::{Project, ProjectMetadata, ProjectSettings};
pub use validation::{validate, Inputs, ValidationRule};
