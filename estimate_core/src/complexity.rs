//! # Complexity Levels
//!
//! Execution difficulty as a multiplier on labor time. The default table has
//! three levels; a catalog document may redefine them.

use serde::{Deserialize, Serialize};

/// One entry of the complexity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityLevel {
    /// Stable key used in requests (e.g. "simple")
    pub key: String,
    /// Display name
    pub name: String,
    /// Multiplier applied to labor cost
    pub factor: f64,
}

impl ComplexityLevel {
    pub fn new(key: impl Into<String>, name: impl Into<String>, factor: f64) -> Self {
        ComplexityLevel {
            key: key.into(),
            name: name.into(),
            factor,
        }
    }

    /// The standard three-level table: 1.0, 1.3, 1.8
    pub fn defaults() -> Vec<ComplexityLevel> {
        vec![
            ComplexityLevel::new("simple", "Simple", 1.0),
            ComplexityLevel::new("medium", "Medium", 1.3),
            ComplexityLevel::new("complex", "Complex", 1.8),
        ]
    }
}
