//! # Units and Rounding
//!
//! Metric unit labels, a pair of length wrappers for the centimeter inputs
//! users type (slab thickness, stair heights), and the rounding policy every
//! estimate follows.
//!
//! ## Rounding Policy
//!
//! - Quantities round to 3 decimal places ([`round_quantity`])
//! - Monetary values round to 2 decimal places ([`round_money`])
//! - Each line is rounded before it is summed, never after
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{round_money, round_quantity, Centimeters, Meters};
//!
//! let thickness: Meters = Centimeters(15.0).into();
//! assert!((thickness.0 - 0.15).abs() < 1e-12);
//!
//! assert_eq!(round_quantity(3.9375), 3.938);
//! assert_eq!(round_money(1543.499), 1543.5);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Unit Labels
// ============================================================================

/// Square meters
pub const M2: &str = "m²";
/// Cubic meters
pub const M3: &str = "m³";
/// Linear meters
pub const M: &str = "m";
/// Centimeters
pub const CM: &str = "cm";
/// Units (pieces)
pub const UN: &str = "un";
/// Kilograms
pub const KG: &str = "kg";
/// Liters
pub const L: &str = "L";
/// 50 kg cement sacks
pub const SACK: &str = "sc";
/// Percent
pub const PERCENT: &str = "%";
/// Degrees
pub const DEG: &str = "°";
/// Lux
pub const LUX: &str = "lx";
/// Lumens
pub const LM: &str = "lm";
/// Watts
pub const W: &str = "W";
/// Watts per square meter
pub const W_PER_M2: &str = "W/m²";
/// Cubic meters per hour
pub const M3_PER_H: &str = "m³/h";
/// Working hours
pub const H: &str = "h";
/// Working days
pub const DAYS: &str = "days";

// ============================================================================
// Rounding
// ============================================================================

/// Round to a fixed number of decimal places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a quantity to 3 decimal places.
pub fn round_quantity(value: f64) -> f64 {
    round_to(value, 3)
}

/// Round a monetary value to 2 decimal places.
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Whole-unit count covering `value`, ignoring float noise below 1e-6
/// (so 11.000000000000002 boards is 11, not 12).
pub fn ceil_count(value: f64) -> f64 {
    round_to(value, 6).ceil()
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl Meters {
    /// Get the raw f64 value
    pub fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centimeters_to_meters() {
        let m: Meters = Centimeters(280.0).into();
        assert!((m.0 - 2.8).abs() < 1e-12);
        let cm: Centimeters = Meters(1.2).into();
        assert!((cm.0 - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_quantity(55.125), 55.125);
        assert_eq!(round_quantity(3.9375), 3.938);
        assert_eq!(round_money(196.875), 196.88);
        assert_eq!(round_money(-0.005), -0.01);
    }

    #[test]
    fn test_ceil_count_ignores_float_noise() {
        assert_eq!(ceil_count(21.6 * 1.1 / 2.16), 11.0);
        assert_eq!(ceil_count(61.11), 62.0);
        assert_eq!(ceil_count(500.0), 500.0);
    }
}
