// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement units and conversion for cave survey data.
//!
//! The model stores every quantity in a canonical unit (metres for lengths,
//! degrees for bearings and gradients) and converts on read/write. All
//! conversions are exact floating-point formulas; rounding happens only at
//! text-formatting boundaries in the writers.

/// Metres per international foot.
pub const METRES_PER_FOOT: f64 = 0.3048;

/// Metres per yard.
pub const METRES_PER_YARD: f64 = 0.9144;

/// Grads (gons) per full circle is 400, degrees is 360.
pub const GRADS_PER_DEGREE: f64 = 400.0 / 360.0;

/// Minutes of arc per degree.
pub const MINUTES_PER_DEGREE: f64 = 60.0;

/// Normalizes an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees % 360.0;
    if d < 0.0 {
        d + 360.0
    } else {
        d
    }
}

/// Units a length measurement can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthUnit {
    #[default]
    Metres,
    Feet,
    Yards,
}

impl LengthUnit {
    /// Converts a value in this unit to metres.
    #[inline]
    pub fn to_metres(self, value: f64) -> f64 {
        match self {
            LengthUnit::Metres => value,
            LengthUnit::Feet => value * METRES_PER_FOOT,
            LengthUnit::Yards => value * METRES_PER_YARD,
        }
    }

    /// Converts a value in metres to this unit.
    #[inline]
    pub fn from_metres(self, metres: f64) -> f64 {
        match self {
            LengthUnit::Metres => metres,
            LengthUnit::Feet => metres / METRES_PER_FOOT,
            LengthUnit::Yards => metres / METRES_PER_YARD,
        }
    }

    /// Parses a unit keyword as found in survey file headers.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "metres" | "meters" | "metric" | "m" => Some(LengthUnit::Metres),
            "feet" | "foot" | "ft" => Some(LengthUnit::Feet),
            "yards" | "yard" | "yd" => Some(LengthUnit::Yards),
            _ => None,
        }
    }
}

/// Units a compass bearing can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BearingUnit {
    #[default]
    Degrees,
    Grads,
    Minutes,
}

impl BearingUnit {
    /// Converts a bearing in this unit to degrees.
    #[inline]
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            BearingUnit::Degrees => value,
            BearingUnit::Grads => value / GRADS_PER_DEGREE,
            BearingUnit::Minutes => value / MINUTES_PER_DEGREE,
        }
    }

    /// Converts a bearing in degrees to this unit.
    #[inline]
    pub fn from_degrees(self, degrees: f64) -> f64 {
        match self {
            BearingUnit::Degrees => degrees,
            BearingUnit::Grads => degrees * GRADS_PER_DEGREE,
            BearingUnit::Minutes => degrees * MINUTES_PER_DEGREE,
        }
    }

    /// Parses a unit keyword as found in survey file headers.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "degrees" | "degs" | "deg" => Some(BearingUnit::Degrees),
            "grads" | "grades" | "mils" => Some(BearingUnit::Grads),
            "minutes" => Some(BearingUnit::Minutes),
            _ => None,
        }
    }
}

/// Units a gradient (inclination) can be expressed in.
///
/// Gradients are a distinct unit space from bearings: they additionally
/// support percent slope, computed as `tan(degrees) * 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradientUnit {
    #[default]
    Degrees,
    Grads,
    Minutes,
    Percent,
}

impl GradientUnit {
    /// Converts a gradient in this unit to degrees.
    #[inline]
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            GradientUnit::Degrees => value,
            GradientUnit::Grads => value / GRADS_PER_DEGREE,
            GradientUnit::Minutes => value / MINUTES_PER_DEGREE,
            GradientUnit::Percent => (value / 100.0).atan().to_degrees(),
        }
    }

    /// Converts a gradient in degrees to this unit.
    #[inline]
    pub fn from_degrees(self, degrees: f64) -> f64 {
        match self {
            GradientUnit::Degrees => degrees,
            GradientUnit::Grads => degrees * GRADS_PER_DEGREE,
            GradientUnit::Minutes => degrees * MINUTES_PER_DEGREE,
            GradientUnit::Percent => degrees.to_radians().tan() * 100.0,
        }
    }

    /// Parses a unit keyword as found in survey file headers.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "degrees" | "degs" | "deg" => Some(GradientUnit::Degrees),
            "grads" | "grades" | "mils" => Some(GradientUnit::Grads),
            "minutes" => Some(GradientUnit::Minutes),
            "percent" | "percentage" => Some(GradientUnit::Percent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn length_round_trips() {
        for unit in [LengthUnit::Metres, LengthUnit::Feet, LengthUnit::Yards] {
            for value in [0.0, 1.0, 12.345, 1609.344] {
                assert_relative_eq!(
                    unit.from_metres(unit.to_metres(value)),
                    value,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn bearing_round_trips() {
        for unit in [BearingUnit::Degrees, BearingUnit::Grads, BearingUnit::Minutes] {
            for value in [0.0, 90.0, 359.99] {
                assert_relative_eq!(
                    unit.from_degrees(unit.to_degrees(value)),
                    value,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn gradient_round_trips() {
        for unit in [
            GradientUnit::Degrees,
            GradientUnit::Grads,
            GradientUnit::Minutes,
            GradientUnit::Percent,
        ] {
            for value in [-80.0, -5.5, 0.0, 45.0, 80.0] {
                assert_relative_eq!(
                    unit.to_degrees(unit.from_degrees(value)),
                    value,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn percent_matches_tan() {
        assert_relative_eq!(GradientUnit::Percent.from_degrees(45.0), 100.0, epsilon = 1e-9);
        assert_relative_eq!(GradientUnit::Percent.to_degrees(100.0), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn known_conversions() {
        assert_relative_eq!(LengthUnit::Feet.to_metres(1.0), 0.3048);
        assert_relative_eq!(LengthUnit::Yards.to_metres(1.0), 0.9144);
        assert_relative_eq!(BearingUnit::Grads.from_degrees(360.0), 400.0, epsilon = 1e-9);
        assert_relative_eq!(BearingUnit::Minutes.from_degrees(1.0), 60.0);
    }

    #[test]
    fn normalize() {
        assert_relative_eq!(normalize_degrees(370.0), 10.0);
        assert_relative_eq!(normalize_degrees(-10.0), 350.0);
        assert_relative_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn keyword_parsing() {
        assert_eq!(LengthUnit::parse("Feet"), Some(LengthUnit::Feet));
        assert_eq!(BearingUnit::parse("grads"), Some(BearingUnit::Grads));
        assert_eq!(GradientUnit::parse("percent"), Some(GradientUnit::Percent));
        assert_eq!(LengthUnit::parse("cubits"), None);
    }
}
