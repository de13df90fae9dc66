// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Survey legs: directed measured shots between two stations.

use crate::station::Station;
use crate::units::{normalize_degrees, BearingUnit, GradientUnit, LengthUnit};

/// Left/Right/Up/Down corridor extents at a leg, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lrud {
    pub left: f64,
    pub right: f64,
    pub up: f64,
    pub down: f64,
}

impl Lrud {
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.up == 0.0 && self.down == 0.0
    }
}

/// Leg classification flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegFlags {
    /// Radial wall shot, not part of the survey network.
    pub splay: bool,
    /// Measured on the surface rather than underground.
    pub surface: bool,
    /// Duplicate of another measured shot; excluded from length totals.
    pub duplicate: bool,
}

/// A directed measured shot from one station to another.
///
/// Measurements are stored canonically (metres / degrees / degrees) and
/// converted on read. A zero-length leg represents an equate between its two
/// endpoint stations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    from: Station,
    to: Station,
    length: f64,
    bearing: f64,
    gradient: f64,
    lrud: Lrud,
    flags: LegFlags,
}

impl Leg {
    /// Creates a leg from canonical-unit measurements (metres, degrees).
    pub fn new(from: Station, to: Station, length: f64, bearing: f64, gradient: f64) -> Self {
        Self {
            from,
            to,
            length,
            bearing: normalize_degrees(bearing),
            gradient,
            lrud: Lrud::default(),
            flags: LegFlags::default(),
        }
    }

    /// Creates a leg from measurements in the given units.
    pub fn with_units(
        from: Station,
        to: Station,
        length: f64,
        length_unit: LengthUnit,
        bearing: f64,
        bearing_unit: BearingUnit,
        gradient: f64,
        gradient_unit: GradientUnit,
    ) -> Self {
        Self::new(
            from,
            to,
            length_unit.to_metres(length),
            bearing_unit.to_degrees(bearing),
            gradient_unit.to_degrees(gradient),
        )
    }

    /// Creates a zero-length leg asserting the two stations are the same
    /// physical point.
    pub fn equate(from: Station, to: Station) -> Self {
        Self::new(from, to, 0.0, 0.0, 0.0)
    }

    pub fn from(&self) -> &Station {
        &self.from
    }

    pub fn from_mut(&mut self) -> &mut Station {
        &mut self.from
    }

    pub fn to(&self) -> &Station {
        &self.to
    }

    pub fn to_mut(&mut self) -> &mut Station {
        &mut self.to
    }

    /// Length in metres.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn length_in(&self, unit: LengthUnit) -> f64 {
        unit.from_metres(self.length)
    }

    /// Bearing in degrees, normalized to `[0, 360)`.
    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn bearing_in(&self, unit: BearingUnit) -> f64 {
        unit.from_degrees(self.bearing)
    }

    /// Gradient in degrees, negative pointing down.
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    pub fn gradient_in(&self, unit: GradientUnit) -> f64 {
        unit.from_degrees(self.gradient)
    }

    pub fn lrud(&self) -> Lrud {
        self.lrud
    }

    pub fn set_lrud(&mut self, lrud: Lrud) {
        self.lrud = lrud;
    }

    pub fn flags(&self) -> LegFlags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut LegFlags {
        &mut self.flags
    }

    pub fn set_flags(&mut self, flags: LegFlags) {
        self.flags = flags;
    }

    pub fn is_splay(&self) -> bool {
        self.flags.splay
    }

    /// A zero-length leg stands for an equate between its endpoints.
    pub fn is_zero_length(&self) -> bool {
        self.length.abs() < 1e-12
    }

    /// True when either endpoint matches the given station name.
    pub fn touches(&self, name: &str) -> bool {
        self.from.matches(name) || self.to.matches(name)
    }

    /// The same physical shot measured in the opposite direction: endpoints
    /// swapped, bearing flipped by 180°, gradient negated, left/right
    /// extents exchanged.
    pub fn reversed(&self) -> Leg {
        Leg {
            from: self.to.clone(),
            to: self.from.clone(),
            length: self.length,
            bearing: normalize_degrees(self.bearing + 180.0),
            gradient: -self.gradient,
            lrud: Lrud {
                left: self.lrud.right,
                right: self.lrud.left,
                up: self.lrud.up,
                down: self.lrud.down,
            },
            flags: self.flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn leg(from: &str, to: &str, length: f64, bearing: f64, gradient: f64) -> Leg {
        Leg::new(
            Station::new(from).unwrap(),
            Station::new(to).unwrap(),
            length,
            bearing,
            gradient,
        )
    }

    #[test]
    fn reversal_flips_direction() {
        let mut l = leg("a", "b", 10.0, 30.0, -5.0);
        l.set_lrud(Lrud {
            left: 1.0,
            right: 2.0,
            up: 0.5,
            down: 0.25,
        });
        let r = l.reversed();
        assert_eq!(r.from().name(), "b");
        assert_eq!(r.to().name(), "a");
        assert_relative_eq!(r.bearing(), 210.0);
        assert_relative_eq!(r.gradient(), 5.0);
        assert_relative_eq!(r.lrud().left, 2.0);
        assert_relative_eq!(r.lrud().right, 1.0);
        assert_relative_eq!(r.length(), 10.0);
    }

    #[test]
    fn reversal_is_involutive() {
        let l = leg("a", "b", 10.0, 350.0, 12.0);
        assert_eq!(l.reversed().reversed(), l);
    }

    #[test]
    fn unit_construction() {
        let l = Leg::with_units(
            Station::new("a").unwrap(),
            Station::new("b").unwrap(),
            10.0,
            LengthUnit::Feet,
            200.0,
            BearingUnit::Grads,
            100.0,
            GradientUnit::Percent,
        );
        assert_relative_eq!(l.length(), 3.048, epsilon = 1e-9);
        assert_relative_eq!(l.bearing(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(l.gradient(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(l.length_in(LengthUnit::Feet), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn equate_is_zero_length() {
        let e = Leg::equate(Station::new("a").unwrap(), Station::new("b").unwrap());
        assert!(e.is_zero_length());
        assert!(e.touches("A"));
        assert!(e.touches("b"));
        assert!(!e.touches("c"));
    }
}
