// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Survey stations.
//!
//! A station is a value type identified by its name: legs own their endpoint
//! stations, and "the same station" means case-insensitive name equality
//! within one series, never shared references. Cross-series identity is
//! expressed only through [`crate::SeriesLink`].

use crate::error::{Error, Result};

/// A fixed surface position for a station, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedPoint {
    pub easting: f64,
    pub northing: f64,
    pub altitude: f64,
}

/// A named survey station.
///
/// Names may encode hierarchy with `.` separators (e.g. `A.12`); the
/// full-path splitter uses [`Station::split_prefix`] to peel those apart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    name: String,
    fixed: Option<FixedPoint>,
    entrance: bool,
    anonymous: bool,
}

impl Station {
    /// Creates a station with the given name.
    ///
    /// Empty or whitespace-only names are rejected: a leg with an unnamed
    /// endpoint cannot be resolved by any later processing step.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyStationName);
        }
        Ok(Self {
            name,
            fixed: None,
            entrance: false,
            anonymous: false,
        })
    }

    /// Creates an anonymous station (a synthesized splay target).
    ///
    /// The name must still be unique within its series so the station can be
    /// indexed; writers may render anonymous stations as `-`.
    pub fn anonymous(name: impl Into<String>) -> Result<Self> {
        let mut station = Self::new(name)?;
        station.anonymous = true;
        Ok(station)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the station. Used for endpoint-name rewriting during series
    /// restructuring; the same emptiness rule as [`Station::new`] applies.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyStationName);
        }
        self.name = name;
        Ok(())
    }

    /// Case-insensitive name equality: the model's notion of identity.
    pub fn same_name(&self, other: &Station) -> bool {
        self.matches(&other.name)
    }

    /// Case-insensitive match against a raw name.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn fixed(&self) -> Option<FixedPoint> {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: Option<FixedPoint>) {
        self.fixed = fixed;
    }

    pub fn is_entrance(&self) -> bool {
        self.entrance
    }

    pub fn set_entrance(&mut self, entrance: bool) {
        self.entrance = entrance;
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Splits a dotted name into `(prefix, rest)` at the first `.`.
    ///
    /// Returns `None` for undotted names.
    pub fn split_prefix(&self) -> Option<(&str, &str)> {
        self.name.split_once('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_names() {
        assert!(Station::new("").is_err());
        assert!(Station::new("   ").is_err());
        let mut ok = Station::new("A1").unwrap();
        assert!(ok.set_name(" ").is_err());
        assert_eq!(ok.name(), "A1");
    }

    #[test]
    fn identity_is_case_insensitive() {
        let a = Station::new("Entrance.1").unwrap();
        let b = Station::new("entrance.1").unwrap();
        assert!(a.same_name(&b));
        assert!(a.matches("ENTRANCE.1"));
        assert!(!a.matches("entrance.2"));
    }

    #[test]
    fn prefix_splitting() {
        let s = Station::new("A.B.12").unwrap();
        assert_eq!(s.split_prefix(), Some(("A", "B.12")));
        let plain = Station::new("12").unwrap();
        assert_eq!(plain.split_prefix(), None);
    }
}
