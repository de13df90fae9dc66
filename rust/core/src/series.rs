// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Survey series: named groupings of legs with nesting and links.
//!
//! A series owns an ordered sequence of legs, a set of child series
//! (containment is exclusive ownership, so the containment tree is acyclic
//! by construction), and the links that equate stations across series.
//! Physical connectivity — shared station names plus links — may contain
//! loops; the containment tree never does.

use crate::error::{Error, Result};
use crate::leg::Leg;
use crate::station::Station;
use crate::units::{BearingUnit, GradientUnit, LengthUnit};

/// Instrument calibration offsets for a series.
///
/// Offsets are subtracted from raw readings by convention; declination is
/// added to bearings. Values are in the series' default units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    pub tape: f64,
    pub compass: f64,
    pub clino: f64,
    pub declination: f64,
}

/// An assertion that two (series, station) pairs are the same physical
/// point.
///
/// A link lives in the nearest common ancestor of the two series it names
/// (or in the series itself when both stations are local). Series names in a
/// link are dotted paths relative to the owning series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesLink {
    series1: String,
    station1: Station,
    series2: String,
    station2: Station,
}

impl SeriesLink {
    pub fn new(
        series1: impl Into<String>,
        station1: Station,
        series2: impl Into<String>,
        station2: Station,
    ) -> Self {
        Self {
            series1: series1.into(),
            station1,
            series2: series2.into(),
            station2,
        }
    }

    pub fn series1(&self) -> &str {
        &self.series1
    }

    pub fn station1(&self) -> &Station {
        &self.station1
    }

    pub fn series2(&self) -> &str {
        &self.series2
    }

    pub fn station2(&self) -> &Station {
        &self.station2
    }

    /// Value equality ignoring case, used to deduplicate links. Links are
    /// undirected: `(a, b)` equals `(b, a)`.
    pub fn same_as(&self, other: &SeriesLink) -> bool {
        let fwd = self.series1.eq_ignore_ascii_case(&other.series1)
            && self.series2.eq_ignore_ascii_case(&other.series2)
            && self.station1.same_name(&other.station1)
            && self.station2.same_name(&other.station2);
        let rev = self.series1.eq_ignore_ascii_case(&other.series2)
            && self.series2.eq_ignore_ascii_case(&other.series1)
            && self.station1.same_name(&other.station2)
            && self.station2.same_name(&other.station1);
        fwd || rev
    }

    /// Rewrites series-name references after a tree reorganization.
    pub fn rewrite_series_name(&mut self, old: &str, new: &str) {
        if self.series1.eq_ignore_ascii_case(old) {
            self.series1 = new.to_string();
        }
        if self.series2.eq_ignore_ascii_case(old) {
            self.series2 = new.to_string();
        }
    }
}

/// A named series of survey legs, possibly containing nested series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    name: String,
    legs: Vec<Leg>,
    inner: Vec<Series>,
    links: Vec<SeriesLink>,
    calibration: Calibration,
    length_unit: LengthUnit,
    bearing_unit: BearingUnit,
    gradient_unit: GradientUnit,
    date: Option<String>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            legs: Vec::new(),
            inner: Vec::new(),
            links: Vec::new(),
            calibration: Calibration::default(),
            length_unit: LengthUnit::default(),
            bearing_unit: BearingUnit::default(),
            gradient_unit: GradientUnit::default(),
            date: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // --- Legs ---

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn legs_mut(&mut self) -> &mut [Leg] {
        &mut self.legs
    }

    pub fn leg(&self, index: usize) -> Option<&Leg> {
        self.legs.get(index)
    }

    pub fn leg_mut(&mut self, index: usize) -> Option<&mut Leg> {
        self.legs.get_mut(index)
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    pub fn add_leg(&mut self, leg: Leg) {
        self.legs.push(leg);
    }

    pub fn insert_leg(&mut self, index: usize, leg: Leg) -> Result<()> {
        if index > self.legs.len() {
            return Err(Error::LegIndexOutOfRange {
                index,
                count: self.legs.len(),
            });
        }
        self.legs.insert(index, leg);
        Ok(())
    }

    pub fn remove_leg(&mut self, index: usize) -> Result<Leg> {
        if index >= self.legs.len() {
            return Err(Error::LegIndexOutOfRange {
                index,
                count: self.legs.len(),
            });
        }
        Ok(self.legs.remove(index))
    }

    /// Drains all direct legs, leaving the series empty. Used by the
    /// restructuring algorithms before redistributing legs.
    pub fn take_legs(&mut self) -> Vec<Leg> {
        std::mem::take(&mut self.legs)
    }

    /// Replaces the direct leg list wholesale.
    pub fn set_legs(&mut self, legs: Vec<Leg>) {
        self.legs = legs;
    }

    pub fn retain_legs(&mut self, keep: impl FnMut(&Leg) -> bool) {
        self.legs.retain(keep);
    }

    // --- Inner series ---

    pub fn inner_series(&self) -> &[Series] {
        &self.inner
    }

    pub fn inner_series_mut(&mut self) -> &mut [Series] {
        &mut self.inner
    }

    pub fn inner_series_at(&self, index: usize) -> Option<&Series> {
        self.inner.get(index)
    }

    pub fn inner_series_at_mut(&mut self, index: usize) -> Option<&mut Series> {
        self.inner.get_mut(index)
    }

    pub fn inner_series_count(&self) -> usize {
        self.inner.len()
    }

    pub fn add_inner_series(&mut self, series: Series) {
        self.inner.push(series);
    }

    pub fn remove_inner_series(&mut self, index: usize) -> Result<Series> {
        if index >= self.inner.len() {
            return Err(Error::SeriesIndexOutOfRange {
                index,
                count: self.inner.len(),
            });
        }
        Ok(self.inner.remove(index))
    }

    /// Resolves a child series' index by case-insensitive name, for
    /// structural editing.
    pub fn index_of_child(&self, name: &str) -> Option<usize> {
        self.inner
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    // --- Links ---

    pub fn links(&self) -> &[SeriesLink] {
        &self.links
    }

    /// Adds a link unless an equal-valued one is already present.
    ///
    /// Deduplication keeps repeated restructuring idempotent.
    pub fn add_link(&mut self, link: SeriesLink) {
        if !self.links.iter().any(|l| l.same_as(&link)) {
            self.links.push(link);
        }
    }

    pub fn rewrite_link_series_name(&mut self, old: &str, new: &str) {
        for link in &mut self.links {
            link.rewrite_series_name(old, new);
        }
    }

    // --- Metadata ---

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn calibration_mut(&mut self) -> &mut Calibration {
        &mut self.calibration
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
    }

    pub fn length_unit(&self) -> LengthUnit {
        self.length_unit
    }

    pub fn bearing_unit(&self) -> BearingUnit {
        self.bearing_unit
    }

    pub fn gradient_unit(&self) -> GradientUnit {
        self.gradient_unit
    }

    pub fn set_units(
        &mut self,
        length: LengthUnit,
        bearing: BearingUnit,
        gradient: GradientUnit,
    ) {
        self.length_unit = length;
        self.bearing_unit = bearing;
        self.gradient_unit = gradient;
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn set_date(&mut self, date: Option<String>) {
        self.date = date;
    }

    /// Copies calibration, default units and date onto a child created
    /// during restructuring.
    pub fn new_child_with_metadata(&self, name: impl Into<String>) -> Series {
        let mut child = Series::new(name);
        child.calibration = self.calibration;
        child.length_unit = self.length_unit;
        child.bearing_unit = self.bearing_unit;
        child.gradient_unit = self.gradient_unit;
        child.date = self.date.clone();
        child
    }

    // --- Aggregates ---

    /// Total leg count of this series and every descendant.
    pub fn total_leg_count(&self) -> usize {
        self.legs.len() + self.inner.iter().map(Series::total_leg_count).sum::<usize>()
    }

    /// Total inner-series count including nested descendants.
    pub fn total_series_count(&self) -> usize {
        self.inner.len() + self.inner.iter().map(Series::total_series_count).sum::<usize>()
    }

    /// Total link count of this series and every descendant.
    pub fn total_link_count(&self) -> usize {
        self.links.len() + self.inner.iter().map(Series::total_link_count).sum::<usize>()
    }

    /// Finds a station by name in this series' direct legs.
    pub fn find_station(&self, name: &str) -> Option<&Station> {
        self.legs.iter().find_map(|leg| {
            if leg.from().matches(name) {
                Some(leg.from())
            } else if leg.to().matches(name) {
                Some(leg.to())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(from: &str, to: &str) -> Leg {
        Leg::new(
            Station::new(from).unwrap(),
            Station::new(to).unwrap(),
            1.0,
            0.0,
            0.0,
        )
    }

    #[test]
    fn leg_editing_by_index() {
        let mut s = Series::new("test");
        s.add_leg(leg("1", "2"));
        s.add_leg(leg("2", "3"));
        s.insert_leg(1, leg("1a", "1b")).unwrap();
        assert_eq!(s.leg_count(), 3);
        assert_eq!(s.leg(1).unwrap().from().name(), "1a");
        let removed = s.remove_leg(1).unwrap();
        assert_eq!(removed.to().name(), "1b");
        assert_eq!(s.leg_count(), 2);
        assert!(s.remove_leg(5).is_err());
        assert!(s.insert_leg(7, leg("x", "y")).is_err());
    }

    #[test]
    fn child_lookup_is_case_insensitive() {
        let mut s = Series::new("cave");
        s.add_inner_series(Series::new("Entrance"));
        s.add_inner_series(Series::new("Sump"));
        assert_eq!(s.index_of_child("entrance"), Some(0));
        assert_eq!(s.index_of_child("SUMP"), Some(1));
        assert_eq!(s.index_of_child("nowhere"), None);
    }

    #[test]
    fn link_dedup() {
        let mut s = Series::new("cave");
        let link = SeriesLink::new(
            "a",
            Station::new("1").unwrap(),
            "b",
            Station::new("2").unwrap(),
        );
        let mirrored = SeriesLink::new(
            "B",
            Station::new("2").unwrap(),
            "A",
            Station::new("1").unwrap(),
        );
        s.add_link(link.clone());
        s.add_link(link);
        s.add_link(mirrored);
        assert_eq!(s.links().len(), 1);
    }

    #[test]
    fn totals_recurse() {
        let mut root = Series::new("root");
        root.add_leg(leg("1", "2"));
        let mut child = Series::new("child");
        child.add_leg(leg("a", "b"));
        child.add_leg(leg("b", "c"));
        let mut grandchild = Series::new("grandchild");
        grandchild.add_leg(leg("x", "y"));
        child.add_inner_series(grandchild);
        root.add_inner_series(child);
        assert_eq!(root.total_leg_count(), 4);
        assert_eq!(root.total_series_count(), 2);
    }

    #[test]
    fn link_rewrite() {
        let mut link = SeriesLink::new(
            "old",
            Station::new("1").unwrap(),
            "other",
            Station::new("2").unwrap(),
        );
        link.rewrite_series_name("OLD", "new");
        assert_eq!(link.series1(), "new");
        assert_eq!(link.series2(), "other");
    }
}
