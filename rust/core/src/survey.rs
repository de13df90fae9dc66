// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The survey: root of the containment tree.

use crate::error::{Error, Result};
use crate::series::Series;

/// An ordered collection of top-level series.
///
/// Every structural mutation (including handing out a mutable series
/// reference) bumps a monotonic revision counter. Presentation layers poll
/// [`Survey::revision`] to notice structural change; the model itself keeps
/// no subscriber list.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Survey {
    series: Vec<Series>,
    #[cfg_attr(feature = "serde", serde(skip))]
    revision: u64,
}

impl Survey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_at(&self, index: usize) -> Option<&Series> {
        self.series.get(index)
    }

    /// Mutable access to a top-level series. Counts as a structural change.
    pub fn series_at_mut(&mut self, index: usize) -> Option<&mut Series> {
        self.revision += 1;
        self.series.get_mut(index)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn add_series(&mut self, series: Series) {
        self.revision += 1;
        self.series.push(series);
    }

    pub fn insert_series(&mut self, index: usize, series: Series) -> Result<()> {
        if index > self.series.len() {
            return Err(Error::SeriesIndexOutOfRange {
                index,
                count: self.series.len(),
            });
        }
        self.revision += 1;
        self.series.insert(index, series);
        Ok(())
    }

    pub fn remove_series(&mut self, index: usize) -> Result<Series> {
        if index >= self.series.len() {
            return Err(Error::SeriesIndexOutOfRange {
                index,
                count: self.series.len(),
            });
        }
        self.revision += 1;
        Ok(self.series.remove(index))
    }

    /// Mutable iteration over top-level series. Counts as a structural
    /// change.
    pub fn series_iter_mut(&mut self) -> impl Iterator<Item = &mut Series> {
        self.revision += 1;
        self.series.iter_mut()
    }

    /// Monotonic structural-change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total leg count across all series and their descendants.
    pub fn total_leg_count(&self) -> usize {
        self.series.iter().map(Series::total_leg_count).sum()
    }

    /// Total series count including all nesting levels.
    pub fn total_series_count(&self) -> usize {
        self.series.len() + self.series.iter().map(Series::total_series_count).sum::<usize>()
    }

    /// Total link count across all series and their descendants.
    pub fn total_link_count(&self) -> usize {
        self.series.iter().map(Series::total_link_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_tracks_mutation() {
        let mut survey = Survey::new();
        let r0 = survey.revision();
        survey.add_series(Series::new("a"));
        assert!(survey.revision() > r0);
        let r1 = survey.revision();
        let _ = survey.series_at_mut(0);
        assert!(survey.revision() > r1);
        let r2 = survey.revision();
        let _ = survey.series_at(0);
        assert_eq!(survey.revision(), r2);
    }

    #[test]
    fn index_editing() {
        let mut survey = Survey::new();
        survey.add_series(Series::new("a"));
        survey.add_series(Series::new("c"));
        survey.insert_series(1, Series::new("b")).unwrap();
        assert_eq!(survey.series_count(), 3);
        assert_eq!(survey.series_at(1).unwrap().name(), "b");
        let removed = survey.remove_series(0).unwrap();
        assert_eq!(removed.name(), "a");
        assert!(survey.remove_series(9).is_err());
    }
}
