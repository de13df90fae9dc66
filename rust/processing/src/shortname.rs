// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collision-avoiding fixed-width series identifiers.
//!
//! Formats with strict naming limits (Compass survey names) get a unique
//! 4-character identifier per series. Candidates are derived from the last
//! dot-segment of the full series name and tried in a fixed order, so
//! assignment is deterministic for a given series order. Uniqueness is
//! case-insensitive and scoped to one generator, i.e. one conversion run.

use cave_lite_core::{Series, Survey};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};

/// Fixed identifier width.
pub const SHORT_NAME_LEN: usize = 4;

/// Run-scoped short-name registry.
#[derive(Debug, Default)]
pub struct ShortNameGenerator {
    used: FxHashSet<String>,
}

impl ShortNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a free 4-character name for the given full series name.
    ///
    /// Candidate policy, tried in order until one is unused:
    /// 1. the first 4 characters of the last dot-segment, left-padded;
    /// 2. the same with vowels removed;
    /// 3. the first 3 characters plus a digit `1`..`9`;
    /// 4. the first 2 characters plus `01`..`99`.
    ///
    /// All 110 candidates taken is fatal for the conversion: the target
    /// format cannot represent the dataset.
    pub fn generate(&mut self, full_name: &str) -> Result<String> {
        let segment = full_name
            .rsplit('.')
            .find(|s| !s.trim().is_empty())
            .unwrap_or(full_name)
            .trim();

        let direct = pad(&prefix(segment, 4));
        if self.claim(&direct) {
            return Ok(direct);
        }

        let devoweled: String = segment
            .chars()
            .filter(|c| !matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
            .collect();
        if !devoweled.is_empty() {
            let candidate = pad(&prefix(&devoweled, 4));
            if self.claim(&candidate) {
                return Ok(candidate);
            }
        }

        let base3 = prefix(segment, 3);
        for digit in 1..=9u32 {
            let candidate = pad(&format!("{base3}{digit}"));
            if self.claim(&candidate) {
                return Ok(candidate);
            }
        }

        let base2 = prefix(segment, 2);
        for number in 1..=99u32 {
            let candidate = pad(&format!("{base2}{number:02}"));
            if self.claim(&candidate) {
                return Ok(candidate);
            }
        }

        Err(Error::ShortNameExhausted(full_name.to_string()))
    }

    fn claim(&mut self, candidate: &str) -> bool {
        self.used.insert(candidate.to_ascii_lowercase())
    }
}

/// Short names for every series of a survey, assigned in depth-first order
/// and addressable by depth-first series index.
#[derive(Debug)]
pub struct SeriesShortNames {
    names: Vec<String>,
    by_path: FxHashMap<String, usize>,
}

impl SeriesShortNames {
    /// Walks the survey depth-first and assigns a short name per series.
    pub fn build(survey: &Survey) -> Result<Self> {
        let mut generator = ShortNameGenerator::new();
        let mut names = Vec::new();
        let mut by_path = FxHashMap::default();

        fn walk(
            series: &Series,
            path: &str,
            generator: &mut ShortNameGenerator,
            names: &mut Vec<String>,
            by_path: &mut FxHashMap<String, usize>,
        ) -> Result<()> {
            let path = if path.is_empty() {
                series.name().to_string()
            } else {
                format!("{path}.{}", series.name())
            };
            by_path.insert(path.to_ascii_lowercase(), names.len());
            names.push(generator.generate(series.name())?);
            for child in series.inner_series() {
                walk(child, &path, generator, names, by_path)?;
            }
            Ok(())
        }

        for series in survey.series() {
            walk(series, "", &mut generator, &mut names, &mut by_path)?;
        }
        Ok(Self { names, by_path })
    }

    /// Short name of the series at the given depth-first index.
    pub fn get(&self, series_index: usize) -> Option<&str> {
        self.names.get(series_index).map(String::as_str)
    }

    /// Short name of the series with the given full dotted path.
    pub fn get_by_path(&self, path: &str) -> Option<&str> {
        self.by_path
            .get(&path.to_ascii_lowercase())
            .and_then(|&i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Left-pads to the fixed width with spaces.
fn pad(s: &str) -> String {
    format!("{s:>width$}", width = SHORT_NAME_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_last_segment() {
        let mut gen = ShortNameGenerator::new();
        assert_eq!(gen.generate("cave.entrance.Passage1").unwrap(), "Pass");
        assert_eq!(gen.generate("x.y.Big").unwrap(), " Big");
    }

    #[test]
    fn collisions_walk_the_policy() {
        let mut gen = ShortNameGenerator::new();
        assert_eq!(gen.generate("Passage").unwrap(), "Pass");
        // Same first four characters: vowels drop out.
        assert_eq!(gen.generate("Passage").unwrap(), "Pssg");
        // Then three characters plus a digit.
        assert_eq!(gen.generate("Passage").unwrap(), "Pas1");
        assert_eq!(gen.generate("Passage").unwrap(), "Pas2");
    }

    #[test]
    fn uniqueness_is_case_insensitive() {
        let mut gen = ShortNameGenerator::new();
        assert_eq!(gen.generate("ABCD").unwrap(), "ABCD");
        // "abcd" collides with "ABCD"; devoweled form "bcd" pads to " bcd".
        assert_eq!(gen.generate("abcd").unwrap(), " bcd");
    }

    #[test]
    fn names_are_pairwise_distinct_under_pressure() {
        let mut gen = ShortNameGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let name = gen.generate("Passage").unwrap();
            assert!(seen.insert(name.to_ascii_lowercase()));
        }
    }

    #[test]
    fn survey_names_are_addressable_by_index_and_path() {
        use cave_lite_core::{Series, Survey};

        let mut cave = Series::new("cave");
        cave.add_inner_series(Series::new("entrance"));
        cave.add_inner_series(Series::new("sump"));
        let mut survey = Survey::new();
        survey.add_series(cave);

        let names = SeriesShortNames::build(&survey).unwrap();
        assert_eq!(names.len(), 3);
        // Depth-first: cave, entrance, sump.
        assert_eq!(names.get(0), Some("cave"));
        assert_eq!(names.get(1), Some("entr"));
        assert_eq!(names.get(2), Some("sump"));
        assert_eq!(names.get_by_path("cave.Entrance"), Some("entr"));
        assert_eq!(names.get_by_path("cave.nowhere"), None);
    }

    #[test]
    fn exhaustion_is_deterministic() {
        let mut gen = ShortNameGenerator::new();
        let mut produced = 0usize;
        loop {
            match gen.generate("Passage") {
                Ok(_) => produced += 1,
                Err(Error::ShortNameExhausted(name)) => {
                    assert_eq!(name, "Passage");
                    break;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        // 1 direct + 1 devoweled + 9 + 99 candidates.
        assert_eq!(produced, 110);
    }
}
