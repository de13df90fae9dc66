// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting a flat series by dot-delimited station name hierarchy.
//!
//! Flat survey files (Survex exports, PocketTopo trips) often carry the
//! series structure inside station names: `A.12` means station `12` of
//! series `A`. The splitter materializes that hierarchy: one child series
//! per prefix, legs moved into the child of their from-station, prefixes
//! stripped from the local names.

use cave_lite_core::{Diagnostic, DiagnosticSink, Series, Survey};
use tracing::debug;

/// Splits a flat series along the first `.` of its station names.
///
/// Defined only for leaf series: returns `false` without touching anything
/// when the series already has inner series, or when no station name is
/// dotted. A leg whose to-station carries a different prefix than its
/// from-station stays in the from-station's child with the full dotted
/// reference intact; the unresolved name is reported as a warning, never
/// auto-equated. Returns `true` when any restructuring occurred.
pub fn split_by_full_path_names(series: &mut Series, sink: &mut dyn DiagnosticSink) -> bool {
    if series.inner_series_count() > 0 {
        return false;
    }
    let any_dotted = series
        .legs()
        .iter()
        .any(|leg| leg.from().split_prefix().is_some() || leg.to().split_prefix().is_some());
    if !any_dotted {
        return false;
    }

    let legs = series.take_legs();
    let mut kept = Vec::new();
    let mut moved = 0usize;

    for mut leg in legs {
        // Materialize a child for the to-prefix even when the leg itself
        // lands elsewhere, so every named sub-series exists afterwards.
        if let Some((to_prefix, _)) = leg.to().split_prefix() {
            let to_prefix = to_prefix.to_string();
            ensure_child(series, &to_prefix);
        }

        let Some((prefix, local)) = leg
            .from()
            .split_prefix()
            .map(|(p, l)| (p.to_string(), l.to_string()))
        else {
            kept.push(leg);
            continue;
        };
        if local.trim().is_empty() {
            sink.report(Diagnostic::warning(format!(
                "series '{}': station '{}' has an empty local name, leg not split",
                series.name(),
                leg.from().name()
            )));
            kept.push(leg);
            continue;
        }

        leg.from_mut()
            .set_name(local)
            .expect("validated local name");

        match leg.to().split_prefix().map(|(p, l)| (p.to_string(), l.to_string())) {
            Some((to_prefix, to_local))
                if to_prefix.eq_ignore_ascii_case(&prefix) && !to_local.trim().is_empty() =>
            {
                leg.to_mut().set_name(to_local).expect("validated local name");
            }
            _ => {
                // Cross-prefix (or undotted) reference: flagged as a future
                // equate, not created here.
                if !leg.to().is_anonymous() {
                    sink.report(Diagnostic::warning(format!(
                        "series '{}': unresolved cross-series reference '{}' from '{}.{}'",
                        series.name(),
                        leg.to().name(),
                        prefix,
                        leg.from().name()
                    )));
                }
            }
        }

        let child_index = ensure_child(series, &prefix);
        series
            .inner_series_at_mut(child_index)
            .expect("child exists")
            .add_leg(leg);
        moved += 1;
    }

    series.set_legs(kept);
    debug!(series = %series.name(), moved, "split series by full path names");
    // The series was a leaf on entry, so any child now present was created
    // by this call.
    moved > 0 || series.inner_series_count() > 0
}

/// Applies the splitter depth-first across the survey, re-splitting newly
/// created children until no dotted names remain. Returns `true` when any
/// series was restructured.
pub fn split_survey_by_full_path_names(
    survey: &mut Survey,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    fn walk(series: &mut Series, sink: &mut dyn DiagnosticSink) -> bool {
        let mut changed = split_by_full_path_names(series, sink);
        for child in series.inner_series_mut() {
            changed |= walk(child, sink);
        }
        changed
    }

    let mut changed = false;
    for series in survey.series_iter_mut() {
        changed |= walk(series, sink);
    }
    changed
}

/// Finds a child by case-insensitive name or creates it, returning its
/// index. The first-seen spelling becomes the child's name.
fn ensure_child(series: &mut Series, name: &str) -> usize {
    if let Some(index) = series.index_of_child(name) {
        return index;
    }
    let child = series.new_child_with_metadata(name);
    series.add_inner_series(child);
    series.inner_series_count() - 1
}
