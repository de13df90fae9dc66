// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deriving corridor dimensions from splay shots.
//!
//! Instruments like the DistoX record unordered radial splays at each
//! station instead of explicit passage dimensions. This pass assigns
//! Left/Right/Up/Down extents to every regular leg by bucketing the splays
//! at its endpoint stations against the leg's own bearing.

use cave_lite_core::{normalize_degrees, Leg, Lrud, Series, Survey};
use tracing::debug;

/// Splays steeper than this (degrees) count as vertical, toward Up/Down.
const VERTICAL_GRADIENT: f64 = 70.0;

/// Half-width (degrees) of the bearing window around perpendicular-left and
/// perpendicular-right.
const BEARING_WINDOW: f64 = 45.0;

/// Options for LRUD generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LrudOptions {
    /// Delete the splay legs after their dimensions have been consumed.
    /// Off by default; most formats tolerate (or want) the splays kept.
    pub remove_splays: bool,
}

struct SplayShot {
    station: String,
    bearing: f64,
    gradient: f64,
    length: f64,
}

/// Generates LRUD data for every regular leg of the survey, depth-first
/// over the series tree so nested series are always covered. Mutates leg
/// LRUD fields in place; graph structure is never altered, and splays are
/// kept unless [`LrudOptions::remove_splays`] is set.
pub fn generate_lrud(survey: &mut Survey, options: &LrudOptions) {
    for series in survey.series_iter_mut() {
        process_series(series, options);
    }
}

fn process_series(series: &mut Series, options: &LrudOptions) {
    let splays: Vec<SplayShot> = series
        .legs()
        .iter()
        .filter(|leg| leg.is_splay())
        .map(|leg| SplayShot {
            station: leg.from().name().to_ascii_lowercase(),
            bearing: leg.bearing(),
            gradient: leg.gradient(),
            length: leg.length(),
        })
        .collect();

    if !splays.is_empty() {
        let mut assigned = 0usize;
        for leg in series.legs_mut() {
            if leg.is_splay() {
                continue;
            }
            if let Some(lrud) = dimensions_for(leg, &splays) {
                leg.set_lrud(lrud);
                assigned += 1;
            }
        }
        debug!(series = %series.name(), legs = assigned, "generated LRUD from splays");
    }

    if options.remove_splays {
        series.retain_legs(|leg| !leg.is_splay());
    }

    for child in series.inner_series_mut() {
        process_series(child, options);
    }
}

/// Buckets the splays at either endpoint of a leg. Returns `None` when no
/// splay touches the leg, leaving any parsed LRUD data alone.
fn dimensions_for(leg: &Leg, splays: &[SplayShot]) -> Option<Lrud> {
    let from = leg.from().name().to_ascii_lowercase();
    let to = leg.to().name().to_ascii_lowercase();
    let mut lrud = Lrud::default();
    let mut any = false;

    for splay in splays {
        if splay.station != from && splay.station != to {
            continue;
        }
        any = true;
        if splay.gradient.abs() >= VERTICAL_GRADIENT {
            if splay.gradient > 0.0 {
                lrud.up = lrud.up.max(splay.length);
            } else {
                lrud.down = lrud.down.max(splay.length);
            }
            continue;
        }
        let relative = normalize_degrees(splay.bearing - leg.bearing());
        if (relative - 90.0).abs() <= BEARING_WINDOW {
            lrud.right = lrud.right.max(splay.length);
        } else if (relative - 270.0).abs() <= BEARING_WINDOW {
            lrud.left = lrud.left.max(splay.length);
        }
        // Splays near-parallel to the leg measure passage ends, not walls.
    }

    any.then_some(lrud)
}
