// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toporobot `.text` writer.
//!
//! Toporobot numbers everything: series get sequential numbers, stations
//! are numbered 0..n along their series, and connections are expressed as
//! (series, station) number pairs. That representation only exists for
//! linear chains, so the writer demands a linearized survey: every series'
//! regular legs must form a simple chain ([`Error::NotLinear`] otherwise),
//! and loop closures/attachments must already be recorded as links.
//!
//! Record layout, one line per record, space-padded columns:
//!
//! ```text
//! -6 <serial>  <cave name>
//! -2 <series>  <series name>
//! -1 <series>  <from series> <from station> <to series> <to station>
//! <series> <station>  <length> <bearing> <gradient>  <L> <R> <U> <D>
//! ```

use cave_lite_core::{Diagnostic, DiagnosticSink, Leg, Series, Survey};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fmtnum::fixed2;

/// A series flattened into the numbering scheme.
struct Numbered<'a> {
    number: usize,
    series: &'a Series,
    /// Index of the parent entry, if any.
    parent: Option<usize>,
    /// Station names along the chain, position = Toporobot station number.
    stations: Vec<String>,
    /// Chain legs in order (splays excluded).
    chain: Vec<&'a Leg>,
}

/// Writes a linearized survey in Toporobot text form.
pub fn write(survey: &Survey, sink: &mut dyn DiagnosticSink) -> Result<String> {
    let mut entries: Vec<Numbered<'_>> = Vec::new();
    for series in survey.series() {
        collect(series, None, &mut entries)?;
    }

    let mut splays_skipped = 0usize;
    for entry in &entries {
        splays_skipped += entry.series.leg_count() - entry.chain.len();
    }
    if splays_skipped > 0 {
        sink.report(Diagnostic::info(format!(
            "{splays_skipped} splays not representable in toporobot output"
        )));
    }

    let cave_name = survey
        .series_at(0)
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| "cave".to_string());

    let mut out = String::new();
    out.push_str(&format!("{:>5} {:>4}  {}\n", -6, 1, cave_name));

    for index in 0..entries.len() {
        let entry = &entries[index];
        out.push_str(&format!(
            "{:>5} {:>4}  {}\n",
            -2,
            entry.number,
            entry.series.name()
        ));

        let (from, to) = connections(&entries, index);
        out.push_str(&format!(
            "{:>5} {:>4}  {:>4} {:>4} {:>4} {:>4}\n",
            -1, entry.number, from.0, from.1, to.0, to.1
        ));

        // Station 0 row carries no measurement.
        out.push_str(&format!(
            "{:>5} {:>4}  {:>8} {:>8} {:>8}  {:>7} {:>7} {:>7} {:>7}\n",
            entry.number,
            0,
            fixed2(0.0),
            fixed2(0.0),
            fixed2(0.0),
            fixed2(0.0),
            fixed2(0.0),
            fixed2(0.0),
            fixed2(0.0)
        ));
        for (station, leg) in entry.chain.iter().enumerate() {
            let lrud = leg.lrud();
            out.push_str(&format!(
                "{:>5} {:>4}  {:>8} {:>8} {:>8}  {:>7} {:>7} {:>7} {:>7}\n",
                entry.number,
                station + 1,
                fixed2(leg.length()),
                fixed2(leg.bearing()),
                fixed2(leg.gradient()),
                fixed2(lrud.left),
                fixed2(lrud.right),
                fixed2(lrud.up),
                fixed2(lrud.down)
            ));
        }
    }

    debug!(series = entries.len(), "wrote toporobot file");
    Ok(out)
}

/// Depth-first numbering; validates each series is a simple chain.
fn collect<'a>(
    series: &'a Series,
    parent: Option<usize>,
    entries: &mut Vec<Numbered<'a>>,
) -> Result<()> {
    let chain: Vec<&Leg> = series.legs().iter().filter(|l| !l.is_splay()).collect();
    let mut stations = Vec::with_capacity(chain.len() + 1);
    if let Some(first) = chain.first() {
        stations.push(first.from().name().to_string());
        for pair in chain.windows(2) {
            if !pair[0].to().same_name(pair[1].from()) {
                return Err(Error::NotLinear(series.name().to_string()));
            }
        }
        for leg in &chain {
            stations.push(leg.to().name().to_string());
        }
    }

    let index = entries.len();
    entries.push(Numbered {
        number: index + 1,
        series,
        parent,
        stations,
        chain,
    });
    for child in series.inner_series() {
        collect(child, Some(index), entries)?;
    }
    Ok(())
}

/// Resolves the start and end connection of a series from the links stored
/// in its parent (attachments) and in itself (ring closures). Unattached
/// ends connect to the series' own station 0.
fn connections(entries: &[Numbered<'_>], index: usize) -> ((usize, usize), (usize, usize)) {
    let entry = &entries[index];
    let own = entry.number;
    let mut start = (own, 0);
    let mut end = (own, entry.stations.len().saturating_sub(1));

    // Ring closure recorded in the series itself: the chain's last station
    // is the first station again.
    for link in entry.series.links() {
        if link.series1().eq_ignore_ascii_case(entry.series.name())
            && link.series2().eq_ignore_ascii_case(entry.series.name())
            && link.station1().same_name(link.station2())
        {
            end = (own, 0);
        }
    }

    let Some(parent_index) = entry.parent else {
        return (start, end);
    };
    let parent = &entries[parent_index];

    // Map sibling names (and the parent itself) to their numbers for
    // resolving the far side of a link.
    let mut scope: FxHashMap<String, usize> = FxHashMap::default();
    scope.insert(parent.series.name().to_ascii_lowercase(), parent_index);
    for (i, candidate) in entries.iter().enumerate() {
        if candidate.parent == Some(parent_index) {
            scope.insert(candidate.series.name().to_ascii_lowercase(), i);
        }
    }

    for link in parent.series.links() {
        let (own_station, far_series, far_station) =
            if link.series1().eq_ignore_ascii_case(entry.series.name()) {
                (link.station1(), link.series2(), link.station2())
            } else if link.series2().eq_ignore_ascii_case(entry.series.name()) {
                (link.station2(), link.series1(), link.station1())
            } else {
                continue;
            };
        if far_series.eq_ignore_ascii_case(entry.series.name()) {
            continue;
        }
        let Some(&far_index) = scope.get(&far_series.to_ascii_lowercase()) else {
            continue;
        };
        let far = &entries[far_index];
        let Some(far_number) = station_number(far, far_station.name()) else {
            continue;
        };
        let here = station_number(entry, own_station.name());
        match here {
            Some(0) | None => start = (far.number, far_number),
            Some(n) if n == entry.stations.len() - 1 => end = (far.number, far_number),
            Some(_) => {
                // Mid-chain attachment: report it on the start slot only if
                // the start is still unattached.
                if start == (own, 0) {
                    start = (far.number, far_number);
                }
            }
        }
    }

    (start, end)
}

fn station_number(entry: &Numbered<'_>, name: &str) -> Option<usize> {
    entry
        .stations
        .iter()
        .position(|s| s.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_lite_core::{CollectingSink, NullSink, Series, Station, Survey};
    use cave_lite_processing::linearize_series;

    fn leg(from: &str, to: &str) -> Leg {
        Leg::new(
            Station::new(from).unwrap(),
            Station::new(to).unwrap(),
            5.0,
            120.0,
            -3.0,
        )
    }

    #[test]
    fn branching_series_is_rejected() {
        let mut series = Series::new("cave");
        series.add_leg(leg("1", "2"));
        series.add_leg(leg("5", "6"));
        let mut survey = Survey::new();
        survey.add_series(series);
        let mut sink = CollectingSink::new();
        assert!(matches!(
            write(&survey, &mut sink),
            Err(Error::NotLinear(name)) if name == "cave"
        ));
    }

    #[test]
    fn linearized_t_shape_writes_both_series() {
        let mut series = Series::new("cave");
        for l in [
            leg("A", "B"),
            leg("B", "C"),
            leg("C", "D"),
            leg("D", "E"),
            leg("C", "X"),
            leg("X", "Y"),
        ] {
            series.add_leg(l);
        }
        linearize_series(&mut series, &mut NullSink).unwrap();
        let mut survey = Survey::new();
        survey.add_series(series);

        let mut sink = CollectingSink::new();
        let text = write(&survey, &mut sink).unwrap();

        // Two series records, numbered 1 and 2.
        assert!(text.contains("   -2    1  cave\n"));
        assert!(text.contains("   -2    2  cave_1\n"));
        // The branch attaches to series 1 at station 2 (A=0, B=1, C=2).
        assert!(text.contains("   -1    2     1    2    2    2\n"));
        // Deterministic output.
        let again = write(&survey, &mut sink).unwrap();
        assert_eq!(text, again);
    }
}
