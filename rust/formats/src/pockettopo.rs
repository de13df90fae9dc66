// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PocketTopo text export reader.
//!
//! A PocketTopo `.txt` export groups tab-separated measurement rows under
//! trip headers:
//!
//! ```text
//! TRIP
//! DATE 2012/07/07
//! DECLINATION 2.50
//! DATA
//! 1.0<TAB>1.1<TAB>10.230<TAB>250.10<TAB>-5.30
//! 1.1<TAB><TAB>2.530<TAB>100.00<TAB>0.00
//! ```
//!
//! Rows with an empty to-station are splays; they get synthesized
//! anonymous to-names derived from the from-station so they survive the
//! full-path splitter alongside their station. Station names keep their
//! dotted series numbering (`1.0` = series 1, station 0) — converting the
//! flat trip into a series tree is the splitter's job, not the parser's.

use cave_lite_core::{Diagnostic, DiagnosticSink, Leg, Series, Station, Survey};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};

/// Name given to the root series wrapping all trips.
const ROOT_NAME: &str = "cave";

/// Parses a PocketTopo text export into a survey of one series per trip.
pub fn parse(content: &str, sink: &mut dyn DiagnosticSink) -> Result<Survey> {
    let mut root = Series::new(ROOT_NAME);
    let mut trip: Option<Series> = None;
    let mut trip_count = 0usize;
    // Per-station splay counter, reset at each trip boundary.
    let mut splay_counts: FxHashMap<String, usize> = FxHashMap::default();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim_end();
        if text.trim().is_empty() {
            continue;
        }

        let upper = text.trim().to_ascii_uppercase();
        if upper == "TRIP" || upper.starts_with("TRIP ") {
            if let Some(done) = trip.take() {
                root.add_inner_series(done);
            }
            trip_count += 1;
            trip = Some(Series::new(format!("trip{trip_count}")));
            splay_counts.clear();
            continue;
        }
        if upper == "DATA" {
            continue;
        }
        if let Some(date) = text.trim().strip_prefix("DATE ") {
            if let Some(t) = trip.as_mut() {
                t.set_date(Some(date.trim().to_string()));
            }
            continue;
        }
        if let Some(value) = upper.strip_prefix("DECLINATION ") {
            let declination: f64 = fast_float::parse(value.trim())
                .map_err(|_| Error::parse(line, format!("bad declination '{}'", value.trim())))?;
            if let Some(t) = trip.as_mut() {
                t.calibration_mut().declination = declination;
            }
            continue;
        }

        // Measurement row.
        let Some(t) = trip.as_mut() else {
            return Err(Error::parse(line, "measurement row before any TRIP header"));
        };
        t.add_leg(parse_row(text, line, &mut splay_counts)?);
    }
    if let Some(done) = trip.take() {
        root.add_inner_series(done);
    }

    if root.inner_series_count() == 0 {
        sink.report(Diagnostic::warning("pockettopo file contains no trips"));
    }
    debug!(trips = root.inner_series_count(), legs = root.total_leg_count(), "parsed pockettopo file");
    let mut survey = Survey::new();
    survey.add_series(root);
    Ok(survey)
}

fn parse_row(
    text: &str,
    line: usize,
    splay_counts: &mut FxHashMap<String, usize>,
) -> Result<Leg> {
    let fields: Vec<&str> = text.split('\t').map(str::trim).collect();
    if fields.len() < 5 {
        return Err(Error::parse(
            line,
            format!(
                "expected 'from<TAB>to<TAB>length<TAB>azimuth<TAB>inclination', found {} fields",
                fields.len()
            ),
        ));
    }
    let number = |index: usize| -> Result<f64> {
        fast_float::parse(fields[index])
            .map_err(|_| Error::parse(line, format!("bad number '{}'", fields[index])))
    };

    let from_name = fields[0];
    let from =
        Station::new(from_name).map_err(|_| Error::parse(line, "empty from-station name"))?;

    let splay = fields[1].is_empty() || fields[1] == "-";
    let to = if splay {
        // Deterministic per-station counter; `1.0` splays become `1.0-1`,
        // `1.0-2`, ... so the series prefix rides along with the station.
        let slot = splay_counts
            .entry(from_name.to_ascii_lowercase())
            .or_insert(0);
        *slot += 1;
        Station::anonymous(format!("{from_name}-{slot}")).expect("non-empty synthesized name")
    } else {
        Station::new(fields[1]).map_err(|_| Error::parse(line, "empty to-station name"))?
    };

    let mut leg = Leg::new(from, to, number(2)?, number(3)?, number(4)?);
    leg.flags_mut().splay = splay;
    Ok(leg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cave_lite_core::CollectingSink;

    const EXPORT: &str = "TRIP\n\
DATE 2012/07/07\n\
DECLINATION 2.50\n\
DATA\n\
1.0\t1.1\t10.230\t250.10\t-5.30\n\
1.1\t\t2.530\t340.00\t0.00\n\
1.1\t\t1.820\t160.00\t2.00\n\
1.1\t1.2\t8.100\t250.00\t-2.00\n\
\n\
TRIP\n\
DATE 2012/07/08\n\
DATA\n\
2.0\t2.1\t5.000\t10.00\t0.00\n";

    #[test]
    fn parses_trips_and_splays() {
        let mut sink = CollectingSink::new();
        let survey = parse(EXPORT, &mut sink).unwrap();
        let root = survey.series_at(0).unwrap();
        assert_eq!(root.inner_series_count(), 2);

        let trip1 = root.inner_series_at(0).unwrap();
        assert_eq!(trip1.name(), "trip1");
        assert_eq!(trip1.date(), Some("2012/07/07"));
        assert_relative_eq!(trip1.calibration().declination, 2.5);
        assert_eq!(trip1.leg_count(), 4);

        let splays: Vec<&Leg> = trip1.legs().iter().filter(|l| l.is_splay()).collect();
        assert_eq!(splays.len(), 2);
        assert_eq!(splays[0].to().name(), "1.1-1");
        assert_eq!(splays[1].to().name(), "1.1-2");
        assert!(splays[0].to().is_anonymous());

        let trip2 = root.inner_series_at(1).unwrap();
        assert_eq!(trip2.leg_count(), 1);
        assert_relative_eq!(trip2.legs()[0].length(), 5.0);
    }

    #[test]
    fn rows_before_a_trip_fail() {
        let mut sink = CollectingSink::new();
        assert!(parse("1.0\t1.1\t10.0\t250.0\t-5.0\n", &mut sink).is_err());
    }
}
