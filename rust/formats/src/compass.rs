// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compass `.dat` reader and writer.
//!
//! A Compass data file is a sequence of survey sections separated by form
//! feeds. Each section carries a fixed header (cave name, `SURVEY NAME:`,
//! `SURVEY DATE:`, `DECLINATION:`) followed by measurement rows in feet:
//! `FROM TO LENGTH BEARING INC LEFT UP DOWN RIGHT [FLAGS] [COMMENTS]`.
//!
//! The writer needs one survey section per series and a unique short survey
//! name per section, which is where the run-scoped
//! [`SeriesShortNames`](cave_lite_processing::SeriesShortNames) registry
//! comes in: Compass survey names are limited to a handful of characters,
//! so full series names cannot be used directly.

use cave_lite_core::{
    Calibration, Diagnostic, DiagnosticSink, Leg, LengthUnit, Lrud, Series, Station, Survey,
};
use cave_lite_processing::SeriesShortNames;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fmtnum::fixed2;

/// Section separator: an ASCII form feed on its own line.
const FORM_FEED: u8 = 0x0C;

/// Missing LRUD readings are conventionally negative in Compass files.
fn lrud_field(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        LengthUnit::Feet.to_metres(value)
    }
}

/// Parses a Compass data file into a survey.
///
/// Sections become series under a single root series named after the cave
/// name of the first section.
pub fn parse(content: &str, sink: &mut dyn DiagnosticSink) -> Result<Survey> {
    let mut root: Option<Series> = None;
    let mut line_base = 0usize;

    for section in split_sections(content) {
        let line_count = section.lines().count();
        if section.trim().is_empty() {
            line_base += line_count;
            continue;
        }
        let (cave_name, series) = parse_section(section, line_base, sink)?;
        let root = root.get_or_insert_with(|| Series::new(cave_name.clone()));
        root.add_inner_series(series);
        line_base += line_count;
    }

    let mut survey = Survey::new();
    match root {
        Some(root) => {
            debug!(sections = root.inner_series_count(), "parsed compass file");
            survey.add_series(root);
        }
        None => {
            sink.report(Diagnostic::warning("compass file contains no survey sections"));
        }
    }
    Ok(survey)
}

/// Splits on form feeds; the trailing terminator of each section belongs to
/// the section before it.
fn split_sections(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(FORM_FEED as char)
        .map(|s| s.strip_prefix('\n').unwrap_or(s))
}

fn parse_section(
    section: &str,
    line_base: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<(String, Series)> {
    let mut lines = section.lines().enumerate();
    let mut cave_name = String::new();
    let mut series = Series::new("survey");
    let mut calibration = Calibration::default();
    let mut in_data = false;

    for (offset, raw) in &mut lines {
        let line = line_base + offset + 1;
        let text = raw.trim_end();
        if !in_data {
            if offset == 0 {
                cave_name = text.trim().to_string();
                continue;
            }
            if let Some(value) = field_after(text, "SURVEY NAME:") {
                series.set_name(value.trim());
                continue;
            }
            if let Some(value) = field_after(text, "SURVEY DATE:") {
                let date = value
                    .split("COMMENT:")
                    .next()
                    .unwrap_or(value)
                    .trim()
                    .to_string();
                if !date.is_empty() {
                    series.set_date(Some(date));
                }
                continue;
            }
            if let Some(value) = field_after(text, "DECLINATION:") {
                let first = value.split_whitespace().next().ok_or_else(|| {
                    Error::parse(line, "DECLINATION: with no value")
                })?;
                calibration.declination = fast_float::parse(first)
                    .map_err(|_| Error::parse(line, format!("bad declination '{first}'")))?;
                // CORRECTIONS: tape compass clino may follow on the same line.
                if let Some(corrections) = field_after(value, "CORRECTIONS:") {
                    let mut fields = corrections.split_whitespace();
                    for slot in [
                        &mut calibration.compass,
                        &mut calibration.clino,
                        &mut calibration.tape,
                    ] {
                        if let Some(tok) = fields.next() {
                            *slot = fast_float::parse(tok).map_err(|_| {
                                Error::parse(line, format!("bad correction '{tok}'"))
                            })?;
                        }
                    }
                }
                continue;
            }
            if text.trim_start().starts_with("FROM") {
                in_data = true;
            }
            continue;
        }

        let row = text.trim();
        if row.is_empty() {
            continue;
        }
        series.add_leg(parse_row(row, line, sink)?);
    }

    if series.name() == "survey" {
        return Err(Error::parse(
            line_base + 1,
            "section has no SURVEY NAME: header",
        ));
    }
    series.set_calibration(calibration);
    series.set_units(
        LengthUnit::Feet,
        Default::default(),
        Default::default(),
    );
    Ok((cave_name, series))
}

fn field_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.to_ascii_uppercase().find(key)?;
    Some(&line[start + key.len()..])
}

fn parse_row(row: &str, line: usize, sink: &mut dyn DiagnosticSink) -> Result<Leg> {
    let fields: Vec<&str> = row.split_whitespace().collect();
    if fields.len() < 9 {
        return Err(Error::parse(
            line,
            format!("expected 9 measurement fields, found {}", fields.len()),
        ));
    }
    let number = |index: usize| -> Result<f64> {
        fast_float::parse(fields[index])
            .map_err(|_| Error::parse(line, format!("bad number '{}'", fields[index])))
    };

    let from = Station::new(fields[0])
        .map_err(|_| Error::parse(line, "empty from-station name"))?;
    let to = Station::new(fields[1]).map_err(|_| Error::parse(line, "empty to-station name"))?;
    let mut leg = Leg::new(
        from,
        to,
        LengthUnit::Feet.to_metres(number(2)?),
        number(3)?,
        number(4)?,
    );
    // Column order is LEFT UP DOWN RIGHT.
    leg.set_lrud(Lrud {
        left: lrud_field(number(5)?),
        up: lrud_field(number(6)?),
        down: lrud_field(number(7)?),
        right: lrud_field(number(8)?),
    });

    if let Some(flags) = fields.get(9).filter(|f| f.starts_with("#|")) {
        let letters = flags.trim_start_matches("#|").trim_end_matches('#');
        for letter in letters.chars() {
            match letter.to_ascii_uppercase() {
                'L' | 'X' => leg.flags_mut().duplicate = true,
                'S' => leg.flags_mut().splay = true,
                'P' | 'C' => {}
                other => sink.report(Diagnostic::warning(format!(
                    "line {line}: unknown compass flag '{other}'"
                ))),
            }
        }
    }
    Ok(leg)
}

// =============================================================================
// Writer
// =============================================================================

/// Writes a survey as a Compass data file, one section per series that
/// carries legs. Survey names are run-scoped 4-character short names.
pub fn write(survey: &Survey, sink: &mut dyn DiagnosticSink) -> Result<String> {
    let short_names = SeriesShortNames::build(survey)?;
    let cave_name = survey
        .series_at(0)
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| "CAVE".to_string());

    let mut out = String::new();
    let mut index = 0usize;
    for series in survey.series() {
        write_series(&mut out, series, &cave_name, &short_names, &mut index, sink);
    }
    Ok(out)
}

fn write_series(
    out: &mut String,
    series: &Series,
    cave_name: &str,
    short_names: &SeriesShortNames,
    index: &mut usize,
    sink: &mut dyn DiagnosticSink,
) {
    let short = short_names
        .get(*index)
        .expect("one short name per series")
        .trim()
        .to_string();
    *index += 1;

    let regular: Vec<&Leg> = series.legs().iter().filter(|l| !l.is_splay()).collect();
    let skipped = series.leg_count() - regular.len();
    if skipped > 0 {
        sink.report(Diagnostic::info(format!(
            "series '{}': {skipped} splays not representable in compass output",
            series.name()
        )));
    }

    if !regular.is_empty() {
        let calibration = series.calibration();
        out.push_str(&format!("{cave_name}\n"));
        out.push_str(&format!("SURVEY NAME: {short}\n"));
        out.push_str(&format!(
            "SURVEY DATE: {}\n",
            series.date().unwrap_or("1 1 2000")
        ));
        out.push_str("SURVEY TEAM:\n\n");
        out.push_str(&format!(
            "DECLINATION: {}  FORMAT: DMMDLUDRLADN  CORRECTIONS: {} {} {}\n\n",
            fixed2(calibration.declination),
            fixed2(calibration.compass),
            fixed2(calibration.clino),
            fixed2(calibration.tape)
        ));
        out.push_str(
            "FROM         TO           LENGTH  BEARING      INC     LEFT       UP     DOWN    RIGHT  FLAGS COMMENTS\n\n",
        );
        for leg in &regular {
            let lrud = leg.lrud();
            out.push_str(&format!(
                "{:<12} {:<12} {:>7} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
                station_name(&short, leg.from().name()),
                station_name(&short, leg.to().name()),
                fixed2(leg.length_in(LengthUnit::Feet)),
                fixed2(leg.bearing()),
                fixed2(leg.gradient()),
                fixed2(LengthUnit::Feet.from_metres(lrud.left)),
                fixed2(LengthUnit::Feet.from_metres(lrud.up)),
                fixed2(LengthUnit::Feet.from_metres(lrud.down)),
                fixed2(LengthUnit::Feet.from_metres(lrud.right)),
            ));
        }
        out.push('\n');
        out.push(FORM_FEED as char);
        out.push('\n');
    }

    for child in series.inner_series() {
        write_series(out, child, cave_name, short_names, index, sink);
    }
}

/// Compass station names are capped at 12 characters; the short survey name
/// prefixes the local station name.
fn station_name(short: &str, station: &str) -> String {
    format!("{short}{station}").chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cave_lite_core::CollectingSink;

    const SECTION: &str = "Yellow Cave\n\
SURVEY NAME: ENT\n\
SURVEY DATE: 7 7 2012  COMMENT: entrance sweep\n\
SURVEY TEAM:\n\
\n\
DECLINATION: 2.50  FORMAT: DMMDLUDRLADN  CORRECTIONS: 1.00 -0.50 0.25\n\
\n\
FROM TO LENGTH BEARING INC LEFT UP DOWN RIGHT FLAGS COMMENTS\n\
\n\
E1 E2 32.81 250.00 -5.00 3.28 6.56 -9.90 1.64\n\
E2 E3 16.40 100.00 0.00 0.00 0.00 0.00 0.00 #|L#\n";

    #[test]
    fn parses_a_section() {
        let mut sink = CollectingSink::new();
        let survey = parse(SECTION, &mut sink).unwrap();
        let root = survey.series_at(0).unwrap();
        assert_eq!(root.name(), "Yellow Cave");
        let ent = root.inner_series_at(0).unwrap();
        assert_eq!(ent.name(), "ENT");
        assert_eq!(ent.date(), Some("7 7 2012"));
        assert_relative_eq!(ent.calibration().declination, 2.5);
        assert_relative_eq!(ent.calibration().compass, 1.0);
        assert_relative_eq!(ent.calibration().tape, 0.25);
        assert_eq!(ent.leg_count(), 2);

        // 32.81 ft to metres; LRUD feet converted, missing (-9.90) dropped.
        let leg = &ent.legs()[0];
        assert_relative_eq!(leg.length(), 10.000488, epsilon = 1e-6);
        assert_relative_eq!(leg.lrud().left, 0.999744, epsilon = 1e-6);
        assert_relative_eq!(leg.lrud().down, 0.0);
        assert!(ent.legs()[1].flags().duplicate);
    }

    #[test]
    fn rejects_short_rows() {
        let broken = SECTION.replace("E2 E3 16.40 100.00 0.00 0.00 0.00 0.00 0.00 #|L#", "E2 E3 16.40");
        let mut sink = CollectingSink::new();
        assert!(parse(&broken, &mut sink).is_err());
    }

    #[test]
    fn writes_deterministic_sections() {
        let mut sink = CollectingSink::new();
        let survey = parse(SECTION, &mut sink).unwrap();
        let first = write(&survey, &mut sink).unwrap();
        let second = write(&survey, &mut sink).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("SURVEY NAME: ENT"));
        assert!(first.contains("32.81"));
    }
}
