// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Survex `.svx` reader and writer.
//!
//! Survex files are line oriented: `*` commands (`*begin`, `*end`,
//! `*equate`, `*calibrate`, ...) interleaved with whitespace-separated
//! measurement rows. `*begin`/`*end` blocks nest and map directly onto the
//! series tree; `*equate` lines become [`SeriesLink`]s in the nearest
//! common ancestor of the two referenced series.

use cave_lite_core::{
    BearingUnit, Diagnostic, DiagnosticSink, FixedPoint, GradientUnit, Leg, LegFlags,
    LengthUnit, Series, SeriesLink, Station, Survey,
};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    sequence::delimited,
    IResult,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::fmtnum::fixed2;

// =============================================================================
// Tokenizer
// =============================================================================

/// One token: a quoted string or a bare word.
fn token(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        take_while1(|c: char| !c.is_whitespace()),
    ))(input)
}

/// Splits a line into tokens after stripping the `;` comment tail.
fn tokenize(line: &str) -> Vec<&str> {
    let text = match memchr::memchr(b';', line.as_bytes()) {
        Some(at) => &line[..at],
        None => line,
    };
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        match token(rest) {
            Ok((remaining, tok)) => {
                tokens.push(tok);
                rest = remaining.trim_start();
            }
            Err(_) => break,
        }
    }
    tokens
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    fast_float::parse(token)
        .map_err(|_| Error::parse(line, format!("expected a number, found '{token}'")))
}

/// Reading for a clino/compass field that survex allows as a keyword.
fn parse_reading(token: &str, line: usize) -> Result<f64> {
    match token.to_ascii_lowercase().as_str() {
        "-" | "level" => Ok(0.0),
        "up" | "u" | "+v" => Ok(90.0),
        "down" | "d" | "-v" => Ok(-90.0),
        _ => parse_number(token, line),
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Per-`*begin` parse state.
struct Frame {
    series: Series,
    flags: LegFlags,
    /// Unsupported `*data` style active: measurement rows are skipped.
    data_ignored: bool,
    equates: Vec<(String, String)>,
    fixes: Vec<(String, FixedPoint)>,
    entrances: Vec<String>,
    anon_counter: usize,
    length_unit: LengthUnit,
    bearing_unit: BearingUnit,
    gradient_unit: GradientUnit,
}

impl Frame {
    fn new(name: impl Into<String>) -> Self {
        Self {
            series: Series::new(name),
            flags: LegFlags::default(),
            data_ignored: false,
            equates: Vec::new(),
            fixes: Vec::new(),
            entrances: Vec::new(),
            anon_counter: 0,
            length_unit: LengthUnit::Metres,
            bearing_unit: BearingUnit::Degrees,
            gradient_unit: GradientUnit::Degrees,
        }
    }

    /// Child frames inherit units, calibration, flags and data state.
    fn child(&self, name: impl Into<String>) -> Self {
        let mut frame = Frame::new(name);
        frame.flags = self.flags;
        frame.data_ignored = self.data_ignored;
        frame.length_unit = self.length_unit;
        frame.bearing_unit = self.bearing_unit;
        frame.gradient_unit = self.gradient_unit;
        frame
            .series
            .set_calibration(self.series.calibration());
        frame
    }
}

/// Name of the implicit wrapper series for content outside any `*begin`.
const ROOT_NAME: &str = "cave";

/// Parses Survex text into a survey.
pub fn parse(content: &str, sink: &mut dyn DiagnosticSink) -> Result<Survey> {
    let mut stack = vec![Frame::new(ROOT_NAME)];
    let mut anon_blocks = 0usize;

    for (index, raw_line) in content.lines().enumerate() {
        let line = index + 1;
        let tokens = tokenize(raw_line);
        if tokens.is_empty() {
            continue;
        }

        if let Some(command) = tokens[0].strip_prefix('*') {
            let args = &tokens[1..];
            match command.to_ascii_lowercase().as_str() {
                "begin" => {
                    let name = match args.first() {
                        Some(name) => (*name).to_string(),
                        None => {
                            anon_blocks += 1;
                            sink.report(Diagnostic::warning(format!(
                                "line {line}: unnamed *begin block"
                            )));
                            format!("block{anon_blocks}")
                        }
                    };
                    let frame = stack.last().expect("root frame").child(name);
                    stack.push(frame);
                }
                "end" => {
                    if stack.len() == 1 {
                        return Err(Error::parse(line, "*end without matching *begin"));
                    }
                    let frame = stack.pop().expect("checked depth");
                    if let Some(name) = args.first() {
                        if !frame.series.name().eq_ignore_ascii_case(name) {
                            sink.report(Diagnostic::warning(format!(
                                "line {line}: *end {name} closes *begin {}",
                                frame.series.name()
                            )));
                        }
                    }
                    let series = finish_frame(frame, sink)?;
                    stack
                        .last_mut()
                        .expect("parent frame")
                        .series
                        .add_inner_series(series);
                }
                "equate" => {
                    if args.len() < 2 {
                        return Err(Error::parse(line, "*equate needs two stations"));
                    }
                    let frame = stack.last_mut().expect("root frame");
                    frame
                        .equates
                        .push((args[0].to_string(), args[1].to_string()));
                }
                "calibrate" => {
                    if args.len() < 2 {
                        return Err(Error::parse(line, "*calibrate needs a quantity and value"));
                    }
                    let value = parse_number(args[1], line)?;
                    let frame = stack.last_mut().expect("root frame");
                    let calibration = frame.series.calibration_mut();
                    match args[0].to_ascii_lowercase().as_str() {
                        "tape" | "length" => calibration.tape = value,
                        "compass" | "bearing" => calibration.compass = value,
                        "clino" | "gradient" => calibration.clino = value,
                        "declination" => calibration.declination = value,
                        other => sink.report(Diagnostic::warning(format!(
                            "line {line}: unknown *calibrate quantity '{other}'"
                        ))),
                    }
                }
                "declination" => {
                    let frame = stack.last_mut().expect("root frame");
                    match args.first() {
                        Some(&"auto") | None => sink.report(Diagnostic::warning(format!(
                            "line {line}: automatic declination is not supported"
                        ))),
                        Some(value) => {
                            frame.series.calibration_mut().declination =
                                parse_number(value, line)?
                        }
                    }
                }
                "date" => {
                    let frame = stack.last_mut().expect("root frame");
                    frame.series.set_date(Some(args.join(" ")));
                }
                "units" => {
                    if args.len() < 2 {
                        return Err(Error::parse(line, "*units needs a quantity and unit"));
                    }
                    apply_units(stack.last_mut().expect("root frame"), args, line, sink)?;
                }
                "fix" => {
                    if args.len() < 4 {
                        return Err(Error::parse(line, "*fix needs a station and 3 coordinates"));
                    }
                    let frame = stack.last_mut().expect("root frame");
                    frame.fixes.push((
                        args[0].to_string(),
                        FixedPoint {
                            easting: parse_number(args[1], line)?,
                            northing: parse_number(args[2], line)?,
                            altitude: parse_number(args[3], line)?,
                        },
                    ));
                }
                "entrance" => {
                    if let Some(name) = args.first() {
                        let frame = stack.last_mut().expect("root frame");
                        frame.entrances.push((*name).to_string());
                    }
                }
                "flags" => {
                    let frame = stack.last_mut().expect("root frame");
                    apply_flags(&mut frame.flags, args, line, sink);
                }
                "data" => {
                    let frame = stack.last_mut().expect("root frame");
                    frame.data_ignored = !data_style_supported(args);
                    if frame.data_ignored {
                        sink.report(Diagnostic::warning(format!(
                            "line {line}: unsupported *data style '{}', rows skipped",
                            args.join(" ")
                        )));
                    }
                }
                // Presentation and processing hints with no model content.
                "title" | "team" | "instrument" | "sd" | "cs" | "ref" | "export"
                | "require" | "case" | "truncate" | "alias" | "set" | "infer" => {}
                "include" => sink.report(Diagnostic::warning(format!(
                    "line {line}: *include is not followed"
                ))),
                other => sink.report(Diagnostic::warning(format!(
                    "line {line}: unknown command *{other}"
                ))),
            }
            continue;
        }

        // Measurement row.
        let frame = stack.last_mut().expect("root frame");
        if frame.data_ignored {
            continue;
        }
        if tokens.len() < 5 {
            return Err(Error::parse(
                line,
                format!("expected 'from to tape compass clino', found {} fields", tokens.len()),
            ));
        }
        let leg = build_leg(frame, &tokens, line)?;
        frame.series.add_leg(leg);
    }

    if stack.len() > 1 {
        let open = stack.last().expect("frame").series.name().to_string();
        return Err(Error::parse(
            content.lines().count(),
            format!("*begin {open} is never closed"),
        ));
    }

    let root_frame = stack.pop().expect("root frame");
    let root_is_plain = root_frame.series.leg_count() == 0
        && root_frame.equates.is_empty()
        && root_frame.fixes.is_empty()
        && root_frame.entrances.is_empty();
    let root = finish_frame(root_frame, sink)?;

    let mut survey = Survey::new();
    if root_is_plain {
        for series in root.inner_series() {
            survey.add_series(series.clone());
        }
    } else {
        survey.add_series(root);
    }
    debug!(series = survey.total_series_count(), legs = survey.total_leg_count(), "parsed survex file");
    Ok(survey)
}

fn data_style_supported(args: &[&str]) -> bool {
    match args.first().map(|s| s.to_ascii_lowercase()) {
        None => true,
        Some(style) if style == "default" => true,
        Some(style) if style == "normal" => {
            // Only the standard column order is understood.
            let order: Vec<String> =
                args[1..].iter().map(|s| s.to_ascii_lowercase()).collect();
            order.is_empty() || order == ["from", "to", "tape", "compass", "clino"]
        }
        Some(_) => false,
    }
}

fn apply_units(
    frame: &mut Frame,
    args: &[&str],
    line: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    let unit_name = args[args.len() - 1];
    match args[0].to_ascii_lowercase().as_str() {
        "tape" | "length" => match LengthUnit::parse(unit_name) {
            Some(unit) => frame.length_unit = unit,
            None => {
                return Err(Error::parse(line, format!("unknown length unit '{unit_name}'")))
            }
        },
        "compass" | "bearing" => match BearingUnit::parse(unit_name) {
            Some(unit) => frame.bearing_unit = unit,
            None => {
                return Err(Error::parse(line, format!("unknown bearing unit '{unit_name}'")))
            }
        },
        "clino" | "gradient" => match GradientUnit::parse(unit_name) {
            Some(unit) => frame.gradient_unit = unit,
            None => {
                return Err(Error::parse(line, format!("unknown gradient unit '{unit_name}'")))
            }
        },
        other => sink.report(Diagnostic::warning(format!(
            "line {line}: unknown *units quantity '{other}'"
        ))),
    }
    frame.series.set_units(
        frame.length_unit,
        frame.bearing_unit,
        frame.gradient_unit,
    );
    Ok(())
}

fn apply_flags(flags: &mut LegFlags, args: &[&str], line: usize, sink: &mut dyn DiagnosticSink) {
    let mut negate = false;
    for arg in args {
        match arg.to_ascii_lowercase().as_str() {
            "not" => {
                negate = true;
                continue;
            }
            "splay" => flags.splay = !negate,
            "surface" => flags.surface = !negate,
            "duplicate" => flags.duplicate = !negate,
            other => sink.report(Diagnostic::warning(format!(
                "line {line}: unknown flag '{other}'"
            ))),
        }
        negate = false;
    }
}

fn build_leg(frame: &mut Frame, tokens: &[&str], line: usize) -> Result<Leg> {
    let from_name = tokens[0];
    let to_name = tokens[1];
    let length = parse_number(tokens[2], line)?;
    let bearing = parse_reading(tokens[3], line)?;
    let gradient = parse_reading(tokens[4], line)?;

    let from = Station::new(from_name).map_err(|_| {
        Error::parse(line, "empty from-station name")
    })?;
    let mut splay = frame.flags.splay;
    let to = if to_name == "-" || to_name == ".." || to_name == "..." {
        splay = true;
        frame.anon_counter += 1;
        Station::anonymous(format!("{from_name}-{}", frame.anon_counter))
            .expect("non-empty synthesized name")
    } else {
        Station::new(to_name).map_err(|_| Error::parse(line, "empty to-station name"))?
    };

    let mut leg = Leg::with_units(
        from,
        to,
        length,
        frame.length_unit,
        bearing,
        frame.bearing_unit,
        gradient,
        frame.gradient_unit,
    );
    let mut flags = frame.flags;
    flags.splay = splay;
    leg.set_flags(flags);
    Ok(leg)
}

/// Applies deferred per-frame state (fixes, entrances, equates) and returns
/// the finished series.
fn finish_frame(frame: Frame, sink: &mut dyn DiagnosticSink) -> Result<Series> {
    let Frame {
        mut series,
        equates,
        fixes,
        entrances,
        ..
    } = frame;

    for (name, point) in fixes {
        if !apply_to_station(&mut series, &name, |s| s.set_fixed(Some(point))) {
            sink.report(Diagnostic::warning(format!(
                "series '{}': *fix references unknown station '{name}'",
                series.name()
            )));
        }
    }
    for name in entrances {
        if !apply_to_station(&mut series, &name, |s| s.set_entrance(true)) {
            sink.report(Diagnostic::warning(format!(
                "series '{}': *entrance references unknown station '{name}'",
                series.name()
            )));
        }
    }
    for (path1, path2) in equates {
        place_equate(&mut series, &path1, &path2)?;
    }
    Ok(series)
}

/// Applies `edit` to the first occurrence of a station in the series'
/// direct legs. Returns false when the station does not occur.
fn apply_to_station(
    series: &mut Series,
    name: &str,
    edit: impl FnOnce(&mut Station),
) -> bool {
    for leg in series.legs_mut() {
        if leg.from().matches(name) {
            edit(leg.from_mut());
            return true;
        }
        if leg.to().matches(name) {
            edit(leg.to_mut());
            return true;
        }
    }
    false
}

/// Splits a dotted station path into (series path, station name).
fn split_station_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((series, station)) => (series, station),
        None => ("", path),
    }
}

/// Records an equate as a link in the nearest common ancestor reachable
/// from `series`: shared leading path segments are walked down while a
/// matching child exists, then the remaining relative paths name the two
/// sides.
fn place_equate(series: &mut Series, path1: &str, path2: &str) -> Result<()> {
    let (series_path1, station1) = split_station_path(path1);
    let (series_path2, station2) = split_station_path(path2);

    let segs1: Vec<&str> = series_path1.split('.').filter(|s| !s.is_empty()).collect();
    let segs2: Vec<&str> = series_path2.split('.').filter(|s| !s.is_empty()).collect();
    let shared = segs1
        .iter()
        .zip(&segs2)
        .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
        .count();

    let mut owner: &mut Series = series;
    let mut descended = 0usize;
    for seg in &segs1[..shared] {
        match owner.index_of_child(seg) {
            Some(index) => {
                owner = owner.inner_series_at_mut(index).expect("index from lookup");
                descended += 1;
            }
            None => break,
        }
    }

    let rel1 = segs1[descended..].join(".");
    let rel2 = segs2[descended..].join(".");
    let owner_name = owner.name().to_string();
    let name1 = if rel1.is_empty() { owner_name.clone() } else { rel1 };
    let name2 = if rel2.is_empty() { owner_name } else { rel2 };

    let link = SeriesLink::new(name1, Station::new(station1)?, name2, Station::new(station2)?);
    owner.add_link(link);
    Ok(())
}

// =============================================================================
// Writer
// =============================================================================

/// Writes a survey as nested Survex blocks.
pub fn write(survey: &Survey) -> String {
    let mut out = String::new();
    for series in survey.series() {
        write_series(&mut out, series, 0);
    }
    out
}

fn quoted(name: &str) -> String {
    if name.contains(' ') {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

fn write_series(out: &mut String, series: &Series, depth: usize) {
    let pad = "    ".repeat(depth);
    let inner_pad = "    ".repeat(depth + 1);
    out.push_str(&format!("{pad}*begin {}\n", quoted(series.name())));

    if let Some(date) = series.date() {
        out.push_str(&format!("{inner_pad}*date {date}\n"));
    }
    let calibration = series.calibration();
    for (quantity, value) in [
        ("tape", calibration.tape),
        ("compass", calibration.compass),
        ("clino", calibration.clino),
        ("declination", calibration.declination),
    ] {
        if value != 0.0 {
            out.push_str(&format!("{inner_pad}*calibrate {quantity} {}\n", fixed2(value)));
        }
    }

    // Fixed positions and entrances, first occurrence per station.
    for leg in series.legs() {
        for station in [leg.from(), leg.to()] {
            if let Some(point) = station.fixed() {
                out.push_str(&format!(
                    "{inner_pad}*fix {} {} {} {}\n",
                    quoted(station.name()),
                    fixed2(point.easting),
                    fixed2(point.northing),
                    fixed2(point.altitude)
                ));
            }
            if station.is_entrance() {
                out.push_str(&format!(
                    "{inner_pad}*entrance {}\n",
                    quoted(station.name())
                ));
            }
        }
    }

    let mut current = LegFlags::default();
    for leg in series.legs() {
        let target = leg.flags();
        if target != current {
            out.push_str(&format!("{inner_pad}*flags{}\n", flag_transition(current, target)));
            current = target;
        }
        let to_name = if leg.to().is_anonymous() {
            "-".to_string()
        } else {
            quoted(leg.to().name())
        };
        out.push_str(&format!(
            "{inner_pad}{} {} {} {} {}\n",
            quoted(leg.from().name()),
            to_name,
            fixed2(leg.length()),
            fixed2(leg.bearing()),
            fixed2(leg.gradient())
        ));
    }
    if current != LegFlags::default() {
        out.push_str(&format!(
            "{inner_pad}*flags{}\n",
            flag_transition(current, LegFlags::default())
        ));
    }

    for link in series.links() {
        let side = |series_name: &str, station: &Station| {
            if series_name.eq_ignore_ascii_case(series.name()) {
                quoted(station.name())
            } else {
                format!("{series_name}.{}", station.name())
            }
        };
        out.push_str(&format!(
            "{inner_pad}*equate {} {}\n",
            side(link.series1(), link.station1()),
            side(link.series2(), link.station2())
        ));
    }

    for child in series.inner_series() {
        write_series(out, child, depth + 1);
    }

    out.push_str(&format!("{pad}*end {}\n", quoted(series.name())));
}

fn flag_transition(current: LegFlags, target: LegFlags) -> String {
    let mut text = String::new();
    for (name, was, is) in [
        ("splay", current.splay, target.splay),
        ("duplicate", current.duplicate, target.duplicate),
        ("surface", current.surface, target.surface),
    ] {
        if is && !was {
            text.push_str(&format!(" {name}"));
        } else if was && !is {
            text.push_str(&format!(" not {name}"));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_lite_core::CollectingSink;

    #[test]
    fn tokenizer_handles_comments_and_quotes() {
        assert_eq!(
            tokenize("1 2 10.5 250 -5 ; wet crawl"),
            vec!["1", "2", "10.5", "250", "-5"]
        );
        assert_eq!(
            tokenize("*begin \"main passage\""),
            vec!["*begin", "main passage"]
        );
        assert!(tokenize("   ; only a comment").is_empty());
    }

    #[test]
    fn readings_accept_keywords() {
        assert_eq!(parse_reading("up", 1).unwrap(), 90.0);
        assert_eq!(parse_reading("D", 1).unwrap(), -90.0);
        assert_eq!(parse_reading("-", 1).unwrap(), 0.0);
        assert!(parse_reading("sideways", 1).is_err());
    }

    #[test]
    fn station_paths_split_at_last_dot() {
        assert_eq!(split_station_path("passage2.5"), ("passage2", "5"));
        assert_eq!(split_station_path("a.b.3"), ("a.b", "3"));
        assert_eq!(split_station_path("12"), ("", "12"));
    }

    #[test]
    fn unbalanced_blocks_fail() {
        let mut sink = CollectingSink::new();
        assert!(parse("*begin cave\n1 2 5.0 100 0\n", &mut sink).is_err());
        assert!(parse("*end cave\n", &mut sink).is_err());
    }
}
