// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DXF centreline reader.
//!
//! Survey packages export cave centrelines as `POLYLINE`/`VERTEX` entity
//! streams. A DXF file is a flat sequence of (group code, value) line
//! pairs; codes 10/20/30 carry X/Y/Z on a `VERTEX`. Each polyline becomes
//! a series, and each pair of consecutive vertices becomes a leg whose
//! tape/compass/clino values are recovered from the coordinate deltas —
//! the inverse of the usual survey reduction.

use cave_lite_core::{normalize_degrees, Diagnostic, DiagnosticSink, Leg, Series, Station, Survey};
use tracing::debug;

use crate::error::{Error, Result};

/// Name given to the root series wrapping all polylines.
const ROOT_NAME: &str = "dxf";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
    z: f64,
}

/// Parses DXF text into a survey of one series per polyline.
pub fn parse(content: &str, sink: &mut dyn DiagnosticSink) -> Result<Survey> {
    let mut lines = content.lines().enumerate();
    let mut polylines: Vec<Vec<Point>> = Vec::new();
    let mut current: Option<Vec<Point>> = None;
    let mut vertex: Option<Point> = None;

    while let Some((index, code_line)) = lines.next() {
        let line = index + 1;
        let Some((_, value_line)) = lines.next() else {
            return Err(Error::parse(line, "dangling group code at end of file"));
        };
        let code: i32 = code_line
            .trim()
            .parse()
            .map_err(|_| Error::parse(line, format!("bad group code '{}'", code_line.trim())))?;
        let value = value_line.trim();

        match (code, value) {
            (0, "POLYLINE") => {
                flush_vertex(&mut current, &mut vertex);
                if let Some(done) = current.take() {
                    polylines.push(done);
                }
                current = Some(Vec::new());
            }
            (0, "VERTEX") => {
                flush_vertex(&mut current, &mut vertex);
                if current.is_none() {
                    sink.report(Diagnostic::warning(format!(
                        "line {line}: VERTEX outside POLYLINE ignored"
                    )));
                } else {
                    vertex = Some(Point {
                        x: 0.0,
                        y: 0.0,
                        z: 0.0,
                    });
                }
            }
            (0, "SEQEND") => {
                flush_vertex(&mut current, &mut vertex);
                if let Some(done) = current.take() {
                    polylines.push(done);
                }
            }
            (10, _) | (20, _) | (30, _) => {
                if let Some(point) = vertex.as_mut() {
                    let coordinate: f64 = fast_float::parse(value).map_err(|_| {
                        Error::parse(line, format!("bad coordinate '{value}'"))
                    })?;
                    match code {
                        10 => point.x = coordinate,
                        20 => point.y = coordinate,
                        _ => point.z = coordinate,
                    }
                }
            }
            _ => {}
        }
    }
    flush_vertex(&mut current, &mut vertex);
    if let Some(done) = current.take() {
        polylines.push(done);
    }

    let mut root = Series::new(ROOT_NAME);
    for (number, points) in polylines.iter().enumerate() {
        if points.len() < 2 {
            sink.report(Diagnostic::warning(format!(
                "polyline {} has fewer than 2 vertices, skipped",
                number + 1
            )));
            continue;
        }
        let mut series = Series::new(format!("line{}", number + 1));
        for (station, pair) in points.windows(2).enumerate() {
            series.add_leg(leg_between(number + 1, station, pair[0], pair[1])?);
        }
        root.add_inner_series(series);
    }

    if root.inner_series_count() == 0 {
        sink.report(Diagnostic::warning("dxf file contains no centreline polylines"));
    }
    debug!(polylines = root.inner_series_count(), legs = root.total_leg_count(), "parsed dxf file");
    let mut survey = Survey::new();
    survey.add_series(root);
    Ok(survey)
}

fn flush_vertex(current: &mut Option<Vec<Point>>, vertex: &mut Option<Point>) {
    if let (Some(points), Some(point)) = (current.as_mut(), vertex.take()) {
        points.push(point);
    }
}

/// Recovers tape/compass/clino from a coordinate delta. Bearings are
/// measured clockwise from grid north (+Y).
fn leg_between(polyline: usize, station: usize, a: Point, b: Point) -> Result<Leg> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    let horizontal = (dx * dx + dy * dy).sqrt();
    let length = (horizontal * horizontal + dz * dz).sqrt();
    let bearing = if horizontal == 0.0 {
        0.0
    } else {
        normalize_degrees(dx.atan2(dy).to_degrees())
    };
    let gradient = if length == 0.0 {
        0.0
    } else {
        dz.atan2(horizontal).to_degrees()
    };

    Ok(Leg::new(
        Station::new(format!("{polyline}.{station}"))?,
        Station::new(format!("{polyline}.{}", station + 1))?,
        length,
        bearing,
        gradient,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cave_lite_core::CollectingSink;

    fn dxf_for(points: &[(f64, f64, f64)]) -> String {
        let mut out = String::from("0\nSECTION\n0\nPOLYLINE\n");
        for (x, y, z) in points {
            out.push_str(&format!("0\nVERTEX\n10\n{x}\n20\n{y}\n30\n{z}\n"));
        }
        out.push_str("0\nSEQEND\n0\nEOF\n");
        out
    }

    #[test]
    fn recovers_measurements_from_deltas() {
        // 30 m east, then 40 m up at a point due north.
        let text = dxf_for(&[
            (100.0, 200.0, 50.0),
            (130.0, 200.0, 50.0),
            (130.0, 230.0, 90.0),
        ]);
        let mut sink = CollectingSink::new();
        let survey = parse(&text, &mut sink).unwrap();
        let line = survey.series_at(0).unwrap().inner_series_at(0).unwrap();
        assert_eq!(line.leg_count(), 2);

        let east = &line.legs()[0];
        assert_relative_eq!(east.length(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(east.bearing(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(east.gradient(), 0.0, epsilon = 1e-9);
        assert_eq!(east.from().name(), "1.0");
        assert_eq!(east.to().name(), "1.1");

        let climb = &line.legs()[1];
        assert_relative_eq!(climb.length(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(climb.bearing(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(climb.gradient(), 53.130102354, epsilon = 1e-6);
    }

    #[test]
    fn multiple_polylines_become_series() {
        let mut text = dxf_for(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]);
        text.push_str(&dxf_for(&[(5.0, 5.0, 0.0), (5.0, 9.0, 0.0)]));
        let mut sink = CollectingSink::new();
        let survey = parse(&text, &mut sink).unwrap();
        let root = survey.series_at(0).unwrap();
        assert_eq!(root.inner_series_count(), 2);
        assert_eq!(root.inner_series_at(1).unwrap().name(), "line2");
        assert_relative_eq!(
            root.inner_series_at(1).unwrap().legs()[0].length(),
            4.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn truncated_pairs_fail() {
        let mut sink = CollectingSink::new();
        assert!(parse("0\nPOLYLINE\n10\n", &mut sink).is_err());
    }
}
