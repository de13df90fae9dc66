// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end conversion scenarios across parser, transforms and writer.

use approx::assert_relative_eq;
use cave_lite_core::{CollectingSink, Severity};
use cave_lite_formats::{parse, write, Format};
use cave_lite_processing::{
    generate_lrud, linearize_survey, split_survey_by_full_path_names, LrudOptions,
};

const NESTED_SVX: &str = "\
*begin yellow
*date 2012.07.07
*calibrate declination 2.10
*begin entrance
1 2 9.75 231.50 -12.00
2 3 4.20 181.00 -2.50
*flags splay
3 - 1.50 270.00 0.00
*flags not splay
*end entrance
*begin sump
1 2 12.00 45.00 0.00
*end sump
*equate entrance.3 sump.1
*end yellow
";

#[test]
fn survex_parse_reads_structure() {
    let mut sink = CollectingSink::new();
    let survey = parse(Format::Survex, NESTED_SVX, &mut sink).unwrap();

    assert_eq!(survey.series_count(), 1);
    let yellow = survey.series_at(0).unwrap();
    assert_eq!(yellow.name(), "yellow");
    assert_eq!(yellow.date(), Some("2012.07.07"));
    assert_relative_eq!(yellow.calibration().declination, 2.1);
    assert_eq!(yellow.inner_series_count(), 2);

    let entrance = yellow.inner_series_at(0).unwrap();
    assert_eq!(entrance.leg_count(), 3);
    assert!(entrance.legs()[2].is_splay());
    assert!(entrance.legs()[2].to().is_anonymous());

    // The equate lives in the common ancestor and names both children.
    assert_eq!(yellow.links().len(), 1);
    let link = &yellow.links()[0];
    assert_eq!(link.series1(), "entrance");
    assert_eq!(link.station1().name(), "3");
    assert_eq!(link.series2(), "sump");
    assert_eq!(link.station2().name(), "1");

    assert_eq!(sink.count_at_least(Severity::Warning), 0);
}

#[test]
fn survex_round_trip_is_stable() {
    let mut sink = CollectingSink::new();
    let survey = parse(Format::Survex, NESTED_SVX, &mut sink).unwrap();
    let written = write(Format::Survex, &survey, &mut sink).unwrap();

    // Writing is deterministic, and the written form re-parses to the same
    // model.
    assert_eq!(written, write(Format::Survex, &survey, &mut sink).unwrap());
    let reparsed = parse(Format::Survex, &written, &mut sink).unwrap();
    assert_eq!(reparsed.series(), survey.series());
    let rewritten = write(Format::Survex, &reparsed, &mut sink).unwrap();
    assert_eq!(written, rewritten);
}

#[test]
fn survex_writer_emits_expected_rows() {
    let mut sink = CollectingSink::new();
    let survey = parse(Format::Survex, NESTED_SVX, &mut sink).unwrap();
    let written = write(Format::Survex, &survey, &mut sink).unwrap();

    assert!(written.contains("*begin yellow\n"));
    assert!(written.contains("    *calibrate declination 2.10\n"));
    assert!(written.contains("        1 2 9.75 231.50 -12.00\n"));
    assert!(written.contains("        *flags splay\n"));
    assert!(written.contains("        3 - 1.50 270.00 0.00\n"));
    assert!(written.contains("    *equate entrance.3 sump.1\n"));
    assert!(written.ends_with("*end yellow\n"));
}

const POCKETTOPO_EXPORT: &str = "TRIP\n\
DATE 2012/07/07\n\
DECLINATION 0.00\n\
DATA\n\
1.0\t1.1\t10.000\t0.00\t0.00\n\
1.1\t\t1.500\t270.00\t0.00\n\
1.1\t\t0.800\t90.00\t0.00\n\
1.1\t1.2\t8.000\t0.00\t0.00\n\
1.2\t2.0\t3.000\t45.00\t0.00\n\
2.0\t2.1\t6.000\t90.00\t0.00\n";

#[test]
fn pockettopo_to_survex_pipeline() {
    let mut sink = CollectingSink::new();
    let mut survey = parse(Format::PocketTopo, POCKETTOPO_EXPORT, &mut sink).unwrap();

    assert!(split_survey_by_full_path_names(&mut survey, &mut sink));
    generate_lrud(&mut survey, &LrudOptions::default());
    linearize_survey(&mut survey, &mut sink).unwrap();

    // Trip split into numbered series 1 and 2; the 1.2 -> 2.0 leg stays as
    // an unresolved cross-series reference inside series 1.
    let root = survey.series_at(0).unwrap();
    let trip = root.inner_series_at(0).unwrap();
    assert_eq!(trip.inner_series_count(), 2);

    // The leg before the splays picked up the corridor widths.
    let one = trip.inner_series_at(trip.index_of_child("1").unwrap()).unwrap();
    let wide = one
        .legs()
        .iter()
        .find(|l| l.from().matches("1") && !l.is_splay())
        .expect("leg 1 -> 2");
    assert_relative_eq!(wide.lrud().left, 1.5);
    assert_relative_eq!(wide.lrud().right, 0.8);

    let written = write(Format::Survex, &survey, &mut sink).unwrap();
    assert!(written.contains("*begin trip1"));
    // Splays come out as anonymous stations again.
    assert!(written.contains(" - "));
}

#[test]
fn compass_write_needs_no_linearization_but_toporobot_does() {
    let mut sink = CollectingSink::new();
    let survey = parse(Format::Survex, NESTED_SVX, &mut sink).unwrap();

    assert!(write(Format::Compass, &survey, &mut sink).is_ok());
    assert!(write(Format::Toporobot, &survey, &mut sink).is_ok());

    // A branching series is representable in Compass but not Toporobot.
    let branching = "*begin t\n1 2 5.0 0 0\n2 3 5.0 90 0\n2 4 5.0 180 0\n*end t\n";
    let survey = parse(Format::Survex, branching, &mut sink).unwrap();
    assert!(write(Format::Compass, &survey, &mut sink).is_ok());
    assert!(write(Format::Toporobot, &survey, &mut sink).is_err());
}

#[test]
fn dxf_to_compass_conversion() {
    let dxf = "0\nPOLYLINE\n\
0\nVERTEX\n10\n0.0\n20\n0.0\n30\n0.0\n\
0\nVERTEX\n10\n0.0\n20\n10.0\n30\n0.0\n\
0\nVERTEX\n10\n10.0\n20\n10.0\n30\n-5.0\n\
0\nSEQEND\n0\nEOF\n";
    let mut sink = CollectingSink::new();
    let survey = parse(Format::Dxf, dxf, &mut sink).unwrap();
    let written = write(Format::Compass, &survey, &mut sink).unwrap();

    // 10 m due north = 32.81 ft at bearing 0.
    assert!(written.contains("32.81"));
    assert!(written.contains("0.00"));
    // Two writes, identical bytes.
    assert_eq!(written, write(Format::Compass, &survey, &mut sink).unwrap());
}
