// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # cave-lite Core Model
//!
//! The cave survey network model shared by all format adapters and
//! processing algorithms.
//!
//! ## Overview
//!
//! A [`Survey`] owns an ordered set of top-level [`Series`]. Each series
//! owns its legs, its child series (the containment tree, acyclic by
//! construction), and the [`SeriesLink`]s that equate stations across
//! series. Stations are value types identified by case-insensitive name;
//! physical connectivity is carried by shared names and links, never by
//! shared references, so the survey *graph* may loop while the containment
//! *tree* cannot.
//!
//! ## Quick Start
//!
//! ```
//! use cave_lite_core::{Leg, Series, Station, Survey};
//!
//! let mut series = Series::new("entrance");
//! series.add_leg(Leg::new(
//!     Station::new("1")?,
//!     Station::new("2")?,
//!     9.75,   // metres
//!     231.5,  // degrees
//!     -12.0,  // degrees
//! ));
//!
//! let mut survey = Survey::new();
//! survey.add_series(series);
//! assert_eq!(survey.total_leg_count(), 1);
//! # Ok::<(), cave_lite_core::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for the model types

pub mod diagnostics;
pub mod error;
pub mod leg;
pub mod series;
pub mod station;
pub mod survey;
pub mod tree;
pub mod units;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, NullSink, Severity};
pub use error::{Error, Result};
pub use leg::{Leg, LegFlags, Lrud};
pub use series::{Calibration, Series, SeriesLink};
pub use station::{FixedPoint, Station};
pub use survey::Survey;
pub use tree::{SurveyTree, TreeNode};
pub use units::{
    normalize_degrees, BearingUnit, GradientUnit, LengthUnit, GRADS_PER_DEGREE,
    METRES_PER_FOOT, METRES_PER_YARD, MINUTES_PER_DEGREE,
};
