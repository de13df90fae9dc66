// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # cave-lite Processing
//!
//! The restructuring algorithms that turn parsed survey data into the
//! canonical form the writers need:
//!
//! - **Linearization**: decompose an arbitrary leg graph into a tree of
//!   simple chains plus loop-closure links ([`linearize_series`],
//!   [`linearize_survey`]).
//! - **Full-path splitting**: materialize the series hierarchy encoded in
//!   dotted station names ([`split_by_full_path_names`]).
//! - **LRUD generation**: derive corridor dimensions from splay shots
//!   ([`generate_lrud`]).
//! - **Short names**: run-scoped, collision-avoiding 4-character series
//!   identifiers ([`ShortNameGenerator`], [`SeriesShortNames`]).
//!
//! All operations are synchronous, single-threaded transforms over one
//! in-memory [`cave_lite_core::Survey`]; repeated application of any of
//! them to an already-canonical survey is a no-op.

mod arena;
pub mod error;
pub mod linearize;
pub mod lrud;
pub mod pathsplit;
pub mod shortname;

pub use error::{Error, Result};
pub use linearize::{linearize_series, linearize_survey};
pub use lrud::{generate_lrud, LrudOptions};
pub use pathsplit::{split_by_full_path_names, split_survey_by_full_path_names};
pub use shortname::{SeriesShortNames, ShortNameGenerator, SHORT_NAME_LEN};
