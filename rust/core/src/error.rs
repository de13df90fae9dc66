// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the survey model.

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or editing the survey model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A station was given an empty or whitespace-only name.
    #[error("station name is empty")]
    EmptyStationName,

    /// A leg index was out of range for the series.
    #[error("leg index {index} out of range: series has {count} legs")]
    LegIndexOutOfRange { index: usize, count: usize },

    /// An inner-series index was out of range for the series.
    #[error("series index {index} out of range: {count} inner series present")]
    SeriesIndexOutOfRange { index: usize, count: usize },
}
