// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for format adapters.

/// Result type alias for format operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or writing survey files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A line could not be decoded. Parsers fail fast on structurally
    /// invalid rows rather than building a corrupt tree.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The requested format is not recognized.
    #[error("unknown survey format: {0}")]
    UnknownFormat(String),

    /// The format cannot parse, or cannot write, survey data.
    #[error("format {0} does not support this direction")]
    UnsupportedDirection(&'static str),

    /// The writer requires every series to be a simple chain.
    #[error("writer requires a linearized survey: series '{0}' is not a simple chain")]
    NotLinear(String),

    /// A model edit failed while building the survey.
    #[error(transparent)]
    Model(#[from] cave_lite_core::Error),

    /// A processing step invoked by a writer failed (e.g. short-name
    /// exhaustion).
    #[error(transparent)]
    Processing(#[from] cave_lite_processing::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
