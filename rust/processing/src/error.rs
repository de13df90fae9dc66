// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for survey restructuring.

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during survey restructuring.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A leg references a station name that cannot be resolved.
    #[error("leg references unresolvable station: {0}")]
    MalformedStationReference(String),

    /// Every short-name candidate for a series was already taken. Fatal for
    /// the current write run: the target format cannot represent the
    /// dataset.
    #[error("short name candidates exhausted for series '{0}'")]
    ShortNameExhausted(String),

    /// A model edit failed.
    #[error(transparent)]
    Model(#[from] cave_lite_core::Error),
}
