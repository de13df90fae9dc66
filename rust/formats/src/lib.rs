// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # cave-lite Format Adapters
//!
//! Readers and writers for the survey text formats cave-lite converts
//! between. Every adapter speaks only the [`cave_lite_core`] model API:
//! parsers build a [`Survey`], writers walk one. The restructuring passes
//! between parse and write live in `cave-lite-processing`.
//!
//! | format | read | write |
//! |-----------|------|-------|
//! | Survex    | yes  | yes   |
//! | Compass   | yes  | yes   |
//! | PocketTopo| yes  | no    |
//! | DXF       | yes  | no    |
//! | Toporobot | no   | yes   |
//!
//! Writers are deterministic: output is a pure function of the model, with
//! all numeric formatting funnelled through [`fmtnum`].

pub mod compass;
pub mod dxf;
pub mod error;
pub mod fmtnum;
pub mod pockettopo;
pub mod survex;
pub mod toporobot;

use std::path::Path;

use cave_lite_core::{DiagnosticSink, Survey};

pub use error::{Error, Result};

/// The survey file formats cave-lite understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Survex,
    Compass,
    PocketTopo,
    Dxf,
    Toporobot,
}

impl Format {
    /// All formats, in display order.
    pub const ALL: [Format; 5] = [
        Format::Survex,
        Format::Compass,
        Format::PocketTopo,
        Format::Dxf,
        Format::Toporobot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Format::Survex => "survex",
            Format::Compass => "compass",
            Format::PocketTopo => "pockettopo",
            Format::Dxf => "dxf",
            Format::Toporobot => "toporobot",
        }
    }

    /// Resolves a format by name.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| Error::UnknownFormat(name.to_string()))
    }

    /// Infers a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "svx" => Ok(Format::Survex),
            "dat" => Ok(Format::Compass),
            "txt" => Ok(Format::PocketTopo),
            "dxf" => Ok(Format::Dxf),
            "text" => Ok(Format::Toporobot),
            other => Err(Error::UnknownFormat(format!(
                "{} (extension '.{other}')",
                path.display()
            ))),
        }
    }

    pub fn can_parse(self) -> bool {
        !matches!(self, Format::Toporobot)
    }

    pub fn can_write(self) -> bool {
        matches!(self, Format::Survex | Format::Compass | Format::Toporobot)
    }
}

/// Parses survey text in the given format.
pub fn parse(
    format: Format,
    content: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<Survey> {
    match format {
        Format::Survex => survex::parse(content, sink),
        Format::Compass => compass::parse(content, sink),
        Format::PocketTopo => pockettopo::parse(content, sink),
        Format::Dxf => dxf::parse(content, sink),
        Format::Toporobot => Err(Error::UnsupportedDirection("toporobot")),
    }
}

/// Writes a survey as text in the given format.
pub fn write(
    format: Format,
    survey: &Survey,
    sink: &mut dyn DiagnosticSink,
) -> Result<String> {
    match format {
        Format::Survex => Ok(survex::write(survey)),
        Format::Compass => compass::write(survey, sink),
        Format::Toporobot => toporobot::write(survey, sink),
        Format::PocketTopo => Err(Error::UnsupportedDirection("pockettopo")),
        Format::Dxf => Err(Error::UnsupportedDirection("dxf")),
    }
}
