// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `cavelite`: command-line cave survey format converter.
//!
//! Pipeline per invocation: read the input file, parse it into the survey
//! model, run the requested transforms (path splitting, linearization,
//! LRUD generation), then write the output format. Diagnostics stream to
//! the log as they are produced.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use cave_lite_core::{Diagnostic, DiagnosticSink, Severity};
use cave_lite_formats::Format;
use cave_lite_processing::{
    generate_lrud, linearize_survey, split_survey_by_full_path_names, LrudOptions,
};

/// Convert cave survey data between text formats.
#[derive(Parser, Debug)]
#[command(name = "cavelite", version, about = "Cave survey format converter")]
struct Cli {
    /// Input survey file
    input: PathBuf,

    /// Output survey file
    output: PathBuf,

    /// Input format (inferred from the input extension when omitted)
    #[arg(long)]
    from: Option<String>,

    /// Output format (inferred from the output extension when omitted)
    #[arg(long)]
    to: Option<String>,

    /// Split flat series along dotted station names before converting
    #[arg(long)]
    split_paths: bool,

    /// Restructure each series into simple chains (implied by Toporobot
    /// output)
    #[arg(long)]
    linearize: bool,

    /// Generate Left/Right/Up/Down data from splay shots
    #[arg(long)]
    lrud: bool,

    /// Drop splay shots after LRUD generation
    #[arg(long, requires = "lrud")]
    remove_splays: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Forwards diagnostics to the log at their severity.
struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => info!("{}", diagnostic.message),
            Severity::Warning => warn!("{}", diagnostic.message),
            Severity::Error => error!("{}", diagnostic.message),
        }
    }
}

fn resolve_format(explicit: Option<&str>, path: &Path) -> Result<Format> {
    match explicit {
        Some(name) => Ok(Format::from_name(name)?),
        None => Format::from_path(path)
            .with_context(|| format!("cannot infer format of {}", path.display())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();

    let from = resolve_format(cli.from.as_deref(), &cli.input)?;
    let to = resolve_format(cli.to.as_deref(), &cli.output)?;
    if !from.can_parse() {
        bail!("{} files cannot be read", from.name());
    }
    if !to.can_write() {
        bail!("{} files cannot be written", to.name());
    }

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let mut sink = LogSink;
    let mut survey = cave_lite_formats::parse(from, &content, &mut sink)
        .with_context(|| format!("parsing {}", cli.input.display()))?;
    info!(
        "parsed {}: {} series, {} legs",
        cli.input.display(),
        survey.total_series_count(),
        survey.total_leg_count()
    );

    if cli.split_paths {
        if split_survey_by_full_path_names(&mut survey, &mut sink) {
            info!("split series by station name paths");
        }
    }
    if cli.lrud {
        generate_lrud(
            &mut survey,
            &LrudOptions {
                remove_splays: cli.remove_splays,
            },
        );
    }
    if cli.linearize || to == Format::Toporobot {
        linearize_survey(&mut survey, &mut sink)?;
    }

    let output = cave_lite_formats::write(to, &survey, &mut sink)
        .with_context(|| format!("writing {} output", to.name()))?;
    std::fs::write(&cli.output, output)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    info!(
        "wrote {}: {} series, {} legs, {} links",
        cli.output.display(),
        survey.total_series_count(),
        survey.total_leg_count(),
        survey.total_link_count()
    );
    Ok(())
}
