// Command-line arguments and their merge with the loaded config.

use std::path::PathBuf;

use clap::Parser;
use hoopledger_core::ReportScope;

use crate::config::Config;
use crate::ingest::ReadOptions;
use crate::output::OutputFormat;

/// Merge per-season player stat lines into one ordered ledger and report the
/// all-time leaders at every season boundary.
#[derive(Debug, Parser)]
#[command(name = "hoopledger", version, about)]
pub struct Cli {
    /// Input file with rows of season,name,team,rebounds,assists,points.
    /// Falls back to the configured input path.
    pub input: Option<PathBuf>,

    /// Config file to load instead of searching config/ and the user config dir.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Players listed per snapshot: `all`, or only those seen in the closing `season`.
    #[arg(long)]
    pub scope: Option<ReportScope>,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report here instead of the configured target (`-` for stdout).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Abort on the first malformed row instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

/// Everything a run needs, after command-line overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub input: PathBuf,
    /// True when no input was given on the command line.
    pub input_defaulted: bool,
    pub read: ReadOptions,
    pub scope: ReportScope,
    pub format: OutputFormat,
    pub output: String,
}

impl Cli {
    pub fn settings(&self, config: &Config) -> RunSettings {
        let mut read = ReadOptions::from(&config.input);
        read.strict |= self.strict;

        RunSettings {
            input: self
                .input
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.input.path)),
            input_defaulted: self.input.is_none(),
            read,
            scope: self.scope.unwrap_or(config.report.scope),
            format: self.format.unwrap_or(config.report.format),
            output: self
                .output
                .clone()
                .unwrap_or_else(|| config.report.output.clone()),
        }
    }
}
