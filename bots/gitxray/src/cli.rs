// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! CLI Interface for gitxray.
//!
//! Subcommands:
//! - `scan <dossier>...` x-ray one or more repository dossiers
//! - `inspect <file>` parse a single signature, key block or key line

use clap::{Parser, Subcommand};
use gitxray_shared_context::ReportFormat;
use std::path::PathBuf;

/// gitxray: cryptographic identity fingerprinting for GitHub contributors
///
/// Extracts key IDs, algorithms, timestamps and armor headers from commit
/// signatures and published keys, then reports identifiers shared across
/// contributor accounts.
#[derive(Parser, Debug)]
#[command(name = "gitxray")]
#[command(version)]
#[command(about = "Cryptographic identity fingerprinting for GitHub contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v shows verbose results, -vv debug results).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format (text, json). Overrides the config file.
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Config file (default: .gitxray/config.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for programmatic consumption.
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// X-ray repository dossiers, one report per dossier.
    Scan {
        /// Dossier JSON files.
        #[arg(required = true)]
        dossiers: Vec<PathBuf>,

        /// Only analyze these contributor logins.
        #[arg(long = "contributor", value_delimiter = ',')]
        contributors: Vec<String>,

        /// Keep only result lines containing one of these keywords.
        #[arg(long = "filter", value_delimiter = ',')]
        filters: Vec<String>,

        /// Append reports to this file instead of printing them.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Parse one armored signature, key block or SSH key line.
    Inspect {
        /// File holding the artifact.
        file: PathBuf,
    },
}
