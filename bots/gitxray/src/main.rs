// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! gitxray CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use gitxray::cli::{Cli, Command};
use gitxray::config::{default_config_path, load_config, Config};
use gitxray::definitions::PlatformKeys;
use gitxray::github::Dossier;
use gitxray::{inspect_artifact, scan_dossier, ScanOptions};
use gitxray_shared_context::{append_report, ReportOptions, ScanContext};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    match cli.command {
        Command::Scan {
            ref dossiers,
            ref contributors,
            ref filters,
            ref out,
        } => {
            let report = report_options(&cli, &config, filters, out.is_some());
            let out = out.clone().or_else(|| config.output.clone());
            cmd_scan(dossiers, contributors, &config, &report, out.as_deref())
        }
        Command::Inspect { ref file } => cmd_inspect(file),
    }
}

/// Merge command-line flags over the config file
fn report_options(cli: &Cli, config: &Config, filters: &[String], to_file: bool) -> ReportOptions {
    let filters = if filters.is_empty() {
        config.filters.clone()
    } else {
        filters.to_vec()
    };
    let to_file = to_file || config.output.is_some();
    ReportOptions {
        format: cli.format.map(Into::into).unwrap_or(config.format),
        verbose: cli.verbose >= 1 || config.verbose,
        debug: cli.verbose >= 2 || config.debug,
        filters,
        ansi: !to_file && std::io::stdout().is_terminal(),
    }
}

/// X-ray each dossier in turn, one report per repository.
fn cmd_scan(
    dossiers: &[PathBuf],
    contributors: &[String],
    config: &Config,
    report: &ReportOptions,
    out: Option<&Path>,
) -> Result<ExitCode> {
    let options = ScanOptions {
        platform_keys: PlatformKeys::new(&config.extra_platform_keys),
        ..ScanOptions::default()
    };
    let mut ctx = ScanContext::new().with_contributor_scope(contributors.to_vec());
    let mut skipped = 0usize;

    for path in dossiers {
        let dossier = match Dossier::load(path) {
            Ok(dossier) => dossier,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        if let Err(e) = scan_dossier(&mut ctx, &dossier, &options) {
            tracing::warn!("Skipping {}: {}", dossier.repository.full_name, e);
            skipped += 1;
            continue;
        }

        let rendered = ctx.generate_report(report);
        match out {
            Some(file) => append_report(file, &rendered)
                .with_context(|| format!("Failed to write report to {}", file.display()))?,
            None => println!("{}", rendered),
        }
        tracing::info!(summary = ?ctx.summary(), "scan complete");
    }

    if skipped > 0 {
        tracing::warn!("{} of {} targets skipped", skipped, dossiers.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the parsed attributes of one artifact as JSON.
fn cmd_inspect(file: &Path) -> Result<ExitCode> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    match inspect_artifact(&content) {
        Some(artifact) => {
            let json = serde_json::to_string_pretty(&artifact)
                .context("Failed to serialize artifact")?;
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No signature, key block or key line found in {}", file.display());
            Ok(ExitCode::FAILURE)
        }
    }
}
