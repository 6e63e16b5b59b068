// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Report rendering
//!
//! Renders the findings of a [`ScanContext`] as text (terminal or file) or
//! JSON. Rendering applies the visibility tiers and keyword filters; the
//! context itself is left untouched so callers decide when to reset it.

use crate::context::ScanContext;
use crate::finding::{Finding, Subject};
use crate::Result;
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Width of the `#` separator lines in text output
pub const SCREEN_SEPARATOR_LENGTH: usize = 100;

const CATEGORY_PALETTE: [Color; 9] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::BrightRed,
    Color::BrightGreen,
    Color::BrightMagenta,
    Color::BrightCyan,
];

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// How findings are rendered
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// Show verbose-tier findings
    pub verbose: bool,
    /// Show debug-tier findings (implies verbose)
    pub debug: bool,
    /// Keep only lines containing one of these keywords (case-insensitive)
    pub filters: Vec<String>,
    /// Emit ANSI colours in text output
    pub ansi: bool,
}

impl ReportOptions {
    fn shows(&self, finding: &Finding) -> bool {
        finding.visibility.is_shown(self.verbose, self.debug)
    }

    fn passes_filters(&self, line: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let line = line.to_lowercase();
        self.filters.iter().any(|f| line.contains(&f.to_lowercase()))
    }
}

impl ScanContext {
    /// Render the current findings
    pub fn generate_report(&self, options: &ReportOptions) -> String {
        match options.format {
            ReportFormat::Text => self.format_text(options),
            ReportFormat::Json => {
                serde_json::to_string_pretty(&self.build_json(options)).unwrap_or_default()
            }
        }
    }

    fn visible_findings<'a>(&'a self, options: &'a ReportOptions) -> impl Iterator<Item = &'a Finding> {
        self.findings().findings.iter().filter(move |f| options.shows(f))
    }

    fn format_text(&self, options: &ReportOptions) -> String {
        let width = self
            .visible_findings(options)
            .map(|f| f.category.len())
            .max()
            .unwrap_or(0)
            + 3;

        let subjects = self.findings().subjects();
        let repositories: Vec<&Subject> = subjects
            .iter()
            .copied()
            .filter(|s| matches!(s, Subject::Repository(_)))
            .collect();
        let accounts: Vec<&Subject> = subjects
            .iter()
            .copied()
            .filter(|s| matches!(s, Subject::Account(_)))
            .collect();
        let anonymous: Vec<&Subject> = subjects
            .iter()
            .copied()
            .filter(|s| matches!(s, Subject::Anonymous(_)))
            .collect();

        let mut output = String::new();
        output.push_str(&self.format_group(&repositories, "Repository", width, options));
        output.push_str(&self.format_group(&accounts, "account", width, options));
        if anonymous.is_empty() {
            output.push_str(&separator());
        } else {
            output.push_str(&self.format_group(&anonymous, "Anonymous", width, options));
        }
        output
    }

    fn format_group(
        &self,
        subjects: &[&Subject],
        label: &str,
        width: usize,
        options: &ReportOptions,
    ) -> String {
        let mut output = String::new();
        let mut no_results = Vec::new();

        for subject in subjects {
            let lines = self.subject_lines(subject, width, options);

            if !lines.is_empty() {
                output.push_str(&separator());
                let found = if options.ansi {
                    "Found results".green().to_string()
                } else {
                    "Found results".to_string()
                };
                output.push_str(&format!("{} for {}.", found, subject));
                if options.filters.is_empty() {
                    output.push('\n');
                } else {
                    output.push_str(&format!(" Filters applied: {:?}\n", options.filters));
                }
                for line in lines {
                    output.push_str(&line);
                }
            } else if options.verbose || options.debug {
                output.push_str(&separator());
                output.push_str(&format!("No results to show for {}.", subject));
                if !options.filters.is_empty() {
                    output.push_str(" Try removing filters.");
                }
                output.push('\n');
            } else {
                no_results.push(subject.name().to_string());
            }
        }

        if !no_results.is_empty() {
            output.push_str(&separator());
            output.push_str(&format!("No results found for {} {}.\n", label, no_results.join(",")));
        }

        output
    }

    /// Lines for one subject, grouped by category in first-logged order
    fn subject_lines(&self, subject: &Subject, width: usize, options: &ReportOptions) -> Vec<String> {
        let findings: Vec<&Finding> = self
            .visible_findings(options)
            .filter(|f| &f.subject == subject)
            .collect();

        let mut categories: Vec<&str> = Vec::new();
        for finding in &findings {
            if !categories.contains(&finding.category.as_str()) {
                categories.push(&finding.category);
            }
        }

        let mut lines = Vec::new();
        for category in categories {
            let label = format!("{:<width$}", format!("[{}]:", category), width = width);
            for finding in findings.iter().filter(|f| f.category == category) {
                let plain = format!("{} {}", label, finding.message);
                if !options.passes_filters(&plain) {
                    continue;
                }
                if options.ansi {
                    lines.push(format!(
                        "{} {}\n",
                        label.color(category_color(category, subject)),
                        finding.message
                    ));
                } else {
                    lines.push(format!("{}\n", plain));
                }
            }
        }
        lines
    }

    fn build_json(&self, options: &ReportOptions) -> Value {
        let repository_name = self.repository().unwrap_or_default().to_string();
        let mut results = Map::new();
        let mut contributors: Vec<Value> = Vec::new();
        let mut anonymous: Vec<Value> = Vec::new();

        for subject in self.findings().subjects() {
            let mut grouped = Map::new();
            for finding in self
                .visible_findings(options)
                .filter(|f| &f.subject == subject)
                .filter(|f| options.passes_filters(&f.message))
            {
                let entry = grouped
                    .entry(finding.category.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(messages) = entry {
                    messages.push(Value::String(finding.message.clone()));
                }
            }

            match subject {
                Subject::Repository(_) => results.extend(grouped),
                Subject::Account(login) => {
                    contributors.push(json!({ "name": login, "results": grouped }));
                }
                Subject::Anonymous(_) => anonymous.push(Value::Object(grouped)),
            }
        }

        json!({
            "repositories": [{
                "name": repository_name,
                "summary": self.summary(),
                "results": results,
                "contributors": contributors,
                "anonymous_contributors": anonymous,
            }]
        })
    }
}

/// Append a rendered report to `path`, creating the file if needed
pub fn append_report(path: &Path, report: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(report.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn separator() -> String {
    format!("{}\n", "#".repeat(SCREEN_SEPARATOR_LENGTH))
}

/// Stable colour per category; anonymous results are always blue
fn category_color(category: &str, subject: &Subject) -> Color {
    if matches!(subject, Subject::Anonymous(_)) {
        return Color::Blue;
    }
    let hash = category
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    CATEGORY_PALETTE[hash % CATEGORY_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{category, Visibility};

    fn sample_context() -> ScanContext {
        let mut ctx = ScanContext::new();
        ctx.set_repository("octo/repo");
        ctx.repository_log(category::CONTRIBUTORS, "Repository has 2 contributors with Github User accounts.");
        ctx.contributor_log("alice", category::KEYS, "1 Primary PGP Keys in this contributor's profile");
        ctx.log(
            Finding::new(Subject::Account("alice".into()), category::DEBUG, "raw key dump")
                .with_visibility(Visibility::Debug),
        );
        ctx.contributor_log("bob", category::EMAILS, "[bob@example.com] obtained from the user's profile.");
        ctx
    }

    #[test]
    fn test_text_report_groups_by_subject() {
        let ctx = sample_context();
        let report = ctx.generate_report(&ReportOptions::default());

        assert!(report.contains("Found results for Repository https://github.com/octo/repo."));
        assert!(report.contains("Found results for account alice."));
        assert!(report.contains("[keys]:"));
        assert!(!report.contains("raw key dump"));
        assert!(!report.contains('\u{1b}'));
    }

    #[test]
    fn test_debug_findings_shown_in_debug_mode() {
        let ctx = sample_context();
        let options = ReportOptions {
            debug: true,
            ..Default::default()
        };
        assert!(ctx.generate_report(&options).contains("raw key dump"));
    }

    #[test]
    fn test_filters_keep_matching_lines_only() {
        let ctx = sample_context();
        let options = ReportOptions {
            filters: vec!["EXAMPLE.COM".to_string()],
            ..Default::default()
        };
        let report = ctx.generate_report(&options);
        assert!(report.contains("bob@example.com"));
        assert!(!report.contains("Primary PGP Keys"));
        assert!(report.contains("No results found for"));
    }

    #[test]
    fn test_json_report_shape() {
        let ctx = sample_context();
        let options = ReportOptions {
            format: ReportFormat::Json,
            ..Default::default()
        };
        let value: Value = serde_json::from_str(&ctx.generate_report(&options)).unwrap();
        let repo = &value["repositories"][0];
        assert_eq!(repo["name"], "octo/repo");
        assert_eq!(repo["results"]["contributors"][0], "Repository has 2 contributors with Github User accounts.");
        assert_eq!(repo["contributors"][0]["name"], "alice");
        assert!(repo["contributors"][0]["results"].get("debug").is_none());
    }

    #[test]
    fn test_append_report_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        append_report(&path, "first").unwrap();
        append_report(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
