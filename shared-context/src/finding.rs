// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Finding representation shared by the scan drivers and the report renderers

use crate::identifier::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Report sections. Findings are grouped by these in the output.
pub mod category {
    pub const ASSOCIATION: &str = "association";
    pub const ANONYMOUS: &str = "anonymous";
    pub const COMMITS: &str = "commits";
    pub const CONTRIBUTORS: &str = "contributors";
    pub const DEBUG: &str = "debug";
    pub const EMAILS: &str = "emails";
    pub const KEYS: &str = "keys";
    pub const METRICS: &str = "metrics";
    pub const PERSONAL: &str = "personal";
    pub const PROFILING: &str = "profiling";
    pub const SIGNATURES: &str = "signatures";
    pub const URLS: &str = "urls";
    pub const USER_INPUT: &str = "user_input";
}

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Strong signal of account linkage, compromise or tampering
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Get emoji icon
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Warning => "⚠️",
            Severity::Info => "ℹ️",
        }
    }
}

/// Who gets to see a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Always rendered
    Always,
    /// Rendered in verbose (or debug) mode only
    Verbose,
    /// Rendered in debug mode only
    Debug,
}

impl Visibility {
    /// Whether a finding with this visibility is rendered
    pub fn is_shown(&self, verbose: bool, debug: bool) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::Verbose => verbose || debug,
            Visibility::Debug => debug,
        }
    }
}

/// The entity a finding is reported under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum Subject {
    /// A repository, by full name (`owner/repo`)
    Repository(String),
    /// A contributor account, by login
    Account(String),
    /// Contributors without a GitHub account, grouped under one key
    Anonymous(String),
}

impl Subject {
    pub fn name(&self) -> &str {
        match self {
            Subject::Repository(name) | Subject::Account(name) | Subject::Anonymous(name) => name,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Repository(name) => write!(f, "Repository https://github.com/{}", name),
            Subject::Account(login) => write!(f, "account {}", login),
            Subject::Anonymous(_) => f.write_str("Anonymous Contributors (those with no GitHub account)"),
        }
    }
}

/// A single result line produced while x-raying a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique identifier
    pub id: Uuid,
    /// Entity this finding is reported under
    pub subject: Subject,
    /// Report section (see [`category`])
    pub category: String,
    /// Severity level
    pub severity: Severity,
    /// Rendering tier
    pub visibility: Visibility,
    /// Human-readable message
    pub message: String,
    /// Identifier this finding is about, for correlation findings
    pub identifier: Option<Identifier>,
    /// Accounts implicated by this finding
    pub accounts: Vec<String>,
    /// When this finding was created
    pub created_at: DateTime<Utc>,
}

impl Finding {
    /// Create a new informational finding
    ///
    /// # Panics
    ///
    /// Panics if the subject has no name; results must be attributable.
    pub fn new(subject: Subject, category: &str, message: impl Into<String>) -> Self {
        assert!(
            !subject.name().is_empty(),
            "a finding needs a named subject (category {})",
            category
        );
        Self {
            id: Uuid::new_v4(),
            subject,
            category: category.to_string(),
            severity: Severity::Info,
            visibility: Visibility::Always,
            message: message.into(),
            identifier: None,
            accounts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attach the identifier this finding is about
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Attach implicated accounts
    pub fn with_accounts(mut self, accounts: &[String]) -> Self {
        self.accounts = accounts.to_vec();
        self
    }

    /// Copy this finding under another subject with a fresh ID
    pub fn replicate_for(&self, subject: Subject) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            ..self.clone()
        }
    }
}

/// A collection of findings with aggregation methods
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingSet {
    /// All findings, in the order they were logged
    pub findings: Vec<Finding>,
}

impl FindingSet {
    /// Create empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding
    pub fn add(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Extend with multiple findings
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// Findings reported under `subject`
    pub fn for_subject(&self, subject: &Subject) -> Vec<&Finding> {
        self.findings.iter().filter(|f| &f.subject == subject).collect()
    }

    /// Get findings by category
    pub fn by_category(&self, category: &str) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }

    /// Get all warnings
    pub fn warnings(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .collect()
    }

    /// Distinct subjects, in first-logged order
    pub fn subjects(&self) -> Vec<&Subject> {
        let mut subjects: Vec<&Subject> = Vec::new();
        for finding in &self.findings {
            if !subjects.contains(&&finding.subject) {
                subjects.push(&finding.subject);
            }
        }
        subjects
    }

    /// Total count
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Is empty
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.findings.clear();
    }
}

impl IntoIterator for FindingSet {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

impl<'a> IntoIterator for &'a FindingSet {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_tiers() {
        assert!(Visibility::Always.is_shown(false, false));
        assert!(!Visibility::Verbose.is_shown(false, false));
        assert!(Visibility::Verbose.is_shown(true, false));
        assert!(Visibility::Verbose.is_shown(false, true));
        assert!(!Visibility::Debug.is_shown(true, false));
        assert!(Visibility::Debug.is_shown(false, true));
    }

    #[test]
    fn test_replicate_keeps_content() {
        let finding = Finding::new(
            Subject::Repository("octo/repo".to_string()),
            category::ASSOCIATION,
            "shared",
        )
        .with_severity(Severity::Warning)
        .with_accounts(&["alice".to_string(), "carol".to_string()]);

        let copy = finding.replicate_for(Subject::Account("alice".to_string()));
        assert_ne!(copy.id, finding.id);
        assert_eq!(copy.message, "shared");
        assert_eq!(copy.severity, Severity::Warning);
        assert_eq!(copy.accounts, finding.accounts);
        assert_eq!(copy.subject, Subject::Account("alice".to_string()));
    }

    #[test]
    #[should_panic(expected = "named subject")]
    fn test_unnamed_subject_panics() {
        Finding::new(Subject::Account(String::new()), category::KEYS, "oops");
    }

    #[test]
    fn test_subjects_in_logged_order() {
        let mut set = FindingSet::new();
        set.add(Finding::new(Subject::Account("bob".into()), category::KEYS, "a"));
        set.add(Finding::new(Subject::Repository("o/r".into()), category::METRICS, "b"));
        set.add(Finding::new(Subject::Account("bob".into()), category::EMAILS, "c"));

        let subjects = set.subjects();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0], &Subject::Account("bob".into()));
        assert_eq!(set.for_subject(&Subject::Account("bob".into())).len(), 2);
        assert_eq!(set.by_category(category::METRICS).len(), 1);
    }

    #[test]
    fn test_subject_display() {
        assert_eq!(
            Subject::Repository("octo/repo".into()).to_string(),
            "Repository https://github.com/octo/repo"
        );
        assert_eq!(Subject::Account("alice".into()).to_string(), "account alice");
    }
}
