// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Per-target scan context
//!
//! A [`ScanContext`] is created once per run and passed explicitly to every
//! driver. It carries the identifier index and the findings of the repository
//! currently being x-rayed; [`ScanContext::reset`] must be called between
//! repository/organization targets so nothing leaks from one scan into the
//! next.

use crate::finding::{Finding, FindingSet, Subject};
use crate::identifier::{Collision, IdentifierIndex, IdentifierKind, OwnerValues};
use crate::{ContextError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which anonymous contributors are grouped
pub const ANONYMOUS_KEY: &str = "anonymous";

/// Shared state for one repository scan
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Unique session ID, renewed on reset
    pub session_id: Uuid,
    /// When the current scan started
    pub started_at: DateTime<Utc>,
    repository: Option<String>,
    contributor_scope: Option<Vec<String>>,
    index: IdentifierIndex,
    findings: FindingSet,
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            repository: None,
            contributor_scope: None,
            index: IdentifierIndex::new(),
            findings: FindingSet::new(),
        }
    }

    /// Restrict contributor results to the given logins. The scope survives
    /// resets.
    pub fn with_contributor_scope(mut self, scope: Vec<String>) -> Self {
        self.contributor_scope = if scope.is_empty() { None } else { Some(scope) };
        self
    }

    pub fn contributor_scope(&self) -> Option<&[String]> {
        self.contributor_scope.as_deref()
    }

    /// Whether results for `login` are kept
    pub fn in_scope(&self, login: &str) -> bool {
        match &self.contributor_scope {
            Some(scope) => scope.iter().any(|s| s == login),
            None => true,
        }
    }

    /// Set the repository (full name) being x-rayed
    pub fn set_repository(&mut self, full_name: &str) {
        self.repository = Some(full_name.to_string());
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// The current repository, or an error when none is set
    pub fn require_repository(&self) -> Result<&str> {
        self.repository
            .as_deref()
            .ok_or_else(|| ContextError::InvalidState("no repository set on the scan context".into()))
    }

    /// Link identifier values to a contributor login
    ///
    /// # Panics
    ///
    /// Panics if `owner` is empty.
    pub fn link_identifier<I, V>(&mut self, kind: IdentifierKind, values: I, owner: &str)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.index.link(kind, values, owner);
    }

    /// Identifiers shared by two or more accounts
    pub fn collisions(&self) -> Vec<Collision> {
        self.index.collisions()
    }

    /// Values of `kind` per owner
    pub fn values_by_type(&self, kind: IdentifierKind) -> Vec<OwnerValues> {
        self.index.values_by_type(kind)
    }

    pub fn index(&self) -> &IdentifierIndex {
        &self.index
    }

    /// Record a finding. Account findings outside the contributor scope are
    /// dropped.
    pub fn log(&mut self, finding: Finding) {
        if let Subject::Account(login) = &finding.subject {
            if !self.in_scope(login) {
                tracing::trace!(login = %login, category = %finding.category, "finding outside contributor scope dropped");
                return;
            }
        }
        self.findings.add(finding);
    }

    /// Record an informational finding under the current repository
    ///
    /// # Panics
    ///
    /// Panics if no repository has been set.
    pub fn repository_log(&mut self, category: &str, message: impl Into<String>) {
        let subject = Subject::Repository(self.repository.clone().unwrap_or_default());
        self.log(Finding::new(subject, category, message));
    }

    /// Record an informational finding under a contributor account
    pub fn contributor_log(&mut self, login: &str, category: &str, message: impl Into<String>) {
        self.log(Finding::new(Subject::Account(login.to_string()), category, message));
    }

    /// Record an informational finding about anonymous contributors
    pub fn anonymous_log(&mut self, category: &str, message: impl Into<String>) {
        self.log(Finding::new(
            Subject::Anonymous(ANONYMOUS_KEY.to_string()),
            category,
            message,
        ));
    }

    pub fn findings(&self) -> &FindingSet {
        &self.findings
    }

    /// Summarize the current scan
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            session_id: self.session_id,
            repository: self.repository.clone(),
            started_at: self.started_at,
            duration_ms: (Utc::now() - self.started_at).num_milliseconds().max(0) as u64,
            total_findings: self.findings.len(),
            total_warnings: self.findings.warnings().len(),
            identifiers: self.index.len(),
            collisions: self.index.collisions().len(),
        }
    }

    /// Discard the index, findings and repository of the finished target.
    /// The contributor scope is kept.
    pub fn reset(&mut self) {
        tracing::debug!(
            session = %self.session_id,
            findings = self.findings.len(),
            identifiers = self.index.len(),
            "resetting scan context"
        );
        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.repository = None;
        self.index.reset();
        self.findings.clear();
    }
}

/// Summary of one repository scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub session_id: Uuid,
    pub repository: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_findings: usize,
    pub total_warnings: usize,
    pub identifiers: usize,
    pub collisions: usize,
}
