// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! GitHub records consumed by a scan.
//!
//! A dossier bundles, for one repository, the records the REST API returns
//! for the repository, each contributor's profile, commits, GPG keys and SSH
//! keys, and the anonymous contributors. Field names follow the API so
//! responses can be saved as-is; unknown fields are ignored.

use crate::error::{Result, XrayError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything known about one repository target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dossier {
    pub repository: Repository,
    #[serde(default)]
    pub contributors: Vec<ContributorRecord>,
    #[serde(default)]
    pub anonymous: Vec<AnonymousContributor>,
}

impl Dossier {
    /// Read a dossier from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dossier: Dossier = serde_json::from_str(&content)?;
        dossier.validate()?;
        tracing::debug!(
            path = %path.display(),
            repository = %dossier.repository.full_name,
            contributors = dossier.contributors.len(),
            anonymous = dossier.anonymous.len(),
            "loaded dossier"
        );
        Ok(dossier)
    }

    /// Check the fields every result is attributed to
    pub fn validate(&self) -> Result<()> {
        if self.repository.full_name.trim().is_empty() {
            return Err(XrayError::MissingRepository);
        }
        if let Some(index) = self
            .contributors
            .iter()
            .position(|c| c.profile.login.trim().is_empty())
        {
            return Err(XrayError::BlankLogin { index });
        }
        Ok(())
    }

    /// Whether `login` is one of the account contributors
    pub fn has_contributor(&self, login: &str) -> bool {
        self.contributors.iter().any(|c| c.profile.login == login)
    }
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/repo`
    pub full_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Repository {
    pub fn html_url(&self) -> String {
        self.html_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}", self.full_name))
    }
}

/// A contributor account and the records fetched for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub profile: UserProfile,
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    #[serde(default)]
    pub gpg_keys: Vec<GpgKey>,
    #[serde(default)]
    pub ssh_signing_keys: Vec<SshKey>,
    #[serde(default)]
    pub ssh_auth_keys: Vec<SshKey>,
}

/// Account type as reported in the contributors list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    User,
    Bot,
    Organization,
    #[serde(other)]
    Other,
}

/// `GET /users/{login}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
}

/// Entry of `GET /repos/{owner}/{repo}/commits?author={login}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub author: CommitAuthor,
    #[serde(default)]
    pub verification: Verification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Default for Verification {
    fn default() -> Self {
        Self {
            verified: false,
            reason: default_reason(),
            signature: None,
        }
    }
}

fn default_reason() -> String {
    "unsigned".to_string()
}

/// Entry of `GET /users/{login}/gpg_keys`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpgKey {
    #[serde(default)]
    pub key_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub raw_key: Option<String>,
    #[serde(default)]
    pub emails: Vec<GpgKeyEmail>,
    #[serde(default)]
    pub subkeys: Vec<GpgSubkey>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpgKeyEmail {
    pub email: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpgSubkey {
    #[serde(default)]
    pub key_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emails: Vec<GpgKeyEmail>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Entry of `GET /users/{login}/ssh_signing_keys` or `/users/{login}/keys`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKey {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    pub key: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Contributor without a GitHub account, identified by commit email and name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymousContributor {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contributions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_dossier() {
        let json = r#"{
            "repository": {"full_name": "octo/repo"},
            "contributors": [{
                "profile": {"login": "alice", "created_at": "2020-01-01T00:00:00Z", "unknown": 1},
                "commits": [{
                    "commit": {"author": {"email": "a@example.com", "date": "2021-01-01T00:00:00Z"}}
                }]
            }]
        }"#;
        let dossier: Dossier = serde_json::from_str(json).unwrap();

        assert_eq!(dossier.repository.html_url(), "https://github.com/octo/repo");
        let alice = &dossier.contributors[0];
        assert_eq!(alice.profile.account_type, AccountType::User);
        assert_eq!(alice.commits[0].commit.verification.reason, "unsigned");
        assert!(dossier.has_contributor("alice"));
        assert!(!dossier.has_contributor("bob"));
    }

    #[test]
    fn test_unknown_account_type() {
        let json = r#"{"login": "x", "type": "Mannequin", "created_at": "2020-01-01T00:00:00Z"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.account_type, AccountType::Other);
    }

    #[test]
    fn test_load_rejects_blank_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        std::fs::write(&path, r#"{"repository": {"full_name": " "}}"#).unwrap();
        assert!(matches!(Dossier::load(&path), Err(XrayError::MissingRepository)));
    }

    #[test]
    fn test_load_rejects_blank_login() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        std::fs::write(
            &path,
            r#"{
                "repository": {"full_name": "octo/repo"},
                "contributors": [
                    {"profile": {"login": "alice", "created_at": "2020-01-01T00:00:00Z"}},
                    {"profile": {"login": "", "created_at": "2020-01-01T00:00:00Z"}}
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Dossier::load(&path),
            Err(XrayError::BlankLogin { index: 1 })
        ));
    }
}
