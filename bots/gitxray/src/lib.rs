// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! gitxray: cryptographic identity fingerprinting for GitHub contributors
//!
//! Commit signatures and published keys leak stable identifiers: PGP issuer
//! key IDs, algorithm choices, creation times, armor `Version:`/`Comment:`
//! headers, and emails. gitxray extracts them per contributor, links each to
//! the account it came from, and reports the ones shared by two or more
//! accounts of the same repository.
//!
//! ## Flow
//!
//! 1. [`parsers`] turn armored blocks and key lines into attributes
//! 2. [`contributors`] turns a contributor's records into evidence and
//!    folds it into a [`ScanContext`]
//! 3. [`association`] classifies identifier collisions, platform keys
//!    being benign

pub mod association;
pub mod cli;
pub mod config;
pub mod contributors;
pub mod definitions;
pub mod error;
pub mod github;
pub mod parsers;

use association::{CollisionClassifier, CollisionFinding};
use chrono::{DateTime, Utc};
use definitions::PlatformKeys;
use error::Result;
use github::Dossier;
use gitxray_shared_context::ScanContext;
use parsers::{
    parse_openpgp_block, parse_ssh_key_line, parse_ssh_signature, OpenPgpBlock,
    SshSignatureAttributes, SSH_SIGNATURE_MARKER,
};
use serde::Serialize;

/// Per-run scan settings
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Reference instant for account and key ages
    pub now: DateTime<Utc>,
    pub platform_keys: PlatformKeys,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            platform_keys: PlatformKeys::default(),
        }
    }
}

/// X-ray one repository dossier.
///
/// The context is reset first, so identifiers never leak between targets.
/// Dossiers with a blank repository name or login are rejected untouched.
/// Returns the cross-account associations found.
pub fn scan_dossier(
    ctx: &mut ScanContext,
    dossier: &Dossier,
    options: &ScanOptions,
) -> Result<Vec<CollisionFinding>> {
    dossier.validate()?;
    ctx.reset();
    ctx.set_repository(&dossier.repository.full_name);
    tracing::info!(repository = %dossier.repository.full_name, "x-raying repository");

    contributors::analyze_contributors(ctx, dossier, &options.platform_keys, options.now)?;

    let findings = CollisionClassifier::new(options.platform_keys.clone()).run(ctx);
    Ok(findings)
}

/// A single artifact parsed on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "artifact", rename_all = "snake_case")]
pub enum InspectedArtifact {
    SshSignature(SshSignatureAttributes),
    OpenPgp(OpenPgpBlock),
    SshKeyLine { algorithm: String },
}

/// Parse an armored SSH signature, an armored OpenPGP block, or an SSH
/// public key line. `None` when nothing could be extracted.
pub fn inspect_artifact(text: &str) -> Option<InspectedArtifact> {
    if text.contains(SSH_SIGNATURE_MARKER) {
        return parse_ssh_signature(text).map(InspectedArtifact::SshSignature);
    }
    if text.contains("-----BEGIN ") {
        return Some(InspectedArtifact::OpenPgp(parse_openpgp_block(text)));
    }
    parse_ssh_key_line(text).map(|algorithm| InspectedArtifact::SshKeyLine {
        algorithm: algorithm.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_key_line() {
        assert_eq!(
            inspect_artifact("ssh-ed25519 AAAAC3Nza user@host\n"),
            Some(InspectedArtifact::SshKeyLine {
                algorithm: "ssh-ed25519".to_string()
            })
        );
        assert_eq!(inspect_artifact("   \n"), None);
    }

    #[test]
    fn test_inspect_ssh_signature() {
        let text = parsers::ssh::tests::armored(&parsers::ssh::tests::sshsig("ecdsa-sha2-nistp256"));
        let json = serde_json::to_value(inspect_artifact(&text).unwrap()).unwrap();
        assert_eq!(json["artifact"], "ssh_signature");
        assert_eq!(json["algorithm"], "ecdsa-sha2-nistp256");
    }

    #[test]
    fn test_scan_rejects_blank_login() {
        let dossier: Dossier = serde_json::from_str(
            r#"{"repository": {"full_name": "octo/repo"},
                "contributors": [{"profile": {"login": "", "created_at": "2020-01-01T00:00:00Z"}}]}"#,
        )
        .unwrap();
        let mut ctx = ScanContext::new();
        let err = scan_dossier(&mut ctx, &dossier, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, error::XrayError::BlankLogin { index: 0 }));
        assert!(ctx.findings().is_empty());
    }

    #[test]
    fn test_scan_requires_scoped_contributors() {
        let dossier: Dossier = serde_json::from_str(
            r#"{"repository": {"full_name": "octo/repo"}, "contributors": []}"#,
        )
        .unwrap();
        let mut ctx = ScanContext::new().with_contributor_scope(vec!["ghost".to_string()]);
        let err = scan_dossier(&mut ctx, &dossier, &ScanOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            error::XrayError::ContributorsNotFound { ref logins, .. } if logins == &["ghost".to_string()]
        ));
    }
}
