// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Cross-account association
//!
//! Runs once all contributors of a repository have been analyzed: every
//! identifier linked to two or more accounts becomes a finding. Findings go
//! under the repository and, unless they belong to the verbose tier, are
//! repeated under each implicated account.

use crate::definitions::PlatformKeys;
use gitxray_shared_context::{
    category, Collision, Finding, Identifier, IdentifierKind, ScanContext, Severity, Subject,
    Visibility,
};
use serde::Serialize;

/// A collision rendered for humans
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionFinding {
    pub identifier: Identifier,
    /// Owners in first-link order
    pub accounts: Vec<String>,
    pub message: String,
    pub severity: Severity,
    pub visibility: Visibility,
}

/// Turns index collisions into findings
#[derive(Debug, Clone, Default)]
pub struct CollisionClassifier {
    platform_keys: PlatformKeys,
}

impl CollisionClassifier {
    /// Classifier treating `platform_keys` as benign when shared
    pub fn new(platform_keys: PlatformKeys) -> Self {
        Self { platform_keys }
    }

    pub fn is_platform_key(&self, key_id: &str) -> bool {
        self.platform_keys.contains(key_id)
    }

    /// Describe one collision
    pub fn classify(&self, collision: &Collision) -> CollisionFinding {
        let kind = collision.identifier.kind;
        let value = &collision.identifier.value;
        let accounts = &collision.owners;
        let mut severity = Severity::Info;

        let message = match kind {
            IdentifierKind::PgpKeyId if self.is_platform_key(value) => format!(
                "GitHub's Web Editor (because of GitHub PGP Key IDs) was used by accounts: {:?}.",
                accounts
            ),
            IdentifierKind::PgpKeyId => {
                severity = Severity::Warning;
                format!(
                    "WARNING: A Personal/Private PGP Key with ID {} found shared by accounts: {:?}.",
                    value, accounts
                )
            }
            IdentifierKind::PgpPublicKeyAlgorithm => {
                format!("PGP Public Key Algorithm ({}) shared by accounts: {:?}.", value, accounts)
            }
            IdentifierKind::PgpSignatureType => {
                format!("PGP Signature Type ({}) shared by accounts: {:?}.", value, accounts)
            }
            IdentifierKind::PgpHashAlgorithm => {
                format!("PGP Hash Algorithm ({}) shared by accounts: {:?}.", value, accounts)
            }
            IdentifierKind::PgpSignatureCreationTime => format!(
                "PGP Signature Creation Time ({}) shared by accounts: {:?}.",
                value, accounts
            ),
            IdentifierKind::PgpSubkeyCreatedAt => format!(
                "The following contributor accounts have PGP Subkeys that were created in the same day, precisely {} days ago: {:?}.",
                value, accounts
            ),
            IdentifierKind::SshSignatureAlgorithm => {
                format!("SSH Signature Algorithm ({}) shared by accounts: {:?}.", value, accounts)
            }
            IdentifierKind::SshSigningKeyCreatedAt => format!(
                "The following contributor accounts have SSH signing keys that were created in the same day, precisely {} days ago: {:?}.",
                value, accounts
            ),
            IdentifierKind::KeyArmoredVersion => format!(
                "Exact same Version field extracted from a Key for accounts: {:?}: {}.",
                accounts, value
            ),
            IdentifierKind::KeyArmoredComment => format!(
                "Exact same Comment field extracted from a Key for accounts: {:?}: {}.",
                accounts, value
            ),
            IdentifierKind::Email => {
                format!("Email {} shared by accounts: {:?}.", value, accounts)
            }
            IdentifierKind::DaysSinceCreation => format!(
                "The following contributor accounts were created in the same day, precisely {} days ago: {:?}.",
                value, accounts
            ),
            IdentifierKind::DaysSinceUpdated => format!(
                "The following contributor accounts were last updated in the same day, precisely {} days ago: {:?}.",
                value, accounts
            ),
        };

        let visibility = if kind.is_low_signal() {
            Visibility::Verbose
        } else {
            Visibility::Always
        };

        CollisionFinding {
            identifier: collision.identifier.clone(),
            accounts: accounts.clone(),
            message,
            severity,
            visibility,
        }
    }

    /// Drain the context's collisions into findings and log them
    ///
    /// # Panics
    ///
    /// Panics if collisions exist but no repository is set on `ctx`.
    pub fn run(&self, ctx: &mut ScanContext) -> Vec<CollisionFinding> {
        let repository = ctx.repository().unwrap_or_default().to_string();
        let findings: Vec<CollisionFinding> =
            ctx.collisions().iter().map(|c| self.classify(c)).collect();

        for collision in &findings {
            let finding = Finding::new(
                Subject::Repository(repository.clone()),
                category::ASSOCIATION,
                collision.message.clone(),
            )
            .with_severity(collision.severity)
            .with_visibility(collision.visibility)
            .with_identifier(collision.identifier.clone())
            .with_accounts(&collision.accounts);

            if collision.visibility == Visibility::Always {
                for login in &collision.accounts {
                    ctx.log(finding.replicate_for(Subject::Account(login.clone())));
                }
            }
            ctx.log(finding);
        }

        let warnings = findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
        tracing::info!(
            repository = %repository,
            associations = findings.len(),
            warnings,
            "cross-account association complete"
        );
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collision(kind: IdentifierKind, value: &str, owners: &[&str]) -> Collision {
        Collision {
            identifier: Identifier::new(kind, value),
            owners: owners.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn test_platform_key_is_benign() {
        let classifier = CollisionClassifier::default();
        let finding = classifier.classify(&collision(
            IdentifierKind::PgpKeyId,
            "4AEE18F83AFDEB23",
            &["alice", "bob"],
        ));

        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.visibility, Visibility::Always);
        assert!(finding.message.contains("GitHub's Web Editor"));
    }

    #[test]
    fn test_personal_key_is_warning() {
        let classifier = CollisionClassifier::default();
        let finding = classifier.classify(&collision(
            IdentifierKind::PgpKeyId,
            "DEADBEEFCAFEBABE",
            &["alice", "carol"],
        ));

        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.accounts, vec!["alice".to_string(), "carol".to_string()]);
        assert!(finding.message.contains("DEADBEEFCAFEBABE"));
        assert!(finding.message.contains(r#"["alice", "carol"]"#));
    }

    #[test]
    fn test_extra_platform_keys() {
        let classifier =
            CollisionClassifier::new(PlatformKeys::new(&[" deadbeefcafebabe ".to_string()]));
        let finding = classifier.classify(&collision(
            IdentifierKind::PgpKeyId,
            "DEADBEEFCAFEBABE",
            &["alice", "carol"],
        ));
        assert_eq!(finding.severity, Severity::Info);
    }

    #[test]
    fn test_low_signal_kinds_are_verbose() {
        let classifier = CollisionClassifier::default();
        for kind in [
            IdentifierKind::PgpHashAlgorithm,
            IdentifierKind::PgpPublicKeyAlgorithm,
            IdentifierKind::PgpSignatureType,
            IdentifierKind::SshSignatureAlgorithm,
        ] {
            let finding = classifier.classify(&collision(kind, "x", &["a", "b"]));
            assert_eq!(finding.visibility, Visibility::Verbose, "{}", kind);
        }
        let email = classifier.classify(&collision(IdentifierKind::Email, "x@example.com", &["a", "b"]));
        assert_eq!(email.visibility, Visibility::Always);
    }

    #[test]
    fn test_same_day_keys_name_the_day() {
        let classifier = CollisionClassifier::default();
        for kind in [
            IdentifierKind::PgpSubkeyCreatedAt,
            IdentifierKind::SshSigningKeyCreatedAt,
        ] {
            let finding = classifier.classify(&collision(kind, "31", &["alice", "bob"]));
            assert!(
                finding.message.ends_with(r#"precisely 31 days ago: ["alice", "bob"]."#),
                "{}",
                finding.message
            );
        }
    }

    #[test]
    fn test_run_replicates_to_accounts() {
        let mut ctx = ScanContext::new();
        ctx.set_repository("octo/repo");
        ctx.link_identifier(IdentifierKind::PgpKeyId, ["DEADBEEFCAFEBABE"], "alice");
        ctx.link_identifier(IdentifierKind::PgpKeyId, ["DEADBEEFCAFEBABE"], "carol");
        ctx.link_identifier(IdentifierKind::PgpHashAlgorithm, ["SHA256"], "alice");
        ctx.link_identifier(IdentifierKind::PgpHashAlgorithm, ["SHA256"], "carol");

        let findings = CollisionClassifier::default().run(&mut ctx);
        assert_eq!(findings.len(), 2);

        let logged = ctx.findings();
        // key warning: repository + 2 accounts; hash algorithm: repository only
        assert_eq!(logged.len(), 4);
        assert_eq!(logged.warnings().len(), 3);
        assert_eq!(logged.for_subject(&Subject::Account("carol".into())).len(), 1);
    }
}
