// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Contributor analysis
//!
//! Each contributor account is analyzed on its own into a
//! [`ContributorEvidence`]: the result lines to log and the identifiers to
//! link. Evidence is then folded into the [`ScanContext`] one contributor at
//! a time, in dossier order, so the identifier index sees the same insertion
//! order however the evidence was produced.
//!
//! Everything time-relative is computed against an explicit `now`.

use crate::definitions::{PlatformKeys, BINARY_DOCUMENT_SIGNATURE};
use crate::error::{Result, XrayError};
use crate::github::{
    AccountType, AnonymousContributor, CommitRecord, ContributorRecord, Dossier, GpgKey,
    Repository, SshKey,
};
use crate::parsers::{parse_commit_signature, parse_openpgp_block, parse_ssh_key_line, CommitSignature};
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use gitxray_shared_context::{
    category, Finding, IdentifierKind, ScanContext, Severity, Subject, Visibility,
};

/// GitHub lists contributors past this many as anonymous
pub const ANONYMOUS_LISTING_THRESHOLD: usize = 500;

/// A result line produced for a contributor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceLine {
    pub category: &'static str,
    pub message: String,
    pub severity: Severity,
    pub visibility: Visibility,
}

/// Everything learned about one contributor, ready to be folded into a
/// [`ScanContext`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorEvidence {
    pub login: String,
    pub lines: Vec<EvidenceLine>,
    /// Identifier values to link, in discovery order
    pub links: Vec<(IdentifierKind, Vec<String>)>,
    /// Distinct email addresses seen for the account
    pub emails: Vec<String>,
}

impl ContributorEvidence {
    fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            ..Default::default()
        }
    }

    fn log(&mut self, category: &'static str, message: impl Into<String>) {
        self.push(category, message, Severity::Info, Visibility::Always);
    }

    fn warn(&mut self, category: &'static str, message: impl Into<String>) {
        self.push(category, message, Severity::Warning, Visibility::Always);
    }

    fn debug(&mut self, message: impl Into<String>) {
        self.push(category::DEBUG, message, Severity::Info, Visibility::Debug);
    }

    fn push(
        &mut self,
        category: &'static str,
        message: impl Into<String>,
        severity: Severity,
        visibility: Visibility,
    ) {
        self.lines.push(EvidenceLine {
            category,
            message: message.into(),
            severity,
            visibility,
        });
    }

    fn link<I, V>(&mut self, kind: IdentifierKind, values: I)
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if !values.is_empty() {
            self.links.push((kind, values));
        }
    }

    /// Record an email; returns false when it was already known
    fn note_email(&mut self, email: &str) -> bool {
        if self.emails.iter().any(|e| e == email) {
            return false;
        }
        self.emails.push(email.to_string());
        self.link(IdentifierKind::Email, [email]);
        true
    }

    /// Whether any line was logged under `category`
    pub fn has_category(&self, category: &str) -> bool {
        self.lines.iter().any(|l| l.category == category)
    }

    /// Values linked under `kind`, flattened
    pub fn linked(&self, kind: IdentifierKind) -> Vec<&str> {
        self.links
            .iter()
            .filter(|(k, _)| *k == kind)
            .flat_map(|(_, values)| values.iter().map(String::as_str))
            .collect()
    }
}

/// Attribute values gathered from a contributor's commit signatures
#[derive(Debug, Default)]
struct SignatureSummary {
    key_ids: Vec<String>,
    public_key_algorithms: Vec<String>,
    hash_algorithms: Vec<String>,
    creation_times: Vec<String>,
    signature_types: Vec<String>,
    ssh_algorithms: Vec<String>,
}

impl SignatureSummary {
    fn add(&mut self, signature: &CommitSignature) {
        match signature {
            CommitSignature::Ssh(ssh) => push_unique(&mut self.ssh_algorithms, &ssh.algorithm),
            CommitSignature::Pgp(block) => {
                let Some(sig) = block.signature() else {
                    return;
                };
                if let Some(key_id) = &sig.issuer_key_id {
                    push_unique(&mut self.key_ids, key_id);
                }
                if let Some(pka) = sig.public_key_algorithm {
                    push_unique(&mut self.public_key_algorithms, pka.name);
                }
                if let Some(ha) = sig.hash_algorithm {
                    push_unique(&mut self.hash_algorithms, ha.name);
                }
                if let Some(created) = sig.creation_time {
                    push_unique(&mut self.creation_times, &stamp(created));
                }
                if let Some(st) = sig.signature_type {
                    push_unique(&mut self.signature_types, st.name);
                }
            }
        }
    }
}

/// Analyzes contributor records of one repository
#[derive(Debug, Clone)]
pub struct ContributorAnalyzer<'a> {
    repository: &'a Repository,
    anonymous: &'a [AnonymousContributor],
    platform_keys: PlatformKeys,
    now: DateTime<Utc>,
}

impl<'a> ContributorAnalyzer<'a> {
    pub fn new(
        repository: &'a Repository,
        anonymous: &'a [AnonymousContributor],
        platform_keys: PlatformKeys,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            repository,
            anonymous,
            platform_keys,
            now,
        }
    }

    /// Analyze one contributor. Pure: nothing is logged or linked here.
    pub fn analyze(&self, record: &ContributorRecord) -> ContributorEvidence {
        let login = record.profile.login.as_str();
        let mut ev = ContributorEvidence::new(login);

        self.profile(record, &mut ev);
        let signatures = self.commits(record, &mut ev);
        self.signature_attributes(&signatures, &mut ev);
        if !record.gpg_keys.is_empty() {
            let ids: Vec<&str> = record
                .gpg_keys
                .iter()
                .filter_map(|k| k.key_id.as_deref())
                .collect();
            ev.log(
                category::KEYS,
                format!(
                    "{} Primary PGP Keys in this contributor's profile: {:?}",
                    record.gpg_keys.len(),
                    ids
                ),
            );
            ev.log(
                category::KEYS,
                format!("PGP Keys: https://api.github.com/users/{}/gpg_keys", login),
            );
        }
        for key in &record.gpg_keys {
            self.gpg_key(login, key, &mut ev);
        }
        self.ssh_signing_keys(login, &record.ssh_signing_keys, &mut ev);
        self.ssh_auth_keys(login, &record.ssh_auth_keys, &mut ev);
        self.signing_summary(record, &signatures, &mut ev);
        self.closing_profile(record, &mut ev);

        ev
    }

    fn profile(&self, record: &ContributorRecord, ev: &mut ContributorEvidence) {
        let profile = &record.profile;

        if let Some(url) = &profile.html_url {
            ev.log(category::URLS, format!("Contributor URL: {}", url));
        }
        ev.log(
            category::URLS,
            format!("Owned repositories: https://github.com/{}?tab=repositories", profile.login),
        );

        let personal = [
            ("Name", profile.name.as_deref()),
            ("X/Twitter account", profile.twitter_username.as_deref()),
            ("Bio", profile.bio.as_deref()),
            ("Company", profile.company.as_deref()),
            ("Blog", profile.blog.as_deref()),
            ("Location", profile.location.as_deref()),
        ];
        for (label, value) in personal {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                ev.log(
                    category::PERSONAL,
                    format!("[{}: {}] obtained from the user's profile.", label, one_line(value)),
                );
            }
        }

        if let Some(email) = &profile.email {
            ev.log(category::EMAILS, format!("[{}] obtained from the user's profile.", email));
            ev.note_email(email);
        }

        let age = self.days_since(profile.created_at);
        ev.link(IdentifierKind::DaysSinceCreation, [age]);
        let age_text = if age > 365 {
            format!("{:.2} years old", age as f64 / 365.0)
        } else {
            format!("{} days old", age)
        };
        ev.log(
            category::PROFILING,
            format!("Contributor account created: {}, is {}.", stamp(profile.created_at), age_text),
        );

        if let Some(updated) = profile.updated_at {
            let days = self.days_since(updated);
            ev.log(
                category::PROFILING,
                format!("The account was last updated at {}, {} days ago.", stamp(updated), days),
            );
            ev.link(IdentifierKind::DaysSinceUpdated, [days]);
        }

        if profile.site_admin {
            ev.log(
                category::PROFILING,
                "The account may be an administrator. It has 'site_admin' set to True",
            );
        }
    }

    /// Walk commits; returns the parsed signatures of verified commits
    fn commits(&self, record: &ContributorRecord, ev: &mut ContributorEvidence) -> Vec<CommitSignature> {
        let login = record.profile.login.as_str();
        let commits = &record.commits;
        let mut signatures = Vec::new();
        let mut dates_before_account = 0usize;
        let mut hours = [0usize; 24];

        if let (Some(first), Some(last)) = (
            commits.iter().map(|c| c.commit.author.date).min(),
            commits.iter().map(|c| c.commit.author.date).max(),
        ) {
            let when = if commits.len() > 1 {
                format!(", first one at {} and last one at {}.", stamp(first), stamp(last))
            } else {
                format!(", at {}.", stamp(last))
            };
            ev.log(category::COMMITS, format!("Made (to this repo) {} commits{}", commits.len(), when));
        }

        for commit in commits {
            let detail = &commit.commit;
            let verification = &detail.verification;

            if verification.verified {
                match verification.signature.as_deref().map(|s| (s, parse_commit_signature(s))) {
                    Some((_, Some(signature))) => signatures.push(signature),
                    Some((raw, None)) => ev.debug(format!(
                        "Failed at parsing a signature, not strange given how little of the format is understood. Signature: {}",
                        raw
                    )),
                    None => ev.debug(format!("Verified commit without a signature: {}", commit.html_url)),
                }
                if verification.reason != "valid" {
                    ev.debug(format!(
                        "Unexpected condition - verified commit with reason '{}': {}",
                        verification.reason, commit.html_url
                    ));
                }
            } else if verification.reason != "unsigned" {
                if let Some(message) = failure_message(&verification.reason) {
                    ev.log(category::SIGNATURES, format!("{}: {}", message, commit.html_url));
                }
            }

            if let Some(email) = &detail.author.email {
                if ev.note_email(email) {
                    ev.log(category::EMAILS, format!("[{}] obtained by parsing commits.", email));
                }
            }

            if detail.author.date < record.profile.created_at {
                dates_before_account += 1;
            }
            hours[detail.author.date.hour() as usize] += 1;
        }

        if dates_before_account > 0 {
            let url = format!(
                "{}/commits/?author={}&until={}",
                self.repository.html_url(),
                login,
                stamp(record.profile.created_at)
            );
            ev.warn(
                category::COMMITS,
                format!(
                    "WARNING: UNRELIABLE DATES (Older than Account) in {} commits by [{}]. Potential tampering, account re-use, or Rebase.",
                    dates_before_account, login
                ),
            );
            ev.log(
                category::COMMITS,
                format!("View commits with unreliable DATES here: {}", url),
            );
        }

        if !commits.is_empty() {
            ev.log(category::COMMITS, commit_hours(&hours, commits.len()));
        }

        signatures
    }

    fn signature_attributes(&self, signatures: &[CommitSignature], ev: &mut ContributorEvidence) {
        let mut summary = SignatureSummary::default();
        for signature in signatures {
            summary.add(signature);
        }

        // SSH key IDs are not linked: GitHub refuses the same SSH key on two accounts
        ev.link(IdentifierKind::PgpKeyId, &summary.key_ids);
        ev.link(IdentifierKind::PgpPublicKeyAlgorithm, &summary.public_key_algorithms);
        ev.link(IdentifierKind::PgpHashAlgorithm, &summary.hash_algorithms);
        ev.link(IdentifierKind::PgpSignatureCreationTime, &summary.creation_times);
        ev.link(IdentifierKind::SshSignatureAlgorithm, &summary.ssh_algorithms);

        if !summary.ssh_algorithms.is_empty() {
            ev.log(
                category::KEYS,
                format!(
                    "SSH signatures used Algorithms: {:?} obtained from parsing signature blobs",
                    summary.ssh_algorithms
                ),
            );
        }
        if !summary.public_key_algorithms.is_empty() {
            ev.log(
                category::KEYS,
                format!(
                    "PGP signatures used publicKeyAlgorithms: {:?} obtained from parsing signature blobs",
                    summary.public_key_algorithms
                ),
            );
        }
        for signature_type in &summary.signature_types {
            if signature_type != BINARY_DOCUMENT_SIGNATURE {
                ev.log(
                    category::KEYS,
                    format!(
                        "PGP signatures used an atypical signature Type: [{}] obtained from parsing signature blobs",
                        signature_type
                    ),
                );
                ev.link(IdentifierKind::PgpSignatureType, [signature_type]);
            }
        }
        if !summary.hash_algorithms.is_empty() {
            ev.log(
                category::KEYS,
                format!(
                    "PGP signatures used hash Algorithms: {:?} obtained from parsing signature blobs",
                    summary.hash_algorithms
                ),
            );
        }

        if !summary.key_ids.is_empty() {
            ev.log(
                category::KEYS,
                format!(
                    "{} Keys ({:?}) were used by this contributor when signing commits.",
                    summary.key_ids.len(),
                    summary.key_ids
                ),
            );
            let platform: Vec<&String> = summary
                .key_ids
                .iter()
                .filter(|k| self.platform_keys.contains(k))
                .collect();
            if !platform.is_empty() {
                ev.log(
                    category::KEYS,
                    format!(
                        "{} of the keys used to sign commits belong to Github's Web editor {:?}",
                        platform.len(),
                        platform
                    ),
                );
            }
        }
    }

    fn gpg_key(&self, login: &str, key: &GpgKey, ev: &mut ContributorEvidence) {
        let key_id = key.key_id.as_deref().unwrap_or("(unknown)");

        if let Some(raw) = &key.raw_key {
            let block = parse_openpgp_block(raw);
            if let Some(prefix) = &block.malformed_prefix {
                ev.log(
                    category::USER_INPUT,
                    format!("Bogus data found at the beginning of a PGP Key containing: {}", prefix),
                );
            }
            if let Some(suffix) = &block.malformed_suffix {
                ev.log(
                    category::USER_INPUT,
                    format!("Bogus data found at the end of a PGP Key containing: {}", suffix),
                );
            }
            if let Some(user_id) = block.public_key().and_then(|k| k.user_id.as_deref()) {
                ev.log(
                    category::PERSONAL,
                    format!("[{}] obtained from parsing PGP Key ID {}", user_id, key_id),
                );
            }
            if let Some(version) = &block.armored_version {
                ev.log(
                    category::KEYS,
                    format!("[Version: {}] obtained from parsing PGP Key ID {}", version, key_id),
                );
                ev.link(IdentifierKind::KeyArmoredVersion, [version]);
            }
            if let Some(comment) = &block.armored_comment {
                ev.log(
                    category::KEYS,
                    format!("[Comment: {}] obtained from parsing PGP Key ID {}", comment, key_id),
                );
                ev.link(IdentifierKind::KeyArmoredComment, [comment]);
            }
        }

        if let Some(id) = &key.key_id {
            ev.link(IdentifierKind::PgpKeyId, [id]);
        }
        if let Some(name) = &key.name {
            ev.log(
                category::USER_INPUT,
                format!("Primary key name typed by user for key {}: [{}]", key_id, name),
            );
        }

        for email in &key.emails {
            if ev.note_email(&email.email) {
                let shown = if email.verified {
                    "(shows as Verified)"
                } else {
                    "(shows as Not Verified)"
                };
                ev.log(
                    category::EMAILS,
                    format!("[{}] {} obtained from primary Key with ID {}", email.email, shown, key_id),
                );
            }
        }

        for subkey in &key.subkeys {
            let sub_id = subkey.key_id.as_deref().unwrap_or("(unknown)");
            if let Some(id) = &subkey.key_id {
                ev.link(IdentifierKind::PgpKeyId, [id]);
            }
            if let Some(name) = &subkey.name {
                ev.log(
                    category::USER_INPUT,
                    format!("Subkey name typed by user for key {}: {}", sub_id, name),
                );
            }
            for email in &subkey.emails {
                if ev.note_email(&email.email) {
                    ev.log(
                        category::EMAILS,
                        format!("[{}] obtained from subKey with ID {}", email.email, sub_id),
                    );
                }
            }

            let expiry = match subkey.expires_at {
                Some(expires) if expires < self.now => "(EXPIRED)".to_string(),
                Some(expires) => format!("(EXPIRES in {} days)", (expires - self.now).num_days()),
                None => "(DOES NOT EXPIRE)".to_string(),
            };
            ev.log(
                category::KEYS,
                format!(
                    "PGP Subkey {} in profile. Created at: {} - Expires: {} {}",
                    sub_id,
                    optional_stamp(subkey.created_at),
                    optional_stamp(subkey.expires_at),
                    expiry
                ),
            );
            if let Some(created) = subkey.created_at {
                ev.link(IdentifierKind::PgpSubkeyCreatedAt, [self.days_since(created)]);
            }
        }

        match serde_json::to_string(key) {
            Ok(json) => ev.debug(format!("Primary Key details for {}: {}", login, json)),
            Err(e) => tracing::debug!(error = %e, "could not serialize GPG key"),
        }
    }

    fn ssh_signing_keys(&self, login: &str, keys: &[SshKey], ev: &mut ContributorEvidence) {
        if keys.is_empty() {
            return;
        }
        ev.log(
            category::KEYS,
            format!("{} SSH Keys used for Signatures in this contributor's profile", keys.len()),
        );
        ev.log(
            category::KEYS,
            format!("SSH Signing Keys: https://api.github.com/users/{}/ssh_signing_keys", login),
        );

        for key in keys {
            ev.log(
                category::USER_INPUT,
                format!(
                    "SSH Signing Key title typed by user for Key ID [{}]: [{}]",
                    key.id,
                    key.title.as_deref().unwrap_or_default()
                ),
            );
            ev.log(
                category::KEYS,
                format!(
                    "SSH Signing Key ID [{}] {}in profile, created at {}.",
                    key.id,
                    key_type(&key.key),
                    optional_stamp(key.created_at)
                ),
            );
            if let Some(created) = key.created_at {
                ev.link(IdentifierKind::SshSigningKeyCreatedAt, [self.days_since(created)]);
            }
        }
    }

    fn ssh_auth_keys(&self, login: &str, keys: &[SshKey], ev: &mut ContributorEvidence) {
        if keys.is_empty() {
            return;
        }
        ev.log(
            category::KEYS,
            format!("{} SSH Authentication Keys in this contributor's profile", keys.len()),
        );
        ev.log(
            category::KEYS,
            format!("SSH Authentication Keys: https://api.github.com/users/{}/keys", login),
        );
        // not linked: GitHub refuses an authentication key already in use
        for key in keys {
            ev.log(
                category::KEYS,
                format!("SSH Authentication Key ID [{}] {}in profile.", key.id, key_type(&key.key)),
            );
        }
    }

    fn signing_summary(
        &self,
        record: &ContributorRecord,
        signatures: &[CommitSignature],
        ev: &mut ContributorEvidence,
    ) {
        let login = record.profile.login.as_str();
        let total = record.commits.len();
        let signed = record
            .commits
            .iter()
            .filter(|c| c.commit.verification.verified && c.commit.verification.reason == "valid")
            .count();
        let failed = record.commits.iter().filter(|c| is_failed_verification(c)).count();

        ev.log(
            category::COMMITS,
            format!("All commits (for this Repo): {}/commits/?author={}", self.repository.html_url(), login),
        );
        tracing::trace!(login, total, signed, failed, parsed = signatures.len(), "signing summary");

        if total == 0 {
            return;
        }
        if signed == total {
            ev.log(
                category::SIGNATURES,
                format!("Contributor has signed all of their {} total commits (to this repo).", total),
            );
        }
        if failed > 0 && signed > 0 {
            ev.log(
                category::SIGNATURES,
                format!(
                    "Contributor has failed signature verifications in {} of their {} total commits.",
                    failed, total
                ),
            );
        }
        if signed == 0 && failed == 0 {
            ev.log(
                category::SIGNATURES,
                format!("Contributor has not signed any of their {} commits (in this repo).", total),
            );
        }
        if signed == 0 && failed > 0 {
            ev.log(
                category::SIGNATURES,
                format!(
                    "Contributor has {} failed attempts at signing commits and 0 successful commits signed out of their {} total commits.",
                    failed, total
                ),
            );
        }
        if signed > 0 && signed < total {
            ev.log(
                category::COMMITS,
                format!(
                    "Contributor has a mix of {} signed vs. {} unsigned commits (in this repo).",
                    signed,
                    total - signed
                ),
            );
        }
    }

    fn closing_profile(&self, record: &ContributorRecord, ev: &mut ContributorEvidence) {
        let profile = &record.profile;
        if profile.public_repos > 0 {
            ev.log(
                category::PROFILING,
                format!("Contributor has {} total public repos.", profile.public_repos),
            );
        }
        ev.log(category::PROFILING, format!("Contributor has {} followers.", profile.followers));

        let matching: Vec<String> = self
            .anonymous
            .iter()
            .filter(|a| a.email.as_ref().is_some_and(|e| ev.emails.contains(e)))
            .map(|a| {
                format!(
                    "{} <{}>",
                    a.name.as_deref().unwrap_or_default(),
                    a.email.as_deref().unwrap_or_default()
                )
            })
            .collect();
        if !matching.is_empty() {
            ev.log(
                category::PROFILING,
                format!(
                    "One of {} emails matched the following anonymous users: {:?}",
                    profile.login, matching
                ),
            );
        }
    }

    fn days_since(&self, when: DateTime<Utc>) -> i64 {
        (self.now - when).num_days()
    }
}

/// Fold one contributor's evidence into the context
pub fn apply_evidence(ctx: &mut ScanContext, evidence: ContributorEvidence) {
    let login = evidence.login;
    for line in evidence.lines {
        ctx.log(
            Finding::new(Subject::Account(login.clone()), line.category, line.message)
                .with_severity(line.severity)
                .with_visibility(line.visibility),
        );
    }
    for (kind, values) in evidence.links {
        ctx.link_identifier(kind, values, &login);
    }
}

/// Analyze every contributor of `dossier` and fold the results into `ctx`.
///
/// Fails when a login in the context's contributor scope is not a
/// contributor of the repository.
pub fn analyze_contributors(
    ctx: &mut ScanContext,
    dossier: &Dossier,
    platform_keys: &PlatformKeys,
    now: DateTime<Utc>,
) -> Result<()> {
    let repository = &dossier.repository;

    if let Some(scope) = ctx.contributor_scope() {
        let missing: Vec<String> = scope
            .iter()
            .filter(|login| !dossier.has_contributor(login))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(XrayError::ContributorsNotFound {
                repository: repository.full_name.clone(),
                logins: missing,
            });
        }
        let note = format!(
            "Contributor scope set to {:?}. Other accounts and anonymous contributors are not analyzed.",
            scope
        );
        ctx.repository_log(category::CONTRIBUTORS, note);
    } else {
        ctx.repository_log(
            category::CONTRIBUTORS,
            format!("Repository has {} Anonymous contributors.", dossier.anonymous.len()),
        );
        ctx.repository_log(
            category::CONTRIBUTORS,
            format!(
                "Repository has {} contributors with Github User accounts.",
                dossier.contributors.len()
            ),
        );
        if dossier.contributors.len() + dossier.anonymous.len() > ANONYMOUS_LISTING_THRESHOLD {
            ctx.repository_log(
                category::CONTRIBUTORS,
                "The repository has 500+ contributors. GitHub lists contributors past the first 500 as Anonymous.",
            );
        }
    }

    let analyzer = ContributorAnalyzer::new(repository, &dossier.anonymous, platform_keys.clone(), now);
    let records: Vec<&ContributorRecord> = dossier
        .contributors
        .iter()
        .filter(|c| ctx.in_scope(&c.profile.login))
        .filter(|c| match c.profile.account_type {
            AccountType::User | AccountType::Bot => true,
            other => {
                tracing::warn!(login = %c.profile.login, ?other, "skipping contributor that is not a user account");
                false
            }
        })
        .collect();

    let evidence: Vec<ContributorEvidence> = records.iter().map(|r| analyzer.analyze(r)).collect();
    for (index, ev) in evidence.into_iter().enumerate() {
        tracing::info!(
            "[{}/{}] folding evidence for {}",
            index + 1,
            records.len(),
            ev.login
        );
        apply_evidence(ctx, ev);
    }

    if ctx.contributor_scope().is_none() {
        log_anonymous(ctx, repository, &dossier.anonymous);
    }
    Ok(())
}

/// Anonymous contributors grouped by email
fn log_anonymous(ctx: &mut ScanContext, repository: &Repository, anonymous: &[AnonymousContributor]) {
    if anonymous.is_empty() {
        return;
    }
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for contributor in anonymous {
        let email = contributor.email.clone().unwrap_or_else(|| "(no email)".to_string());
        let name = contributor.name.clone().unwrap_or_else(|| "(no name)".to_string());
        match grouped.iter_mut().find(|(e, _)| *e == email) {
            Some((_, names)) => names.push(name),
            None => grouped.push((email, vec![name])),
        }
    }

    ctx.anonymous_log(
        category::URLS,
        format!(
            "Find commits with: https://api.github.com/search/commits?q=repo:{}+author-email:PLACE_EMAIL_HERE",
            repository.full_name
        ),
    );
    for (email, names) in grouped {
        ctx.anonymous_log(category::ANONYMOUS, format!("{} - {:?}", email, names));
    }
}

fn failure_message(reason: &str) -> Option<&'static str> {
    let message = match reason {
        "bad_email" => "The email in the signature doesn't match the 'committer' email",
        "unverified_email" => "The committer email in the signature was not Verified in the account",
        "expired_key" => "The key that made the signature expired",
        "not_signing_key" => "The PGP key used in the signature did not include the 'signing' flag",
        "gpgverify_error" | "gpgverify_unavailable" => {
            "There was an error communicating with the signature verification service"
        }
        "unknown_signature_type" => "A non-PGP signature was found in the commit",
        "no_user" => "The email address in 'committer' does not belong to a User",
        "unknown_key" => "The key used to sign the commit is not in their profile and can't be verified",
        "malformed_signature" | "invalid" => {
            "The signature was malformed and a parsing error took place"
        }
        other => {
            tracing::debug!(reason = other, "unknown verification reason");
            return None;
        }
    };
    Some(message)
}

fn is_failed_verification(commit: &CommitRecord) -> bool {
    let v = &commit.commit.verification;
    !v.verified && v.reason != "unsigned"
}

fn commit_hours(hours: &[usize; 24], total: usize) -> String {
    let mut by_count: Vec<(usize, usize)> = hours
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(hour, count)| (hour, *count))
        .collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut out = format!("Commit Hours for [{}] commits:", total);
    for (hour, count) in by_count {
        out.push_str(&format!(
            " [{:02}:00-{:02}:59 UTC: {} ({:.2}%)]",
            hour,
            hour,
            count,
            count as f64 * 100.0 / total as f64
        ));
    }
    out
}

fn key_type(line: &str) -> String {
    parse_ssh_key_line(line)
        .map(|algorithm| format!("of type [{}] ", algorithm))
        .unwrap_or_default()
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn one_line(text: &str) -> String {
    text.replace("\r\n", " | ").replace('\n', " | ")
}

fn stamp(when: DateTime<Utc>) -> String {
    when.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn optional_stamp(when: Option<DateTime<Utc>>) -> String {
    when.map(stamp).unwrap_or_else(|| "None".to_string())
}
