// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the scan context and identifier index

use gitxray_shared_context::{
    category, Finding, IdentifierKind, ReportFormat, ReportOptions, ScanContext, Severity,
    Subject, Visibility,
};

#[test]
fn test_context_creation() {
    let ctx = ScanContext::new();

    assert!(ctx.repository().is_none());
    assert!(ctx.findings().is_empty());
    assert!(ctx.index().is_empty());
    assert!(ctx.contributor_scope().is_none());
}

#[test]
fn test_shared_key_id_collides_across_accounts() {
    let mut ctx = ScanContext::new();
    ctx.set_repository("octo/repo");

    ctx.link_identifier(IdentifierKind::PgpKeyId, ["DEADBEEFCAFEBABE"], "alice");
    ctx.link_identifier(IdentifierKind::PgpKeyId, ["1111111111111111"], "bob");
    ctx.link_identifier(IdentifierKind::PgpKeyId, ["DEADBEEFCAFEBABE"], "carol");

    let collisions = ctx.collisions();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].identifier.kind, IdentifierKind::PgpKeyId);
    assert_eq!(collisions[0].identifier.value, "DEADBEEFCAFEBABE");
    assert_eq!(collisions[0].owners, vec!["alice".to_string(), "carol".to_string()]);
}

#[test]
fn test_relinking_is_idempotent() {
    let mut ctx = ScanContext::new();
    for _ in 0..3 {
        ctx.link_identifier(IdentifierKind::Email, ["a@example.com"], "alice");
    }

    assert_eq!(ctx.index().len(), 1);
    assert!(ctx.collisions().is_empty());
    assert_eq!(
        ctx.index().owners(IdentifierKind::Email, "a@example.com"),
        Some(&["alice".to_string()][..])
    );
}

#[test]
fn test_same_value_under_different_kinds_never_collides() {
    let mut ctx = ScanContext::new();
    ctx.link_identifier(IdentifierKind::KeyArmoredVersion, ["GnuPG v2"], "alice");
    ctx.link_identifier(IdentifierKind::KeyArmoredComment, ["GnuPG v2"], "bob");

    assert!(ctx.collisions().is_empty());
}

#[test]
fn test_values_by_type_groups_per_owner() {
    let mut ctx = ScanContext::new();
    ctx.link_identifier(IdentifierKind::Email, ["a@example.com", "a2@example.com"], "alice");
    ctx.link_identifier(IdentifierKind::Email, ["b@example.com"], "bob");
    ctx.link_identifier(IdentifierKind::PgpKeyId, ["K1"], "bob");

    let emails = ctx.values_by_type(IdentifierKind::Email);
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].owner, "alice");
    assert_eq!(emails[0].values, vec!["a@example.com", "a2@example.com"]);
    assert_eq!(emails[1].owner, "bob");
}

#[test]
fn test_reset_between_targets() {
    let mut ctx = ScanContext::new();
    ctx.set_repository("octo/first");
    ctx.link_identifier(IdentifierKind::PgpKeyId, ["K1"], "alice");
    ctx.link_identifier(IdentifierKind::PgpKeyId, ["K1"], "bob");
    ctx.repository_log(category::CONTRIBUTORS, "2 contributors");

    ctx.reset();
    ctx.set_repository("octo/second");
    ctx.link_identifier(IdentifierKind::PgpKeyId, ["K1"], "alice");

    assert!(ctx.collisions().is_empty());
    assert!(ctx.findings().is_empty());
    assert_eq!(ctx.repository(), Some("octo/second"));
}

#[test]
fn test_warning_replicated_to_accounts_is_rendered_per_account() {
    let mut ctx = ScanContext::new();
    ctx.set_repository("octo/repo");

    let accounts = vec!["alice".to_string(), "carol".to_string()];
    let finding = Finding::new(
        Subject::Repository("octo/repo".into()),
        category::ASSOCIATION,
        "WARNING: A Personal/Private PGP Key with ID DEADBEEFCAFEBABE is shared by: alice, carol",
    )
    .with_severity(Severity::Warning)
    .with_accounts(&accounts);

    for login in &accounts {
        ctx.log(finding.replicate_for(Subject::Account(login.clone())));
    }
    ctx.log(finding);

    assert_eq!(ctx.findings().warnings().len(), 3);
    let report = ctx.generate_report(&ReportOptions::default());
    assert!(report.contains("Found results for account alice."));
    assert!(report.contains("Found results for account carol."));
    assert_eq!(report.matches("DEADBEEFCAFEBABE").count(), 3);
}

#[test]
fn test_verbose_findings_hidden_by_default() {
    let mut ctx = ScanContext::new();
    ctx.set_repository("octo/repo");
    ctx.log(
        Finding::new(
            Subject::Repository("octo/repo".into()),
            category::ASSOCIATION,
            "Signature hash algorithm SHA256 is shared by: alice, bob",
        )
        .with_visibility(Visibility::Verbose),
    );

    let quiet = ctx.generate_report(&ReportOptions::default());
    assert!(!quiet.contains("SHA256"));

    let verbose = ctx.generate_report(&ReportOptions {
        verbose: true,
        ..Default::default()
    });
    assert!(verbose.contains("SHA256"));
}

#[test]
fn test_json_report_lists_anonymous_contributors() {
    let mut ctx = ScanContext::new();
    ctx.set_repository("octo/repo");
    ctx.anonymous_log(category::ANONYMOUS, "anon@example.com - [\"Anon\"]");

    let json = ctx.generate_report(&ReportOptions {
        format: ReportFormat::Json,
        ..Default::default()
    });
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["repositories"][0]["anonymous_contributors"][0]["anonymous"][0],
        "anon@example.com - [\"Anon\"]"
    );
    assert_eq!(value["repositories"][0]["summary"]["total_findings"], 1);
}
