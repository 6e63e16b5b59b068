// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! gitxray shared context layer
//!
//! State shared by every gitxray driver while a repository is x-rayed:
//!
//! - [`IdentifierIndex`] links identifier values (key IDs, emails, signature
//!   attributes) to the contributor accounts they were observed on, and
//!   reports which values are shared by more than one account.
//! - [`Finding`] / [`FindingSet`] hold the result lines logged under the
//!   repository, each contributor account, and anonymous contributors.
//! - [`ScanContext`] ties both together for one target and is reset between
//!   targets.
//! - [`reporting`] renders a context as text or JSON.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gitxray_shared_context::{IdentifierKind, ScanContext};
//!
//! let mut ctx = ScanContext::new();
//! ctx.set_repository("octo/repo");
//! ctx.link_identifier(IdentifierKind::PgpKeyId, ["DEADBEEFCAFEBABE"], "alice");
//! ctx.link_identifier(IdentifierKind::PgpKeyId, ["DEADBEEFCAFEBABE"], "carol");
//! assert_eq!(ctx.collisions()[0].owners, vec!["alice", "carol"]);
//! ```

pub mod context;
pub mod finding;
pub mod identifier;
pub mod reporting;

pub use context::{ScanContext, ScanSummary, ANONYMOUS_KEY};
pub use finding::{category, Finding, FindingSet, Severity, Subject, Visibility};
pub use identifier::{Collision, Identifier, IdentifierIndex, IdentifierKind, OwnerSet, OwnerValues};
pub use reporting::{append_report, ReportFormat, ReportOptions, SCREEN_SEPARATOR_LENGTH};

use thiserror::Error;

/// Errors from shared context operations
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;
