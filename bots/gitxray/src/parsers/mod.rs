// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Parsers for the signature and key material GitHub exposes.
//!
//! None of these fail: unexpected input yields partial or empty attributes
//! and a `debug` trace.

pub mod armor;
pub mod openpgp;
pub mod ssh;
pub mod subpacket;

pub use armor::{decode_armor, ArmoredBlock, BlockKind};
pub use openpgp::{parse_openpgp_block, OpenPgpBlock, PacketAttributes, PublicKeyAttributes, SignatureAttributes};
pub use ssh::{parse_ssh_key_line, parse_ssh_signature, SshSignatureAttributes};

/// Marker distinguishing SSH commit signatures from PGP ones
pub const SSH_SIGNATURE_MARKER: &str = "BEGIN SSH SIGNATURE";

/// A parsed commit signature
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum CommitSignature {
    Ssh(SshSignatureAttributes),
    Pgp(OpenPgpBlock),
}

/// Parse a commit signature, SSH or PGP by its armor marker
pub fn parse_commit_signature(text: &str) -> Option<CommitSignature> {
    if text.contains(SSH_SIGNATURE_MARKER) {
        parse_ssh_signature(text).map(CommitSignature::Ssh)
    } else {
        Some(CommitSignature::Pgp(parse_openpgp_block(text)))
    }
}
