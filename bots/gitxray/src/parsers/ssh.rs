// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! SSH signature and key line parsing

use super::armor::decode_armor;
use serde::Serialize;

/// Magic preamble of an SSHSIG blob
pub const SSHSIG_MAGIC: &[u8; 6] = b"SSHSIG";

/// Offset of the algorithm name length byte in signatures produced by
/// GitHub's signer.
///
/// After the magic and the 4-byte version comes the public key blob: a 4-byte
/// length, then the key type string with its own 4-byte length. Byte 17 is
/// the low byte of that second length, so names of 256 bytes or more, and
/// blobs laid out differently, are not supported.
pub const SSH_ALGORITHM_LENGTH_OFFSET: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshSignatureAttributes {
    /// e.g. `ssh-ed25519`
    pub algorithm: String,
}

/// Extract the algorithm of an armored SSH signature
pub fn parse_ssh_signature(text: &str) -> Option<SshSignatureAttributes> {
    let armor = decode_armor(text);
    let blob = armor.payload.as_slice();

    if !blob.starts_with(SSHSIG_MAGIC) {
        tracing::debug!(len = blob.len(), "SSH signature without SSHSIG magic");
        return None;
    }

    let length = *blob.get(SSH_ALGORITHM_LENGTH_OFFSET)? as usize;
    let start = SSH_ALGORITHM_LENGTH_OFFSET + 1;
    let Some(name) = blob.get(start..start + length) else {
        tracing::debug!(length, available = blob.len(), "truncated SSH signature");
        return None;
    };

    Some(SshSignatureAttributes {
        algorithm: String::from_utf8_lossy(name).into_owned(),
    })
}

/// Algorithm of an `authorized_keys` style line: its first token
pub fn parse_ssh_key_line(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::prelude::{BASE64_STANDARD, Engine};

    fn ssh_string(bytes: &[u8]) -> Vec<u8> {
        let mut out = (bytes.len() as u32).to_be_bytes().to_vec();
        out.extend(bytes);
        out
    }

    /// SSHSIG blob as `ssh-keygen -Y sign` lays it out
    pub(crate) fn sshsig(algorithm: &str) -> Vec<u8> {
        let mut public_key = ssh_string(algorithm.as_bytes());
        public_key.extend(ssh_string(&[0x42; 32]));

        let mut blob = SSHSIG_MAGIC.to_vec();
        blob.extend(1u32.to_be_bytes());
        blob.extend(ssh_string(&public_key));
        blob.extend(ssh_string(b"git"));
        blob.extend(ssh_string(b""));
        blob.extend(ssh_string(b"sha512"));
        blob.extend(ssh_string(&[0x07; 16]));
        blob
    }

    pub(crate) fn armored(blob: &[u8]) -> String {
        format!(
            "-----BEGIN SSH SIGNATURE-----\n{}\n-----END SSH SIGNATURE-----\n",
            BASE64_STANDARD.encode(blob)
        )
    }

    #[test]
    fn test_signature_algorithm() {
        let attrs = parse_ssh_signature(&armored(&sshsig("ssh-ed25519"))).unwrap();
        assert_eq!(attrs.algorithm, "ssh-ed25519");
    }

    #[test]
    fn test_missing_magic() {
        let mut blob = sshsig("ssh-rsa");
        blob[0] = b'X';
        assert!(parse_ssh_signature(&armored(&blob)).is_none());
        assert!(parse_ssh_signature("").is_none());
    }

    #[test]
    fn test_truncated_blob() {
        let blob = sshsig("ecdsa-sha2-nistp256");
        assert!(parse_ssh_signature(&armored(&blob[..20])).is_none());
        assert!(parse_ssh_signature(&armored(&blob[..17])).is_none());
    }

    #[test]
    fn test_key_line() {
        assert_eq!(
            parse_ssh_key_line("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAA user@host"),
            Some("ssh-ed25519")
        );
        assert_eq!(parse_ssh_key_line("  ssh-rsa AAAA"), Some("ssh-rsa"));
        assert_eq!(parse_ssh_key_line("   "), None);
        assert_eq!(parse_ssh_key_line(""), None);
    }
}
