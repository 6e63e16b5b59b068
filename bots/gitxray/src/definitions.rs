// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Lookup tables for OpenPGP codes and well-known platform keys.
//!
//! Codes missing from a table resolve to [`UNKNOWN`].

use serde::Serialize;
use std::fmt;

/// Name given to codes absent from a table
pub const UNKNOWN: &str = "Unknown";

/// Key IDs GitHub uses to sign commits made through its web editor
/// (owned by the `web-flow` account). The first one expired in 2024.
pub const GITHUB_WEB_EDITOR_SIGNING_KEYS: [&str; 2] = ["4AEE18F83AFDEB23", "B5690EEEBB952194"];

/// The signature type GitHub emits for every commit signature
pub const BINARY_DOCUMENT_SIGNATURE: &str = "Signature of a binary document";

/// RFC 4880 §5.2.1 signature types
pub static SIGNATURE_TYPES: &[(u8, &str)] = &[
    (0x00, BINARY_DOCUMENT_SIGNATURE),
    (0x01, "Signature of a canonical text document"),
    (0x02, "Standalone signature"),
    (0x10, "Generic certification of a User ID and Public-Key packet"),
    (0x11, "Persona certification of a User ID and Public-Key packet"),
    (0x12, "Casual certification of a User ID and Public-Key packet"),
    (0x13, "Positive certification of a User ID and Public-Key packet"),
    (0x18, "Subkey Binding Signature"),
    (0x19, "Primary Key Binding Signature"),
    (0x1F, "Signature directly on a key"),
    (0x20, "Key revocation signature"),
    (0x28, "Subkey revocation signature"),
    (0x30, "Certification revocation signature"),
];

/// RFC 4880 §9.1 public-key algorithms, plus EdDSA (22)
pub static PUBLIC_KEY_ALGORITHMS: &[(u8, &str)] = &[
    (1, "RSA (Encrypt or Sign)"),
    (2, "RSA Encrypt-Only"),
    (3, "RSA Sign-Only"),
    (16, "Elgamal Encrypt-Only"),
    (17, "DSA"),
    (18, "Reserved for Elliptic Curve"),
    (19, "Reserved for ECDSA"),
    (20, "Reserved (formerly Elgamal Encrypt or Sign)"),
    (21, "Reserved for Diffie-Hellman"),
    (22, "EdDSA"),
];

/// RFC 4880 §9.4 hash algorithms
pub static HASH_ALGORITHMS: &[(u8, &str)] = &[
    (1, "MD5"),
    (2, "SHA-1"),
    (3, "RIPEMD-160"),
    (8, "SHA256"),
    (9, "SHA384"),
    (10, "SHA512"),
    (11, "SHA224"),
];

/// A table code together with its resolved name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Named {
    pub code: u8,
    pub name: &'static str,
}

impl Named {
    fn resolve(table: &[(u8, &'static str)], code: u8) -> Self {
        let name = table
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
            .unwrap_or(UNKNOWN);
        Self { code, name }
    }

    pub fn signature_type(code: u8) -> Self {
        Self::resolve(SIGNATURE_TYPES, code)
    }

    pub fn public_key_algorithm(code: u8) -> Self {
        Self::resolve(PUBLIC_KEY_ALGORITHMS, code)
    }

    pub fn hash_algorithm(code: u8) -> Self {
        Self::resolve(HASH_ALGORITHMS, code)
    }

    pub fn is_known(&self) -> bool {
        self.name != UNKNOWN
    }
}

impl fmt::Display for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Key IDs whose use by several accounts is expected: GitHub's web editor
/// keys plus any configured ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformKeys {
    keys: Vec<String>,
}

impl Default for PlatformKeys {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl PlatformKeys {
    pub fn new(extra: &[String]) -> Self {
        let mut keys: Vec<String> = GITHUB_WEB_EDITOR_SIGNING_KEYS
            .iter()
            .map(|k| k.to_string())
            .collect();
        for key in extra {
            let key = key.trim().to_uppercase();
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self { keys }
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.iter().any(|k| k.eq_ignore_ascii_case(key_id))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }
}
