// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! ASCII armor decoder
//!
//! Strips `-----BEGIN ...-----` / `-----END ...-----` framing and decodes the
//! base64 body. Users paste keys into their GitHub profile by hand, so text
//! surrounding the markers is common (notes, hidden messages, half-pasted
//! blocks). That text is captured verbatim and the block is not decoded
//! further. Decoding never fails: noise is skipped and whatever bytes can be
//! recovered are returned.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const BEGIN_MARKER: &str = "-----BEGIN";
const END_MARKER: &str = "-----END";
const DASHES: &str = "-----";

/// Padding optional, trailing bits ignored
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

static BEGIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-----BEGIN ([A-Z0-9 ]+?)-----").expect("valid BEGIN regex"));

static HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Version|Comment|Charset):\s?(.*)$").expect("valid armor header regex")
});

/// Kind of block declared by the BEGIN marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// `PGP SIGNATURE`
    Signature,
    /// `PGP PUBLIC KEY BLOCK`
    PublicKeyBlock,
    /// `SSH SIGNATURE`
    SshSignature,
    /// Any other label
    Other,
}

impl BlockKind {
    fn from_label(label: &str) -> Self {
        match label {
            "PGP SIGNATURE" => BlockKind::Signature,
            "PGP PUBLIC KEY BLOCK" => BlockKind::PublicKeyBlock,
            "SSH SIGNATURE" => BlockKind::SshSignature,
            _ => BlockKind::Other,
        }
    }
}

/// An armored block split into its parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmoredBlock {
    /// Declared kind, `None` when there is no BEGIN marker
    pub kind: Option<BlockKind>,
    /// Text found before the BEGIN marker, lines joined with ` | `
    pub malformed_prefix: Option<String>,
    /// Text found after the END marker, lines joined with ` | `
    pub malformed_suffix: Option<String>,
    /// Armor `Version:` header value
    pub version: Option<String>,
    /// Armor `Comment:` header value
    pub comment: Option<String>,
    /// Decoded body; empty for malformed blocks
    pub payload: Vec<u8>,
}

impl ArmoredBlock {
    /// Whether non-armor text surrounds the markers
    pub fn is_malformed(&self) -> bool {
        self.malformed_prefix.is_some() || self.malformed_suffix.is_some()
    }
}

/// Split and decode an armored block
pub fn decode_armor(text: &str) -> ArmoredBlock {
    let begin = text.find(BEGIN_MARKER);
    let body_start = begin.unwrap_or(0);

    let (body_end, suffix) = match text.rfind(END_MARKER) {
        Some(end) if end >= body_start => {
            let after = end + END_MARKER.len();
            let close = text[after..]
                .find(DASHES)
                .map(|i| after + i + DASHES.len())
                .unwrap_or(text.len());
            (close, &text[close..])
        }
        _ => (text.len(), ""),
    };

    let mut block = ArmoredBlock {
        kind: begin.map(|_| {
            BEGIN_LABEL
                .captures(&text[body_start..])
                .map(|c| BlockKind::from_label(&c[1]))
                .unwrap_or(BlockKind::Other)
        }),
        malformed_prefix: collapse_lines(&text[..body_start]),
        malformed_suffix: collapse_lines(suffix),
        ..Default::default()
    };

    if block.is_malformed() {
        tracing::debug!(
            prefix = ?block.malformed_prefix,
            suffix = ?block.malformed_suffix,
            "armored block surrounded by extra text, not decoding"
        );
        return block;
    }

    let mut encoded = String::new();
    for line in text[body_start..body_end].lines().map(str::trim) {
        if line.starts_with(DASHES) {
            continue;
        }
        if let Some(header) = HEADER_LINE.captures(line) {
            let value = header[2].trim().to_string();
            match &header[1] {
                "Version" if block.version.is_none() => block.version = Some(value),
                "Comment" if block.comment.is_none() => block.comment = Some(value),
                _ => {}
            }
            continue;
        }
        if is_armor_checksum(line) {
            continue;
        }
        encoded.push_str(line);
    }

    block.payload = decode_base64_lenient(&encoded);
    block
}

/// Decode base64, skipping anything outside the standard alphabet.
///
/// Padding is optional and a dangling final character (which cannot encode a
/// whole byte) is dropped.
pub fn decode_base64_lenient(input: &str) -> Vec<u8> {
    let mut cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
        .collect();
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }

    match LENIENT_BASE64.decode(cleaned.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "base64 payload could not be decoded");
            Vec::new()
        }
    }
}

/// `=XXXX` CRC-24 line closing a PGP armor body
fn is_armor_checksum(line: &str) -> bool {
    line.len() == 5 && line.starts_with('=')
}

fn collapse_lines(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::prelude::BASE64_STANDARD;

    fn armor(label: &str, headers: &str, payload: &[u8]) -> String {
        format!(
            "-----BEGIN {label}-----\n{headers}\n{}\n=AbCd\n-----END {label}-----\n",
            BASE64_STANDARD.encode(payload)
        )
    }

    #[test]
    fn test_clean_block_decodes() {
        let text = armor("PGP SIGNATURE", "", &[0x89, 0x01, 0x02, 0x04]);
        let block = decode_armor(&text);

        assert_eq!(block.kind, Some(BlockKind::Signature));
        assert!(!block.is_malformed());
        assert_eq!(block.payload, vec![0x89, 0x01, 0x02, 0x04]);
    }

    #[test]
    fn test_headers_are_kept_and_charset_dropped() {
        let text = armor(
            "PGP PUBLIC KEY BLOCK",
            "Version: GnuPG v1\nComment: my laptop key\nCharset: UTF-8\n",
            b"key",
        );
        let block = decode_armor(&text);

        assert_eq!(block.kind, Some(BlockKind::PublicKeyBlock));
        assert_eq!(block.version.as_deref(), Some("GnuPG v1"));
        assert_eq!(block.comment.as_deref(), Some("my laptop key"));
        assert_eq!(block.payload, b"key");
    }

    #[test]
    fn test_prefix_text_is_captured_and_not_decoded() {
        let text = format!(
            "hello there\r\nsecond line\r\n{}",
            armor("PGP PUBLIC KEY BLOCK", "", b"key")
        );
        let block = decode_armor(&text);

        assert_eq!(block.malformed_prefix.as_deref(), Some("hello there | second line"));
        assert!(block.malformed_suffix.is_none());
        assert!(block.payload.is_empty());
    }

    #[test]
    fn test_suffix_text_is_captured() {
        let text = format!("{}P.S. call me", armor("PGP SIGNATURE", "", b"sig"));
        let block = decode_armor(&text);

        assert_eq!(block.malformed_suffix.as_deref(), Some("P.S. call me"));
        assert!(block.payload.is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_is_not_malformed() {
        let text = format!("\n   \n{}\n\n", armor("SSH SIGNATURE", "", b"SSHSIG"));
        let block = decode_armor(&text);

        assert!(!block.is_malformed());
        assert_eq!(block.kind, Some(BlockKind::SshSignature));
        assert_eq!(block.payload, b"SSHSIG");
    }

    #[test]
    fn test_lenient_base64() {
        // missing padding
        assert_eq!(decode_base64_lenient("aGk"), b"hi");
        // noise and padding in odd places
        assert_eq!(decode_base64_lenient("a G*k=\n"), b"hi");
        // dangling sextet
        assert_eq!(decode_base64_lenient("aGlhZ"), b"hia");
        assert!(decode_base64_lenient("").is_empty());
        assert!(decode_base64_lenient("!!!").is_empty());
    }

    #[test]
    fn test_garbage_never_panics() {
        for text in ["", "-----BEGIN", "-----END-----BEGIN x", "-----BEGIN PGP SIGNATURE-----"] {
            let _ = decode_armor(text);
        }
    }
}
