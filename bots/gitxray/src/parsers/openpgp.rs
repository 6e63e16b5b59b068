// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Single-packet OpenPGP decoder
//!
//! Understands just enough of RFC 4880 to pull identifying attributes out of
//! the commit signatures and public keys GitHub hands out: signature type,
//! algorithms, issuer key ID and creation time for v4 signatures; version,
//! creation time, algorithm and the first User ID for v4 RSA keys. Only the
//! first packet of a block is looked at.

use super::armor::{decode_armor, BlockKind};
use super::subpacket::{walk_subpacket_area, SubpacketValues};
use crate::definitions::Named;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Offset of the version byte.
///
/// Both the old-format packets GitHub emits for signatures (tag byte plus a
/// two-octet length) and the new-format packets with a two-octet length put
/// it here. Packets with one- or five-octet lengths would not, and are not
/// handled.
pub const VERSION_OFFSET: usize = 3;

/// Signature packet tag
pub const TAG_SIGNATURE: u8 = 2;
/// Public-key packet tag
pub const TAG_PUBLIC_KEY: u8 = 6;

/// Old-format User ID packet header with a one-octet length
const OLD_USER_ID_HEADER: u8 = 0xB4;
/// New-format User ID packet header
const NEW_USER_ID_HEADER: u8 = 0xCD;

/// Packet header format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketFormat {
    /// Old format: an unhashed subpacket area follows the hashed one
    Old,
    New,
}

/// Attributes of a signature packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureAttributes {
    pub version: u8,
    pub signature_type: Option<Named>,
    pub public_key_algorithm: Option<Named>,
    pub hash_algorithm: Option<Named>,
    /// Upper-case hex
    pub issuer_key_id: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    /// Subpackets that were skipped, as `type:hexbody`
    pub extra: Vec<String>,
}

/// Attributes of a public-key packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicKeyAttributes {
    pub version: u8,
    pub creation_time: Option<DateTime<Utc>>,
    pub public_key_algorithm: Option<Named>,
    pub user_id: Option<String>,
    /// Notes about parts of the key that could not be walked
    pub extra: Vec<String>,
}

/// Attributes of the first packet in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "packet", rename_all = "snake_case")]
pub enum PacketAttributes {
    Signature(SignatureAttributes),
    PublicKey(PublicKeyAttributes),
    Unrecognized { tag: u8, extra: Vec<String> },
}

impl PacketAttributes {
    pub fn as_signature(&self) -> Option<&SignatureAttributes> {
        match self {
            PacketAttributes::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn as_public_key(&self) -> Option<&PublicKeyAttributes> {
        match self {
            PacketAttributes::PublicKey(key) => Some(key),
            _ => None,
        }
    }
}

/// A decoded OpenPGP armored block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenPgpBlock {
    pub kind: Option<BlockKind>,
    pub malformed_prefix: Option<String>,
    pub malformed_suffix: Option<String>,
    pub armored_version: Option<String>,
    pub armored_comment: Option<String>,
    /// `None` for malformed or undecodable blocks
    pub packet: Option<PacketAttributes>,
}

impl OpenPgpBlock {
    pub fn signature(&self) -> Option<&SignatureAttributes> {
        self.packet.as_ref().and_then(PacketAttributes::as_signature)
    }

    pub fn public_key(&self) -> Option<&PublicKeyAttributes> {
        self.packet.as_ref().and_then(PacketAttributes::as_public_key)
    }
}

/// Decode an armored PGP signature or public key block
pub fn parse_openpgp_block(text: &str) -> OpenPgpBlock {
    let armor = decode_armor(text);
    let packet = if armor.is_malformed() {
        None
    } else {
        parse_packet(&armor.payload)
    };

    OpenPgpBlock {
        kind: armor.kind,
        malformed_prefix: armor.malformed_prefix,
        malformed_suffix: armor.malformed_suffix,
        armored_version: armor.version,
        armored_comment: armor.comment,
        packet,
    }
}

/// Decode the first packet of a binary OpenPGP stream
pub fn parse_packet(data: &[u8]) -> Option<PacketAttributes> {
    let &header = data.first()?;
    if header & 0x80 == 0 {
        tracing::debug!(header, "first byte is not an OpenPGP packet header");
        return None;
    }

    let (format, tag) = if header & 0x40 != 0 {
        (PacketFormat::New, header & 0x3F)
    } else {
        (PacketFormat::Old, (header & 0x3C) >> 2)
    };

    let Some(&version) = data.get(VERSION_OFFSET) else {
        tracing::debug!(len = data.len(), "packet too short to hold a version");
        return None;
    };

    match tag {
        TAG_SIGNATURE => Some(PacketAttributes::Signature(parse_signature(data, format, version))),
        TAG_PUBLIC_KEY => Some(PacketAttributes::PublicKey(parse_public_key(data, version))),
        other => {
            tracing::debug!(tag = other, ?format, "unexpected OpenPGP packet tag");
            Some(PacketAttributes::Unrecognized {
                tag: other,
                extra: vec![format!("version:{}", version)],
            })
        }
    }
}

fn parse_signature(data: &[u8], format: PacketFormat, version: u8) -> SignatureAttributes {
    let mut sig = SignatureAttributes {
        version,
        signature_type: None,
        public_key_algorithm: None,
        hash_algorithm: None,
        issuer_key_id: None,
        creation_time: None,
        extra: Vec::new(),
    };
    if version != 4 {
        tracing::debug!(version, "only v4 signatures are decoded");
        return sig;
    }

    let mut offset = VERSION_OFFSET + 1;
    sig.signature_type = data.get(offset).copied().map(Named::signature_type);
    sig.public_key_algorithm = data.get(offset + 1).copied().map(Named::public_key_algorithm);
    sig.hash_algorithm = data.get(offset + 2).copied().map(Named::hash_algorithm);
    offset += 3;

    let mut values = SubpacketValues::default();
    let hashed = walk_subpacket_area(data.get(offset..).unwrap_or_default(), &mut values);
    if format == PacketFormat::Old {
        walk_subpacket_area(data.get(offset + hashed..).unwrap_or_default(), &mut values);
    }

    sig.issuer_key_id = values.issuer_key_id;
    sig.creation_time = values.creation_time;
    sig.extra = values.unrecognized;
    sig
}

fn parse_public_key(data: &[u8], version: u8) -> PublicKeyAttributes {
    let mut key = PublicKeyAttributes {
        version,
        creation_time: None,
        public_key_algorithm: None,
        user_id: None,
        extra: Vec::new(),
    };

    let mut offset = VERSION_OFFSET + 1;
    key.creation_time = read_u32(data, offset)
        .and_then(|seconds| DateTime::from_timestamp(i64::from(seconds), 0));
    offset += 4;
    if version != 4 {
        tracing::debug!(version, "only v4 public keys are decoded past the creation time");
        return key;
    }

    key.public_key_algorithm = data.get(offset).copied().map(Named::public_key_algorithm);
    offset += 1;

    // RSA modulus and exponent
    for _ in 0..2 {
        match skip_mpi(data, offset) {
            Some(next) => offset = next,
            None => {
                key.extra.push(format!("truncated MPI at offset {}", offset));
                return key;
            }
        }
    }

    key.user_id = read_user_id(data, offset);
    key
}

/// Skip a multiprecision integer, returning the offset just past it
fn skip_mpi(data: &[u8], offset: usize) -> Option<usize> {
    let bits = read_u16(data, offset)? as usize;
    let next = offset + 2 + bits.div_ceil(8);
    (next <= data.len()).then_some(next)
}

/// Read the User ID packet that follows the key material.
///
/// Accepts `0xB4 len` and `0xCD len` headers, and the `0x01 0xB4 len` layout
/// seen when the exponent is walked one byte short.
fn read_user_id(data: &[u8], offset: usize) -> Option<String> {
    let length_at = match data.get(offset..offset + 2)? {
        [0x01, OLD_USER_ID_HEADER] => offset + 2,
        [OLD_USER_ID_HEADER | NEW_USER_ID_HEADER, _] => offset + 1,
        _ => return None,
    };
    let length = *data.get(length_at)? as usize;
    let start = length_at + 1;
    let bytes = data.get(start..(start + length).min(data.len()))?;
    Some(String::from_utf8_lossy(bytes).into_owned())
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
