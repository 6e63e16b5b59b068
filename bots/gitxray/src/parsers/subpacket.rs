// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Signature subpacket area walker (RFC 4880 §5.2.3.1)

use chrono::{DateTime, Utc};

/// Signature creation time
pub const SUBPACKET_CREATION_TIME: u8 = 2;
/// Issuer key ID
pub const SUBPACKET_ISSUER: u8 = 16;

/// Values collected from one or more subpacket areas. Later areas overwrite
/// earlier values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubpacketValues {
    pub issuer_key_id: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    /// Other subpackets as `type:hexbody`
    pub unrecognized: Vec<String>,
}

/// Walk a subpacket area starting at its 2-byte big-endian length field.
///
/// Returns the number of bytes the area occupies, length field included,
/// clamped to `data`. Only one-octet subpacket lengths are understood.
pub fn walk_subpacket_area(data: &[u8], values: &mut SubpacketValues) -> usize {
    if data.len() < 2 {
        return data.len();
    }
    let declared = u16::from_be_bytes([data[0], data[1]]) as usize;
    let end = (2 + declared).min(data.len());
    if end < 2 + declared {
        tracing::debug!(declared, available = data.len() - 2, "subpacket area truncated");
    }
    let area = &data[2..end];

    let mut pos = 0;
    while pos + 1 < area.len() {
        let length = area[pos] as usize;
        // high bit flags the subpacket as critical
        let kind = area[pos + 1] & 0x7F;
        let body_start = pos + 2;
        let body_end = (pos + 1 + length).clamp(body_start, area.len());
        let body = &area[body_start.min(body_end)..body_end];

        match kind {
            SUBPACKET_ISSUER => {
                values.issuer_key_id = Some(hex::encode_upper(body));
            }
            SUBPACKET_CREATION_TIME if length >= 5 && body.len() >= 4 => {
                let seconds = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
                values.creation_time = DateTime::from_timestamp(i64::from(seconds), 0);
            }
            _ => values
                .unrecognized
                .push(format!("{}:{}", kind, hex::encode(body))),
        }

        pos += length + 1;
    }

    end
}
