// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Identifier correlation index
//!
//! Every artifact extracted from a contributor (key IDs, signature metadata,
//! emails, account dates) is linked to that contributor's login under a typed
//! [`Identifier`]. Once all contributors of a repository have been processed,
//! any identifier owned by two or more logins is a [`Collision`]: the accounts
//! share something they normally should not.
//!
//! The index is append-only. Relations are written once and read many times;
//! the only way to drop entries is [`IdentifierIndex::reset`], called at a
//! repository/organization target boundary.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Closed set of identifier kinds that can be correlated across accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdentifierKind {
    /// Issuer key ID of a PGP signature, or a primary/sub key ID from a profile
    #[serde(rename = "PGP_KEYID")]
    PgpKeyId,
    /// PGP public-key algorithm name
    #[serde(rename = "PGP_PKA")]
    PgpPublicKeyAlgorithm,
    /// PGP hash algorithm name
    #[serde(rename = "PGP_HA")]
    PgpHashAlgorithm,
    /// PGP signature creation time
    #[serde(rename = "PGP_SCT")]
    PgpSignatureCreationTime,
    /// PGP signature type (only atypical ones are linked)
    #[serde(rename = "PGP_SIG_TYPE")]
    PgpSignatureType,
    /// SSH signature algorithm
    #[serde(rename = "SSH_SA")]
    SshSignatureAlgorithm,
    /// Days since a PGP subkey was created
    #[serde(rename = "PGP_SUBKEY_CREATED_AT")]
    PgpSubkeyCreatedAt,
    /// Days since an SSH signing key was created
    #[serde(rename = "SSH_SIGNING_KEY_CREATED_AT")]
    SshSigningKeyCreatedAt,
    /// `Version:` header of an armored key
    #[serde(rename = "KEY_ARMORED_VERSION")]
    KeyArmoredVersion,
    /// `Comment:` header of an armored key
    #[serde(rename = "KEY_ARMORED_COMMENT")]
    KeyArmoredComment,
    /// Email address
    #[serde(rename = "EMAIL")]
    Email,
    /// Account age in days
    #[serde(rename = "DAYS_SINCE_CREATION")]
    DaysSinceCreation,
    /// Days since the account was last updated
    #[serde(rename = "DAYS_SINCE_UPDATED")]
    DaysSinceUpdated,
}

impl IdentifierKind {
    /// All kinds, in declaration order
    pub const ALL: [IdentifierKind; 13] = [
        IdentifierKind::PgpKeyId,
        IdentifierKind::PgpPublicKeyAlgorithm,
        IdentifierKind::PgpHashAlgorithm,
        IdentifierKind::PgpSignatureCreationTime,
        IdentifierKind::PgpSignatureType,
        IdentifierKind::SshSignatureAlgorithm,
        IdentifierKind::PgpSubkeyCreatedAt,
        IdentifierKind::SshSigningKeyCreatedAt,
        IdentifierKind::KeyArmoredVersion,
        IdentifierKind::KeyArmoredComment,
        IdentifierKind::Email,
        IdentifierKind::DaysSinceCreation,
        IdentifierKind::DaysSinceUpdated,
    ];

    /// Stable tag used in reports and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::PgpKeyId => "PGP_KEYID",
            IdentifierKind::PgpPublicKeyAlgorithm => "PGP_PKA",
            IdentifierKind::PgpHashAlgorithm => "PGP_HA",
            IdentifierKind::PgpSignatureCreationTime => "PGP_SCT",
            IdentifierKind::PgpSignatureType => "PGP_SIG_TYPE",
            IdentifierKind::SshSignatureAlgorithm => "SSH_SA",
            IdentifierKind::PgpSubkeyCreatedAt => "PGP_SUBKEY_CREATED_AT",
            IdentifierKind::SshSigningKeyCreatedAt => "SSH_SIGNING_KEY_CREATED_AT",
            IdentifierKind::KeyArmoredVersion => "KEY_ARMORED_VERSION",
            IdentifierKind::KeyArmoredComment => "KEY_ARMORED_COMMENT",
            IdentifierKind::Email => "EMAIL",
            IdentifierKind::DaysSinceCreation => "DAYS_SINCE_CREATION",
            IdentifierKind::DaysSinceUpdated => "DAYS_SINCE_UPDATED",
        }
    }

    /// Kinds shared by many unrelated accounts. A collision on one of these
    /// alone says little, so it is only reported in verbose mode.
    pub fn is_low_signal(&self) -> bool {
        matches!(
            self,
            IdentifierKind::PgpPublicKeyAlgorithm
                | IdentifierKind::PgpHashAlgorithm
                | IdentifierKind::PgpSignatureType
                | IdentifierKind::SshSignatureAlgorithm
        )
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed identifier value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    pub kind: IdentifierKind,
    pub value: String,
}

impl Identifier {
    pub fn new(kind: IdentifierKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Insertion-ordered set of owner logins.
///
/// Membership is hashed; iteration follows first insertion.
#[derive(Debug, Clone, Default)]
pub struct OwnerSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl OwnerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an owner. Returns `false` if it was already present.
    pub fn insert(&mut self, owner: &str) -> bool {
        if self.members.contains(owner) {
            return false;
        }
        self.members.insert(owner.to_string());
        self.order.push(owner.to_string());
        true
    }

    pub fn contains(&self, owner: &str) -> bool {
        self.members.contains(owner)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }
}

impl<'a> IntoIterator for &'a OwnerSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// An identifier owned by two or more accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub identifier: Identifier,
    /// Owners in first-link order
    pub owners: Vec<String>,
}

/// Distinct values of one identifier kind linked to an owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerValues {
    pub owner: String,
    pub values: Vec<String>,
}

/// Inverted index from identifier to the ordered set of owners that linked it
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    entries: Vec<(Identifier, OwnerSet)>,
    positions: HashMap<Identifier, usize>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link every value in `values` to `owner` under `kind`.
    ///
    /// Linking the same relation twice is a no-op. An empty `values` iterator
    /// links nothing.
    ///
    /// # Panics
    ///
    /// Panics if `owner` is empty: every relation needs an owner.
    pub fn link<I, V>(&mut self, kind: IdentifierKind, values: I, owner: &str)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        assert!(
            !owner.is_empty(),
            "an owner login is required to link a {} identifier",
            kind
        );

        for value in values {
            let identifier = Identifier::new(kind, value);
            let position = match self.positions.get(&identifier) {
                Some(&position) => position,
                None => {
                    let position = self.entries.len();
                    self.positions.insert(identifier.clone(), position);
                    self.entries.push((identifier, OwnerSet::new()));
                    position
                }
            };
            self.entries[position].1.insert(owner);
        }
    }

    /// Owners linked to `(kind, value)`, if any
    pub fn owners(&self, kind: IdentifierKind, value: &str) -> Option<&[String]> {
        let identifier = Identifier::new(kind, value);
        self.positions
            .get(&identifier)
            .map(|&position| self.entries[position].1.as_slice())
    }

    /// Every identifier owned by at least two accounts, in first-link order
    pub fn collisions(&self) -> Vec<Collision> {
        self.entries
            .iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(identifier, owners)| Collision {
                identifier: identifier.clone(),
                owners: owners.as_slice().to_vec(),
            })
            .collect()
    }

    /// For each owner with at least one value of `kind`, the distinct values
    /// linked to it. Owners and values keep first-link order.
    pub fn values_by_type(&self, kind: IdentifierKind) -> Vec<OwnerValues> {
        let mut results: Vec<OwnerValues> = Vec::new();
        let mut owner_positions: HashMap<&str, usize> = HashMap::new();

        for (identifier, owners) in self.entries.iter().filter(|(id, _)| id.kind == kind) {
            for owner in owners {
                let position = *owner_positions.entry(owner.as_str()).or_insert_with(|| {
                    results.push(OwnerValues {
                        owner: owner.clone(),
                        values: Vec::new(),
                    });
                    results.len() - 1
                });
                let values = &mut results[position].values;
                if !values.contains(&identifier.value) {
                    values.push(identifier.value.clone());
                }
            }
        }

        results
    }

    /// Drop every relation
    pub fn reset(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_set_keeps_first_insertion_order() {
        let mut set = OwnerSet::new();
        assert!(set.insert("carol"));
        assert!(set.insert("alice"));
        assert!(!set.insert("carol"));
        assert_eq!(set.as_slice(), &["carol".to_string(), "alice".to_string()]);
        assert!(set.contains("alice"));
        assert!(!set.contains("bob"));
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::Email, ["a@example.com"], "alice");
        index.link(IdentifierKind::Email, ["a@example.com"], "alice");

        assert_eq!(
            index.owners(IdentifierKind::Email, "a@example.com"),
            Some(&["alice".to_string()][..])
        );
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn test_collision_requires_two_distinct_owners() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::PgpKeyId, ["AAAA"], "alice");
        index.link(IdentifierKind::PgpKeyId, ["BBBB"], "bob");
        assert!(index.collisions().is_empty());

        index.link(IdentifierKind::PgpKeyId, ["AAAA"], "bob");
        let collisions = index.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].identifier, Identifier::new(IdentifierKind::PgpKeyId, "AAAA"));
        assert_eq!(collisions[0].owners, vec!["alice", "bob"]);
    }

    #[test]
    fn test_same_value_different_kind_does_not_collide() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::DaysSinceCreation, ["42"], "alice");
        index.link(IdentifierKind::DaysSinceUpdated, ["42"], "bob");
        assert!(index.collisions().is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_owner_order_is_first_link_order() {
        let mut index = IdentifierIndex::new();
        for owner in ["zed", "amy", "mo", "amy", "zed"] {
            index.link(IdentifierKind::Email, ["shared@example.com"], owner);
        }
        let collisions = index.collisions();
        assert_eq!(collisions[0].owners, vec!["zed", "amy", "mo"]);
    }

    #[test]
    fn test_empty_values_link_nothing() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::PgpKeyId, Vec::<String>::new(), "alice");
        assert!(index.is_empty());
    }

    #[test]
    #[should_panic(expected = "owner login is required")]
    fn test_link_without_owner_panics() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::Email, ["a@example.com"], "");
    }

    #[test]
    fn test_values_by_type() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::PgpKeyId, ["K1", "K2"], "alice");
        index.link(IdentifierKind::PgpKeyId, ["K2"], "bob");
        index.link(IdentifierKind::Email, ["a@example.com"], "carol");

        let values = index.values_by_type(IdentifierKind::PgpKeyId);
        assert_eq!(
            values,
            vec![
                OwnerValues {
                    owner: "alice".to_string(),
                    values: vec!["K1".to_string(), "K2".to_string()],
                },
                OwnerValues {
                    owner: "bob".to_string(),
                    values: vec!["K2".to_string()],
                },
            ]
        );
        assert!(index.values_by_type(IdentifierKind::SshSignatureAlgorithm).is_empty());
    }

    #[test]
    fn test_reset_clears_collisions() {
        let mut index = IdentifierIndex::new();
        index.link(IdentifierKind::Email, ["x@example.com"], "alice");
        index.link(IdentifierKind::Email, ["x@example.com"], "bob");
        assert!(!index.collisions().is_empty());

        index.reset();
        assert!(index.collisions().is_empty());
        assert!(index.owners(IdentifierKind::Email, "x@example.com").is_none());
    }

    #[test]
    fn test_kind_tags_are_unique() {
        let tags: HashSet<_> = IdentifierKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(tags.len(), IdentifierKind::ALL.len());
    }

    #[test]
    fn test_kind_serializes_as_tag() {
        let json = serde_json::to_string(&IdentifierKind::PgpSignatureCreationTime).unwrap();
        assert_eq!(json, "\"PGP_SCT\"");
    }
}
