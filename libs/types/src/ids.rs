//! Key-derived identity types for settlement entities
//!
//! An `Address` is the 20-byte identity of an account: the leading bytes of
//! SHA-256 over the account's Ed25519 public key. Signature verification
//! derives the signer's address the same way, so "recovering" a signer and
//! comparing identities is a plain byte comparison.
//!
//! A `NodeId` identifies a consensus node in the external staking registry.
//! It shares the 20-byte shape but is a distinct type: node identities and
//! account identities must never be interchangeable.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length in bytes of an `Address` or `NodeId`.
pub const ID_LEN: usize = 20;

/// Errors from parsing a hex-encoded identity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Invalid hex encoding")]
    InvalidHex,

    #[error("Expected {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },
}

fn parse_id_bytes(s: &str) -> Result<[u8; ID_LEN], IdParseError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let raw = hex::decode(stripped).map_err(|_| IdParseError::InvalidHex)?;
    raw.try_into().map_err(|v: Vec<u8>| IdParseError::WrongLength {
        expected: ID_LEN,
        got: v.len(),
    })
}

/// Account identity derived from an Ed25519 public key.
///
/// Displayed and serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ID_LEN]);

impl Address {
    /// The all-zeroes address, used as the "unset" sentinel in configuration.
    pub const ZERO: Address = Address([0u8; ID_LEN]);

    /// Create from raw bytes.
    pub fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the address for an Ed25519 public key (32 raw bytes).
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let digest = Sha256::digest(public_key);
        let mut bytes = [0u8; ID_LEN];
        bytes.copy_from_slice(&digest[..ID_LEN]);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Check for the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id_bytes(s).map(Self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Consensus node identity used by the staking registry and fee vault.
///
/// Displayed and serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId([u8; ID_LEN]);

impl NodeId {
    pub const ZERO: NodeId = NodeId([0u8; ID_LEN]);

    pub fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for NodeId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id_bytes(s).map(Self)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_public_key_deterministic() {
        let key = [7u8; 32];
        let a1 = Address::from_public_key(&key);
        let a2 = Address::from_public_key(&key);
        assert_eq!(a1, a2);

        let other = Address::from_public_key(&[8u8; 32]);
        assert_ne!(a1, other);
    }

    #[test]
    fn test_address_display_round_trip() {
        let addr = Address::new([0xAB; ID_LEN]);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 2 + ID_LEN * 2);
        assert_eq!(s.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_parse_without_prefix() {
        let addr = Address::new([0x11; ID_LEN]);
        let bare = hex::encode(addr.as_bytes());
        assert_eq!(bare.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_parse_invalid_hex() {
        let result = "0xzz".parse::<Address>();
        assert_eq!(result, Err(IdParseError::InvalidHex));
    }

    #[test]
    fn test_address_parse_wrong_length() {
        let result = "0x1234".parse::<Address>();
        assert_eq!(
            result,
            Err(IdParseError::WrongLength {
                expected: ID_LEN,
                got: 2
            })
        );
    }

    #[test]
    fn test_address_zero_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::new([1u8; ID_LEN]).is_zero());
    }

    #[test]
    fn test_address_serialization() {
        let addr = Address::new([0x42; ID_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let deserialized: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, deserialized);
    }

    #[test]
    fn test_node_id_round_trip() {
        let node = NodeId::new([0x99; ID_LEN]);
        let json = serde_json::to_string(&node).unwrap();
        let deserialized: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(node, deserialized);
    }

    #[test]
    fn test_node_id_zero_sentinel() {
        assert!(NodeId::ZERO.is_zero());
        assert!(!NodeId::new([3u8; ID_LEN]).is_zero());
    }
}
