//! Hex encodings shared by the fixture model and the configuration.

use std::{fmt, ops::Deref, str::FromStr};

use primitive_types::{H160, H256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Byte string rendered as `0x`-prefixed lowercase hex (`0x` when empty).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Creates an empty byte string.
    pub const fn new() -> Self {
        Self(Vec::new())
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

impl FromStr for Bytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(strip_hex_prefix(s)).map(Self)
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parses an address in canonical or non-canonical spelling.
///
/// The `0x` prefix is optional and hex digits may use either case, so every spelling of the same
/// address yields the same [`H160`].
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] unless `s` encodes exactly 20 bytes.
pub fn parse_address(s: &str) -> Result<H160> {
    parse_fixed::<20>(s)
        .map(H160)
        .ok_or_else(|| Error::InvalidAddress(s.to_owned()))
}

/// Parses a 32-byte hash; accepts the same spellings as [`parse_address()`].
///
/// # Errors
///
/// Returns [`Error::InvalidHash`] unless `s` encodes exactly 32 bytes.
pub fn parse_hash(s: &str) -> Result<H256> {
    parse_fixed::<32>(s)
        .map(H256)
        .ok_or_else(|| Error::InvalidHash(s.to_owned()))
}

fn parse_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut bytes = [0_u8; N];
    hex::decode_to_slice(strip_hex_prefix(s.trim()), &mut bytes).ok()?;
    Some(bytes)
}
