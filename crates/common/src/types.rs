//! Primitive identities and value types shared by the staking engine and the node.
//!
//! Semua identitas di-serialize sebagai hex string (JSON / TOML), sedangkan
//! encoding biner (bincode) tetap memakai representasi string yang sama agar
//! satu format berlaku di semua layer.

use anyhow::Result;
use hex::{decode as hex_decode, encode as hex_encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LEN: usize = 20;
pub const PUBKEY_LEN: usize = 32;

fn decode_fixed<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex_decode(s)?;
    if bytes.len() != N {
        anyhow::bail!("invalid {} length: {}", what, bytes.len());
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

// ════════════════════════════════════════════════════════════════════════════
// ADDRESS
// ════════════════════════════════════════════════════════════════════════════

/// Account identity: 20 bytes (first 20 bytes of SHA3-512 over the key or seed).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub fn from_bytes(b: [u8; ADDRESS_LEN]) -> Self { Address(b) }
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] { &self.0 }
    pub fn to_hex(&self) -> String { hex_encode(self.0) }
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Address(decode_fixed::<ADDRESS_LEN>(s, "address")?))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.to_hex()).finish()
    }
}
impl FromStr for Address {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_str(&self.to_hex())
    }
}
impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Address, D::Error>
    where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PUBKEY (validator identity)
// ════════════════════════════════════════════════════════════════════════════

/// Validator consensus key (32 bytes, ed25519-sized). Primary key of a candidate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PubKey(pub [u8; PUBKEY_LEN]);

impl PubKey {
    pub fn from_bytes(b: [u8; PUBKEY_LEN]) -> Self { PubKey(b) }
    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] { &self.0 }
    pub fn to_hex(&self) -> String { hex_encode(self.0) }
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(PubKey(decode_fixed::<PUBKEY_LEN>(s, "pubkey")?))
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PubKey").field(&self.to_hex()).finish()
    }
}
impl FromStr for PubKey {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PubKey::from_hex(s)
    }
}

impl Serialize for PubKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_str(&self.to_hex())
    }
}
impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<PubKey, D::Error>
    where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        PubKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// COIN
// ════════════════════════════════════════════════════════════════════════════

/// Amount of a single denomination, in integer micro-units.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Coin { denom: denom.into(), amount }
    }

    pub fn is_zero(&self) -> bool { self.amount == 0 }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_hex_accepts_prefix() {
        let a = Address::from_bytes([0xab; 20]);
        let parsed: Address = format!("0x{}", a.to_hex()).parse().expect("parse");
        assert_eq!(a, parsed);
        assert_eq!(a.to_hex().len(), 40);
    }

    #[test]
    fn pubkey_rejects_wrong_length() {
        assert!(PubKey::from_hex("abcd").is_err());
        assert!(PubKey::from_hex(&"11".repeat(32)).is_ok());
    }

    #[test]
    fn pubkey_orders_bytewise() {
        let lo = PubKey::from_bytes([1; 32]);
        let hi = PubKey::from_bytes([2; 32]);
        assert!(lo < hi);
    }

    #[test]
    fn coin_display() {
        assert_eq!(Coin::new("stake", 42).to_string(), "42stake");
        assert!(Coin::new("stake", 0).is_zero());
    }
}
