//! Hashing helpers (SHA3-512) dan derivasi alamat.

use hex::encode as hex_encode;
use sha3::{Digest, Sha3_512};

use crate::types::{Address, PubKey, ADDRESS_LEN};

/// compute sha3-512 raw bytes (64 bytes)
pub fn sha3_512_bytes(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// compute sha3-512 hex string of bytes
pub fn sha3_512_hex(data: &[u8]) -> String {
    hex_encode(sha3_512_bytes(data))
}

fn truncate_to_address(digest: &[u8; 64]) -> Address {
    let mut arr = [0u8; ADDRESS_LEN];
    arr.copy_from_slice(&digest[..ADDRESS_LEN]);
    Address(arr)
}

/// Address of the account controlled by `pk` (first 20 bytes of SHA3-512(pk)).
pub fn address_from_pubkey(pk: &PubKey) -> Address {
    truncate_to_address(&sha3_512_bytes(pk.as_bytes()))
}

/// Keyless module account, e.g. `module_address("stake/hold")`.
pub fn module_address(name: &str) -> Address {
    let mut seed = Vec::with_capacity(7 + name.len());
    seed.extend_from_slice(b"module/");
    seed.extend_from_slice(name.as_bytes());
    truncate_to_address(&sha3_512_bytes(&seed))
}
