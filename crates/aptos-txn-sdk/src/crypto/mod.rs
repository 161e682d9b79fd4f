//! Hashing and Ed25519 signing.
//!
//! Signature arithmetic is delegated to `ed25519-dalek`; this module only
//! wraps keys and signatures in types that encode the way the node expects.

mod ed25519;
mod hash;

pub use ed25519::{
    Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, ED25519_PRIVATE_KEY_LENGTH,
    ED25519_PUBLIC_KEY_LENGTH, ED25519_SIGNATURE_LENGTH,
};
pub use hash::{sha3_256, sha3_256_of};

use crate::types::AccountAddress;

/// Authentication key scheme byte for single Ed25519 keys.
pub const ED25519_SCHEME: u8 = 0;

/// Authentication key scheme byte for multi-Ed25519 keys.
pub const MULTI_ED25519_SCHEME: u8 = 1;

/// `SHA3-256(public_key || scheme)`.
pub fn derive_authentication_key(public_key: &[u8], scheme: u8) -> [u8; 32] {
    sha3_256_of([public_key, &[scheme]])
}

/// An account's initial address equals its authentication key.
pub fn derive_address(public_key: &[u8], scheme: u8) -> AccountAddress {
    AccountAddress::new(derive_authentication_key(public_key, scheme))
}
