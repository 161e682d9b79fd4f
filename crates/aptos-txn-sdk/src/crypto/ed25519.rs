//! Ed25519 keys and signatures.
//!
//! Public keys and signatures encode as length-prefixed byte strings (`0x20`
//! and `0x40` prefixes respectively), matching how the node decodes an
//! authenticator.

use crate::crypto::{derive_address, ED25519_SCHEME};
use crate::error::{AptosError, AptosResult};
use crate::types::AccountAddress;
use ed25519_dalek::{Signer as _, Verifier as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;
use std::fmt;
use zeroize::Zeroizing;

pub const ED25519_PRIVATE_KEY_LENGTH: usize = 32;
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;
pub const ED25519_SIGNATURE_LENGTH: usize = 64;

/// An Ed25519 private key.
///
/// The underlying `SigningKey` wipes its secret on drop. `Debug` never prints
/// key material.
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    inner: ed25519_dalek::SigningKey,
}

impl Ed25519PrivateKey {
    /// Generates a key from the operating system's RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            inner: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> AptosResult<Self> {
        let seed: &[u8; ED25519_PRIVATE_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            AptosError::InvalidPrivateKey(format!(
                "expected {ED25519_PRIVATE_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        })
    }

    pub fn from_hex(hex_str: &str) -> AptosResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|e| AptosError::InvalidPrivateKey(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Raw 32-byte seed. Callers own the responsibility of not leaking it.
    pub fn to_bytes(&self) -> Zeroizing<[u8; ED25519_PRIVATE_KEY_LENGTH]> {
        Zeroizing::new(self.inner.to_bytes())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Ed25519 signing is deterministic: the same key and message always give
    /// the same signature.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature {
            inner: self.inner.sign(message),
        }
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ed25519PrivateKey([REDACTED])")
    }
}

/// An Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    inner: ed25519_dalek::VerifyingKey,
}

impl Ed25519PublicKey {
    /// Parses 32 bytes, rejecting points that are not on the curve.
    pub fn from_bytes(bytes: &[u8]) -> AptosResult<Self> {
        let key: &[u8; ED25519_PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            AptosError::InvalidPublicKey(format!(
                "expected {ED25519_PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let inner = ed25519_dalek::VerifyingKey::from_bytes(key)
            .map_err(|e| AptosError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn from_hex(hex_str: &str) -> AptosResult<Self> {
        let bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_LENGTH] {
        self.inner.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> AptosResult<()> {
        self.inner
            .verify(message, &signature.inner)
            .map_err(|_| AptosError::SignatureVerificationFailed)
    }

    /// The address of a fresh account controlled by this key.
    pub fn to_address(&self) -> AccountAddress {
        derive_address(&self.to_bytes(), ED25519_SCHEME)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = ByteBuf::deserialize(deserializer)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

/// An Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature {
    inner: ed25519_dalek::Signature,
}

impl Ed25519Signature {
    pub fn from_bytes(bytes: &[u8]) -> AptosResult<Self> {
        let inner = ed25519_dalek::Signature::from_slice(bytes).map_err(|_| {
            AptosError::InvalidSignature(format!(
                "expected {ED25519_SIGNATURE_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { inner })
    }

    pub fn from_hex(hex_str: &str) -> AptosResult<Self> {
        let bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; ED25519_SIGNATURE_LENGTH] {
        self.inner.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({})", self.to_hex())
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = ByteBuf::deserialize(deserializer)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
