use crate::account::Signer;
use crate::crypto::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use crate::error::AptosResult;
use crate::types::AccountAddress;
use std::fmt;

/// An account whose private key lives in process memory.
///
/// The address is derived once from the public key and cached.
///
/// ```rust
/// use aptos_txn_sdk::account::{LocalAccount, Signer};
///
/// let alice = LocalAccount::generate();
/// let signature = alice.sign(b"hello").unwrap();
/// assert!(alice.public_key().verify(b"hello", &signature).is_ok());
/// ```
#[derive(Clone)]
pub struct LocalAccount {
    private_key: Ed25519PrivateKey,
    public_key: Ed25519PublicKey,
    address: AccountAddress,
}

impl LocalAccount {
    pub fn generate() -> Self {
        Self::from_private_key(Ed25519PrivateKey::generate())
    }

    pub fn from_private_key(private_key: Ed25519PrivateKey) -> Self {
        let public_key = private_key.public_key();
        let address = public_key.to_address();
        Self {
            private_key,
            public_key,
            address,
        }
    }

    pub fn from_private_key_bytes(bytes: &[u8]) -> AptosResult<Self> {
        Ed25519PrivateKey::from_bytes(bytes).map(Self::from_private_key)
    }

    pub fn from_private_key_hex(hex_str: &str) -> AptosResult<Self> {
        Ed25519PrivateKey::from_hex(hex_str).map(Self::from_private_key)
    }

    pub fn private_key(&self) -> &Ed25519PrivateKey {
        &self.private_key
    }
}

impl Signer for LocalAccount {
    fn address(&self) -> AccountAddress {
        self.address
    }

    fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    fn sign(&self, message: &[u8]) -> AptosResult<Ed25519Signature> {
        Ok(self.private_key.sign(message))
    }
}

impl fmt::Debug for LocalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAccount")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_matches_public_key() {
        let account = LocalAccount::generate();
        assert_eq!(account.address(), account.public_key().to_address());
    }

    #[test]
    fn test_from_private_key_hex_is_stable() {
        let hex = "0x9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";
        let a = LocalAccount::from_private_key_hex(hex).unwrap();
        let b = LocalAccount::from_private_key_hex(hex).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.sign(b"m").unwrap(), b.sign(b"m").unwrap());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let account = LocalAccount::generate();
        let debug = format!("{account:?}");
        assert!(debug.contains("LocalAccount"));
        assert!(!debug.contains(&hex::encode(*account.private_key().to_bytes())));
    }

    #[test]
    fn test_signer_through_reference() {
        fn address_of(signer: &dyn Signer) -> AccountAddress {
            signer.address()
        }
        let account = LocalAccount::generate();
        assert_eq!(address_of(&&account), account.address());
    }
}
