use crate::crypto::Ed25519PublicKey;
use crate::crypto::Ed25519Signature;
use crate::error::AptosResult;
use crate::types::AccountAddress;

/// Anything able to authorize a transaction with an Ed25519 signature.
///
/// Implementations may keep the key in memory, in a hardware module or
/// behind a remote service. `sign` must be deterministic for a given key and
/// message; a backend failure is reported as [`AptosError::Signing`].
///
/// [`AptosError::Signing`]: crate::error::AptosError::Signing
pub trait Signer: Send + Sync {
    /// The account this signer authorizes for.
    fn address(&self) -> AccountAddress;

    fn public_key(&self) -> Ed25519PublicKey;

    /// Signs `message` exactly as given; callers pass the full signing
    /// message, not a digest of it.
    fn sign(&self, message: &[u8]) -> AptosResult<Ed25519Signature>;
}

impl<T: Signer + ?Sized> Signer for &T {
    fn address(&self) -> AccountAddress {
        (**self).address()
    }

    fn public_key(&self) -> Ed25519PublicKey {
        (**self).public_key()
    }

    fn sign(&self, message: &[u8]) -> AptosResult<Ed25519Signature> {
        (**self).sign(message)
    }
}

impl<T: Signer + ?Sized> Signer for std::sync::Arc<T> {
    fn address(&self) -> AccountAddress {
        (**self).address()
    }

    fn public_key(&self) -> Ed25519PublicKey {
        (**self).public_key()
    }

    fn sign(&self, message: &[u8]) -> AptosResult<Ed25519Signature> {
        (**self).sign(message)
    }
}
