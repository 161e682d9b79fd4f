//! Transaction and account authenticators.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::error::{AptosError, AptosResult};
use crate::types::AccountAddress;
use serde::{Deserialize, Serialize};

/// Proof that the right accounts approved a transaction.
///
/// Variant order fixes the wire tag: Ed25519 0, MultiEd25519 1,
/// MultiAgent 2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAuthenticator {
    /// The sender alone signed.
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    },
    /// A k-of-n multisig sender. Carried opaque; this crate does not produce
    /// or check these.
    MultiEd25519 {
        #[serde(with = "serde_bytes")]
        public_key: Vec<u8>,
        #[serde(with = "serde_bytes")]
        signature: Vec<u8>,
    },
    /// The sender plus an ordered list of secondary signers.
    ///
    /// On the wire the secondary addresses come first as one list, then the
    /// secondary authenticators as a second list of the same length.
    MultiAgent {
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
    },
}

impl TransactionAuthenticator {
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    /// Assembles a multi-agent authenticator without checking it against any
    /// envelope. Prefer [`Self::multi_agent_checked`].
    pub fn multi_agent(
        sender: AccountAuthenticator,
        secondary_signers: Vec<(AccountAddress, AccountAuthenticator)>,
    ) -> Self {
        let (secondary_signer_addresses, secondary_signers) = secondary_signers.into_iter().unzip();
        Self::MultiAgent {
            sender,
            secondary_signer_addresses,
            secondary_signers,
        }
    }

    /// Assembles a multi-agent authenticator whose secondary signers must
    /// match `expected` in count and order.
    ///
    /// `expected` is the secondary address list of the envelope that was
    /// signed. A mismatch fails with [`AptosError::StructuralMismatch`].
    pub fn multi_agent_checked(
        sender: AccountAuthenticator,
        secondary_signers: Vec<(AccountAddress, AccountAuthenticator)>,
        expected: &[AccountAddress],
    ) -> AptosResult<Self> {
        let actual: Vec<AccountAddress> = secondary_signers.iter().map(|(a, _)| *a).collect();
        check_secondary_signers(expected, &actual)?;
        Ok(Self::multi_agent(sender, secondary_signers))
    }

    /// The sender's part of this authenticator.
    pub fn sender(&self) -> AccountAuthenticator {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => AccountAuthenticator::ed25519(*public_key, *signature),
            Self::MultiEd25519 {
                public_key,
                signature,
            } => AccountAuthenticator::MultiEd25519 {
                public_key: public_key.clone(),
                signature: signature.clone(),
            },
            Self::MultiAgent { sender, .. } => sender.clone(),
        }
    }

    /// Secondary signers paired with their addresses, in order. Empty unless
    /// this is a multi-agent authenticator.
    pub fn secondary_signers(&self) -> Vec<(AccountAddress, &AccountAuthenticator)> {
        match self {
            Self::MultiAgent {
                secondary_signer_addresses,
                secondary_signers,
                ..
            } => secondary_signer_addresses
                .iter()
                .copied()
                .zip(secondary_signers.iter())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Fails with [`AptosError::StructuralMismatch`] when a multi-agent
    /// authenticator lists a different number of secondary addresses than
    /// it carries signatures.
    pub fn check_secondary_signer_count(&self) -> AptosResult<()> {
        match self {
            Self::MultiAgent {
                secondary_signer_addresses,
                secondary_signers,
                ..
            } if secondary_signer_addresses.len() != secondary_signers.len() => {
                Err(AptosError::mismatch(
                    format!("{} secondary signatures", secondary_signer_addresses.len()),
                    format!("{} secondary signatures", secondary_signers.len()),
                ))
            }
            _ => Ok(()),
        }
    }

    pub fn is_multi_agent(&self) -> bool {
        matches!(self, Self::MultiAgent { .. })
    }
}

/// One account's signature over a transaction.
///
/// Variant order fixes the wire tag: Ed25519 0, MultiEd25519 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountAuthenticator {
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    },
    MultiEd25519 {
        #[serde(with = "serde_bytes")]
        public_key: Vec<u8>,
        #[serde(with = "serde_bytes")]
        signature: Vec<u8>,
    },
}

impl AccountAuthenticator {
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    /// Checks the signature over `message`.
    pub fn verify(&self, message: &[u8]) -> AptosResult<()> {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => public_key.verify(message, signature),
            Self::MultiEd25519 { .. } => Err(AptosError::InvalidSignature(
                "multi-ed25519 verification is not supported".to_string(),
            )),
        }
    }

    /// The address a fresh account controlled by this key would have.
    pub fn derived_address(&self) -> Option<AccountAddress> {
        match self {
            Self::Ed25519 { public_key, .. } => Some(public_key.to_address()),
            Self::MultiEd25519 { .. } => None,
        }
    }
}

/// Fails unless `actual` lists the same secondary signers as `expected`, in
/// the same order.
pub fn check_secondary_signers(
    expected: &[AccountAddress],
    actual: &[AccountAddress],
) -> AptosResult<()> {
    if expected.len() != actual.len() {
        return Err(AptosError::mismatch(
            format!("{} secondary signers", expected.len()),
            format!("{} secondary signers", actual.len()),
        ));
    }
    if let Some((index, (want, got))) = expected
        .iter()
        .zip(actual)
        .enumerate()
        .find(|(_, (want, got))| want != got)
    {
        return Err(AptosError::mismatch(
            format!("secondary signer {index} to be {want}"),
            got.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs;
    use crate::crypto::Ed25519PrivateKey;

    fn account_auth(seed: u8, message: &[u8]) -> (AccountAddress, AccountAuthenticator) {
        let key = Ed25519PrivateKey::from_bytes(&[seed; 32]).unwrap();
        let public_key = key.public_key();
        (
            public_key.to_address(),
            AccountAuthenticator::ed25519(public_key, key.sign(message)),
        )
    }

    #[test]
    fn test_ed25519_layout() {
        let key = Ed25519PrivateKey::generate();
        let auth = TransactionAuthenticator::ed25519(key.public_key(), key.sign(b"m"));
        let bytes = bcs::to_bytes(&auth).unwrap();

        assert_eq!(bytes.len(), 1 + 1 + 32 + 1 + 64);
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 0x20);
        assert_eq!(&bytes[2..34], &key.public_key().to_bytes());
        assert_eq!(bytes[34], 0x40);
    }

    #[test]
    fn test_multi_agent_layout() {
        let (_, sender) = account_auth(1, b"m");
        let (b_addr, b_auth) = account_auth(2, b"m");
        let (c_addr, c_auth) = account_auth(3, b"m");
        let auth = TransactionAuthenticator::multi_agent(
            sender.clone(),
            vec![(b_addr, b_auth.clone()), (c_addr, c_auth.clone())],
        );

        let bytes = bcs::to_bytes(&auth).unwrap();
        assert_eq!(bytes[0], 2);

        let mut expected = vec![2];
        expected.extend(bcs::to_bytes(&sender).unwrap());
        expected.push(2);
        expected.extend(b_addr.as_bytes());
        expected.extend(c_addr.as_bytes());
        expected.push(2);
        expected.extend(bcs::to_bytes(&b_auth).unwrap());
        expected.extend(bcs::to_bytes(&c_auth).unwrap());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_checked_rejects_count_mismatch() {
        let (_, sender) = account_auth(1, b"m");
        let (b_addr, b_auth) = account_auth(2, b"m");
        let err = TransactionAuthenticator::multi_agent_checked(
            sender,
            vec![(b_addr, b_auth)],
            &[b_addr, AccountAddress::ONE],
        )
        .unwrap_err();
        assert!(matches!(err, AptosError::StructuralMismatch { .. }));
    }

    #[test]
    fn test_checked_rejects_order_mismatch() {
        let (_, sender) = account_auth(1, b"m");
        let (b_addr, b_auth) = account_auth(2, b"m");
        let (c_addr, c_auth) = account_auth(3, b"m");
        let err = TransactionAuthenticator::multi_agent_checked(
            sender,
            vec![(c_addr, c_auth), (b_addr, b_auth)],
            &[b_addr, c_addr],
        )
        .unwrap_err();
        match err {
            AptosError::StructuralMismatch { expected, .. } => {
                assert!(expected.starts_with("secondary signer 0"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_secondary_signers_pairs() {
        let (_, sender) = account_auth(1, b"m");
        let (b_addr, b_auth) = account_auth(2, b"m");
        let auth = TransactionAuthenticator::multi_agent_checked(
            sender.clone(),
            vec![(b_addr, b_auth.clone())],
            &[b_addr],
        )
        .unwrap();
        assert_eq!(auth.secondary_signers(), vec![(b_addr, &b_auth)]);
        assert_eq!(auth.sender(), sender);
        assert!(auth.is_multi_agent());
    }

    #[test]
    fn test_account_authenticator_verify() {
        let (addr, auth) = account_auth(4, b"payload");
        assert!(auth.verify(b"payload").is_ok());
        assert!(auth.verify(b"other").is_err());
        assert_eq!(auth.derived_address(), Some(addr));
    }
}
