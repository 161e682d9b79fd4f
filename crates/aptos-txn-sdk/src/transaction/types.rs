//! Raw, multi-agent and signed transactions.

use crate::bcs;
use crate::crypto::{sha3_256, sha3_256_of};
use crate::error::{AptosError, AptosResult};
use crate::transaction::authenticator::{
    check_secondary_signers, AccountAuthenticator, TransactionAuthenticator,
};
use crate::transaction::payload::TransactionPayload;
use crate::types::{AccountAddress, ChainId, HashValue};
use serde::{Deserialize, Serialize};

/// HTTP content type of a canonically encoded signed transaction.
pub const BCS_SIGNED_TRANSACTION_CONTENT_TYPE: &str = "application/x.aptos.signed_transaction+bcs";

const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";
const RAW_TRANSACTION_WITH_DATA_SALT: &[u8] = b"APTOS::RawTransactionWithData";
const TRANSACTION_SALT: &[u8] = b"APTOS::Transaction";

/// Anything that produces the exact bytes a signer must sign.
pub trait SigningMessage {
    /// Domain prefix followed by the canonical encoding.
    fn signing_message(&self) -> AptosResult<Vec<u8>>;
}

fn prefixed(salt: &[u8], body: Vec<u8>) -> Vec<u8> {
    let prefix = sha3_256(salt);
    let mut message = Vec::with_capacity(prefix.len() + body.len());
    message.extend_from_slice(&prefix);
    message.extend_from_slice(&body);
    message
}

/// The transaction a sender signs.
///
/// Field order is the wire order. Constructing one performs no I/O.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    /// Must equal the sender's current on-chain sequence number.
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    /// Seconds since the Unix epoch.
    pub expiration_timestamp_secs: u64,
    pub chain_id: ChainId,
}

impl RawTransaction {
    pub fn new(
        sender: AccountAddress,
        sequence_number: u64,
        payload: TransactionPayload,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self {
            sender,
            sequence_number,
            payload,
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        }
    }

    /// `SHA3-256("APTOS::RawTransaction") || bcs(self)`.
    pub fn signing_message(&self) -> AptosResult<Vec<u8>> {
        Ok(prefixed(RAW_TRANSACTION_SALT, self.to_bcs()?))
    }

    pub fn to_bcs(&self) -> AptosResult<Vec<u8>> {
        bcs::to_bytes(self)
    }
}

impl SigningMessage for RawTransaction {
    fn signing_message(&self) -> AptosResult<Vec<u8>> {
        RawTransaction::signing_message(self)
    }
}

/// A raw transaction that also names the accounts co-signing it.
///
/// Every signer, sender included, signs the same message, which commits to
/// the secondary addresses in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAgentRawTransaction {
    pub raw_txn: RawTransaction,
    pub secondary_signer_addresses: Vec<AccountAddress>,
}

impl MultiAgentRawTransaction {
    pub fn new(raw_txn: RawTransaction, secondary_signer_addresses: Vec<AccountAddress>) -> Self {
        Self {
            raw_txn,
            secondary_signer_addresses,
        }
    }

    /// `SHA3-256("APTOS::RawTransactionWithData") || bcs(MultiAgent { .. })`.
    pub fn signing_message(&self) -> AptosResult<Vec<u8>> {
        #[derive(Serialize)]
        enum RawTransactionWithData<'a> {
            MultiAgent {
                raw_txn: &'a RawTransaction,
                secondary_signer_addresses: &'a [AccountAddress],
            },
        }

        let data = RawTransactionWithData::MultiAgent {
            raw_txn: &self.raw_txn,
            secondary_signer_addresses: &self.secondary_signer_addresses,
        };
        Ok(prefixed(RAW_TRANSACTION_WITH_DATA_SALT, bcs::to_bytes(&data)?))
    }

    pub fn inner(&self) -> &RawTransaction {
        &self.raw_txn
    }

    pub fn into_inner(self) -> RawTransaction {
        self.raw_txn
    }
}

impl SigningMessage for MultiAgentRawTransaction {
    fn signing_message(&self) -> AptosResult<Vec<u8>> {
        MultiAgentRawTransaction::signing_message(self)
    }
}

/// A transaction ready to be signed, with or without secondary signers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnsignedTransaction {
    SingleAgent(RawTransaction),
    MultiAgent(MultiAgentRawTransaction),
}

impl UnsignedTransaction {
    pub fn raw_txn(&self) -> &RawTransaction {
        match self {
            Self::SingleAgent(raw) => raw,
            Self::MultiAgent(txn) => &txn.raw_txn,
        }
    }

    pub fn secondary_signer_addresses(&self) -> &[AccountAddress] {
        match self {
            Self::SingleAgent(_) => &[],
            Self::MultiAgent(txn) => &txn.secondary_signer_addresses,
        }
    }
}

impl SigningMessage for UnsignedTransaction {
    fn signing_message(&self) -> AptosResult<Vec<u8>> {
        match self {
            Self::SingleAgent(raw) => raw.signing_message(),
            Self::MultiAgent(txn) => txn.signing_message(),
        }
    }
}

impl From<RawTransaction> for UnsignedTransaction {
    fn from(raw: RawTransaction) -> Self {
        Self::SingleAgent(raw)
    }
}

impl From<MultiAgentRawTransaction> for UnsignedTransaction {
    fn from(txn: MultiAgentRawTransaction) -> Self {
        Self::MultiAgent(txn)
    }
}

/// A raw transaction together with its authenticator. This is what gets
/// submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    pub fn new(raw_txn: RawTransaction, authenticator: TransactionAuthenticator) -> Self {
        Self {
            raw_txn,
            authenticator,
        }
    }

    /// The request body for submission.
    pub fn canonical_bytes(&self) -> AptosResult<Vec<u8>> {
        bcs::to_bytes(self)
    }

    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    /// The hash the node reports for this transaction once submitted.
    pub fn hash(&self) -> AptosResult<HashValue> {
        let bytes = self.canonical_bytes()?;
        let prefix = sha3_256(TRANSACTION_SALT);
        // 0 is the user-transaction variant
        Ok(HashValue::new(sha3_256_of([&prefix[..], &[0u8][..], &bytes[..]])))
    }

    /// The message every signer of this transaction signed.
    pub fn signing_message(&self) -> AptosResult<Vec<u8>> {
        match &self.authenticator {
            TransactionAuthenticator::MultiAgent {
                secondary_signer_addresses,
                ..
            } => MultiAgentRawTransaction::new(
                self.raw_txn.clone(),
                secondary_signer_addresses.clone(),
            )
            .signing_message(),
            _ => self.raw_txn.signing_message(),
        }
    }

    /// Checks every signature against the signing message.
    ///
    /// Says nothing about whether the keys are allowed to act for the
    /// accounts involved; see [`Self::verify`].
    pub fn verify_signature(&self) -> AptosResult<()> {
        self.authenticator.check_secondary_signer_count()?;
        let message = self.signing_message()?;
        self.authenticator.sender().verify(&message)?;
        for (_, signer) in self.authenticator.secondary_signers() {
            signer.verify(&message)?;
        }
        Ok(())
    }

    /// Checks every signature and that each key derives to the address it
    /// signs for.
    ///
    /// Only meaningful for accounts whose authentication key was never
    /// rotated, where the address still equals the derived one.
    pub fn verify(&self) -> AptosResult<()> {
        self.verify_signature()?;
        check_key_binding(&self.authenticator.sender(), self.raw_txn.sender)?;
        for (address, signer) in self.authenticator.secondary_signers() {
            check_key_binding(signer, address)?;
        }
        Ok(())
    }
}

fn check_key_binding(auth: &AccountAuthenticator, address: AccountAddress) -> AptosResult<()> {
    match auth.derived_address() {
        Some(derived) if derived == address => Ok(()),
        Some(derived) => Err(AptosError::mismatch(
            format!("key for {address}"),
            format!("key for {derived}"),
        )),
        None => Err(AptosError::InvalidSignature(
            "cannot derive an address from this authenticator".to_string(),
        )),
    }
}

/// Builds the submission envelope, checking the secondary signers of a
/// multi-agent authenticator against the envelope they were collected for.
pub fn assemble_signed_transaction(
    txn: UnsignedTransaction,
    authenticator: TransactionAuthenticator,
) -> AptosResult<SignedTransaction> {
    match (&txn, &authenticator) {
        (UnsignedTransaction::SingleAgent(_), TransactionAuthenticator::MultiAgent { .. }) => {
            return Err(AptosError::mismatch(
                "a single-agent authenticator",
                "a multi-agent authenticator",
            ));
        }
        (UnsignedTransaction::MultiAgent(_), TransactionAuthenticator::MultiAgent { .. }) => {
            authenticator.check_secondary_signer_count()?;
            let actual: Vec<AccountAddress> = authenticator
                .secondary_signers()
                .into_iter()
                .map(|(address, _)| address)
                .collect();
            check_secondary_signers(txn.secondary_signer_addresses(), &actual)?;
        }
        (UnsignedTransaction::MultiAgent(_), _) => {
            return Err(AptosError::mismatch(
                "a multi-agent authenticator",
                "a single-agent authenticator",
            ));
        }
        (UnsignedTransaction::SingleAgent(_), _) => {}
    }
    let raw_txn = match txn {
        UnsignedTransaction::SingleAgent(raw) => raw,
        UnsignedTransaction::MultiAgent(txn) => txn.into_inner(),
    };
    Ok(SignedTransaction::new(raw_txn, authenticator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519PrivateKey;
    use crate::transaction::payload::ScriptFunction;
    use crate::transaction::TransactionArgument;

    fn raw_txn(sender: AccountAddress) -> RawTransaction {
        let payload = ScriptFunction::natural(
            "0x1::Coin",
            "transfer",
            vec!["0x1::TestCoin::TestCoin".parse().unwrap()],
            &[
                TransactionArgument::Address(AccountAddress::ONE),
                TransactionArgument::U64(1_000),
            ],
        )
        .unwrap();
        RawTransaction::new(
            sender,
            0,
            payload.into(),
            2_000,
            1,
            1_700_000_000,
            ChainId::new(4),
        )
    }

    #[test]
    fn test_signing_message_prefix() {
        let raw = raw_txn(AccountAddress::ONE);
        let message = raw.signing_message().unwrap();
        assert_eq!(&message[..32], &sha3_256(b"APTOS::RawTransaction"));
        assert_eq!(&message[32..], &raw.to_bcs().unwrap()[..]);
    }

    #[test]
    fn test_raw_transaction_field_order() {
        let raw = raw_txn(AccountAddress::ONE);
        let bytes = raw.to_bcs().unwrap();
        assert_eq!(&bytes[..32], AccountAddress::ONE.as_bytes());
        assert_eq!(&bytes[32..40], &0u64.to_le_bytes());
        assert_eq!(bytes[40], 2);
        let tail = &bytes[bytes.len() - 25..];
        assert_eq!(&tail[..8], &2_000u64.to_le_bytes());
        assert_eq!(&tail[8..16], &1u64.to_le_bytes());
        assert_eq!(&tail[16..24], &1_700_000_000u64.to_le_bytes());
        assert_eq!(tail[24], 4);
    }

    #[test]
    fn test_multi_agent_signing_message() {
        let raw = raw_txn(AccountAddress::ONE);
        let txn = MultiAgentRawTransaction::new(raw.clone(), vec![AccountAddress::ZERO]);
        let message = txn.signing_message().unwrap();

        assert_eq!(&message[..32], &sha3_256(b"APTOS::RawTransactionWithData"));
        // variant 0, the raw transaction, then a one-element address list
        let body = &message[32..];
        assert_eq!(body[0], 0);
        let raw_bytes = raw.to_bcs().unwrap();
        assert_eq!(&body[1..1 + raw_bytes.len()], &raw_bytes[..]);
        assert_eq!(body[1 + raw_bytes.len()], 1);
        assert_eq!(body.len(), 1 + raw_bytes.len() + 1 + 32);
    }

    #[test]
    fn test_signed_transaction_verifies() {
        let key = Ed25519PrivateKey::from_bytes(&[3u8; 32]).unwrap();
        let raw = raw_txn(key.public_key().to_address());
        let signature = key.sign(&raw.signing_message().unwrap());
        let signed = SignedTransaction::new(
            raw,
            TransactionAuthenticator::ed25519(key.public_key(), signature),
        );

        assert!(signed.verify().is_ok());
        assert_eq!(signed.hash().unwrap(), signed.hash().unwrap());
    }

    #[test]
    fn test_wrong_sender_key_fails_verify() {
        let key = Ed25519PrivateKey::from_bytes(&[3u8; 32]).unwrap();
        let raw = raw_txn(AccountAddress::ONE);
        let signature = key.sign(&raw.signing_message().unwrap());
        let signed = SignedTransaction::new(
            raw,
            TransactionAuthenticator::ed25519(key.public_key(), signature),
        );

        assert!(signed.verify_signature().is_ok());
        assert!(matches!(
            signed.verify(),
            Err(AptosError::StructuralMismatch { .. })
        ));
    }

    #[test]
    fn test_hash_layout() {
        let key = Ed25519PrivateKey::from_bytes(&[5u8; 32]).unwrap();
        let raw = raw_txn(key.public_key().to_address());
        let signature = key.sign(&raw.signing_message().unwrap());
        let signed = SignedTransaction::new(
            raw,
            TransactionAuthenticator::ed25519(key.public_key(), signature),
        );

        let mut preimage = sha3_256(b"APTOS::Transaction").to_vec();
        preimage.push(0);
        preimage.extend(signed.canonical_bytes().unwrap());
        assert_eq!(signed.hash().unwrap(), HashValue::sha3_256(&preimage));
    }

    #[test]
    fn test_assemble_rejects_mismatched_kinds() {
        let key = Ed25519PrivateKey::generate();
        let raw = raw_txn(key.public_key().to_address());
        let single = TransactionAuthenticator::ed25519(key.public_key(), key.sign(b"x"));
        let multi_txn = MultiAgentRawTransaction::new(raw.clone(), vec![AccountAddress::ONE]);

        assert!(matches!(
            assemble_signed_transaction(multi_txn.into(), single.clone()),
            Err(AptosError::StructuralMismatch { .. })
        ));
        assert!(assemble_signed_transaction(raw.into(), single).is_ok());
    }
}
