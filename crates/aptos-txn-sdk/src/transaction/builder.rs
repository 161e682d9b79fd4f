//! Transaction builder and signing helpers.

use crate::account::Signer;
use crate::error::{AptosError, AptosResult};
use crate::transaction::authenticator::{AccountAuthenticator, TransactionAuthenticator};
use crate::transaction::payload::TransactionPayload;
use crate::transaction::types::{
    MultiAgentRawTransaction, RawTransaction, SignedTransaction, UnsignedTransaction,
};
use crate::types::{AccountAddress, ChainId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default maximum gas amount.
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 2_000;
/// Default gas unit price.
pub const DEFAULT_GAS_UNIT_PRICE: u64 = 1;
/// Default transaction expiration time in seconds.
pub const DEFAULT_EXPIRATION_SECONDS: u64 = 600;

/// A builder for constructing transactions.
///
/// # Example
///
/// ```rust
/// use aptos_txn_sdk::transaction::{scripts, TransactionBuilder};
/// use aptos_txn_sdk::types::{AccountAddress, ChainId};
///
/// let payload = scripts::coin_transfer(AccountAddress::ONE, 1_000).unwrap();
///
/// let txn = TransactionBuilder::new()
///     .sender(AccountAddress::ONE)
///     .sequence_number(0)
///     .payload(payload)
///     .chain_id(ChainId::testnet())
///     .build()
///     .unwrap();
/// assert_eq!(txn.max_gas_amount, 2_000);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: Option<AccountAddress>,
    sequence_number: Option<u64>,
    payload: Option<TransactionPayload>,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_timestamp_secs: Option<u64>,
    chain_id: Option<ChainId>,
    secondary_signers: Option<Vec<AccountAddress>>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: None,
            sequence_number: None,
            payload: None,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_timestamp_secs: None,
            chain_id: None,
            secondary_signers: None,
        }
    }

    #[must_use]
    pub fn sender(mut self, sender: AccountAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    #[must_use]
    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: TransactionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    #[must_use]
    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    /// Sets an absolute expiration, in seconds since the Unix epoch.
    #[must_use]
    pub fn expiration_timestamp_secs(mut self, expiration_timestamp_secs: u64) -> Self {
        self.expiration_timestamp_secs = Some(expiration_timestamp_secs);
        self
    }

    /// Sets the expiration time relative to now.
    ///
    /// Uses saturating arithmetic in case the clock reads before the epoch.
    #[must_use]
    pub fn expiration_from_now(mut self, seconds: u64) -> Self {
        self.expiration_timestamp_secs = Some(now_secs().saturating_add(seconds));
        self
    }

    #[must_use]
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Declares the co-signers of a multi-agent transaction, in signing
    /// order. Only [`Self::build_unsigned`] honours this.
    #[must_use]
    pub fn secondary_signers(mut self, addresses: Vec<AccountAddress>) -> Self {
        self.secondary_signers = Some(addresses);
        self
    }

    /// Builds the raw transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AptosError::Transaction`] if `sender`, `sequence_number`,
    /// `payload` or `chain_id` is missing.
    pub fn build(self) -> AptosResult<RawTransaction> {
        let sender = self
            .sender
            .ok_or_else(|| AptosError::transaction("sender is required"))?;
        let sequence_number = self
            .sequence_number
            .ok_or_else(|| AptosError::transaction("sequence_number is required"))?;
        let payload = self
            .payload
            .ok_or_else(|| AptosError::transaction("payload is required"))?;
        let chain_id = self
            .chain_id
            .ok_or_else(|| AptosError::transaction("chain_id is required"))?;

        let expiration_timestamp_secs = self
            .expiration_timestamp_secs
            .unwrap_or_else(|| now_secs().saturating_add(DEFAULT_EXPIRATION_SECONDS));

        Ok(RawTransaction::new(
            sender,
            sequence_number,
            payload,
            self.max_gas_amount,
            self.gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        ))
    }

    /// Builds a single- or multi-agent transaction depending on whether
    /// secondary signers were declared.
    pub fn build_unsigned(mut self) -> AptosResult<UnsignedTransaction> {
        let secondary_signers = self.secondary_signers.take();
        let raw_txn = self.build()?;
        Ok(match secondary_signers {
            Some(addresses) => MultiAgentRawTransaction::new(raw_txn, addresses).into(),
            None => raw_txn.into(),
        })
    }

    /// Builds and signs the transaction with `signer`, who becomes the sender
    /// unless one was set.
    pub fn build_and_sign<S: Signer + ?Sized>(self, signer: &S) -> AptosResult<SignedTransaction> {
        let sender = self.sender.unwrap_or_else(|| signer.address());
        let raw_txn = Self {
            sender: Some(sender),
            ..self
        }
        .build()?;

        sign_transaction(&raw_txn, signer)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Signs `message` and wraps the result with the signer's public key.
pub fn account_authenticator<S: Signer + ?Sized>(
    signer: &S,
    message: &[u8],
) -> AptosResult<AccountAuthenticator> {
    let signature = signer.sign(message)?;
    Ok(AccountAuthenticator::ed25519(signer.public_key(), signature))
}

fn check_sender<S: Signer + ?Sized>(raw_txn: &RawTransaction, signer: &S) -> AptosResult<()> {
    let address = signer.address();
    if address != raw_txn.sender {
        return Err(AptosError::mismatch(
            format!("sender {}", raw_txn.sender),
            format!("signer {address}"),
        ));
    }
    Ok(())
}

/// Signs a single-agent transaction.
///
/// # Errors
///
/// Fails with [`AptosError::StructuralMismatch`] if `signer` is not the
/// sender, or with whatever the signer reports.
pub fn sign_transaction<S: Signer + ?Sized>(
    raw_txn: &RawTransaction,
    signer: &S,
) -> AptosResult<SignedTransaction> {
    check_sender(raw_txn, signer)?;
    let signing_message = raw_txn.signing_message()?;
    let signature = signer.sign(&signing_message)?;
    let authenticator = TransactionAuthenticator::ed25519(signer.public_key(), signature);

    Ok(SignedTransaction::new(raw_txn.clone(), authenticator))
}

/// Signs a multi-agent transaction: the sender first, then each secondary
/// signer in order, all over the same message.
///
/// The secondary signers must match the envelope's address list in count
/// and order, otherwise nothing is signed and
/// [`AptosError::StructuralMismatch`] is returned. If any signer fails no
/// partial result is produced.
pub fn sign_multi_agent_transaction<S: Signer + ?Sized>(
    multi_agent: &MultiAgentRawTransaction,
    sender: &S,
    secondary_signers: &[&dyn Signer],
) -> AptosResult<SignedTransaction> {
    check_sender(&multi_agent.raw_txn, sender)?;
    let declared: Vec<AccountAddress> = secondary_signers.iter().map(|s| s.address()).collect();
    crate::transaction::authenticator::check_secondary_signers(
        &multi_agent.secondary_signer_addresses,
        &declared,
    )?;

    let signing_message = multi_agent.signing_message()?;
    let sender_auth = account_authenticator(sender, &signing_message)?;

    let mut secondary_auths = Vec::with_capacity(secondary_signers.len());
    for (signer, address) in secondary_signers.iter().zip(declared) {
        secondary_auths.push((address, account_authenticator(*signer, &signing_message)?));
    }

    let authenticator = TransactionAuthenticator::multi_agent_checked(
        sender_auth,
        secondary_auths,
        &multi_agent.secondary_signer_addresses,
    )?;

    Ok(SignedTransaction::new(
        multi_agent.raw_txn.clone(),
        authenticator,
    ))
}

/// Signs either kind of transaction.
///
/// A single-agent transaction given secondary signers is a structural
/// mismatch.
pub fn sign_unsigned_transaction<S: Signer + ?Sized>(
    txn: &UnsignedTransaction,
    sender: &S,
    secondary_signers: &[&dyn Signer],
) -> AptosResult<SignedTransaction> {
    match txn {
        UnsignedTransaction::SingleAgent(raw_txn) => {
            if !secondary_signers.is_empty() {
                return Err(AptosError::mismatch(
                    "0 secondary signers",
                    format!("{} secondary signers", secondary_signers.len()),
                ));
            }
            sign_transaction(raw_txn, sender)
        }
        UnsignedTransaction::MultiAgent(multi_agent) => {
            sign_multi_agent_transaction(multi_agent, sender, secondary_signers)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::LocalAccount;
    use crate::transaction::scripts;

    fn payload() -> TransactionPayload {
        scripts::coin_transfer(AccountAddress::ONE, 10).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let before = now_secs();
        let txn = TransactionBuilder::new()
            .sender(AccountAddress::ONE)
            .sequence_number(3)
            .payload(payload())
            .chain_id(ChainId::new(4))
            .build()
            .unwrap();

        assert_eq!(txn.max_gas_amount, DEFAULT_MAX_GAS_AMOUNT);
        assert_eq!(txn.gas_unit_price, DEFAULT_GAS_UNIT_PRICE);
        assert!(txn.expiration_timestamp_secs >= before + DEFAULT_EXPIRATION_SECONDS);
        assert!(txn.expiration_timestamp_secs <= now_secs() + DEFAULT_EXPIRATION_SECONDS);
    }

    #[test]
    fn test_builder_missing_fields() {
        let err = TransactionBuilder::new()
            .sequence_number(0)
            .payload(payload())
            .chain_id(ChainId::testnet())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("sender is required"));

        let err = TransactionBuilder::new()
            .sender(AccountAddress::ONE)
            .sequence_number(0)
            .payload(payload())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("chain_id is required"));
    }

    #[test]
    fn test_build_and_sign_uses_signer_as_sender() {
        let account = LocalAccount::generate();
        let signed = TransactionBuilder::new()
            .sequence_number(0)
            .payload(payload())
            .chain_id(ChainId::testnet())
            .build_and_sign(&account)
            .unwrap();

        assert_eq!(signed.sender(), account.address());
        assert!(signed.verify().is_ok());
    }

    #[test]
    fn test_sign_rejects_foreign_signer() {
        let raw = TransactionBuilder::new()
            .sender(AccountAddress::ONE)
            .sequence_number(0)
            .payload(payload())
            .chain_id(ChainId::testnet())
            .build()
            .unwrap();
        let err = sign_transaction(&raw, &LocalAccount::generate()).unwrap_err();
        assert!(matches!(err, AptosError::StructuralMismatch { .. }));
    }

    #[test]
    fn test_multi_agent_signing() {
        let alice = LocalAccount::generate();
        let bob = LocalAccount::generate();
        let txn = TransactionBuilder::new()
            .sender(alice.address())
            .sequence_number(0)
            .payload(payload())
            .chain_id(ChainId::testnet())
            .secondary_signers(vec![bob.address()])
            .build_unsigned()
            .unwrap();

        let signed = sign_unsigned_transaction(&txn, &alice, &[&bob]).unwrap();
        assert!(signed.authenticator.is_multi_agent());
        assert!(signed.verify().is_ok());
    }

    #[test]
    fn test_multi_agent_order_mismatch() {
        let alice = LocalAccount::generate();
        let bob = LocalAccount::generate();
        let carol = LocalAccount::generate();
        let raw = TransactionBuilder::new()
            .sender(alice.address())
            .sequence_number(0)
            .payload(payload())
            .chain_id(ChainId::testnet())
            .build()
            .unwrap();
        let txn = MultiAgentRawTransaction::new(raw, vec![bob.address(), carol.address()]);

        let err = sign_multi_agent_transaction(&txn, &alice, &[&carol, &bob]).unwrap_err();
        assert!(matches!(err, AptosError::StructuralMismatch { .. }));

        let err = sign_multi_agent_transaction(&txn, &alice, &[&bob]).unwrap_err();
        assert!(matches!(err, AptosError::StructuralMismatch { .. }));
    }

    #[test]
    fn test_single_agent_with_secondaries_is_mismatch() {
        let alice = LocalAccount::generate();
        let bob = LocalAccount::generate();
        let txn = TransactionBuilder::new()
            .sender(alice.address())
            .sequence_number(0)
            .payload(payload())
            .chain_id(ChainId::testnet())
            .build_unsigned()
            .unwrap();

        assert!(matches!(
            sign_unsigned_transaction(&txn, &alice, &[&bob]),
            Err(AptosError::StructuralMismatch { .. })
        ));
    }
}
