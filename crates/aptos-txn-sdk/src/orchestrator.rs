//! Builds, signs and submits transactions against injected collaborators.
//!
//! The orchestrator is the only place where transaction construction meets
//! the network. It asks a [`LedgerState`] for the sender's sequence number
//! and the chain id, signs locally (primary signer first, then each
//! secondary signer in order), and hands the canonical bytes to a
//! [`TransactionSubmitter`].
//!
//! Nothing here retries. A failed submission comes back to the caller as the
//! collaborator reported it. Every network-bound step is bounded by the
//! configured request timeout and can be abandoned through a
//! [`CancellationToken`]; abandoning a step after the node has accepted a
//! transaction does not take the transaction back.
//!
//! ```rust,no_run
//! use aptos_txn_sdk::account::{LocalAccount, Signer};
//! use aptos_txn_sdk::api::FullnodeClient;
//! use aptos_txn_sdk::config::{ClientConfig, TransactionOptions};
//! use aptos_txn_sdk::orchestrator::TransactionOrchestrator;
//! use aptos_txn_sdk::transaction::scripts;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> aptos_txn_sdk::error::AptosResult<()> {
//!     let node = Arc::new(FullnodeClient::new(&ClientConfig::devnet()?)?);
//!     let orchestrator =
//!         TransactionOrchestrator::new(node.clone(), node, TransactionOptions::default());
//!
//!     let alice = LocalAccount::generate();
//!     let bob = LocalAccount::generate();
//!     let payload = scripts::coin_transfer(bob.address(), 1_000)?;
//!     let hash = orchestrator.sign_and_submit(&alice, payload, &[]).await?;
//!     orchestrator.wait_for(hash).await?;
//!     Ok(())
//! }
//! ```

use crate::account::Signer;
use crate::api::{LedgerState, TransactionStatus, TransactionSubmitter};
use crate::config::TransactionOptions;
use crate::error::{AptosError, AptosResult};
use crate::transaction::{
    sign_unsigned_transaction, SignedTransaction, TransactionBuilder, TransactionPayload,
};
use crate::types::{AccountAddress, ChainId, HashValue};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Single entry point for getting a payload signed and onto the chain.
///
/// Cloning is cheap; clones share the collaborators, the cached chain id and
/// the cancellation token.
pub struct TransactionOrchestrator<L, S> {
    ledger: Arc<L>,
    submitter: Arc<S>,
    options: TransactionOptions,
    /// Fetched on first use, never refreshed.
    chain_id: Arc<OnceCell<ChainId>>,
    cancellation_token: CancellationToken,
}

impl<L, S> Clone for TransactionOrchestrator<L, S> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            submitter: self.submitter.clone(),
            options: self.options,
            chain_id: self.chain_id.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<L: LedgerState, S: TransactionSubmitter> TransactionOrchestrator<L, S> {
    pub fn new(ledger: Arc<L>, submitter: Arc<S>, options: TransactionOptions) -> Self {
        Self {
            ledger,
            submitter,
            options,
            chain_id: Arc::new(OnceCell::new()),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Uses `token` to abandon in-flight network steps. Cancelling it makes
    /// every later call fail with [`AptosError::Cancelled`] too.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// The chain id transactions are bound to.
    ///
    /// Concurrent first calls share a single ledger query.
    pub async fn chain_id(&self) -> AptosResult<ChainId> {
        self.chain_id
            .get_or_try_init(|| async {
                let id = self.guard("chain id lookup", self.ledger.get_chain_id()).await?;
                let chain_id = ChainId::try_from_u64(id)?;
                debug!(chain_id = chain_id.id(), "cached chain id");
                Ok::<_, AptosError>(chain_id)
            })
            .await
            .copied()
    }

    pub async fn sequence_number(&self, address: AccountAddress) -> AptosResult<u64> {
        self.guard(
            "sequence number lookup",
            self.ledger.get_sequence_number(address),
        )
        .await
    }

    /// Builds a transaction for `payload` at the signer's current sequence
    /// number and collects every signature.
    ///
    /// With no `secondary_signers` this is a single-agent transaction.
    /// Otherwise it is a multi-agent transaction whose secondary address list
    /// is taken from `secondary_signers` in the order given. Signing is
    /// all-or-nothing: if any signer fails, no transaction is returned.
    pub async fn build_and_sign(
        &self,
        signer: &dyn Signer,
        payload: TransactionPayload,
        secondary_signers: &[&dyn Signer],
    ) -> AptosResult<SignedTransaction> {
        let sender = signer.address();
        let sequence_number = self.sequence_number(sender).await?;
        let chain_id = self.chain_id().await?;

        let mut builder = TransactionBuilder::new()
            .sender(sender)
            .sequence_number(sequence_number)
            .payload(payload)
            .max_gas_amount(self.options.max_gas_amount)
            .gas_unit_price(self.options.gas_unit_price)
            .expiration_from_now(self.options.expiration.as_secs())
            .chain_id(chain_id);
        if !secondary_signers.is_empty() {
            builder =
                builder.secondary_signers(secondary_signers.iter().map(|s| s.address()).collect());
        }

        let unsigned = builder.build_unsigned()?;
        let signed = sign_unsigned_transaction(&unsigned, signer, secondary_signers)?;
        debug!(
            sender = %sender,
            sequence_number,
            secondary_signers = secondary_signers.len(),
            "signed transaction"
        );
        Ok(signed)
    }

    /// Sends the transaction once and returns the hash the node assigned.
    pub async fn submit(&self, signed_transaction: &SignedTransaction) -> AptosResult<HashValue> {
        let bytes = signed_transaction.canonical_bytes()?;
        let hash = self
            .guard("submission", self.submitter.submit(bytes))
            .await?;
        info!(
            sender = %signed_transaction.sender(),
            sequence_number = signed_transaction.sequence_number(),
            txn_hash = %hash,
            "submitted transaction"
        );
        Ok(hash)
    }

    pub async fn sign_and_submit(
        &self,
        signer: &dyn Signer,
        payload: TransactionPayload,
        secondary_signers: &[&dyn Signer],
    ) -> AptosResult<HashValue> {
        let signed = self
            .build_and_sign(signer, payload, secondary_signers)
            .await?;
        self.submit(&signed).await
    }

    /// Polls until the transaction commits.
    ///
    /// # Errors
    ///
    /// [`AptosError::TransactionTimeout`] if it is still pending after the
    /// wait timeout, [`AptosError::ExecutionFailed`] if it aborted.
    pub async fn wait_for(&self, hash: HashValue) -> AptosResult<()> {
        let timeout = self.options.wait_timeout;
        let start = Instant::now();

        loop {
            match self
                .guard("status poll", self.submitter.poll_status(hash))
                .await?
            {
                TransactionStatus::Success => {
                    debug!(txn_hash = %hash, "transaction committed");
                    return Ok(());
                }
                TransactionStatus::Failed { vm_status } => {
                    return Err(AptosError::ExecutionFailed { vm_status });
                }
                TransactionStatus::Pending => {}
            }

            if start.elapsed() >= timeout {
                return Err(AptosError::TransactionTimeout {
                    hash: hash.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }

            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    return Err(AptosError::Cancelled(format!("waiting for {hash}")));
                }
                _ = tokio::time::sleep(self.options.poll_interval) => {}
            }
        }
    }

    /// [`sign_and_submit`](Self::sign_and_submit) followed by
    /// [`wait_for`](Self::wait_for).
    pub async fn submit_and_wait(
        &self,
        signer: &dyn Signer,
        payload: TransactionPayload,
        secondary_signers: &[&dyn Signer],
    ) -> AptosResult<HashValue> {
        let hash = self
            .sign_and_submit(signer, payload, secondary_signers)
            .await?;
        self.wait_for(hash).await?;
        Ok(hash)
    }

    /// Runs one network-bound step under the request timeout and the
    /// cancellation token.
    async fn guard<T, F>(&self, step: &str, future: F) -> AptosResult<T>
    where
        F: Future<Output = AptosResult<T>>,
    {
        if self.cancellation_token.is_cancelled() {
            return Err(AptosError::Cancelled(step.to_string()));
        }
        let timeout = self.options.request_timeout;

        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => {
                Err(AptosError::Cancelled(step.to_string()))
            }
            result = tokio::time::timeout(timeout, future) => {
                result.unwrap_or_else(|_| {
                    Err(AptosError::RequestTimeout(format!(
                        "{step} exceeded {}ms",
                        timeout.as_millis()
                    )))
                })
            }
        }
    }
}
