//! Collaborators that touch the network.
//!
//! The orchestrator depends on two narrow traits, [`LedgerState`] and
//! [`TransactionSubmitter`], so that anything able to answer those calls (the
//! bundled [`FullnodeClient`], a gas station, a test double) can be plugged
//! in. Errors from implementations are passed to the caller unchanged.

mod faucet;
mod fullnode;
pub mod response;

pub use faucet::FaucetClient;
pub use fullnode::FullnodeClient;
pub use response::{
    AccountData, AptosResponse, LedgerInfo, PendingTransaction, Resource, TableItemRequest,
};

use crate::error::AptosResult;
use crate::types::{AccountAddress, HashValue};
use async_trait::async_trait;

/// Read access to the ledger state a transaction is built against.
#[async_trait]
pub trait LedgerState: Send + Sync + 'static {
    /// The account's latest committed sequence number, i.e. the one its next
    /// transaction must carry.
    async fn get_sequence_number(&self, address: AccountAddress) -> AptosResult<u64>;

    async fn get_chain_id(&self) -> AptosResult<u64>;
}

/// Where signed transactions go.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync + 'static {
    /// Submits canonical signed-transaction bytes, returning the hash the
    /// node assigned.
    async fn submit(&self, signed_transaction: Vec<u8>) -> AptosResult<HashValue>;

    async fn poll_status(&self, hash: HashValue) -> AptosResult<TransactionStatus>;
}

/// Where a submitted transaction stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Not committed yet, or not known to the node.
    Pending,
    Success,
    Failed { vm_status: String },
}

impl TransactionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}
