//! # Aptos transaction SDK
//!
//! Builds, signs and submits Aptos transactions using the canonical binary
//! (BCS) encoding the node verifies signatures against.
//!
//! The pure layers ([`bcs`], [`types`], [`crypto`], [`account`] and
//! [`transaction`]) perform no I/O and can be used on their own to produce
//! signing messages and signed transaction bytes. The [`orchestrator`] is
//! the one component with network side effects; it talks to the ledger and
//! the submission endpoint through the traits in [`api`], which the bundled
//! [`FullnodeClient`](api::FullnodeClient) implements over REST.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aptos_txn_sdk::account::{LocalAccount, Signer};
//! use aptos_txn_sdk::AptosClient;
//!
//! #[tokio::main]
//! async fn main() -> aptos_txn_sdk::AptosResult<()> {
//!     let client = AptosClient::devnet()?;
//!
//!     let alice = LocalAccount::generate();
//!     let bob = LocalAccount::generate();
//!     client.fund_account(alice.address(), 1_000_000).await?;
//!     client.fund_account(bob.address(), 0).await?;
//!
//!     let hash = client.transfer(&alice, bob.address(), 1_000).await?;
//!     client.wait_for_transaction(hash).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Signing without a node
//!
//! ```rust
//! use aptos_txn_sdk::account::LocalAccount;
//! use aptos_txn_sdk::transaction::{scripts, TransactionBuilder};
//! use aptos_txn_sdk::types::{AccountAddress, ChainId};
//!
//! let alice = LocalAccount::generate();
//! let signed = TransactionBuilder::new()
//!     .sequence_number(0)
//!     .payload(scripts::coin_transfer(AccountAddress::ONE, 1_000).unwrap())
//!     .chain_id(ChainId::new(4))
//!     .build_and_sign(&alice)
//!     .unwrap();
//! assert!(signed.verify().is_ok());
//! let body = signed.canonical_bytes().unwrap();
//! assert!(!body.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod account;
pub mod api;
pub mod bcs;
pub mod config;
pub mod crypto;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod transaction;
pub mod types;

mod client;

pub use client::AptosClient;
pub use config::{ClientConfig, TransactionOptions};
pub use error::{AptosError, AptosResult};
pub use orchestrator::TransactionOrchestrator;

pub use types::{AccountAddress, ChainId, HashValue};
