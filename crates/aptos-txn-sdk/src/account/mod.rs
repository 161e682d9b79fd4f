//! Signing identities.
//!
//! [`Signer`] is the capability the transaction builder and orchestrator
//! need from an account: its address, its public key and the ability to sign
//! a message. [`LocalAccount`] is the in-memory implementation.

mod local;
mod signer;

pub use local::LocalAccount;
pub use signer::Signer;
