//! Transaction construction and signing.
//!
//! A transaction goes through three shapes:
//!
//! 1. [`RawTransaction`] (or [`MultiAgentRawTransaction`] when other accounts
//!    co-sign), built with [`TransactionBuilder`].
//! 2. Its signing message, the domain-separated canonical bytes every signer
//!    signs.
//! 3. [`SignedTransaction`], the raw transaction plus a
//!    [`TransactionAuthenticator`], whose canonical bytes are submitted.

mod argument;
mod authenticator;
mod builder;
mod payload;
pub mod scripts;
mod types;

pub use argument::{ScriptArgument, TransactionArgument};
pub use authenticator::{check_secondary_signers, AccountAuthenticator, TransactionAuthenticator};
pub use builder::{
    account_authenticator, sign_multi_agent_transaction, sign_transaction,
    sign_unsigned_transaction, TransactionBuilder, DEFAULT_EXPIRATION_SECONDS,
    DEFAULT_GAS_UNIT_PRICE, DEFAULT_MAX_GAS_AMOUNT,
};
pub use payload::{Module, ModuleBundle, Script, ScriptFunction, TransactionPayload};
pub use types::{
    assemble_signed_transaction, MultiAgentRawTransaction, RawTransaction, SignedTransaction,
    SigningMessage, UnsignedTransaction, BCS_SIGNED_TRANSACTION_CONTENT_TYPE,
};
