//! Core value types shared by the transaction model and the transport.

mod address;
mod chain_id;
mod hash;
mod move_types;

pub use address::{AccountAddress, ADDRESS_LENGTH};
pub use chain_id::ChainId;
pub use hash::{HashValue, HASH_LENGTH};
pub use move_types::{
    Identifier, ModuleId, StructTag, TypeTag, MAX_IDENTIFIER_LENGTH, MAX_TYPE_NESTING_DEPTH,
    MAX_TYPE_TAG_LENGTH,
};
