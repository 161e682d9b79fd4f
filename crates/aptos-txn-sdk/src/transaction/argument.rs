use crate::bcs;
use crate::error::{AptosError, AptosResult};
use crate::types::{AccountAddress, TypeTag};
use serde::{Deserialize, Serialize};

/// A script-function argument.
///
/// The variant decides how the value is encoded. Each argument is encoded on
/// its own, and the payload then carries the resulting bytes as one entry of
/// its length-prefixed argument list. Argument order is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Bool(bool),
    /// 32 raw bytes, no length prefix.
    Address(AccountAddress),
    /// UTF-8 bytes with a length prefix.
    String(String),
    /// A `vector<u8>`: raw bytes with a length prefix.
    Bytes(Vec<u8>),
}

impl TransactionArgument {
    /// Builds an unsigned integer argument of the width `ty` declares.
    ///
    /// Fails with [`AptosError::Encoding`] when `value` does not fit that
    /// width or `ty` is not an integer type this argument kind supports.
    pub fn uint(ty: &TypeTag, value: u128) -> AptosResult<Self> {
        let out_of_range = || AptosError::Encoding(format!("{value} does not fit in {ty}"));
        match ty {
            TypeTag::U8 => u8::try_from(value).map(Self::U8).map_err(|_| out_of_range()),
            TypeTag::U64 => u64::try_from(value).map(Self::U64).map_err(|_| out_of_range()),
            TypeTag::U128 => Ok(Self::U128(value)),
            other => Err(AptosError::Encoding(format!(
                "{other} is not an unsigned integer argument type"
            ))),
        }
    }

    /// Canonical bytes of this argument alone.
    pub fn encode(&self) -> AptosResult<Vec<u8>> {
        match self {
            Self::U8(v) => bcs::to_bytes(v),
            Self::U64(v) => bcs::to_bytes(v),
            Self::U128(v) => bcs::to_bytes(v),
            Self::Bool(v) => bcs::to_bytes(v),
            Self::Address(v) => bcs::to_bytes(v),
            Self::String(v) => bcs::to_bytes(v.as_str()),
            Self::Bytes(v) => bcs::to_bytes(serde_bytes::Bytes::new(v)),
        }
    }
}

impl From<u8> for TransactionArgument {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u64> for TransactionArgument {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<u128> for TransactionArgument {
    fn from(v: u128) -> Self {
        Self::U128(v)
    }
}

impl From<bool> for TransactionArgument {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<AccountAddress> for TransactionArgument {
    fn from(v: AccountAddress) -> Self {
        Self::Address(v)
    }
}

impl From<&str> for TransactionArgument {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for TransactionArgument {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// An argument to a raw `Script` payload, carried as a tagged value rather
/// than pre-encoded bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    U8Vector(#[serde(with = "serde_bytes")] Vec<u8>),
    Bool(bool),
}
