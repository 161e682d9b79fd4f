use crate::error::{AptosError, AptosResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the network a transaction is valid on.
///
/// The node reports its chain id as an integer; on the wire it is a single
/// byte, so anything above 255 cannot be encoded.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChainId(u8);

impl ChainId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub const fn mainnet() -> Self {
        Self(1)
    }

    pub const fn testnet() -> Self {
        Self(2)
    }

    /// Narrows a ledger-reported chain id to its wire width.
    pub fn try_from_u64(id: u64) -> AptosResult<Self> {
        u8::try_from(id)
            .map(Self)
            .map_err(|_| AptosError::Encoding(format!("chain id {id} does not fit in u8")))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
