//! Node response bodies.

use crate::types::HashValue;
use serde::{Deserialize, Serialize};

/// A node response body plus the ledger metadata carried in its headers.
#[derive(Debug, Clone)]
pub struct AptosResponse<T> {
    pub data: T,
    pub ledger_version: Option<u64>,
    /// Microseconds since the Unix epoch.
    pub ledger_timestamp: Option<u64>,
    pub epoch: Option<u64>,
    pub block_height: Option<u64>,
}

impl<T> AptosResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            ledger_version: None,
            ledger_timestamp: None,
            epoch: None,
            block_height: None,
        }
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AptosResponse<U> {
        AptosResponse {
            data: f(self.data),
            ledger_version: self.ledger_version,
            ledger_timestamp: self.ledger_timestamp,
            epoch: self.epoch,
            block_height: self.block_height,
        }
    }
}

/// `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u64,
    #[serde(default)]
    pub epoch: String,
    #[serde(default)]
    pub ledger_version: String,
    #[serde(default)]
    pub ledger_timestamp: String,
    #[serde(default)]
    pub node_role: Option<String>,
}

impl LedgerInfo {
    pub fn version(&self) -> Result<u64, std::num::ParseIntError> {
        self.ledger_version.parse()
    }
}

/// `GET /accounts/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    /// Decimal string.
    pub sequence_number: String,
    pub authentication_key: String,
}

impl AccountData {
    pub fn sequence_number(&self) -> Result<u64, std::num::ParseIntError> {
        self.sequence_number.parse()
    }
}

/// A resource stored under an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub typ: String,
    pub data: serde_json::Value,
}

/// Accepted-for-processing reply to a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: HashValue,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

/// `POST /tables/{handle}/item` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableItemRequest {
    pub key_type: String,
    pub value_type: String,
    pub key: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_rename() {
        let resource: Resource = serde_json::from_value(serde_json::json!({
            "type": "0x1::Coin::CoinStore<0x1::TestCoin::TestCoin>",
            "data": { "coin": { "value": "100" } }
        }))
        .unwrap();
        assert!(resource.typ.starts_with("0x1::Coin::CoinStore"));
        assert_eq!(resource.data["coin"]["value"], "100");
    }

    #[test]
    fn test_account_sequence_number() {
        let account: AccountData = serde_json::from_value(serde_json::json!({
            "sequence_number": "5",
            "authentication_key": "0x00"
        }))
        .unwrap();
        assert_eq!(account.sequence_number().unwrap(), 5);
    }

    #[test]
    fn test_pending_transaction_minimal() {
        let hash = HashValue::sha3_256(b"txn");
        let pending: PendingTransaction =
            serde_json::from_value(serde_json::json!({ "hash": hash.to_hex() })).unwrap();
        assert_eq!(pending.hash, hash);
        assert!(pending.sender.is_none());
    }

    #[test]
    fn test_response_map() {
        let response = AptosResponse::new(2u64).map(|v| v * 2);
        assert_eq!(response.into_inner(), 4);
    }
}
