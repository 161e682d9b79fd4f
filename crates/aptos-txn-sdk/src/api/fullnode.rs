//! Fullnode REST API client.

use crate::api::response::{
    AccountData, AptosResponse, LedgerInfo, PendingTransaction, Resource, TableItemRequest,
};
use crate::api::{LedgerState, TransactionStatus, TransactionSubmitter};
use crate::config::ClientConfig;
use crate::error::{AptosError, AptosResult};
use crate::retry::{RetryConfig, RetryExecutor};
use crate::transaction::{SignedTransaction, BCS_SIGNED_TRANSACTION_CONTENT_TYPE};
use crate::types::{AccountAddress, HashValue};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";
/// Default time to wait for a transaction to be committed.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default gap between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client for the fullnode REST API.
///
/// Read-only requests are retried with backoff according to the
/// configuration's [`RetryConfig`]. Submissions are sent exactly once.
///
/// ```rust,no_run
/// use aptos_txn_sdk::api::FullnodeClient;
/// use aptos_txn_sdk::config::ClientConfig;
///
/// #[tokio::main]
/// async fn main() -> aptos_txn_sdk::error::AptosResult<()> {
///     let client = FullnodeClient::new(&ClientConfig::devnet()?)?;
///     let ledger = client.get_ledger_info().await?;
///     println!("chain id {}", ledger.data.chain_id);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FullnodeClient {
    base_url: Url,
    client: Client,
    retry_config: Arc<RetryConfig>,
}

impl FullnodeClient {
    /// Creates a client for the configured fullnode.
    ///
    /// TLS certificates are validated by `reqwest` against the bundled roots.
    pub fn new(config: &ClientConfig) -> AptosResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AptosError::Http)?;

        Ok(Self {
            base_url: config.fullnode_url().clone(),
            client,
            retry_config: Arc::new(config.retry_config().clone()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // === Ledger ===

    pub async fn get_ledger_info(&self) -> AptosResult<AptosResponse<LedgerInfo>> {
        let url = self.build_url("");
        self.get_json(url).await
    }

    // === Accounts ===

    pub async fn get_account(
        &self,
        address: AccountAddress,
    ) -> AptosResult<AptosResponse<AccountData>> {
        let url = self.build_url(&format!("accounts/{address}"));
        self.get_json(url).await
    }

    pub async fn get_sequence_number(&self, address: AccountAddress) -> AptosResult<u64> {
        let account = self.get_account(address).await?;
        account.data.sequence_number().map_err(|e| {
            AptosError::InvalidResponse(format!("failed to parse sequence number: {e}"))
        })
    }

    /// Gets one resource, or `None` if the account does not hold it.
    pub async fn get_account_resource(
        &self,
        address: AccountAddress,
        resource_type: &str,
    ) -> AptosResult<Option<Resource>> {
        let url = self.build_url(&format!(
            "accounts/{}/resource/{}",
            address,
            urlencoding::encode(resource_type)
        ));
        match self.get_json::<Resource>(url).await {
            Ok(response) => Ok(Some(response.data)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads `key` from the table at `handle`.
    pub async fn get_table_item(
        &self,
        handle: &str,
        key_type: &str,
        value_type: &str,
        key: serde_json::Value,
    ) -> AptosResult<serde_json::Value> {
        let url = self.build_url(&format!("tables/{handle}/item"));
        let body = TableItemRequest {
            key_type: key_type.to_string(),
            value_type: value_type.to_string(),
            key,
        };
        let client = self.client.clone();

        let response: AptosResponse<serde_json::Value> = self
            .executor()
            .execute(|| {
                let client = client.clone();
                let url = url.clone();
                let body = body.clone();
                async move {
                    let response = client
                        .post(url)
                        .header(ACCEPT, JSON_CONTENT_TYPE)
                        .json(&body)
                        .send()
                        .await?;
                    Self::handle_response(response).await
                }
            })
            .await?;
        Ok(response.data)
    }

    // === Transactions ===

    pub async fn get_transaction_by_hash(
        &self,
        hash: &HashValue,
    ) -> AptosResult<AptosResponse<serde_json::Value>> {
        let url = self.build_url(&format!("transactions/by_hash/{hash}"));
        self.get_json(url).await
    }

    /// Where the transaction stands. Unknown hashes count as pending, since
    /// a just-submitted transaction may not be visible yet.
    pub async fn transaction_status(&self, hash: &HashValue) -> AptosResult<TransactionStatus> {
        match self.get_transaction_by_hash(hash).await {
            Ok(response) => Ok(status_from_json(&response.data)),
            Err(e) if e.is_not_found() => Ok(TransactionStatus::Pending),
            Err(e) => Err(e),
        }
    }

    pub async fn transaction_pending(&self, hash: &HashValue) -> AptosResult<bool> {
        Ok(self.transaction_status(hash).await?.is_pending())
    }

    /// Polls until the transaction commits.
    ///
    /// # Errors
    ///
    /// [`AptosError::TransactionTimeout`] if it is still pending after
    /// `timeout`, [`AptosError::ExecutionFailed`] if it committed but
    /// aborted.
    pub async fn wait_for_transaction(
        &self,
        hash: &HashValue,
        timeout: Option<Duration>,
    ) -> AptosResult<()> {
        let timeout = timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT);
        let start = Instant::now();

        loop {
            match self.transaction_status(hash).await? {
                TransactionStatus::Success => return Ok(()),
                TransactionStatus::Failed { vm_status } => {
                    return Err(AptosError::ExecutionFailed { vm_status })
                }
                TransactionStatus::Pending => {}
            }

            if start.elapsed() >= timeout {
                return Err(AptosError::TransactionTimeout {
                    hash: hash.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(DEFAULT_POLL_INTERVAL.min(timeout)).await;
        }
    }

    /// Submits a signed transaction as canonical bytes.
    pub async fn submit_bcs_transaction(
        &self,
        signed_txn: &SignedTransaction,
    ) -> AptosResult<PendingTransaction> {
        self.submit_bytes(signed_txn.canonical_bytes()?).await
    }

    async fn submit_bytes(&self, bytes: Vec<u8>) -> AptosResult<PendingTransaction> {
        let url = self.build_url("transactions");
        debug!(url = %url, len = bytes.len(), "submitting transaction");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, BCS_SIGNED_TRANSACTION_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(bytes)
            .send()
            .await?;

        // Anything but 202 Accepted means the node did not take it.
        if response.status() != StatusCode::ACCEPTED {
            return Err(Self::error_from_response(response).await);
        }
        let pending: PendingTransaction = response.json().await?;
        info!(txn_hash = %pending.hash, "transaction accepted");
        Ok(pending)
    }

    // === Helpers ===

    fn executor(&self) -> RetryExecutor {
        RetryExecutor::new((*self.retry_config).clone())
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if !path.is_empty() {
            if !url.path().ends_with('/') {
                url.set_path(&format!("{}/", url.path()));
            }
            url.set_path(&format!("{}{}", url.path(), path));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AptosResult<AptosResponse<T>> {
        let client = self.client.clone();

        self.executor()
            .execute(|| {
                let client = client.clone();
                let url = url.clone();
                async move {
                    let response = client
                        .get(url)
                        .header(ACCEPT, JSON_CONTENT_TYPE)
                        .send()
                        .await?;
                    Self::handle_response(response).await
                }
            })
            .await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> AptosResult<AptosResponse<T>> {
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };
        let ledger_version = header("x-aptos-ledger-version");
        let ledger_timestamp = header("x-aptos-ledger-timestamp");
        let epoch = header("x-aptos-epoch");
        let block_height = header("x-aptos-block-height");

        let data: T = response.json().await?;
        Ok(AptosResponse {
            data,
            ledger_version,
            ledger_timestamp,
            epoch,
            block_height,
        })
    }

    async fn error_from_response(response: reqwest::Response) -> AptosError {
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let error_code = body
            .get("error_code")
            .and_then(|v| v.as_str())
            .map(ToString::to_string);
        let vm_error_code = body
            .get("vm_error_code")
            .and_then(serde_json::Value::as_u64);

        AptosError::api_with_details(status.as_u16(), message, error_code, vm_error_code)
    }
}

fn status_from_json(txn: &serde_json::Value) -> TransactionStatus {
    if txn.get("type").and_then(|v| v.as_str()) == Some("pending_transaction") {
        return TransactionStatus::Pending;
    }
    match txn.get("success").and_then(serde_json::Value::as_bool) {
        Some(true) => TransactionStatus::Success,
        Some(false) => TransactionStatus::Failed {
            vm_status: txn
                .get("vm_status")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
        },
        None => TransactionStatus::Pending,
    }
}

#[async_trait]
impl LedgerState for FullnodeClient {
    async fn get_sequence_number(&self, address: AccountAddress) -> AptosResult<u64> {
        FullnodeClient::get_sequence_number(self, address).await
    }

    async fn get_chain_id(&self) -> AptosResult<u64> {
        Ok(self.get_ledger_info().await?.data.chain_id)
    }
}

#[async_trait]
impl TransactionSubmitter for FullnodeClient {
    async fn submit(&self, signed_transaction: Vec<u8>) -> AptosResult<HashValue> {
        Ok(self.submit_bytes(signed_transaction).await?.hash)
    }

    async fn poll_status(&self, hash: HashValue) -> AptosResult<TransactionStatus> {
        self.transaction_status(&hash).await
    }
}
