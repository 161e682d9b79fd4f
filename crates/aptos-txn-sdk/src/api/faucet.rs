//! Faucet client for funding accounts on devnet and local nodes.

use crate::api::FullnodeClient;
use crate::config::ClientConfig;
use crate::error::{AptosError, AptosResult};
use crate::types::{AccountAddress, HashValue};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Client for the faucet service.
///
/// Minting is not idempotent, so a mint request is sent once and never
/// retried. [`fund_account`](Self::fund_account) then waits on the fullnode
/// for every transaction the faucet reports.
///
/// ```rust,no_run
/// use aptos_txn_sdk::account::{LocalAccount, Signer};
/// use aptos_txn_sdk::api::FaucetClient;
/// use aptos_txn_sdk::config::ClientConfig;
///
/// #[tokio::main]
/// async fn main() -> aptos_txn_sdk::error::AptosResult<()> {
///     let faucet = FaucetClient::new(&ClientConfig::devnet()?)?;
///     let alice = LocalAccount::generate();
///     faucet.fund_account(alice.address(), 5_000).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FaucetClient {
    faucet_url: Url,
    client: Client,
    fullnode: FullnodeClient,
    wait_timeout: Duration,
}

/// The faucet has answered with both a bare list of hashes and an object
/// wrapping one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FaucetResponse {
    Direct(Vec<String>),
    Object { txn_hashes: Vec<String> },
}

impl FaucetResponse {
    fn into_hashes(self) -> Vec<String> {
        match self {
            FaucetResponse::Direct(hashes) => hashes,
            FaucetResponse::Object { txn_hashes } => txn_hashes,
        }
    }
}

impl FaucetClient {
    /// # Errors
    ///
    /// Returns [`AptosError::Config`] if `config` names no faucet.
    pub fn new(config: &ClientConfig) -> AptosResult<Self> {
        let faucet_url = config
            .faucet_url()
            .cloned()
            .ok_or_else(|| AptosError::Config("faucet URL not configured".into()))?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AptosError::Http)?;

        Ok(Self {
            faucet_url,
            client,
            fullnode: FullnodeClient::new(config)?,
            wait_timeout: Duration::from_secs(30),
        })
    }

    /// How long [`fund_account`](Self::fund_account) waits for each mint
    /// transaction to commit.
    #[must_use]
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Asks the faucet to mint `amount` coins to `address`, creating the
    /// account if needed. Returns the hashes of the mint transactions
    /// without waiting for them.
    pub async fn mint(&self, address: AccountAddress, amount: u64) -> AptosResult<Vec<HashValue>> {
        let url = self.build_url(&format!("mint?amount={amount}&address={address}"))?;
        debug!(%address, amount, "requesting faucet mint");

        let response = self.client.post(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AptosError::api(status.as_u16(), body));
        }

        let faucet_response: FaucetResponse = response.json().await?;
        faucet_response
            .into_hashes()
            .iter()
            .map(|hash| {
                HashValue::from_hex(hash).map_err(|e| {
                    AptosError::InvalidResponse(format!("faucet returned bad hash {hash}: {e}"))
                })
            })
            .collect()
    }

    /// Mints to `address` and waits until every mint transaction commits.
    pub async fn fund_account(&self, address: AccountAddress, amount: u64) -> AptosResult<()> {
        let hashes = self.mint(address, amount).await?;
        for hash in &hashes {
            self.fullnode
                .wait_for_transaction(hash, Some(self.wait_timeout))
                .await?;
        }
        info!(%address, amount, txns = hashes.len(), "account funded");
        Ok(())
    }

    fn build_url(&self, path: &str) -> AptosResult<Url> {
        let base = self.faucet_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(AptosError::Url)
    }
}
