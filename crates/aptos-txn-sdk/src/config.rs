//! Client configuration.
//!
//! A [`ClientConfig`] names the node and faucet endpoints and how requests
//! to them behave. [`TransactionOptions`] holds the per-transaction knobs
//! the orchestrator applies when it builds and waits on transactions.

use crate::error::{AptosError, AptosResult};
use crate::retry::RetryConfig;
use crate::transaction::{DEFAULT_EXPIRATION_SECONDS, DEFAULT_GAS_UNIT_PRICE, DEFAULT_MAX_GAS_AMOUNT};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the fullnode URL.
pub const NODE_URL_ENV: &str = "APTOS_NODE_URL";
/// Environment variable overriding the faucet URL.
pub const FAUCET_URL_ENV: &str = "APTOS_FAUCET_URL";

const DEVNET_NODE_URL: &str = "https://fullnode.devnet.aptoslabs.com";
const DEVNET_FAUCET_URL: &str = "https://faucet.devnet.aptoslabs.com";
const LOCAL_NODE_URL: &str = "http://127.0.0.1:8080";
const LOCAL_FAUCET_URL: &str = "http://127.0.0.1:8081";

/// Known networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Devnet,
    /// A node on this machine, REST API on 8080 and faucet on 8081.
    Local,
    Custom,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Local => "local",
            Network::Custom => "custom",
        }
    }
}

/// Where the node and faucet live, and how requests to them behave.
///
/// ```rust
/// use aptos_txn_sdk::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::devnet()
///     .unwrap()
///     .with_timeout(Duration::from_secs(10))
///     .without_retry();
/// assert_eq!(config.fullnode_url().host_str(), Some("fullnode.devnet.aptoslabs.com"));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) network: Network,
    pub(crate) fullnode_url: Url,
    pub(crate) faucet_url: Option<Url>,
    /// Per-request timeout
    pub(crate) timeout: Duration,
    /// Retry policy for read-only requests
    pub(crate) retry_config: RetryConfig,
}

impl ClientConfig {
    pub fn devnet() -> AptosResult<Self> {
        Ok(Self {
            network: Network::Devnet,
            fullnode_url: Url::parse(DEVNET_NODE_URL)?,
            faucet_url: Some(Url::parse(DEVNET_FAUCET_URL)?),
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        })
    }

    pub fn local() -> AptosResult<Self> {
        Ok(Self {
            network: Network::Local,
            fullnode_url: Url::parse(LOCAL_NODE_URL)?,
            faucet_url: Some(Url::parse(LOCAL_FAUCET_URL)?),
            timeout: Duration::from_secs(10),
            retry_config: RetryConfig::default(),
        })
    }

    /// A node at `fullnode_url`, with no faucet.
    pub fn custom(fullnode_url: &str) -> AptosResult<Self> {
        Ok(Self {
            network: Network::Custom,
            fullnode_url: Url::parse(fullnode_url)?,
            faucet_url: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        })
    }

    /// Devnet, with [`NODE_URL_ENV`] and [`FAUCET_URL_ENV`] overriding the
    /// endpoints when set.
    pub fn from_env() -> AptosResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> AptosResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(NODE_URL_ENV) {
            Some(url) => Self::custom(&url).map_err(|e| {
                AptosError::Config(format!("{NODE_URL_ENV} is not a valid URL: {e}"))
            })?,
            None => Self::devnet()?,
        };
        if let Some(url) = lookup(FAUCET_URL_ENV) {
            config = config.with_faucet_url(&url).map_err(|e| {
                AptosError::Config(format!("{FAUCET_URL_ENV} is not a valid URL: {e}"))
            })?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    pub fn with_faucet_url(mut self, url: &str) -> AptosResult<Self> {
        self.faucet_url = Some(Url::parse(url)?);
        Ok(self)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn fullnode_url(&self) -> &Url {
        &self.fullnode_url
    }

    pub fn faucet_url(&self) -> Option<&Url> {
        self.faucet_url.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }
}

/// Gas, expiry and waiting parameters for transactions the orchestrator
/// builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    /// How long after building a transaction stays valid.
    pub expiration: Duration,
    /// How long [`wait_for`](crate::orchestrator::TransactionOrchestrator::wait_for)
    /// polls before giving up.
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Upper bound on any single ledger or submission call.
    pub request_timeout: Duration,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration: Duration::from_secs(DEFAULT_EXPIRATION_SECONDS),
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TransactionOptions {
    #[must_use]
    pub fn with_max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    #[must_use]
    pub fn with_gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    #[must_use]
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
