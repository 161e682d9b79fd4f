//! Main client entry point.
//!
//! [`AptosClient`] ties a [`FullnodeClient`], an optional [`FaucetClient`]
//! and a [`TransactionOrchestrator`] together behind one handle, and adds the
//! coin and token wrappers used by the demos.

use crate::account::Signer;
use crate::api::{AccountData, FaucetClient, FullnodeClient, Resource};
use crate::config::{ClientConfig, TransactionOptions};
use crate::error::{AptosError, AptosResult};
use crate::orchestrator::TransactionOrchestrator;
use crate::transaction::{scripts, TransactionPayload};
use crate::types::{AccountAddress, ChainId, HashValue};
use serde_json::{json, Value};
use std::sync::Arc;

const COIN_STORE: &str = "0x1::Coin::CoinStore<0x1::TestCoin::TestCoin>";
const TOKEN_STORE: &str = "0x1::Token::TokenStore";
const COLLECTIONS: &str = "0x1::Token::Collections";
const TOKEN_ID: &str = "0x1::Token::TokenId";

/// The client applications talk to.
///
/// Transaction methods return as soon as the node accepts the transaction;
/// pass the hash to [`wait_for_transaction`](Self::wait_for_transaction) to
/// wait for it to commit.
///
/// ```rust,no_run
/// use aptos_txn_sdk::account::{LocalAccount, Signer};
/// use aptos_txn_sdk::AptosClient;
///
/// #[tokio::main]
/// async fn main() -> aptos_txn_sdk::error::AptosResult<()> {
///     let client = AptosClient::devnet()?;
///     let alice = LocalAccount::generate();
///     let bob = LocalAccount::generate();
///
///     client.fund_account(alice.address(), 1_000_000).await?;
///     client.fund_account(bob.address(), 0).await?;
///
///     let hash = client.transfer(&alice, bob.address(), 1_000).await?;
///     client.wait_for_transaction(hash).await?;
///     println!("bob has {}", client.account_balance(bob.address()).await?);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AptosClient {
    config: ClientConfig,
    fullnode: Arc<FullnodeClient>,
    faucet: Option<FaucetClient>,
    orchestrator: TransactionOrchestrator<FullnodeClient, FullnodeClient>,
}

impl AptosClient {
    pub fn new(config: ClientConfig) -> AptosResult<Self> {
        Self::with_options(config, TransactionOptions::default())
    }

    pub fn with_options(config: ClientConfig, options: TransactionOptions) -> AptosResult<Self> {
        let fullnode = Arc::new(FullnodeClient::new(&config)?);
        let faucet = match config.faucet_url() {
            Some(_) => Some(FaucetClient::new(&config)?.with_wait_timeout(options.wait_timeout)),
            None => None,
        };
        let orchestrator = TransactionOrchestrator::new(fullnode.clone(), fullnode.clone(), options);

        Ok(Self {
            config,
            fullnode,
            faucet,
            orchestrator,
        })
    }

    pub fn devnet() -> AptosResult<Self> {
        Self::new(ClientConfig::devnet()?)
    }

    pub fn local() -> AptosResult<Self> {
        Self::new(ClientConfig::local()?)
    }

    /// Devnet unless overridden through the environment; see
    /// [`ClientConfig::from_env`].
    pub fn from_env() -> AptosResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn fullnode(&self) -> &FullnodeClient {
        &self.fullnode
    }

    pub fn faucet(&self) -> Option<&FaucetClient> {
        self.faucet.as_ref()
    }

    pub fn orchestrator(&self) -> &TransactionOrchestrator<FullnodeClient, FullnodeClient> {
        &self.orchestrator
    }

    // === Accounts ===

    pub async fn account(&self, address: AccountAddress) -> AptosResult<AccountData> {
        Ok(self.fullnode.get_account(address).await?.into_inner())
    }

    pub async fn account_sequence_number(&self, address: AccountAddress) -> AptosResult<u64> {
        self.fullnode.get_sequence_number(address).await
    }

    pub async fn account_resource(
        &self,
        address: AccountAddress,
        resource_type: &str,
    ) -> AptosResult<Option<Resource>> {
        self.fullnode.get_account_resource(address, resource_type).await
    }

    /// Test coin balance.
    ///
    /// # Errors
    ///
    /// [`AptosError::NotFound`] if the account holds no coin store.
    pub async fn account_balance(&self, address: AccountAddress) -> AptosResult<u64> {
        let store = self.required_resource(address, COIN_STORE).await?;
        parse_u64(&store.data["coin"]["value"], "coin.value")
    }

    pub async fn get_table_item(
        &self,
        handle: &str,
        key_type: &str,
        value_type: &str,
        key: Value,
    ) -> AptosResult<Value> {
        self.fullnode
            .get_table_item(handle, key_type, value_type, key)
            .await
    }

    pub async fn chain_id(&self) -> AptosResult<ChainId> {
        self.orchestrator.chain_id().await
    }

    // === Transactions ===

    /// Signs `payload` with `signer` (plus any secondary signers) and
    /// submits it.
    pub async fn submit(
        &self,
        signer: &dyn Signer,
        payload: TransactionPayload,
        secondary_signers: &[&dyn Signer],
    ) -> AptosResult<HashValue> {
        self.orchestrator
            .sign_and_submit(signer, payload, secondary_signers)
            .await
    }

    pub async fn transfer(
        &self,
        sender: &dyn Signer,
        recipient: AccountAddress,
        amount: u64,
    ) -> AptosResult<HashValue> {
        self.submit(sender, scripts::coin_transfer(recipient, amount)?, &[])
            .await
    }

    pub async fn wait_for_transaction(&self, hash: HashValue) -> AptosResult<()> {
        self.orchestrator.wait_for(hash).await
    }

    // === Tokens ===

    pub async fn create_collection(
        &self,
        account: &dyn Signer,
        name: &str,
        description: &str,
        uri: &str,
    ) -> AptosResult<HashValue> {
        let payload = scripts::create_collection(name, description, uri)?;
        self.submit(account, payload, &[]).await
    }

    pub async fn create_token(
        &self,
        account: &dyn Signer,
        collection_name: &str,
        name: &str,
        description: &str,
        supply: u64,
        uri: &str,
        royalty_points_per_million: u64,
    ) -> AptosResult<HashValue> {
        let payload = scripts::create_token(
            collection_name,
            name,
            description,
            supply,
            uri,
            royalty_points_per_million,
        )?;
        self.submit(account, payload, &[]).await
    }

    pub async fn offer_token(
        &self,
        account: &dyn Signer,
        receiver: AccountAddress,
        creator: AccountAddress,
        collection_name: &str,
        token_name: &str,
        amount: u64,
    ) -> AptosResult<HashValue> {
        let payload =
            scripts::offer_token(receiver, creator, collection_name, token_name, amount)?;
        self.submit(account, payload, &[]).await
    }

    pub async fn claim_token(
        &self,
        account: &dyn Signer,
        sender: AccountAddress,
        creator: AccountAddress,
        collection_name: &str,
        token_name: &str,
    ) -> AptosResult<HashValue> {
        let payload = scripts::claim_token(sender, creator, collection_name, token_name)?;
        self.submit(account, payload, &[]).await
    }

    /// Moves a token from `sender` to `receiver` in one multi-agent
    /// transaction signed by both.
    pub async fn direct_transfer_token(
        &self,
        sender: &dyn Signer,
        receiver: &dyn Signer,
        creator: AccountAddress,
        collection_name: &str,
        token_name: &str,
        amount: u64,
    ) -> AptosResult<HashValue> {
        let payload =
            scripts::direct_transfer_token(creator, collection_name, token_name, amount)?;
        self.submit(sender, payload, &[receiver]).await
    }

    /// How many of a token `owner` holds.
    pub async fn get_token_balance(
        &self,
        owner: AccountAddress,
        creator: AccountAddress,
        collection_name: &str,
        token_name: &str,
    ) -> AptosResult<u64> {
        let store = self.required_resource(owner, TOKEN_STORE).await?;
        let handle = table_handle(&store, "tokens")?;
        let token = self
            .get_table_item(
                &handle,
                TOKEN_ID,
                "0x1::Token::Token",
                token_id(creator, collection_name, token_name),
            )
            .await?;
        parse_u64(&token["value"], "token.value")
    }

    pub async fn get_token_data(
        &self,
        creator: AccountAddress,
        collection_name: &str,
        token_name: &str,
    ) -> AptosResult<Value> {
        let collections = self.required_resource(creator, COLLECTIONS).await?;
        let handle = table_handle(&collections, "token_data")?;
        self.get_table_item(
            &handle,
            TOKEN_ID,
            "0x1::Token::TokenData",
            token_id(creator, collection_name, token_name),
        )
        .await
    }

    pub async fn get_collection(
        &self,
        creator: AccountAddress,
        collection_name: &str,
    ) -> AptosResult<Value> {
        let collections = self.required_resource(creator, COLLECTIONS).await?;
        let handle = table_handle(&collections, "collections")?;
        self.get_table_item(
            &handle,
            "0x1::ASCII::String",
            "0x1::Token::Collection",
            json!(collection_name),
        )
        .await
    }

    // === Faucet ===

    /// Creates `address` if needed and mints `amount` coins to it, waiting
    /// for the mint to commit.
    pub async fn fund_account(&self, address: AccountAddress, amount: u64) -> AptosResult<()> {
        let faucet = self
            .faucet
            .as_ref()
            .ok_or_else(|| AptosError::Config("faucet URL not configured".into()))?;
        faucet.fund_account(address, amount).await
    }

    async fn required_resource(
        &self,
        address: AccountAddress,
        resource_type: &str,
    ) -> AptosResult<Resource> {
        self.account_resource(address, resource_type)
            .await?
            .ok_or_else(|| AptosError::NotFound(format!("{resource_type} under {address}")))
    }
}

fn token_id(creator: AccountAddress, collection_name: &str, token_name: &str) -> Value {
    json!({
        "creator": creator.to_hex(),
        "collection": collection_name,
        "name": token_name,
    })
}

fn table_handle(resource: &Resource, field: &str) -> AptosResult<String> {
    resource.data[field]["handle"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| {
            AptosError::InvalidResponse(format!("{} has no {field}.handle", resource.typ))
        })
}

/// Move integers arrive as decimal strings.
fn parse_u64(value: &Value, field: &str) -> AptosResult<u64> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|e| AptosError::InvalidResponse(format!("{field} is not a u64: {e}"))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| AptosError::InvalidResponse(format!("{field} is not a u64"))),
        _ => Err(AptosError::InvalidResponse(format!("missing {field}"))),
    }
}
