//! Funds two fresh accounts on devnet and moves coins between them.
//!
//! Set `APTOS_NODE_URL` / `APTOS_FAUCET_URL` to run against another network.

use aptos_txn_sdk::account::{LocalAccount, Signer};
use aptos_txn_sdk::AptosClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    demos::init_tracing();

    let client = AptosClient::from_env()?;

    let alice = LocalAccount::generate();
    let bob = LocalAccount::generate();

    println!("\n=== Addresses ===");
    println!("Alice: {}", alice.address());
    println!("Bob: {}", bob.address());

    client.fund_account(alice.address(), 1_000_000).await?;
    client.fund_account(bob.address(), 0).await?;

    println!("\n=== Initial Balances ===");
    println!("Alice: {}", client.account_balance(alice.address()).await?);
    println!("Bob: {}", client.account_balance(bob.address()).await?);

    // Have Alice give Bob 1_000 coins
    let txn_hash = client.transfer(&alice, bob.address(), 1_000).await?;
    client.wait_for_transaction(txn_hash).await?;

    println!("\n=== Intermediate Balances ===");
    println!("Alice: {}", client.account_balance(alice.address()).await?);
    println!("Bob: {}", client.account_balance(bob.address()).await?);

    // And another 1_000, now that her sequence number has moved on
    let txn_hash = client.transfer(&alice, bob.address(), 1_000).await?;
    client.wait_for_transaction(txn_hash).await?;

    println!("\n=== Final Balances ===");
    println!("Alice: {}", client.account_balance(alice.address()).await?);
    println!("Bob: {}", client.account_balance(bob.address()).await?);

    Ok(())
}
