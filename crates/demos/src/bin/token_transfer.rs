//! Creates a collection and token as Alice, hands the token to Bob through
//! an offer and claim, then has Bob send it back in one multi-agent
//! transaction signed by both.

use aptos_txn_sdk::account::{LocalAccount, Signer};
use aptos_txn_sdk::AptosClient;

const COLLECTION_NAME: &str = "Alice's";
const TOKEN_NAME: &str = "Alice's first token";

async fn print_token_balances(
    client: &AptosClient,
    alice: &LocalAccount,
    bob: &LocalAccount,
) -> anyhow::Result<()> {
    let creator = alice.address();
    println!(
        "Alice's token balance: {}",
        client
            .get_token_balance(alice.address(), creator, COLLECTION_NAME, TOKEN_NAME)
            .await?
    );
    // Bob has no token store until he claims something
    match client
        .get_token_balance(bob.address(), creator, COLLECTION_NAME, TOKEN_NAME)
        .await
    {
        Ok(balance) => println!("Bob's token balance: {balance}"),
        Err(e) if e.is_not_found() => println!("Bob's token balance: 0"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    demos::init_tracing();

    let client = AptosClient::from_env()?;

    let alice = LocalAccount::generate();
    let bob = LocalAccount::generate();

    println!("\n=== Addresses ===");
    println!("Alice: {}", alice.address());
    println!("Bob: {}", bob.address());

    client.fund_account(alice.address(), 10_000_000).await?;
    client.fund_account(bob.address(), 10_000_000).await?;

    println!("\n=== Initial Balances ===");
    println!("Alice: {}", client.account_balance(alice.address()).await?);
    println!("Bob: {}", client.account_balance(bob.address()).await?);

    println!("\n=== Creating Collection and Token ===");

    let txn_hash = client
        .create_collection(
            &alice,
            COLLECTION_NAME,
            "Alice's simple collection",
            "https://aptos.dev",
        )
        .await?;
    client.wait_for_transaction(txn_hash).await?;

    let txn_hash = client
        .create_token(
            &alice,
            COLLECTION_NAME,
            TOKEN_NAME,
            "Alice's simple token",
            1,
            "https://aptos.dev/img/nyan.jpeg",
            0,
        )
        .await?;
    client.wait_for_transaction(txn_hash).await?;

    println!(
        "Alice's collection: {}",
        client.get_collection(alice.address(), COLLECTION_NAME).await?
    );
    println!(
        "Alice's token data: {}",
        client
            .get_token_data(alice.address(), COLLECTION_NAME, TOKEN_NAME)
            .await?
    );
    print_token_balances(&client, &alice, &bob).await?;

    println!("\n=== Transferring the token to Bob ===");
    let txn_hash = client
        .offer_token(
            &alice,
            bob.address(),
            alice.address(),
            COLLECTION_NAME,
            TOKEN_NAME,
            1,
        )
        .await?;
    client.wait_for_transaction(txn_hash).await?;

    let txn_hash = client
        .claim_token(
            &bob,
            alice.address(),
            alice.address(),
            COLLECTION_NAME,
            TOKEN_NAME,
        )
        .await?;
    client.wait_for_transaction(txn_hash).await?;
    print_token_balances(&client, &alice, &bob).await?;

    println!("\n=== Transferring the token back to Alice using MultiAgent ===");
    let txn_hash = client
        .direct_transfer_token(
            &bob,
            &alice,
            alice.address(),
            COLLECTION_NAME,
            TOKEN_NAME,
            1,
        )
        .await?;
    client.wait_for_transaction(txn_hash).await?;
    print_token_balances(&client, &alice, &bob).await?;

    Ok(())
}
