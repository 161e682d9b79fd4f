//! Payloads for the framework's coin and token script functions.

use crate::error::AptosResult;
use crate::transaction::argument::TransactionArgument;
use crate::transaction::payload::{ScriptFunction, TransactionPayload};
use crate::types::{AccountAddress, TypeTag};

/// The coin type transferred by [`coin_transfer`].
pub const TEST_COIN_TYPE: &str = "0x1::TestCoin::TestCoin";

const COIN_MODULE: &str = "0x1::Coin";
const TOKEN_MODULE: &str = "0x1::Token";
const TOKEN_TRANSFERS_MODULE: &str = "0x1::TokenTransfers";

fn call(
    module: &str,
    function: &str,
    ty_args: Vec<TypeTag>,
    args: &[TransactionArgument],
) -> AptosResult<TransactionPayload> {
    Ok(ScriptFunction::natural(module, function, ty_args, args)?.into())
}

/// `0x1::Coin::transfer<TestCoin>(recipient, amount)`.
pub fn coin_transfer(recipient: AccountAddress, amount: u64) -> AptosResult<TransactionPayload> {
    call(
        COIN_MODULE,
        "transfer",
        vec![TEST_COIN_TYPE.parse()?],
        &[recipient.into(), amount.into()],
    )
}

/// Creates a collection with no cap on the number of tokens.
pub fn create_collection(name: &str, description: &str, uri: &str) -> AptosResult<TransactionPayload> {
    call(
        TOKEN_MODULE,
        "create_unlimited_collection_script",
        vec![],
        &[name.into(), description.into(), uri.into()],
    )
}

/// Creates a token in one of the sender's collections.
pub fn create_token(
    collection_name: &str,
    name: &str,
    description: &str,
    supply: u64,
    uri: &str,
    royalty_points_per_million: u64,
) -> AptosResult<TransactionPayload> {
    call(
        TOKEN_MODULE,
        "create_unlimited_token_script",
        vec![],
        &[
            collection_name.into(),
            name.into(),
            description.into(),
            true.into(),
            supply.into(),
            uri.into(),
            royalty_points_per_million.into(),
        ],
    )
}

/// Offers `amount` of a token to `receiver`, who claims it later.
pub fn offer_token(
    receiver: AccountAddress,
    creator: AccountAddress,
    collection_name: &str,
    token_name: &str,
    amount: u64,
) -> AptosResult<TransactionPayload> {
    call(
        TOKEN_TRANSFERS_MODULE,
        "offer_script",
        vec![],
        &[
            receiver.into(),
            creator.into(),
            collection_name.into(),
            token_name.into(),
            amount.into(),
        ],
    )
}

/// Claims a token previously offered by `sender`.
pub fn claim_token(
    sender: AccountAddress,
    creator: AccountAddress,
    collection_name: &str,
    token_name: &str,
) -> AptosResult<TransactionPayload> {
    call(
        TOKEN_TRANSFERS_MODULE,
        "claim_script",
        vec![],
        &[
            sender.into(),
            creator.into(),
            collection_name.into(),
            token_name.into(),
        ],
    )
}

/// Moves a token from the sender straight to a receiver. Needs the receiver
/// as a secondary signer.
pub fn direct_transfer_token(
    creator: AccountAddress,
    collection_name: &str,
    token_name: &str,
    amount: u64,
) -> AptosResult<TransactionPayload> {
    call(
        TOKEN_MODULE,
        "direct_transfer_script",
        vec![],
        &[
            creator.into(),
            collection_name.into(),
            token_name.into(),
            amount.into(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_transfer_shape() {
        let payload = coin_transfer(AccountAddress::ONE, 1_000).unwrap();
        let call = payload.as_script_function().unwrap();
        assert_eq!(call.module.to_string(), "0x1::Coin");
        assert_eq!(call.function.as_str(), "transfer");
        assert_eq!(call.ty_args[0].to_string(), TEST_COIN_TYPE);
        assert_eq!(call.args[0], AccountAddress::ONE.to_bytes().to_vec());
        assert_eq!(call.args[1], 1_000u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_create_token_args() {
        let payload =
            create_token("Alice's", "first token", "desc", 1, "https://aptos.dev/img", 250)
                .unwrap();
        let call = payload.as_script_function().unwrap();
        assert_eq!(call.function.as_str(), "create_unlimited_token_script");
        assert_eq!(call.args.len(), 7);
        assert_eq!(call.args[3], vec![1]);
        assert_eq!(call.args[6], 250u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_token_transfer_modules() {
        let offer = offer_token(AccountAddress::ONE, AccountAddress::ONE, "c", "t", 1).unwrap();
        assert_eq!(
            offer.as_script_function().unwrap().module.to_string(),
            "0x1::TokenTransfers"
        );

        let direct = direct_transfer_token(AccountAddress::ONE, "c", "t", 1).unwrap();
        let call = direct.as_script_function().unwrap();
        assert_eq!(call.module.to_string(), "0x1::Token");
        assert_eq!(call.args.len(), 4);
    }
}
