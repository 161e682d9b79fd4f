//! Pins the canonical layout the node relies on: field order, determinism and
//! ULEB128 prefix widths. Decoding goes through the `bcs` crate directly.

use aptos_txn_sdk::account::{LocalAccount, Signer};
use aptos_txn_sdk::bcs::{to_bytes, uleb128_encode, uleb128_len};
use aptos_txn_sdk::transaction::{
    scripts, sign_unsigned_transaction, RawTransaction, Script, ScriptArgument,
    SignedTransaction, TransactionArgument, TransactionBuilder, TransactionPayload,
};
use aptos_txn_sdk::types::{AccountAddress, ChainId, TypeTag};
use proptest::prelude::*;

fn raw_txn(sender: AccountAddress, sequence_number: u64, amount: u64) -> RawTransaction {
    TransactionBuilder::new()
        .sender(sender)
        .sequence_number(sequence_number)
        .payload(scripts::coin_transfer(AccountAddress::ONE, amount).unwrap())
        .expiration_timestamp_secs(1_700_000_000)
        .chain_id(ChainId::new(4))
        .build()
        .unwrap()
}

#[test]
fn test_length_prefix_widths() {
    for (len, width) in [(0usize, 1usize), (127, 1), (128, 2), (16_383, 2), (16_384, 3)] {
        let bytes = to_bytes(&vec![0u8; len]).unwrap();
        assert_eq!(bytes.len() - len, width, "length {len}");
        assert_eq!(&bytes[width..], vec![0u8; len].as_slice());
    }
}

#[test]
fn test_raw_transaction_field_order() {
    let raw = raw_txn(AccountAddress::ONE, 9, 1_000);

    let mut expected = AccountAddress::ONE.to_bytes().to_vec();
    expected.extend(9u64.to_le_bytes());
    expected.extend(to_bytes(&raw.payload).unwrap());
    expected.extend(raw.max_gas_amount.to_le_bytes());
    expected.extend(raw.gas_unit_price.to_le_bytes());
    expected.extend(1_700_000_000u64.to_le_bytes());
    expected.push(4);
    assert_eq!(raw.to_bcs().unwrap(), expected);
}

#[test]
fn test_type_tag_and_script_layout() {
    let tag: TypeTag = "vector<0x1::Coin::CoinStore<0x1::TestCoin::TestCoin>>"
        .parse()
        .unwrap();
    let bytes = to_bytes(&tag).unwrap();
    // vector tag, struct tag, then the address of the outer struct
    assert_eq!(&bytes[..2], &[6, 7]);
    assert_eq!(&bytes[2..34], AccountAddress::ONE.to_bytes().as_slice());
    assert_eq!(aptos_bcs::from_bytes::<TypeTag>(&bytes).unwrap(), tag);

    let script = TransactionPayload::Script(Script::new(
        vec![0xa1, 0x1c],
        vec![TypeTag::U64],
        vec![
            ScriptArgument::U64(1),
            ScriptArgument::U8Vector(vec![1, 2, 3]),
            ScriptArgument::Bool(false),
        ],
    ));
    let mut expected = vec![0, 2, 0xa1, 0x1c, 1, 2, 3];
    expected.push(1);
    expected.extend(1u64.to_le_bytes());
    expected.extend([4, 3, 1, 2, 3]);
    expected.extend([5, 0]);
    assert_eq!(to_bytes(&script).unwrap(), expected);
}

#[test]
fn test_raw_transaction_decodes() {
    let raw = raw_txn(AccountAddress::from_hex("0xcafe").unwrap(), 3, 55);
    let decoded: RawTransaction = aptos_bcs::from_bytes(&raw.to_bcs().unwrap()).unwrap();
    assert_eq!(decoded, raw);
}

#[test]
fn test_signed_transaction_decodes() {
    let alice = LocalAccount::generate();
    let bob = LocalAccount::generate();
    let payload =
        scripts::direct_transfer_token(alice.address(), "Alice's", "Alice's first token", 1)
            .unwrap();
    let unsigned = TransactionBuilder::new()
        .sender(alice.address())
        .sequence_number(0)
        .payload(payload)
        .chain_id(ChainId::new(4))
        .secondary_signers(vec![bob.address()])
        .build_unsigned()
        .unwrap();
    let signed = sign_unsigned_transaction(&unsigned, &alice, &[&bob]).unwrap();

    let bytes = signed.canonical_bytes().unwrap();
    let decoded: SignedTransaction = aptos_bcs::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, signed);
    decoded.verify().unwrap();
}

#[test]
fn test_string_arguments_are_length_prefixed() {
    let encoded = TransactionArgument::from("foo").encode().unwrap();
    assert_eq!(encoded, vec![3, b'f', b'o', b'o']);
}

proptest! {
    #[test]
    fn prop_uleb128_width(value in any::<u32>()) {
        let mut out = Vec::new();
        uleb128_encode(u64::from(value), &mut out);
        let expected = match value {
            0..=0x7f => 1,
            0x80..=0x3fff => 2,
            0x4000..=0x1f_ffff => 3,
            0x20_0000..=0xfff_ffff => 4,
            _ => 5,
        };
        prop_assert_eq!(out.len(), expected);
        prop_assert_eq!(uleb128_len(u64::from(value)), expected);
        // the last byte is the only one without a continuation bit
        prop_assert!(out[..out.len() - 1].iter().all(|b| b & 0x80 != 0));
        prop_assert_eq!(out[out.len() - 1] & 0x80, 0);
    }

    #[test]
    fn prop_encoding_is_deterministic(
        sender in any::<[u8; 32]>(),
        sequence_number in any::<u64>(),
        amount in any::<u64>(),
    ) {
        let raw = raw_txn(AccountAddress::new(sender), sequence_number, amount);
        let first = raw.to_bcs().unwrap();
        let second = raw.clone().to_bcs().unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(raw.signing_message().unwrap(), raw.signing_message().unwrap());
        let decoded: RawTransaction = aptos_bcs::from_bytes(&first).unwrap();
        prop_assert_eq!(decoded, raw);
    }

    #[test]
    fn prop_byte_vectors_are_length_prefixed(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let encoded = TransactionArgument::Bytes(bytes.clone()).encode().unwrap();
        let mut expected = Vec::new();
        uleb128_encode(bytes.len() as u64, &mut expected);
        expected.extend(&bytes);
        prop_assert_eq!(encoded, expected);
    }
}
