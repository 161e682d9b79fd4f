//! Binary Canonical Serialization.
//!
//! Thin layer over the `bcs` crate: every model type derives `Serialize` and
//! goes through [`to_bytes`], which reports failures as
//! [`AptosError::Encoding`]. The layout the node verifies signatures against:
//!
//! | Kind | Layout |
//! |------|--------|
//! | `u8`..`u128`, `i8`..`i128` | fixed width, little-endian |
//! | `bool` | one byte, `0` or `1` |
//! | `&str`, `&[u8]`, `Vec<T>` | ULEB128 length, then elements |
//! | struct, tuple, `[u8; N]` | fields concatenated, no prefix |
//! | enum | ULEB128 variant index, then the variant's fields |
//! | `Option<T>` | `0`, or `1` followed by the value |
//! | map | ULEB128 length, entries sorted by encoded key |
//!
//! Floats and `char` have no canonical form and are rejected.

use crate::error::{AptosError, AptosResult};
use serde::Serialize;

pub use aptos_bcs::{MAX_CONTAINER_DEPTH, MAX_SEQUENCE_LENGTH};

/// Serializes `value` into a fresh byte vector.
pub fn to_bytes<T>(value: &T) -> AptosResult<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    aptos_bcs::to_bytes(value).map_err(AptosError::encoding)
}

/// Returns the number of bytes `value` encodes to.
pub fn serialized_size<T>(value: &T) -> AptosResult<usize>
where
    T: ?Sized + Serialize,
{
    aptos_bcs::serialized_size(value).map_err(AptosError::encoding)
}

/// Appends `value` as unsigned LEB128: seven bits per byte, low bits first,
/// high bit set on every byte but the last.
#[allow(clippy::cast_possible_truncation)] // masked to 7 bits
pub fn uleb128_encode(mut value: u64, output: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            output.push(byte);
            return;
        }
        output.push(byte | 0x80);
    }
}

/// Number of bytes [`uleb128_encode`] writes for `value`.
pub fn uleb128_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn uleb(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        uleb128_encode(value, &mut out);
        out
    }

    #[test]
    fn test_uleb128_boundaries() {
        assert_eq!(uleb(0), vec![0x00]);
        assert_eq!(uleb(127), vec![0x7f]);
        assert_eq!(uleb(128), vec![0x80, 0x01]);
        assert_eq!(uleb(16383), vec![0xff, 0x7f]);
        assert_eq!(uleb(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(uleb128_len(u64::MAX), 10);
    }

    #[test]
    fn test_uleb128_len_matches_encoding() {
        for value in [0, 1, 127, 128, 300, 16383, 16384, 2_097_151, 2_097_152] {
            assert_eq!(uleb128_len(value), uleb(value).len(), "value {value}");
        }
    }

    #[test]
    fn test_uleb128_matches_sequence_prefix() {
        for len in [0usize, 127, 128, 16_384] {
            let bytes = to_bytes(&vec![0u8; len]).unwrap();
            assert_eq!(&bytes[..uleb128_len(len as u64)], uleb(len as u64).as_slice());
        }
    }

    #[test]
    fn test_integers_little_endian() {
        assert_eq!(
            to_bytes(&0x0102_0304_0506_0708u64).unwrap(),
            vec![8, 7, 6, 5, 4, 3, 2, 1]
        );
        assert_eq!(to_bytes(&u128::MAX).unwrap(), vec![0xff; 16]);
    }

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Line { from: u8, to: u8 },
    }

    #[test]
    fn test_enum_variant_index() {
        assert_eq!(to_bytes(&Shape::Empty).unwrap(), vec![0]);
        assert_eq!(to_bytes(&Shape::Line { from: 1, to: 2 }).unwrap(), vec![1, 1, 2]);
        assert_eq!(to_bytes(&Some(7u8)).unwrap(), vec![1, 7]);
    }

    #[test]
    fn test_map_sorted_by_encoded_key() {
        let mut map = BTreeMap::new();
        map.insert(300u16, 1u8);
        map.insert(2u16, 2u8);
        // 300 encodes as [0x2c, 0x01], 2 as [0x02, 0x00]
        assert_eq!(to_bytes(&map).unwrap(), vec![2, 0x02, 0x00, 2, 0x2c, 0x01, 1]);
    }

    #[test]
    fn test_unsupported_kinds_are_encoding_errors() {
        assert!(matches!(to_bytes(&1.5f64), Err(AptosError::Encoding(_))));
        assert!(matches!(to_bytes(&'c'), Err(AptosError::Encoding(_))));
    }

    #[test]
    fn test_container_depth_limit() {
        #[derive(Serialize)]
        struct Nest(Option<Box<Nest>>);

        let mut value = Nest(None);
        for _ in 0..MAX_CONTAINER_DEPTH + 1 {
            value = Nest(Some(Box::new(value)));
        }
        assert!(matches!(to_bytes(&value), Err(AptosError::Encoding(_))));
    }

    #[test]
    fn test_serialized_size() {
        assert_eq!(serialized_size(&vec![0u64; 3]).unwrap(), 25);
    }
}
