use crate::crypto::sha3_256;
use crate::error::{AptosError, AptosResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of a hash value in bytes.
pub const HASH_LENGTH: usize = 32;

/// A 32-byte SHA3-256 digest, used for transaction hashes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashValue([u8; HASH_LENGTH]);

impl HashValue {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Hashes `data` with SHA3-256.
    pub fn sha3_256<T: AsRef<[u8]>>(data: T) -> Self {
        Self(sha3_256(data.as_ref()))
    }

    /// Parses exactly 64 hex digits, with or without `0x`.
    pub fn from_hex<T: AsRef<[u8]>>(hex_str: T) -> AptosResult<Self> {
        let raw = hex_str.as_ref();
        let digits = raw.strip_prefix(b"0x").unwrap_or(raw);
        if digits.len() != HASH_LENGTH * 2 {
            return Err(AptosError::InvalidHash(format!(
                "hash must be {} hex digits, got {}",
                HASH_LENGTH * 2,
                digits.len()
            )));
        }
        let mut hash = [0u8; HASH_LENGTH];
        hex::decode_to_slice(digits, &mut hash)?;
        Ok(Self(hash))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self.to_hex())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for HashValue {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for HashValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_LENGTH]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha3_known_vector() {
        // SHA3-256 of the empty string
        assert_eq!(
            HashValue::sha3_256(b"").to_hex(),
            "0xa7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_hex_round_trip() {
        let hash = HashValue::sha3_256(b"aptos");
        assert_eq!(hash.to_string().parse::<HashValue>().unwrap(), hash);
    }

    #[test]
    fn test_from_hex_rejects_short() {
        assert!(HashValue::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_json() {
        let hash = HashValue::new([1u8; HASH_LENGTH]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(serde_json::from_str::<HashValue>(&json).unwrap(), hash);
    }
}
