//! Account addresses.

use crate::error::{AptosError, AptosResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address.
///
/// Rendered as `0x` followed by 64 lowercase hex digits. Parsing accepts the
/// short form used for framework accounts (`0x1`) and left-pads it with zeros,
/// so `from_hex(addr.to_hex())` always returns `addr`.
///
/// In canonical binary form an address is its 32 raw bytes with no length
/// prefix; in JSON it is the hex string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    /// All zeros.
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// The core framework account, `0x1`.
    pub const ONE: Self = {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = 1;
        Self(bytes)
    };

    /// Creates an address from a byte array.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses an address from hex, with or without the `0x` prefix.
    pub fn from_hex<T: AsRef<[u8]>>(hex_str: T) -> AptosResult<Self> {
        let raw = hex_str.as_ref();
        let digits = raw
            .strip_prefix(b"0x")
            .or_else(|| raw.strip_prefix(b"0X"))
            .unwrap_or(raw);

        let digits = std::str::from_utf8(digits)
            .map_err(|e| AptosError::InvalidAddress(e.to_string()))?;

        if digits.is_empty() {
            return Err(AptosError::InvalidAddress(
                "address must contain at least one hex digit".to_string(),
            ));
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AptosError::InvalidAddress(format!(
                "address too long: {} hex digits (max {})",
                digits.len(),
                ADDRESS_LENGTH * 2
            )));
        }

        let padded = format!("{digits:0>64}");
        let mut address = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(padded, &mut address)?;
        Ok(Self(address))
    }

    /// Creates an address from a 32-byte slice.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> AptosResult<Self> {
        let bytes = bytes.as_ref();
        let address: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            AptosError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(address))
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the raw byte array.
    pub fn to_bytes(&self) -> [u8; ADDRESS_LENGTH] {
        self.0
    }

    /// Full-length hex form with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Hex form with leading zeros trimmed, e.g. `0x1`.
    pub fn to_short_string(&self) -> String {
        let hex = hex::encode(self.0);
        match hex.trim_start_matches('0') {
            "" => "0x0".to_string(),
            trimmed => format!("0x{trimmed}"),
        }
    }
}

impl Default for AccountAddress {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_short_string())
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            // fixed-size array: a tuple of 32 bytes, no length prefix
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
        }
    }
}

impl From<[u8; ADDRESS_LENGTH]> for AccountAddress {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for AccountAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
