//! Move type descriptors: identifiers, module ids, struct tags and type tags.
//!
//! All of these parse from and render to the canonical string form used by
//! the node, e.g. `0x1::Coin::CoinStore<0x1::TestCoin::TestCoin>`.
//!
//! Parsing is bounded: strings longer than [`MAX_TYPE_TAG_LENGTH`] and
//! generics nested deeper than [`MAX_TYPE_NESTING_DEPTH`] are rejected.

use crate::error::{AptosError, AptosResult};
use crate::types::AccountAddress;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_TYPE_TAG_LENGTH: usize = 1024;
pub const MAX_IDENTIFIER_LENGTH: usize = 128;
pub const MAX_TYPE_NESTING_DEPTH: usize = 8;

/// A Move identifier: module, function or struct name.
///
/// Starts with an ASCII letter or `_`, continues with ASCII alphanumerics or
/// `_`. Encoded as a length-prefixed string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Identifier(Box<str>);

impl Identifier {
    pub fn new(s: impl Into<String>) -> AptosResult<Self> {
        let s = s.into();
        if s.len() > MAX_IDENTIFIER_LENGTH {
            return Err(AptosError::InvalidIdentifier(format!(
                "identifier too long: {} bytes (max {MAX_IDENTIFIER_LENGTH})",
                s.len()
            )));
        }
        let Some(first) = s.chars().next() else {
            return Err(AptosError::InvalidIdentifier(
                "identifier cannot be empty".to_string(),
            ));
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(AptosError::InvalidIdentifier(format!(
                "identifier must start with a letter or underscore: {s}"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AptosError::InvalidIdentifier(format!(
                "identifier contains invalid characters: {s}"
            )));
        }
        Ok(Self(s.into_boxed_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename = "Identifier")]
        struct Raw(String);

        let Raw(s) = Raw::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// A published module: `address::name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: Identifier,
}

impl ModuleId {
    pub fn new(address: AccountAddress, name: Identifier) -> Self {
        Self { address, name }
    }
}

impl FromStr for ModuleId {
    type Err = AptosError;

    /// Parses `"0x1::Coin"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split("::").collect::<Vec<_>>()[..] {
            [address, name] => Ok(Self {
                address: AccountAddress::from_hex(address)?,
                name: Identifier::new(name)?,
            }),
            _ => Err(AptosError::InvalidTypeTag(format!(
                "expected address::module, got {s}"
            ))),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address.to_short_string(), self.name)
    }
}

/// A struct type: `address::module::Name<TypeArgs...>`.
///
/// Encoded as address, module, name, then the length-prefixed type argument
/// list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: Identifier,
    pub name: Identifier,
    pub type_args: Vec<TypeTag>,
}

impl StructTag {
    pub fn new(
        address: AccountAddress,
        module: Identifier,
        name: Identifier,
        type_args: Vec<TypeTag>,
    ) -> Self {
        Self {
            address,
            module,
            name,
            type_args,
        }
    }

    /// Returns the module this struct is declared in.
    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(self.address, self.module.clone())
    }

    fn parse(s: &str, depth: usize) -> AptosResult<Self> {
        let (base, args) = match s.find('<') {
            Some(open) => {
                let Some(inner) = s[open + 1..].strip_suffix('>') else {
                    return Err(AptosError::InvalidTypeTag(format!(
                        "malformed generic type: {s}"
                    )));
                };
                (&s[..open], Some(inner))
            }
            None => (s, None),
        };

        let [address, module, name] = base.split("::").collect::<Vec<_>>()[..] else {
            return Err(AptosError::InvalidTypeTag(format!(
                "expected address::module::name, got {s}"
            )));
        };

        let type_args = match args {
            Some(args) => split_type_args(args)?
                .into_iter()
                .map(|arg| TypeTag::parse(arg, depth + 1))
                .collect::<AptosResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            address: AccountAddress::from_hex(address.trim())?,
            module: Identifier::new(module.trim())?,
            name: Identifier::new(name.trim())?,
            type_args,
        })
    }
}

impl FromStr for StructTag {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        check_length(s)?;
        Self::parse(s, 0)
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_string(),
            self.module,
            self.name
        )?;
        if let Some((first, rest)) = self.type_args.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A Move type.
///
/// Declaration order fixes the variant index on the wire:
/// Bool 0, U8 1, U64 2, U128 3, Address 4, Signer 5, Vector 6, Struct 7,
/// U16 8, U32 9, U256 10.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

impl TypeTag {
    pub fn vector(element: TypeTag) -> Self {
        Self::Vector(Box::new(element))
    }

    pub fn struct_tag(tag: StructTag) -> Self {
        Self::Struct(Box::new(tag))
    }

    fn parse(s: &str, depth: usize) -> AptosResult<Self> {
        if depth > MAX_TYPE_NESTING_DEPTH {
            return Err(AptosError::InvalidTypeTag(format!(
                "type nesting deeper than {MAX_TYPE_NESTING_DEPTH}"
            )));
        }

        let s = s.trim();
        let tag = match s {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            _ => match s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
                Some(inner) => TypeTag::vector(TypeTag::parse(inner, depth + 1)?),
                None => TypeTag::struct_tag(StructTag::parse(s, depth)?),
            },
        };
        Ok(tag)
    }
}

impl FromStr for TypeTag {
    type Err = AptosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        check_length(s)?;
        Self::parse(s, 0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => write!(f, "{tag}"),
        }
    }
}

impl From<StructTag> for TypeTag {
    fn from(tag: StructTag) -> Self {
        TypeTag::struct_tag(tag)
    }
}

fn check_length(s: &str) -> AptosResult<()> {
    if s.len() > MAX_TYPE_TAG_LENGTH {
        return Err(AptosError::InvalidTypeTag(format!(
            "type tag too long: {} bytes (max {MAX_TYPE_TAG_LENGTH})",
            s.len()
        )));
    }
    Ok(())
}

/// Splits a generic argument list at top-level commas.
fn split_type_args(s: &str) -> AptosResult<Vec<&str>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    AptosError::InvalidTypeTag(format!("unbalanced '>' in {s}"))
                })?;
            }
            ',' if depth == 0 => {
                args.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AptosError::InvalidTypeTag(format!("unbalanced '<' in {s}")));
    }

    args.push(s[start..].trim());
    if args.iter().any(|arg| arg.is_empty()) {
        return Err(AptosError::InvalidTypeTag(format!(
            "empty type argument in {s}"
        )));
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs;

    #[test]
    fn test_identifier_validation() {
        assert!(Identifier::new("transfer").is_ok());
        assert!(Identifier::new("_private").is_ok());
        assert!(Identifier::new("").is_err());
        assert!(Identifier::new("1abc").is_err());
        assert!(Identifier::new("a-b").is_err());
        assert!(Identifier::new("a".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_module_id_parse() {
        let module: ModuleId = "0x1::Coin".parse().unwrap();
        assert_eq!(module.address, AccountAddress::ONE);
        assert_eq!(module.name.as_str(), "Coin");
        assert_eq!(module.to_string(), "0x1::Coin");
        assert!("0x1::Coin::transfer".parse::<ModuleId>().is_err());
    }

    #[test]
    fn test_primitive_tags() {
        for (s, tag) in [
            ("bool", TypeTag::Bool),
            ("u8", TypeTag::U8),
            ("u64", TypeTag::U64),
            ("u128", TypeTag::U128),
            ("address", TypeTag::Address),
            ("signer", TypeTag::Signer),
        ] {
            assert_eq!(s.parse::<TypeTag>().unwrap(), tag);
            assert_eq!(tag.to_string(), s);
        }
    }

    #[test]
    fn test_nested_generic_struct() {
        let s = "0x1::Coin::CoinStore<0x1::TestCoin::TestCoin>";
        let tag: StructTag = s.parse().unwrap();
        assert_eq!(tag.module.as_str(), "Coin");
        assert_eq!(tag.name.as_str(), "CoinStore");
        assert_eq!(tag.type_args.len(), 1);
        assert_eq!(tag.to_string(), s);

        let pair: TypeTag = "0x1::Pair::Pair<vector<u8>, 0x1::A::B<u64, bool>>"
            .parse()
            .unwrap();
        let TypeTag::Struct(pair) = pair else {
            panic!("expected struct tag");
        };
        assert_eq!(pair.type_args[0], TypeTag::vector(TypeTag::U8));
        assert_eq!(pair.to_string(), "0x1::Pair::Pair<vector<u8>, 0x1::A::B<u64, bool>>");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("0x1::Coin".parse::<TypeTag>().is_err());
        assert!("0x1::A::B<u8".parse::<TypeTag>().is_err());
        assert!("0x1::A::B<u8,>".parse::<TypeTag>().is_err());
        assert!("0x1::A::B<u8>>".parse::<TypeTag>().is_err());
        assert!("vector<>".parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_parse_limits() {
        let deep = format!("{}u8{}", "vector<".repeat(10), ">".repeat(10));
        assert!(deep.parse::<TypeTag>().is_err());

        let long = format!("0x1::A::{}", "B".repeat(MAX_TYPE_TAG_LENGTH));
        assert!(long.parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_type_tag_discriminants() {
        assert_eq!(bcs::to_bytes(&TypeTag::Bool).unwrap(), vec![0]);
        assert_eq!(bcs::to_bytes(&TypeTag::U64).unwrap(), vec![2]);
        assert_eq!(bcs::to_bytes(&TypeTag::Signer).unwrap(), vec![5]);
        assert_eq!(bcs::to_bytes(&TypeTag::vector(TypeTag::U8)).unwrap(), vec![6, 1]);
        assert_eq!(bcs::to_bytes(&TypeTag::U256).unwrap(), vec![10]);
    }

    #[test]
    fn test_struct_tag_encoding() {
        let tag: TypeTag = "0x1::TestCoin::TestCoin".parse().unwrap();
        let bytes = bcs::to_bytes(&tag).unwrap();

        let mut expected = vec![7];
        expected.extend_from_slice(AccountAddress::ONE.as_bytes());
        expected.push(8);
        expected.extend_from_slice(b"TestCoin");
        expected.push(8);
        expected.extend_from_slice(b"TestCoin");
        expected.push(0);
        assert_eq!(bytes, expected);
    }
}
