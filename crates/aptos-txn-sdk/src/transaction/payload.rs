//! Transaction payloads.

use crate::error::AptosResult;
use crate::transaction::argument::{ScriptArgument, TransactionArgument};
use crate::types::{Identifier, ModuleId, TypeTag};
use serde::{Deserialize, Serialize};

/// The body of a transaction.
///
/// Variant order fixes the wire tag: Script 0, ModuleBundle 1,
/// ScriptFunction 2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    /// Ad-hoc Move bytecode.
    Script(Script),
    /// Modules to publish.
    ModuleBundle(ModuleBundle),
    /// A call to a published script function.
    ScriptFunction(ScriptFunction),
}

impl TransactionPayload {
    pub fn script_function(function: ScriptFunction) -> Self {
        Self::ScriptFunction(function)
    }

    pub fn as_script_function(&self) -> Option<&ScriptFunction> {
        match self {
            Self::ScriptFunction(f) => Some(f),
            _ => None,
        }
    }
}

impl From<ScriptFunction> for TransactionPayload {
    fn from(function: ScriptFunction) -> Self {
        Self::ScriptFunction(function)
    }
}

/// Ad-hoc Move bytecode with type arguments and tagged arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(with = "serde_bytes")]
    pub code: Vec<u8>,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<ScriptArgument>,
}

impl Script {
    pub fn new(code: Vec<u8>, ty_args: Vec<TypeTag>, args: Vec<ScriptArgument>) -> Self {
        Self {
            code,
            ty_args,
            args,
        }
    }
}

/// One compiled module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(with = "serde_bytes")]
    pub code: Vec<u8>,
}

/// A list of compiled modules published together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBundle {
    pub codes: Vec<Module>,
}

impl ModuleBundle {
    pub fn new(codes: Vec<Vec<u8>>) -> Self {
        Self {
            codes: codes.into_iter().map(|code| Module { code }).collect(),
        }
    }
}

/// A call to `module::function<ty_args>(args)`.
///
/// `args` holds each argument already in canonical form. On the wire the
/// list is a length-prefixed sequence of length-prefixed byte strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFunction {
    pub module: ModuleId,
    pub function: Identifier,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<Vec<u8>>,
}

impl ScriptFunction {
    pub fn new(
        module: ModuleId,
        function: Identifier,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            module,
            function,
            ty_args,
            args,
        }
    }

    /// Builds a call from human-readable parts, encoding each argument.
    ///
    /// ```
    /// use aptos_txn_sdk::transaction::{ScriptFunction, TransactionArgument};
    /// use aptos_txn_sdk::types::AccountAddress;
    ///
    /// let call = ScriptFunction::natural(
    ///     "0x1::Coin",
    ///     "transfer",
    ///     vec!["0x1::TestCoin::TestCoin".parse().unwrap()],
    ///     &[
    ///         TransactionArgument::Address(AccountAddress::ONE),
    ///         TransactionArgument::U64(1_000),
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(call.args.len(), 2);
    /// ```
    pub fn natural(
        module: &str,
        function: &str,
        ty_args: Vec<TypeTag>,
        args: &[TransactionArgument],
    ) -> AptosResult<Self> {
        let args = args
            .iter()
            .map(TransactionArgument::encode)
            .collect::<AptosResult<Vec<_>>>()?;
        Ok(Self {
            module: module.parse()?,
            function: Identifier::new(function)?,
            ty_args,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs;
    use crate::types::AccountAddress;

    #[test]
    fn test_script_function_tag() {
        let call = ScriptFunction::natural("0x1::Coin", "transfer", vec![], &[]).unwrap();
        let bytes = bcs::to_bytes(&TransactionPayload::from(call)).unwrap();
        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[1..33], AccountAddress::ONE.as_bytes());
        // module name, function name, empty ty_args, empty args
        assert_eq!(&bytes[33..], b"\x04Coin\x08transfer\x00\x00");
    }

    #[test]
    fn test_args_are_nested_byte_strings() {
        let call = ScriptFunction::natural(
            "0x1::M",
            "f",
            vec![],
            &[TransactionArgument::U8(5), TransactionArgument::from("ab")],
        )
        .unwrap();
        assert_eq!(call.args, vec![vec![5], vec![2, b'a', b'b']]);

        let bytes = bcs::to_bytes(&call).unwrap();
        assert!(bytes.ends_with(&[2, 1, 5, 3, 2, b'a', b'b']));
    }

    #[test]
    fn test_natural_rejects_bad_names() {
        assert!(ScriptFunction::natural("Coin", "transfer", vec![], &[]).is_err());
        assert!(ScriptFunction::natural("0x1::Coin", "1transfer", vec![], &[]).is_err());
    }

    #[test]
    fn test_other_payload_tags() {
        let script = TransactionPayload::Script(Script::new(vec![0xa1], vec![], vec![]));
        assert_eq!(bcs::to_bytes(&script).unwrap(), vec![0, 1, 0xa1, 0, 0]);

        let bundle = TransactionPayload::ModuleBundle(ModuleBundle::new(vec![vec![7, 7]]));
        assert_eq!(bcs::to_bytes(&bundle).unwrap(), vec![1, 1, 2, 7, 7]);
    }
}
