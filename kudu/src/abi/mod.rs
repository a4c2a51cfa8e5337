//! ABI-driven JSON<->binary codec (spec.md §2-§4): parse an [`AbiDefinition`],
//! [`resolver::Resolver::fill_contract`] it into a type graph, then drive
//! [`engine::json_to_bin`]/[`engine::bin_to_json`] against an action or
//! table's registered type.

pub mod data;
pub mod definition;
pub mod engine;
pub mod error;
pub mod path;
pub mod resolver;

pub use definition::AbiDefinition;
pub use engine::{bin_to_json, json_to_bin};
pub use error::AbiError;
pub use path::Path;
pub use resolver::{Resolver, StructDef, TypeIndex, TypeKind, TypeNode, VariantDef};

use serde_json::Value as JsonValue;

use crate::bytestream::ByteStream;

/// A fully-resolved contract: its type graph plus the entry points named in
/// spec.md §6 ("build a contract once, encode/decode many times against it").
#[derive(Debug, Clone)]
pub struct Contract {
    resolver: Resolver,
}

impl Contract {
    /// Resolve an [`AbiDefinition`] into a queryable contract (spec.md §6
    /// item 1, "build_contract").
    pub fn build(abi: &AbiDefinition) -> Result<Self, AbiError> {
        Ok(Self { resolver: Resolver::fill_contract(abi)? })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Encode `value` against the type registered for action `name`.
    pub fn encode_action(&self, name: &str, value: &JsonValue) -> Result<ByteStream, AbiError> {
        let type_idx = self.action_type_or_err(name)?;
        json_to_bin(&self.resolver, type_idx, value)
    }

    /// Decode binary action data back into JSON.
    pub fn decode_action(&self, name: &str, stream: &mut ByteStream) -> Result<JsonValue, AbiError> {
        let type_idx = self.action_type_or_err(name)?;
        bin_to_json(&self.resolver, type_idx, stream)
    }

    /// Encode `value` against the type registered for table `name`.
    pub fn encode_table_row(&self, name: &str, value: &JsonValue) -> Result<ByteStream, AbiError> {
        let type_idx = self.table_type_or_err(name)?;
        json_to_bin(&self.resolver, type_idx, value)
    }

    /// Decode a binary table row back into JSON.
    pub fn decode_table_row(&self, name: &str, stream: &mut ByteStream) -> Result<JsonValue, AbiError> {
        let type_idx = self.table_type_or_err(name)?;
        bin_to_json(&self.resolver, type_idx, stream)
    }

    /// Encode `value` against an arbitrary named type (not necessarily an
    /// action or table), e.g. a struct referenced only from another struct.
    /// Takes `&mut self`: an unfamiliar suffix combination (`"name[][]?"`)
    /// may need a fresh wrapper node resolved into the type graph.
    pub fn encode_type(&mut self, type_name: &str, value: &JsonValue) -> Result<ByteStream, AbiError> {
        let type_idx = self.resolver.get_type(type_name, 0)?;
        json_to_bin(&self.resolver, type_idx, value)
    }

    /// Decode binary data against an arbitrary named type.
    pub fn decode_type(&mut self, type_name: &str, stream: &mut ByteStream) -> Result<JsonValue, AbiError> {
        let type_idx = self.resolver.get_type(type_name, 0)?;
        bin_to_json(&self.resolver, type_idx, stream)
    }

    fn action_type_or_err(&self, name: &str) -> Result<TypeIndex, AbiError> {
        self.resolver.action_type(name).ok_or_else(|| {
            error::SchemaSnafu { path: Path::root(), message: format!(r#"no action named "{name}""#) }.build()
        })
    }

    fn table_type_or_err(&self, name: &str) -> Result<TypeIndex, AbiError> {
        self.resolver.table_type(name).ok_or_else(|| {
            error::SchemaSnafu { path: Path::root(), message: format!(r#"no table named "{name}""#) }.build()
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_and_round_trips_through_an_action() {
        let abi = AbiDefinition::from_str(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "transfer", "base": "", "fields": [
                    { "name": "from", "type": "name" },
                    { "name": "to", "type": "name" },
                    { "name": "quantity", "type": "asset" },
                    { "name": "memo", "type": "string" }
                ]}
            ],
            "actions": [
                { "name": "transfer", "type": "transfer", "ricardian_contract": "" }
            ]
        }"#).unwrap();

        let contract = Contract::build(&abi).unwrap();
        let value = json!({
            "from": "alice",
            "to": "bob",
            "quantity": "1.0000 EOS",
            "memo": "hi",
        });
        let bin = contract.encode_action("transfer", &value).unwrap();
        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        assert_eq!(contract.decode_action("transfer", &mut cursor).unwrap(), value);
    }

    #[test]
    fn unknown_action_is_a_schema_error() {
        let abi = AbiDefinition::default();
        let contract = Contract::build(&abi).unwrap();
        let err = contract.encode_action("nope", &json!({})).unwrap_err();
        assert!(matches!(err, AbiError::Schema { .. }));
    }
}
