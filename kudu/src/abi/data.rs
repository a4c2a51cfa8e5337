//! Literal ABI documents used to bootstrap the resolver, grounded on
//! `antelope-abi/src/abidefinition.rs`'s `abi_schema()`.

/// The self-describing schema for `ABIDefinition` itself: an ABI document
/// whose structs describe the JSON shape of ABI documents. Used by
/// [`crate::abi::resolver::Resolver`] to bootstrap parsing of the binary
/// form of an ABI (spec.md §6, "serialized ABI documents are themselves
/// ABI-encoded against this schema").
pub const ABI_SCHEMA: &str = r#"{
    "version": "eosio::abi/1.1",
    "types": [],
    "structs": [
        {
            "name": "typedef",
            "base": "",
            "fields": [
                { "name": "new_type_name", "type": "string" },
                { "name": "type", "type": "string" }
            ]
        },
        {
            "name": "field",
            "base": "",
            "fields": [
                { "name": "name", "type": "string" },
                { "name": "type", "type": "string" }
            ]
        },
        {
            "name": "struct",
            "base": "",
            "fields": [
                { "name": "name", "type": "string" },
                { "name": "base", "type": "string" },
                { "name": "fields", "type": "field[]" }
            ]
        },
        {
            "name": "action",
            "base": "",
            "fields": [
                { "name": "name", "type": "name" },
                { "name": "type", "type": "string" },
                { "name": "ricardian_contract", "type": "string" }
            ]
        },
        {
            "name": "table",
            "base": "",
            "fields": [
                { "name": "name", "type": "name" },
                { "name": "index_type", "type": "string" },
                { "name": "key_names", "type": "string[]" },
                { "name": "key_types", "type": "string[]" },
                { "name": "type", "type": "string" }
            ]
        },
        {
            "name": "variant",
            "base": "",
            "fields": [
                { "name": "name", "type": "name" },
                { "name": "types", "type": "string[]" }
            ]
        }
    ],
    "actions": [],
    "tables": [],
    "ricardian_clauses": [],
    "error_messages": [],
    "variants": []
}"#;

/// The built-in `extended_asset` struct (spec.md §4.1 item 2) is inserted
/// directly into every resolved contract rather than synthesized from this
/// JSON, but is kept here in ABI-document form for documentation and for
/// contracts that want to reference it explicitly from their own ABI.
pub const EXTENDED_ASSET_STRUCT: &str = r#"{
    "name": "extended_asset",
    "base": "",
    "fields": [
        { "name": "quantity", "type": "asset" },
        { "name": "contract", "type": "name" }
    ]
}"#;
