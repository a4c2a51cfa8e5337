//! Integration coverage for the universal properties and literal scenarios
//! that drive the engine's design (spec.md §8): round-tripping in both
//! directions, bounded recursion, resolver idempotence, extension
//! monotonicity, and the path a failure reports.

use kudu::abi::definition::AbiDefinition;
use kudu::abi::resolver::Resolver;
use kudu::abi::{bin_to_json, json_to_bin, AbiError};
use kudu::bytestream::ByteStream;
use serde_json::json;

fn resolver_for(abi_json: &str) -> Resolver {
    let abi = AbiDefinition::from_str(abi_json).unwrap();
    Resolver::fill_contract(&abi).unwrap()
}

fn transfer_resolver() -> Resolver {
    resolver_for(r#"{
        "version": "eosio::abi/1.2",
        "structs": [
            { "name": "transfer", "base": "", "fields": [
                { "name": "from", "type": "name" },
                { "name": "to", "type": "name" },
                { "name": "quantity", "type": "asset" },
                { "name": "memo", "type": "string" }
            ]}
        ]
    }"#)
}

#[test]
fn name_round_trips_to_the_literal_bytes() {
    let mut r = Resolver::with_builtins();
    let type_idx = r.get_type("name", 0).unwrap();
    let value = json!("eosio.token");
    let bin = json_to_bin(&r, type_idx, &value).unwrap();
    assert_eq!(bin.hex_data(), "00a6823403ea3055");
    let mut cursor = ByteStream::from_bytes(bin.into_bytes());
    assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), value);
}

#[test]
fn asset_round_trips_to_the_literal_bytes() {
    let mut r = Resolver::with_builtins();
    let type_idx = r.get_type("asset", 0).unwrap();
    let value = json!("1.0000 EOS");
    let bin = json_to_bin(&r, type_idx, &value).unwrap();
    assert_eq!(bin.hex_data(), "102700000000000004454f5300000000");
    let mut cursor = ByteStream::from_bytes(bin.into_bytes());
    assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), value);
}

// Property 1 (spec.md §8): round-trip JSON -> bin -> JSON.
#[test]
fn json_to_bin_to_json_round_trips_a_struct() {
    let mut r = transfer_resolver();
    let type_idx = r.get_type("transfer", 0).unwrap();
    let value = json!({
        "from": "alice",
        "to": "bob",
        "quantity": "1.0000 EOS",
        "memo": "hi",
    });
    let bin = json_to_bin(&r, type_idx, &value).unwrap();
    let mut cursor = ByteStream::from_bytes(bin.into_bytes());
    assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), value);
}

// Property 2: round-trip bin -> JSON -> bin, bytes equal.
#[test]
fn bin_to_json_to_bin_round_trips_the_same_bytes() {
    let mut r = transfer_resolver();
    let type_idx = r.get_type("transfer", 0).unwrap();
    let value = json!({
        "from": "alice",
        "to": "bob",
        "quantity": "1.0000 EOS",
        "memo": "hi",
    });
    let original = json_to_bin(&r, type_idx, &value).unwrap().into_bytes();

    let mut cursor = ByteStream::from_bytes(original.clone());
    let decoded = bin_to_json(&r, type_idx, &mut cursor).unwrap();
    let reencoded = json_to_bin(&r, type_idx, &decoded).unwrap().into_bytes();
    assert_eq!(reencoded, original);
}

// Property 3: a pathologically deep type nesting errors rather than
// overflowing the host stack. Each `[]?` pair adds two recursion frames to
// `Resolver::get_type`, so 200 pairs blows well past the 32-deep resolver
// cap before the engine ever sees a value to encode.
#[test]
fn excessively_nested_type_names_hit_the_recursion_limit() {
    let mut r = Resolver::with_builtins();
    let deeply_nested: String = "uint8".to_owned() + &"[]".repeat(200);
    let err = r.get_type(&deeply_nested, 0).unwrap_err();
    assert!(matches!(err, AbiError::Schema { .. }));
}

// Property 4: resolving the same ABI twice yields the same field lists.
#[test]
fn fill_contract_is_idempotent() {
    let abi_json = r#"{
        "version": "eosio::abi/1.2",
        "structs": [
            { "name": "s", "base": "", "fields": [
                { "name": "a", "type": "uint8" },
                { "name": "b", "type": "string" }
            ]}
        ]
    }"#;
    let abi = AbiDefinition::from_str(abi_json).unwrap();
    let mut r1 = Resolver::fill_contract(&abi).unwrap();
    let mut r2 = Resolver::fill_contract(&abi).unwrap();

    let t1 = r1.get_type("s", 0).unwrap();
    let t2 = r2.get_type("s", 0).unwrap();
    let names = |r: &Resolver, idx: usize| -> Vec<String> {
        match &r.node(idx).kind {
            kudu::abi::resolver::TypeKind::Struct(si) => {
                r.struct_def(*si).fields.iter().map(|(n, _)| n.clone()).collect()
            },
            other => panic!("expected a struct, got {other:?}"),
        }
    };
    assert_eq!(names(&r1, t1), names(&r2, t2));
}

// Property 5: truncating at an extension boundary still decodes, and
// re-encoding the decoded object reproduces the truncated bytes exactly.
#[test]
fn truncating_at_an_extension_boundary_round_trips() {
    let mut r = resolver_for(r#"{
        "version": "eosio::abi/1.2",
        "structs": [
            { "name": "s", "base": "", "fields": [
                { "name": "a", "type": "uint8" },
                { "name": "b", "type": "uint8$" },
                { "name": "c", "type": "uint8$" }
            ]}
        ]
    }"#);
    let type_idx = r.get_type("s", 0).unwrap();

    let full = json_to_bin(&r, type_idx, &json!({"a": 1, "b": 2, "c": 3})).unwrap().into_bytes();
    assert_eq!(full.len(), 3);

    let truncated = full[..1].to_vec();
    let mut cursor = ByteStream::from_bytes(truncated.clone());
    let decoded = bin_to_json(&r, type_idx, &mut cursor).unwrap();
    assert_eq!(decoded, json!({"a": 1}));

    let reencoded = json_to_bin(&r, type_idx, &decoded).unwrap().into_bytes();
    assert_eq!(reencoded, truncated);
}

// Property 6: an error's path names the smallest offending subterm.
#[test]
fn error_path_names_the_offending_field() {
    let mut r = resolver_for(r#"{
        "version": "eosio::abi/1.2",
        "structs": [
            { "name": "s", "base": "", "fields": [
                { "name": "items", "type": "uint8[]" }
            ]}
        ]
    }"#);
    let type_idx = r.get_type("s", 0).unwrap();
    let err = json_to_bin(&r, type_idx, &json!({"items": ["1", "not a number", "3"]})).unwrap_err();
    let path = err.path().to_string();
    assert!(path.contains("items"), "expected path to mention \"items\", got {path:?}");
    assert!(path.contains('1'), "expected path to mention the offending index, got {path:?}");
}

#[test]
fn recursive_alias_errors_with_the_exact_message() {
    let abi = AbiDefinition::from_str(r#"{
        "version": "eosio::abi/1.2",
        "types": [
            { "new_type_name": "t", "type": "t" }
        ]
    }"#).unwrap();
    let err = Resolver::fill_contract(&abi).unwrap_err();
    match err {
        AbiError::Schema { message, .. } => assert_eq!(message, "abi recursion limit reached"),
        other => panic!("expected a schema error, got {other:?}"),
    }
}
