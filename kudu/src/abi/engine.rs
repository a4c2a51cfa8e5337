//! The JSON<->Bin traversal engine (spec.md §2 items 2-3, §4.2-§4.3, §5,
//! §9): walks a resolved [`TypeIndex`] against either a `serde_json::Value`
//! tree or a [`ByteStream`], grounded on the `json_to_bin`/`bin_to_json`
//! routines in `examples/original_source/src/abieos.hpp`.
//!
//! The original keeps an explicit `Vec` of resumable frames so a hand-rolled
//! recursion never overruns a fixed 128-entry stack. This crate gets the
//! same observable bound — same depth, same `"recursion limit reached"`
//! wording — from ordinary Rust recursion guarded by an explicit `depth`
//! counter: idiomatic, and just as safe here since Rust's own call stack
//! backstops anything our counter doesn't catch first.

use serde_json::Value as JsonValue;
use snafu::{IntoError, ResultExt};

use crate::abi::error::{AbiError, JsonShapeSnafu, LexSnafu, WireSnafu};
use crate::abi::path::Path;
use crate::abi::resolver::{Resolver, TypeIndex, TypeKind};
use crate::bytestream::{ByteStream, StreamError};
use crate::json::{self, JsonEvent};
use crate::types::value::{decode_primitive, encode_primitive, TruncatedSnafu, WireError};

/// Matches `max_stack_size` in the original implementation; bounds genuine
/// nesting depth (structs-within-structs, arrays-of-arrays), not breadth —
/// a flat 10,000-element array of `int8` is one frame deep, not 10,000.
const MAX_DEPTH: usize = 128;

fn shape_err(path: &Path, message: impl Into<String>) -> AbiError {
    JsonShapeSnafu { path: path.clone(), message: message.into() }.build()
}

fn wire_err(path: &Path, message: impl Into<String>) -> AbiError {
    let source = TruncatedSnafu { message: message.into() }.build();
    WireSnafu { path: path.clone() }.into_error(source)
}

fn stream_err(e: StreamError) -> WireError {
    TruncatedSnafu { message: e.to_string() }.build()
}

/// Encode a JSON value against a resolved type into its binary form.
pub fn json_to_bin(resolver: &Resolver, type_idx: TypeIndex, value: &JsonValue) -> Result<ByteStream, AbiError> {
    let mut stream = ByteStream::new();
    encode_value(resolver, type_idx, value, &mut stream, &Path::root(), 0)?;
    Ok(stream)
}

/// Decode a binary value against a resolved type into its JSON form.
pub fn bin_to_json(resolver: &Resolver, type_idx: TypeIndex, stream: &mut ByteStream) -> Result<JsonValue, AbiError> {
    let mut events = vec![];
    decode_value(resolver, type_idx, stream, &mut events, &Path::root(), 0)?;
    Ok(json::value_of(&events))
}

fn encode_value(
    resolver: &Resolver,
    type_idx: TypeIndex,
    value: &JsonValue,
    stream: &mut ByteStream,
    path: &Path,
    depth: usize,
) -> Result<(), AbiError> {
    if depth >= MAX_DEPTH {
        return Err(shape_err(path, "recursion limit reached"));
    }
    match &resolver.node(type_idx).kind {
        TypeKind::Alias(inner) => encode_value(resolver, *inner, value, stream, path, depth + 1),
        TypeKind::Extension(inner) => encode_value(resolver, *inner, value, stream, path, depth + 1),
        TypeKind::Primitive(id) => {
            encode_primitive(*id, stream, value).context(LexSnafu { path: path.clone() })
        },
        TypeKind::Optional(inner) => {
            if value.is_null() {
                stream.write_byte(0);
                Ok(())
            }
            else {
                stream.write_byte(1);
                encode_value(resolver, *inner, value, stream, &path.with_optional(), depth + 1)
            }
        },
        TypeKind::Array(inner) => {
            let items = value.as_array().ok_or_else(|| shape_err(path, "expected a JSON array"))?;
            stream.write_var_u32(items.len() as u32);
            for (i, item) in items.iter().enumerate() {
                encode_value(resolver, *inner, item, stream, &path.with_index(i), depth + 1)?;
            }
            Ok(())
        },
        TypeKind::Struct(struct_idx) => {
            let obj = value.as_object().ok_or_else(|| shape_err(path, "expected a JSON object"))?;
            let def = resolver.struct_def(*struct_idx);
            let mut obj_iter = obj.iter();
            let mut next_entry = obj_iter.next();
            for (name, field_type) in &def.fields {
                let is_extension = matches!(resolver.node(*field_type).kind, TypeKind::Extension(_));
                match next_entry {
                    Some((key, v)) if key == name => {
                        encode_value(resolver, *field_type, v, stream, &path.with_field(name), depth + 1)?;
                        next_entry = obj_iter.next();
                    },
                    _ if is_extension => (), // omitted tail extension field
                    Some((key, _)) => {
                        return Err(shape_err(
                            &path.with_field(name),
                            format!(r#"expected field "{name}", found "{key}""#),
                        ))
                    },
                    None => {
                        return Err(shape_err(&path.with_field(name), format!(r#"missing field "{name}""#)))
                    },
                }
            }
            if let Some((key, _)) = next_entry {
                return Err(shape_err(path, format!(r#"unknown field "{key}""#)));
            }
            Ok(())
        },
        TypeKind::Variant(variant_idx) => {
            let items = value.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                shape_err(path, "expected a 2-element [type, value] variant array")
            })?;
            let tag = items[0]
                .as_str()
                .ok_or_else(|| shape_err(path, "variant tag must be a string"))?;
            let def = resolver.variant_def(*variant_idx);
            let member = def
                .types
                .iter()
                .position(|t| resolver.node(*t).name == tag)
                .ok_or_else(|| shape_err(path, format!(r#"type "{tag}" is not a member of this variant"#)))?;
            stream.write_var_u32(member as u32);
            encode_value(resolver, def.types[member], &items[1], stream, &path.with_variant(tag), depth + 1)
        },
    }
}

fn decode_value(
    resolver: &Resolver,
    type_idx: TypeIndex,
    stream: &mut ByteStream,
    events: &mut Vec<JsonEvent>,
    path: &Path,
    depth: usize,
) -> Result<(), AbiError> {
    if depth >= MAX_DEPTH {
        return Err(wire_err(path, "recursion limit reached"));
    }
    match &resolver.node(type_idx).kind {
        TypeKind::Alias(inner) => decode_value(resolver, *inner, stream, events, path, depth + 1),
        TypeKind::Extension(inner) => decode_value(resolver, *inner, stream, events, path, depth + 1),
        TypeKind::Primitive(id) => {
            let v = decode_primitive(*id, stream).context(WireSnafu { path: path.clone() })?;
            events.push(scalar_event(v));
            Ok(())
        },
        TypeKind::Optional(inner) => {
            let tag = stream.read_byte().map_err(stream_err).context(WireSnafu { path: path.clone() })?;
            match tag {
                0 => {
                    events.push(JsonEvent::Null);
                    Ok(())
                },
                1 => decode_value(resolver, *inner, stream, events, &path.with_optional(), depth + 1),
                other => Err(wire_err(path, format!("invalid optional presence tag: {other}"))),
            }
        },
        TypeKind::Array(inner) => {
            let count = stream.read_var_u32().map_err(stream_err).context(WireSnafu { path: path.clone() })?;
            events.push(JsonEvent::StartArray);
            for i in 0..count {
                decode_value(resolver, *inner, stream, events, &path.with_index(i as usize), depth + 1)?;
            }
            events.push(JsonEvent::EndArray);
            Ok(())
        },
        TypeKind::Struct(struct_idx) => {
            let def = resolver.struct_def(*struct_idx);
            events.push(JsonEvent::StartObject);
            for (name, field_type) in &def.fields {
                let is_extension = matches!(resolver.node(*field_type).kind, TypeKind::Extension(_));
                if is_extension && stream.is_at_end() {
                    break;
                }
                events.push(JsonEvent::Key(name.clone()));
                decode_value(resolver, *field_type, stream, events, &path.with_field(name), depth + 1)?;
            }
            events.push(JsonEvent::EndObject);
            Ok(())
        },
        TypeKind::Variant(variant_idx) => {
            let tag = stream.read_var_u32().map_err(stream_err).context(WireSnafu { path: path.clone() })?;
            let def = resolver.variant_def(*variant_idx);
            let member_type = *def
                .types
                .get(tag as usize)
                .ok_or_else(|| wire_err(path, format!("variant tag {tag} out of range")))?;
            let member_name = resolver.node(member_type).name.clone();
            events.push(JsonEvent::StartArray);
            events.push(JsonEvent::Str(member_name.clone()));
            decode_value(resolver, member_type, stream, events, &path.with_variant(&member_name), depth + 1)?;
            events.push(JsonEvent::EndArray);
            Ok(())
        },
    }
}

fn scalar_event(v: JsonValue) -> JsonEvent {
    match v {
        JsonValue::Bool(b) => JsonEvent::Bool(b),
        JsonValue::Number(n) => JsonEvent::Number(n),
        JsonValue::String(s) => JsonEvent::Str(s),
        JsonValue::Null => JsonEvent::Null,
        other => unreachable!("decode_primitive only ever returns bool/number/string/null, got {other}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::abi::definition::AbiDefinition;

    fn resolver_for(abi_json: &str) -> Resolver {
        let abi = AbiDefinition::from_str(abi_json).unwrap();
        Resolver::fill_contract(&abi).unwrap()
    }

    #[test]
    fn struct_roundtrip() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "transfer", "base": "", "fields": [
                    { "name": "from", "type": "name" },
                    { "name": "to", "type": "name" },
                    { "name": "quantity", "type": "asset" },
                    { "name": "memo", "type": "string" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("transfer", 0).unwrap();
        let value = json!({
            "from": "alice",
            "to": "bob",
            "quantity": "1.0000 EOS",
            "memo": "hi",
        });
        let bin = json_to_bin(&r, type_idx, &value).unwrap();
        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        let decoded = bin_to_json(&r, type_idx, &mut cursor).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn optional_field_present_and_absent() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "s", "base": "", "fields": [
                    { "name": "n", "type": "uint32?" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("s", 0).unwrap();

        let present = json!({"n": 7});
        let bin = json_to_bin(&r, type_idx, &present).unwrap();
        assert_eq!(bin.hex_data(), "0107000000");
        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), present);

        let absent = json!({"n": null});
        let bin = json_to_bin(&r, type_idx, &absent).unwrap();
        assert_eq!(bin.hex_data(), "00");
        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), absent);
    }

    #[test]
    fn struct_extension_omitted_on_decode_when_stream_is_exhausted() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "s", "base": "", "fields": [
                    { "name": "a", "type": "uint8" },
                    { "name": "b", "type": "uint8$" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("s", 0).unwrap();

        // encode with "b" omitted entirely
        let value = json!({"a": 7});
        let bin = json_to_bin(&r, type_idx, &value).unwrap();
        assert_eq!(bin.hex_data(), "07");

        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        let decoded = bin_to_json(&r, type_idx, &mut cursor).unwrap();
        assert_eq!(decoded, json!({"a": 7}));
    }

    #[test]
    fn struct_extension_included_on_decode_when_bytes_remain() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "s", "base": "", "fields": [
                    { "name": "a", "type": "uint8" },
                    { "name": "b", "type": "uint8$" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("s", 0).unwrap();

        let mut cursor = ByteStream::from_bytes(vec![0x01, 0x02]);
        let decoded = bin_to_json(&r, type_idx, &mut cursor).unwrap();
        assert_eq!(decoded, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn array_of_primitives() {
        let mut r = resolver_for(r#"{"version": "eosio::abi/1.2"}"#);
        let type_idx = r.get_type("uint8[]", 0).unwrap();
        let value = json!([1, 2, 3, 255]);
        let bin = json_to_bin(&r, type_idx, &value).unwrap();
        assert_eq!(bin.hex_data(), "04010203ff");
        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), value);
    }

    #[test]
    fn variant_roundtrip() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "variants": [
                { "name": "v", "types": ["uint8", "string"] }
            ]
        }"#);
        let type_idx = r.get_type("v", 0).unwrap();

        let value = json!(["string", "hi"]);
        let bin = json_to_bin(&r, type_idx, &value).unwrap();
        assert_eq!(bin.hex_data(), "01026869");
        let mut cursor = ByteStream::from_bytes(bin.into_bytes());
        assert_eq!(bin_to_json(&r, type_idx, &mut cursor).unwrap(), value);
    }

    #[test]
    fn out_of_order_field_is_a_shape_error() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "s", "base": "", "fields": [
                    { "name": "a", "type": "uint8" },
                    { "name": "b", "type": "uint8" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("s", 0).unwrap();
        let err = json_to_bin(&r, type_idx, &json!({"b": 2, "a": 1})).unwrap_err();
        assert!(matches!(err, AbiError::JsonShape { .. }));
    }

    #[test]
    fn unknown_field_is_a_shape_error() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "s", "base": "", "fields": [
                    { "name": "a", "type": "uint8" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("s", 0).unwrap();
        let err = json_to_bin(&r, type_idx, &json!({"a": 1, "z": 9})).unwrap_err();
        assert!(matches!(err, AbiError::JsonShape { .. }));
    }

    #[test]
    fn missing_required_field_is_a_shape_error() {
        let mut r = resolver_for(r#"{
            "version": "eosio::abi/1.2",
            "structs": [
                { "name": "s", "base": "", "fields": [
                    { "name": "a", "type": "uint8" }
                ]}
            ]
        }"#);
        let type_idx = r.get_type("s", 0).unwrap();
        let err = json_to_bin(&r, type_idx, &json!({})).unwrap_err();
        assert!(matches!(err, AbiError::JsonShape { .. }));
    }
}
