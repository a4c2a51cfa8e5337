//! A flat SAX-style event stream standing in for a true streaming JSON
//! lexer (spec.md §2 item 4): since this crate parses JSON into a
//! [`serde_json::Value`] tree upfront rather than tokenizing from bytes, the
//! decode side of the engine produces its output as a sequence of
//! [`JsonEvent`]s and only assembles the tree at the very end
//! ([`value_of`]). This keeps the engine's output path decoupled from
//! `serde_json::Value` construction, the way a real streaming writer would
//! be, without this crate needing one.
//!
//! `Number` carries 8/16/32-bit ints, `varuint32`/`varint32`, and floats
//! (spec.md §4.3); 64-bit and 128-bit values still cross as `Str`, since
//! they can exceed the 53-bit mantissa a `serde_json::Number` safely
//! round-trips through `f64`.

use serde_json::{Map, Number as JsonNumber, Value as JsonValue};

#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    Null,
    Bool(bool),
    Number(JsonNumber),
    Str(String),
    StartObject,
    Key(String),
    EndObject,
    StartArray,
    EndArray,
}

/// Flatten a JSON value tree into its event sequence, depth-first and
/// iteratively — a pathologically deep input JSON document can't blow the
/// host stack just by being handed to this function.
pub fn events_of(value: &JsonValue) -> Vec<JsonEvent> {
    enum Work<'a> {
        Value(&'a JsonValue),
        Emit(JsonEvent),
    }

    let mut events = vec![];
    let mut stack = vec![Work::Value(value)];
    while let Some(item) = stack.pop() {
        match item {
            Work::Emit(e) => events.push(e),
            Work::Value(JsonValue::Null) => events.push(JsonEvent::Null),
            Work::Value(JsonValue::Bool(b)) => events.push(JsonEvent::Bool(*b)),
            Work::Value(JsonValue::Number(n)) => events.push(JsonEvent::Number(n.clone())),
            Work::Value(JsonValue::String(s)) => events.push(JsonEvent::Str(s.clone())),
            Work::Value(JsonValue::Array(items)) => {
                events.push(JsonEvent::StartArray);
                stack.push(Work::Emit(JsonEvent::EndArray));
                for item in items.iter().rev() {
                    stack.push(Work::Value(item));
                }
            },
            Work::Value(JsonValue::Object(map)) => {
                events.push(JsonEvent::StartObject);
                stack.push(Work::Emit(JsonEvent::EndObject));
                for (k, v) in map.iter().rev() {
                    stack.push(Work::Emit(JsonEvent::Key(k.clone())));
                    stack.push(Work::Value(v));
                }
            },
        }
    }
    events
}

/// Materialize an event sequence produced by [`crate::abi::engine::bin_to_json`]
/// back into a `serde_json::Value` tree.
pub fn value_of(events: &[JsonEvent]) -> JsonValue {
    let mut pos = 0;
    let v = build_value(events, &mut pos);
    debug_assert_eq!(pos, events.len(), "value_of must consume every event exactly once");
    v
}

fn build_value(events: &[JsonEvent], pos: &mut usize) -> JsonValue {
    let event = &events[*pos];
    *pos += 1;
    match event {
        JsonEvent::Null => JsonValue::Null,
        JsonEvent::Bool(b) => JsonValue::Bool(*b),
        JsonEvent::Number(n) => JsonValue::Number(n.clone()),
        JsonEvent::Str(s) => JsonValue::String(s.clone()),
        JsonEvent::StartArray => {
            let mut items = vec![];
            while events[*pos] != JsonEvent::EndArray {
                items.push(build_value(events, pos));
            }
            *pos += 1;
            JsonValue::Array(items)
        },
        JsonEvent::StartObject => {
            let mut map = Map::new();
            while events[*pos] != JsonEvent::EndObject {
                let key = match &events[*pos] {
                    JsonEvent::Key(k) => k.clone(),
                    other => unreachable!("object body must alternate Key/value events, found {other:?}"),
                };
                *pos += 1;
                map.insert(key, build_value(events, pos));
            }
            *pos += 1;
            JsonValue::Object(map)
        },
        other => unreachable!("unexpected top-level event {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrips_a_nested_value() {
        let v = json!({"a": [1, "2", null], "b": {"c": true}});
        let events = events_of(&v);
        assert_eq!(value_of(&events), v);
    }

    #[test]
    fn empty_containers_roundtrip() {
        let v = json!({"xs": [], "obj": {}});
        assert_eq!(value_of(&events_of(&v)), v);
    }
}
