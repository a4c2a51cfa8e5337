//! The primitive catalogue (spec.md §2 item 1, §4.4, §9).
//!
//! `PrimId` is the tagged enum the redesign in spec.md §9 calls for, replacing
//! the teacher's virtual-dispatch `abi_serializer`/free-function-overload
//! scheme (`antelope-core/src/types/antelopevalue.rs`,
//! `antelope/src/binaryserializable.rs`). Each `PrimId` is looked up against
//! the two free functions below instead of a vtable; the match arms compile
//! to the "static table" spec.md describes. `AntelopeType` is kept as a name
//! for continuity with the teacher's discriminant enum of the same name.

use bytemuck::{cast_ref, pod_read_unaligned};
use serde_json::{json, Value as JsonValue};
use snafu::Snafu;
use strum::{Display, EnumString, VariantNames};

use kudu_macros::with_location;

use crate::bytestream::ByteStream;
use crate::convert::{variant_to_float, variant_to_int, variant_to_uint};
use crate::types::asset::Asset;
use crate::types::crypto::{PrivateKey, PublicKey, Signature};
use crate::types::name::Name;
use crate::types::symbol::{Symbol, SymbolCode};
use crate::types::time::{BlockTimestamp, TimePoint, TimePointSec};

#[with_location]
#[derive(Debug, Snafu)]
pub enum LexError {
    #[snafu(display("{message}"))]
    Malformed { message: String },
}

#[with_location]
#[derive(Debug, Snafu)]
pub enum WireError {
    #[snafu(display("{message}"))]
    Truncated { message: String },
}

macro_rules! lex {
    ($($arg:tt)*) => {
        MalformedSnafu { message: format!($($arg)*) }.build()
    };
}

macro_rules! wire {
    ($($arg:tt)*) => {
        TruncatedSnafu { message: format!($($arg)*) }.build()
    };
}

/// One entry per primitive type named in spec.md §2 item 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumString, Display, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum PrimId {
    Bool,
    Int8, Int16, Int32, Int64,
    Uint8, Uint16, Uint32, Uint64,
    Int128, Uint128,
    #[strum(serialize = "varuint32")]
    VarUint32,
    #[strum(serialize = "varint32")]
    VarInt32,
    Float32, Float64,
    #[cfg(feature = "float128")]
    Float128,
    String,
    Bytes,
    Checksum160, Checksum256, Checksum512,
    Name,
    #[strum(serialize = "symbol_code")]
    SymbolCode,
    Symbol,
    Asset,
    #[strum(serialize = "time_point")]
    TimePoint,
    #[strum(serialize = "time_point_sec")]
    TimePointSec,
    #[strum(serialize = "block_timestamp")]
    BlockTimestamp,
    #[strum(serialize = "public_key")]
    PublicKey,
    #[strum(serialize = "private_key")]
    PrivateKey,
    Signature,
}

/// Alias kept for continuity with the teacher's `AntelopeType` name.
pub type AntelopeType = PrimId;

fn json_bool(v: &JsonValue) -> Result<bool, LexError> {
    match v {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::String(s) => match s.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(lex!("invalid boolean literal: {s}")),
        },
        other => Err(lex!("expected bool or string, got {other}")),
    }
}

fn json_str(v: &JsonValue) -> Result<&str, LexError> {
    v.as_str().ok_or_else(|| lex!("expected a string, got {v}"))
}

macro_rules! encode_signed {
    ($stream:expr, $v:expr, $t:ty) => {{
        let n: $t = match $v {
            JsonValue::Bool(b) => *b as $t,
            JsonValue::Number(_) | JsonValue::String(_) => variant_to_int::<$t>($v).map_err(|e| lex!("{e}"))?,
            other => return Err(lex!("expected number, string or bool, got {other}")),
        };
        $stream.write_bytes(cast_ref::<$t, [u8; std::mem::size_of::<$t>()]>(&n));
    }};
}

macro_rules! encode_unsigned {
    ($stream:expr, $v:expr, $t:ty) => {{
        let n: $t = match $v {
            JsonValue::Bool(b) => *b as $t,
            JsonValue::Number(_) | JsonValue::String(_) => variant_to_uint::<$t>($v).map_err(|e| lex!("{e}"))?,
            other => return Err(lex!("expected number, string or bool, got {other}")),
        };
        $stream.write_bytes(cast_ref::<$t, [u8; std::mem::size_of::<$t>()]>(&n));
    }};
}

macro_rules! decode_int {
    ($stream:expr, $t:ty) => {{
        let n_bytes = std::mem::size_of::<$t>();
        let bytes = $stream.read_bytes(n_bytes).map_err(|e| wire!("{e}"))?;
        let n: $t = pod_read_unaligned(bytes);
        json!(n.to_string())
    }};
}

/// Encode a JSON scalar event (`Null`/`Bool`/`Str` only — arrays, optionals,
/// structs and variants are handled by `abi::engine`) for the given
/// primitive type.
pub fn encode_primitive(id: PrimId, stream: &mut ByteStream, value: &JsonValue) -> Result<(), LexError> {
    use PrimId::*;
    match id {
        Bool => stream.write_byte(json_bool(value)? as u8),
        Int8 => encode_signed!(stream, value, i8),
        Int16 => encode_signed!(stream, value, i16),
        Int32 => encode_signed!(stream, value, i32),
        Int64 => encode_signed!(stream, value, i64),
        Uint8 => encode_unsigned!(stream, value, u8),
        Uint16 => encode_unsigned!(stream, value, u16),
        Uint32 => encode_unsigned!(stream, value, u32),
        Uint64 => encode_unsigned!(stream, value, u64),
        Int128 => encode_signed!(stream, value, i128),
        Uint128 => encode_unsigned!(stream, value, u128),
        VarUint32 => {
            let n: u32 = variant_to_uint(value).map_err(|e| lex!("{e}"))?;
            stream.write_var_u32(n);
        },
        VarInt32 => {
            let n: i32 = variant_to_int(value).map_err(|e| lex!("{e}"))?;
            stream.write_var_i32(n);
        },
        Float32 => {
            let n: f32 = match value {
                JsonValue::Bool(b) => *b as u8 as f32,
                _ => variant_to_float(value).map_err(|e| lex!("{e}"))?,
            };
            stream.write_bytes(cast_ref::<f32, [u8; 4]>(&n));
        },
        Float64 => {
            let n: f64 = match value {
                JsonValue::Bool(b) => *b as u8 as f64,
                _ => variant_to_float(value).map_err(|e| lex!("{e}"))?,
            };
            stream.write_bytes(cast_ref::<f64, [u8; 8]>(&n));
        },
        #[cfg(feature = "float128")]
        Float128 => {
            let bytes = crate::convert::variant_to_f128(value).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&bytes);
        },
        String => {
            let s = json_str(value)?;
            stream.write_var_u32(s.len() as u32);
            stream.write_bytes(s.as_bytes());
        },
        Bytes => {
            let bytes = hex::decode(json_str(value)?).map_err(|e| lex!("invalid hex in bytes: {e}"))?;
            stream.write_var_u32(bytes.len() as u32);
            stream.write_bytes(&bytes);
        },
        Checksum160 => encode_checksum(stream, value, 20)?,
        Checksum256 => encode_checksum(stream, value, 32)?,
        Checksum512 => encode_checksum(stream, value, 64)?,
        Name => {
            let n = Name::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&n.as_u64().to_le_bytes());
        },
        SymbolCode => {
            let s = SymbolCode::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&s.as_u64().to_le_bytes());
        },
        Symbol => {
            let s = Symbol::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&s.as_u64().to_le_bytes());
        },
        Asset => {
            let a = Asset::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&a.amount().to_le_bytes());
            stream.write_bytes(&a.symbol().as_u64().to_le_bytes());
        },
        TimePoint => {
            let t = TimePoint::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&t.as_u64().to_le_bytes());
        },
        TimePointSec => {
            let t = TimePointSec::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&t.as_u32().to_le_bytes());
        },
        BlockTimestamp => {
            let t = BlockTimestamp::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?;
            stream.write_bytes(&t.as_u32().to_le_bytes());
        },
        PublicKey => PublicKey::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?.to_bin(stream),
        PrivateKey => PrivateKey::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?.to_bin(stream),
        Signature => Signature::from_str(json_str(value)?).map_err(|e| lex!("{e}"))?.to_bin(stream),
    }
    Ok(())
}

fn encode_checksum(stream: &mut ByteStream, value: &JsonValue, size: usize) -> Result<(), LexError> {
    let s = json_str(value)?;
    let bytes = hex::decode(s).map_err(|e| lex!("invalid hex in checksum: {e}"))?;
    if bytes.len() != size {
        return Err(lex!("checksum{} must be exactly {size} bytes, got {}", size * 8, bytes.len()));
    }
    stream.write_bytes(&bytes);
    Ok(())
}

fn decode_checksum(stream: &mut ByteStream, size: usize) -> Result<JsonValue, WireError> {
    let bytes = stream.read_bytes(size).map_err(|e| wire!("{e}"))?;
    Ok(json!(hex::encode(bytes)))
}

/// Decode one primitive value from the byte cursor into its JSON representation.
pub fn decode_primitive(id: PrimId, stream: &mut ByteStream) -> Result<JsonValue, WireError> {
    use PrimId::*;
    Ok(match id {
        Bool => {
            let b = stream.read_byte().map_err(|e| wire!("{e}"))?;
            match b {
                0 => json!(false),
                1 => json!(true),
                other => return Err(wire!("invalid bool tag byte: {other}")),
            }
        },
        // 8/16/32-bit ints cross as JSON numbers; only 64/128-bit values
        // cross as strings, to preserve precision past the 53-bit mantissa
        // a JSON number safely round-trips through.
        Int8 => json!(stream.read_byte().map_err(|e| wire!("{e}"))? as i8),
        Uint8 => json!(stream.read_byte().map_err(|e| wire!("{e}"))?),
        Int16 => {
            let bytes = stream.read_bytes(2).map_err(|e| wire!("{e}"))?;
            json!(pod_read_unaligned::<i16>(bytes))
        },
        Uint16 => {
            let bytes = stream.read_bytes(2).map_err(|e| wire!("{e}"))?;
            json!(pod_read_unaligned::<u16>(bytes))
        },
        Int32 => {
            let bytes = stream.read_bytes(4).map_err(|e| wire!("{e}"))?;
            json!(pod_read_unaligned::<i32>(bytes))
        },
        Uint32 => {
            let bytes = stream.read_bytes(4).map_err(|e| wire!("{e}"))?;
            json!(pod_read_unaligned::<u32>(bytes))
        },
        Int64 => decode_int!(stream, i64),
        Uint64 => decode_int!(stream, u64),
        Int128 => decode_int!(stream, i128),
        Uint128 => decode_int!(stream, u128),
        VarUint32 => json!(stream.read_var_u32().map_err(|e| wire!("{e}"))?),
        VarInt32 => json!(stream.read_var_i32().map_err(|e| wire!("{e}"))?),
        Float32 => {
            let bytes = stream.read_bytes(4).map_err(|e| wire!("{e}"))?;
            json!(pod_read_unaligned::<f32>(bytes))
        },
        Float64 => {
            let bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            json!(pod_read_unaligned::<f64>(bytes))
        },
        #[cfg(feature = "float128")]
        Float128 => {
            let bytes = stream.read_bytes(16).map_err(|e| wire!("{e}"))?;
            json!(hex::encode(bytes))
        },
        String => {
            let len = stream.read_var_u32().map_err(|e| wire!("{e}"))? as usize;
            let bytes = stream.read_bytes(len).map_err(|e| wire!("{e}"))?;
            let s = std::str::from_utf8(bytes).map_err(|e| wire!("invalid utf8 in string: {e}"))?;
            json!(s)
        },
        Bytes => {
            let len = stream.read_var_u32().map_err(|e| wire!("{e}"))? as usize;
            let bytes = stream.read_bytes(len).map_err(|e| wire!("{e}"))?;
            json!(hex::encode(bytes))
        },
        Checksum160 => decode_checksum(stream, 20)?,
        Checksum256 => decode_checksum(stream, 32)?,
        Checksum512 => decode_checksum(stream, 64)?,
        Name => {
            let bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            let n = Name::from_u64(pod_read_unaligned(bytes));
            json!(n.to_string())
        },
        SymbolCode => {
            let bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            let s = SymbolCode::from_u64(pod_read_unaligned(bytes));
            json!(s.to_string())
        },
        Symbol => {
            let bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            let s = Symbol::from_u64(pod_read_unaligned(bytes));
            json!(s.to_string())
        },
        Asset => {
            let amount_bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            let amount: i64 = pod_read_unaligned(amount_bytes);
            let sym_bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            let symbol = Symbol::from_u64(pod_read_unaligned(sym_bytes));
            let asset = Asset::new(amount, symbol).map_err(|e| wire!("{e}"))?;
            json!(asset.to_string())
        },
        TimePoint => {
            let bytes = stream.read_bytes(8).map_err(|e| wire!("{e}"))?;
            json!(TimePoint(pod_read_unaligned(bytes)).to_string())
        },
        TimePointSec => {
            let bytes = stream.read_bytes(4).map_err(|e| wire!("{e}"))?;
            json!(TimePointSec(pod_read_unaligned(bytes)).to_string())
        },
        BlockTimestamp => {
            let bytes = stream.read_bytes(4).map_err(|e| wire!("{e}"))?;
            json!(BlockTimestamp(pod_read_unaligned(bytes)).to_string())
        },
        PublicKey => json!(PublicKey::from_bin(stream).map_err(|e| wire!("{e}"))?.to_string()),
        PrivateKey => json!(PrivateKey::from_bin(stream).map_err(|e| wire!("{e}"))?.to_string()),
        Signature => json!(Signature::from_bin(stream).map_err(|e| wire!("{e}"))?.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(id: PrimId, json_in: JsonValue, expected_hex: &str) {
        let mut s = ByteStream::new();
        encode_primitive(id, &mut s, &json_in).unwrap();
        assert_eq!(s.hex_data(), expected_hex);

        let mut r = ByteStream::from_bytes(s.into_bytes());
        let decoded = decode_primitive(id, &mut r).unwrap();
        assert_eq!(decoded, json_in);
    }

    #[test]
    fn uint8_array_element() {
        roundtrip(PrimId::Uint8, json!(255), "ff");
    }

    #[test]
    fn small_ints_decode_as_json_numbers_not_strings() {
        let mut s = ByteStream::from_bytes(vec![0xff]);
        let decoded = decode_primitive(PrimId::Uint8, &mut s).unwrap();
        assert_eq!(decoded, json!(255));
        assert!(decoded.is_number(), "expected a JSON number, got {decoded:?}");
    }

    #[test]
    fn sixty_four_bit_ints_still_decode_as_strings() {
        let mut s = ByteStream::new();
        encode_primitive(PrimId::Uint64, &mut s, &json!("18446744073709551615")).unwrap();
        let mut r = ByteStream::from_bytes(s.into_bytes());
        let decoded = decode_primitive(PrimId::Uint64, &mut r).unwrap();
        assert_eq!(decoded, json!("18446744073709551615"));
        assert!(decoded.is_string(), "expected a JSON string, got {decoded:?}");
    }

    #[test]
    fn name_vector() {
        roundtrip(PrimId::Name, json!("eosio.token"), "00a6823403ea3055");
    }

    #[test]
    fn asset_vector() {
        let mut s = ByteStream::new();
        encode_primitive(PrimId::Asset, &mut s, &json!("1.0000 EOS")).unwrap();
        assert_eq!(s.hex_data(), "102700000000000004454f5300000000");

        let mut r = ByteStream::from_bytes(s.into_bytes());
        let decoded = decode_primitive(PrimId::Asset, &mut r).unwrap();
        assert_eq!(decoded, json!("1.0000 EOS"));
    }

    #[test]
    fn varuint32() {
        let mut s = ByteStream::new();
        encode_primitive(PrimId::VarUint32, &mut s, &json!(300)).unwrap();
        let mut r = ByteStream::from_bytes(s.into_bytes());
        assert_eq!(decode_primitive(PrimId::VarUint32, &mut r).unwrap(), json!(300));
    }

    #[test]
    fn bool_from_json_bool() {
        let mut s = ByteStream::new();
        encode_primitive(PrimId::Bool, &mut s, &json!(true)).unwrap();
        assert_eq!(s.hex_data(), "01");
    }
}
