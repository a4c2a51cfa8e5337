use std::fmt;
use std::num::ParseIntError;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ensure, ResultExt};

use kudu_macros::with_location;

#[with_location]
#[derive(Debug, snafu::Snafu)]
pub enum InvalidSymbol {
    #[snafu(display("creating symbol from empty string"))]
    Empty,

    #[snafu(display(r#"symbol code longer than 7 characters: "{name}""#))]
    TooLong { name: String },

    #[snafu(display("missing comma in symbol"))]
    MissingComma,

    #[snafu(display(r#"invalid char '{c}' in symbol code "{code}""#))]
    InvalidChar { code: String, c: char },

    #[snafu(display("could not parse precision for symbol"))]
    ParsePrecisionError { source: ParseIntError },

    #[snafu(display("given precision {given} should be <= max precision {max}"))]
    InvalidPrecision { given: u8, max: u8 },
}

/// Precision (low byte) plus up to 7 uppercase-letter ticker bytes.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct Symbol {
    value: u64,
}

impl Symbol {
    pub const MAX_PRECISION: u8 = 18;

    fn from_prec_and_code(precision: u8, code: &str) -> Result<Self, InvalidSymbol> {
        Ok(Self { value: string_to_symbol(precision, code.as_bytes())? })
    }

    pub fn from_str(s: &str) -> Result<Self, InvalidSymbol> {
        let s = s.trim();
        ensure!(!s.is_empty(), EmptySnafu);
        let pos = s.find(',').ok_or(InvalidSymbol::MissingComma)?;
        let precision: u8 = s[..pos].parse().context(ParsePrecisionSnafu)?;
        ensure!(precision <= Self::MAX_PRECISION, InvalidPrecisionSnafu { given: precision, max: Self::MAX_PRECISION });
        Self::from_prec_and_code(precision, &s[pos + 1..])
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn from_u64(value: u64) -> Self {
        Self { value }
    }

    pub fn decimals(&self) -> u8 {
        (self.value & 0xFF) as u8
    }

    pub fn precision(&self) -> i64 {
        10_i64.pow(self.decimals() as u32)
    }

    pub fn code(&self) -> SymbolCode {
        SymbolCode::from_u64(self.value >> 8)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.decimals(), self.code())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

struct SymbolVisitor;

impl<'de> Visitor<'de> for SymbolVisitor {
    type Value = Symbol;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, r#"a string of the form "PRECISION,CODE""#)
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Symbol, E> {
        Symbol::from_str(s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Symbol, D::Error> {
        deserializer.deserialize_str(SymbolVisitor)
    }
}

/// The 1-7 uppercase-letter ticker of a [`Symbol`], without its precision.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct SymbolCode {
    value: u64,
}

impl SymbolCode {
    pub fn from_str(s: &str) -> Result<Self, InvalidSymbol> {
        Ok(Self { value: string_to_symbol_code(s.as_bytes())? })
    }

    pub fn from_u64(value: u64) -> Self {
        Self { value }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", symbol_code_to_string(self.value))
    }
}

// see ref implementation in AntelopeIO/leap/libraries/chain/symbol.{hpp,cpp}
pub fn string_to_symbol_code(s: &[u8]) -> Result<u64, InvalidSymbol> {
    let mut result: u64 = 0;
    ensure!(!s.is_empty(), EmptySnafu);

    let name = String::from_utf8_lossy(s).into_owned();
    ensure!(s.len() <= 7, TooLongSnafu { name });

    for (i, &c) in s.iter().enumerate() {
        ensure!(c.is_ascii_uppercase(), InvalidCharSnafu { code: name.clone(), c: c as char });
        result |= (c as u64) << (8 * i);
    }
    Ok(result)
}

fn string_to_symbol(precision: u8, s: &[u8]) -> Result<u64, InvalidSymbol> {
    Ok(string_to_symbol_code(s)? << 8 | (precision as u64))
}

pub fn symbol_code_to_string(value: u64) -> String {
    let mut v = value;
    let mut result = String::new();
    while v != 0 {
        result.push((v & 0xFF) as u8 as char);
        v >>= 8;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_symbols() {
        let s = Symbol::from_str("4,EOS").unwrap();
        assert_eq!(s.decimals(), 4);
        assert_eq!(s.code().to_string(), "EOS");
        assert_eq!(s.to_string(), "4,EOS");
    }

    #[test]
    fn invalid_symbols() {
        let symbols = [
            "0,WAXXXXXX",
            "0,",
            "0, ",
            ",",
            "19,WAX",
            "-1,WAX",
        ];
        for s in symbols {
            assert!(Symbol::from_str(s).is_err());
        }
    }

    #[test]
    fn known_encoding() {
        // matches the "1.0000 EOS" test vector in spec.md §8: symbol bytes
        // are `04 45 4F 53 00 00 00 00` little-endian.
        let s = Symbol::from_str("4,EOS").unwrap();
        assert_eq!(s.as_u64(), 0x534F_4504);
    }
}
