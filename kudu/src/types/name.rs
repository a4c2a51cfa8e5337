use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ensure, Snafu};

use kudu_macros::with_location;

#[with_location]
#[derive(Debug, Snafu)]
pub enum InvalidName {
    #[snafu(display(r#"name "{name}" is too long, names can be at most 13 characters"#))]
    TooLong { name: String },

    #[snafu(display(r#"name "{given}" is not normalized, normalized form is "{normalized}""#))]
    InvalidNormalization { given: String, normalized: String },
}

const CHARMAP: &[u8] = b".12345abcdefghijklmnopqrstuvwxyz";

/// A 64-bit packed identifier: account, action, table, scope and permission
/// names are all instances of this type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name {
    value: u64,
}

impl Name {
    pub fn from_str(s: &str) -> Result<Self, InvalidName> {
        ensure!(s.len() <= 13, TooLongSnafu { name: s });

        let value = string_to_u64(s);
        let normalized = u64_to_string(value);
        ensure!(normalized == s, InvalidNormalizationSnafu { given: s, normalized });

        Ok(Self { value })
    }

    pub const fn from_u64(value: u64) -> Self {
        Self { value }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    /// The "prefix" of a scoped name, e.g. the contract part of `eosio.token::transfer`.
    pub fn prefix(&self) -> Name {
        let s = u64_to_string(self.value);
        let prefix = s.rsplitn(2, '.').last().unwrap_or(&s);
        Name::from_str(prefix).unwrap_or(*self)
    }
}

impl TryFrom<&str> for Name {
    type Error = InvalidName;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Name::from_str(s)
    }
}

impl From<u64> for Name {
    fn from(value: u64) -> Self {
        Name::from_u64(value)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u64_to_string(self.value))
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

struct NameVisitor;

impl<'de> Visitor<'de> for NameVisitor {
    type Value = Name;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a string that is a valid Antelope name")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Name, E> {
        Name::from_str(s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Name, D::Error> {
        deserializer.deserialize_str(NameVisitor)
    }
}

fn char_to_symbol(c: u8) -> u64 {
    if c.is_ascii_lowercase() && c <= b'z' && c >= b'a' {
        ((c - b'a') + 6) as u64
    }
    else if c >= b'1' && c <= b'5' {
        ((c - b'1') + 1) as u64
    }
    else {
        0
    }
}

fn string_to_u64(s: &str) -> u64 {
    let mut value: u64 = 0;
    let bytes = s.as_bytes();

    for i in 0..=12 {
        let c = if i < bytes.len() { char_to_symbol(bytes[i]) } else { 0 };
        if i < 12 {
            value |= (c & 0x1F) << (64 - 5 * (i + 1));
        }
        else {
            value |= c & 0x0F;
        }
    }

    value
}

fn u64_to_bytes(value: u64) -> [u8; 13] {
    let mut result = [0_u8; 13];
    let mut tmp = value;

    for i in 0..=12 {
        let idx = if i == 0 { tmp & 0x0F } else { tmp & 0x1F };
        result[12 - i] = CHARMAP[idx as usize];
        tmp >>= if i == 0 { 4 } else { 5 };
    }

    result
}

fn u64_to_string(value: u64) -> String {
    let bytes = u64_to_bytes(value);
    let s = String::from_utf8(bytes.to_vec()).expect("charmap is ASCII");
    s.trim_end_matches('.').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_names() {
        for s in ["eosio", "eosio.token", "a", "12345", "test.123"] {
            let n = Name::from_str(s).unwrap();
            assert_eq!(n.to_string(), s);
        }
    }

    #[test]
    fn known_encoding() {
        let n = Name::from_str("eosio.token").unwrap();
        assert_eq!(n.as_u64(), 0x5530_EA03_3482_A600);
    }

    #[test]
    fn invalid_names() {
        assert!(matches!(Name::from_str("abcdefghijklmnop"), Err(InvalidName::TooLong { .. })));
        assert!(matches!(Name::from_str("A"), Err(InvalidName::InvalidNormalization { .. })));
        assert!(matches!(Name::from_str("6"), Err(InvalidName::InvalidNormalization { .. })));
        assert!(Name::from_str("").is_ok());
    }

    #[test]
    fn prefix() {
        let n = Name::from_str("eosio.token").unwrap();
        assert_eq!(n.prefix().to_string(), "eosio");

        let plain = Name::from_str("eosio").unwrap();
        assert_eq!(plain.prefix().to_string(), "eosio");
    }

    #[test]
    fn basic_functionality() {
        let n = Name::from_str("eosio.token").unwrap();
        let j = serde_json::to_string(&n).unwrap();
        assert_eq!(j, r#""eosio.token""#);
        let n2: Name = serde_json::from_str(&j).unwrap();
        assert_eq!(n, n2);
    }
}
