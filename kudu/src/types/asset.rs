use std::fmt;
use std::num::ParseIntError;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::name::Name;
use super::symbol::{InvalidSymbol, Symbol};

/// A subset of the teacher's dependency graph (`thiserror`, pulled in
/// transitively by this module and `crypto.rs` in the original) used here
/// directly, preserving the teacher's organic mix of `snafu` (most of the
/// codebase) and `thiserror` (this corner) rather than forcing uniformity.
#[derive(Error, Debug)]
pub enum InvalidAsset {
    #[error("missing space between amount and symbol in asset: \"{0}\"")]
    MissingSpace(String),

    #[error("missing decimal point in asset amount: \"{0}\"")]
    MissingDecimal(String),

    #[error("could not parse asset amount")]
    ParseAmount(#[from] ParseIntError),

    #[error("asset amount overflowed while parsing: \"{0}\"")]
    AmountOverflow(String),

    #[error("asset amount is out of the valid i64 range")]
    AmountOutOfRange,

    #[error("invalid symbol in asset")]
    InvalidSymbol(#[from] InvalidSymbol),
}

/// A 64-bit signed amount paired with a [`Symbol`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    pub const MAX_AMOUNT: i64 = (1 << 62) - 1;

    pub fn new(amount: i64, symbol: Symbol) -> Result<Self, InvalidAsset> {
        let a = Self { amount, symbol };
        a.check_valid()?;
        Ok(a)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn is_amount_within_range(&self) -> bool {
        -Self::MAX_AMOUNT <= self.amount && self.amount <= Self::MAX_AMOUNT
    }

    pub fn is_valid(&self) -> bool {
        self.is_amount_within_range()
    }

    pub fn check_valid(&self) -> Result<(), InvalidAsset> {
        if self.is_valid() { Ok(()) } else { Err(InvalidAsset::AmountOutOfRange) }
    }

    pub fn to_real(&self) -> f64 {
        self.amount as f64 / self.symbol.precision() as f64
    }

    pub fn from_str(s: &str) -> Result<Self, InvalidAsset> {
        let s = s.trim();
        let space = s.find(' ').ok_or_else(|| InvalidAsset::MissingSpace(s.to_owned()))?;
        let (amount_str, rest) = (&s[..space], s[space + 1..].trim());

        let (int_part, dec_part, decimals) = match amount_str.find('.') {
            Some(dot) => (&amount_str[..dot], &amount_str[dot + 1..], (amount_str.len() - dot - 1) as u8),
            None => (amount_str, "", 0),
        };

        let negative = int_part.starts_with('-');
        let digits: String = int_part.chars().filter(|c| c.is_ascii_digit()).chain(dec_part.chars()).collect();
        let magnitude: i64 = if digits.is_empty() { 0 } else { digits.parse()? };
        let amount = if negative { -magnitude } else { magnitude };

        let symbol = Symbol::from_str(&format!("{decimals},{rest}"))?;
        let asset = Self { amount, symbol };
        asset.check_valid()?;
        Ok(asset)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = self.symbol.decimals() as usize;
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();

        if decimals == 0 {
            write!(f, "{sign}{magnitude} {}", self.symbol.code())
        }
        else {
            let s = magnitude.to_string();
            let s = format!("{:0>width$}", s, width = decimals + 1);
            let (int_part, dec_part) = s.split_at(s.len() - decimals);
            write!(f, "{sign}{int_part}.{dec_part} {}", self.symbol.code())
        }
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

struct AssetVisitor;

impl<'de> Visitor<'de> for AssetVisitor {
    type Value = Asset;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, r#"a string of the form "<amount> <SYMBOL>""#)
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Asset, E> {
        Asset::from_str(s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Asset, D::Error> {
        deserializer.deserialize_str(AssetVisitor)
    }
}

/// The built-in `extended_asset{quantity: asset, contract: name}` struct
/// (spec.md §4.1 item 2), registered directly by the resolver rather than
/// synthesized from user ABI JSON.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedAsset {
    pub quantity: Asset,
    pub contract: Name,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        let a = Asset::from_str("1.0000 EOS").unwrap();
        assert_eq!(a.amount(), 10000);
        assert_eq!(a.symbol().decimals(), 4);
        assert_eq!(a.to_string(), "1.0000 EOS");
    }

    #[test]
    fn negative_and_zero_decimals() {
        let a = Asset::from_str("-5 WAX").unwrap();
        assert_eq!(a.amount(), -5);
        assert_eq!(a.to_string(), "-5 WAX");
    }

    #[test]
    fn invalid_assets() {
        let assets = [
            "1.0000EOS",  // missing space
            "EOS",        // missing amount
            "abc 1.0 EOS",
        ];
        for s in assets {
            assert!(Asset::from_str(s).is_err());
        }
    }
}
