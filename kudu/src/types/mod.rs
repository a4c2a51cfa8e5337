//! Concrete Antelope value types: each owns its text <-> binary conversion
//! and, where it appears as a struct field elsewhere (`serde`), its JSON
//! mapping. `value` ties them together behind the `PrimId` dispatch table
//! the ABI engine drives.

pub mod asset;
pub mod crypto;
pub mod name;
pub mod symbol;
pub mod time;
pub mod value;

pub use asset::{Asset, ExtendedAsset, InvalidAsset};
pub use crypto::{InvalidCryptoData, KeyType, PrivateKey, PublicKey, Signature};
pub use name::{InvalidName, Name};
pub use symbol::{InvalidSymbol, Symbol, SymbolCode};
pub use time::{BlockTimestamp, InvalidTime, TimePoint, TimePointSec};
pub use value::{decode_primitive, encode_primitive, AntelopeType, LexError, PrimId, WireError};
