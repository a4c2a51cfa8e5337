//! ABI-driven JSON<->binary codec for Antelope (EOSIO-family) blockchains.
//!
//! Parse a contract's [`abi::AbiDefinition`], resolve it into a type graph
//! with [`abi::Contract::build`], then encode/decode action data, table
//! rows, or arbitrary named types against it with [`abi::Contract`]'s
//! methods (or the free functions [`abi::json_to_bin`]/[`abi::bin_to_json`]
//! directly, against a [`abi::resolver::Resolver`] you built yourself).

pub mod abi;
pub mod bytestream;
pub mod config;
pub mod convert;
pub mod json;
pub mod typename;
pub mod types;

pub use abi::{AbiDefinition, AbiError, Contract};
pub use bytestream::ByteStream;
pub use types::{AntelopeType, PrimId};
