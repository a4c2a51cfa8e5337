//! The error kinds spec.md §7 distinguishes, unified into one enum so that
//! callers of [`crate::abi::resolver::Resolver::get_type`]/
//! [`crate::json_to_bin`]/[`crate::bin_to_json`] have a single `Result` to
//! handle. Grounded on `kudu/src/abi/error.rs`'s `ABIError`, generalized
//! with a `path` field (spec.md §7: "every error carries the structural
//! path at which it occurred").

use snafu::Snafu;

use kudu_macros::with_location;

use crate::abi::path::Path;
use crate::types::value::{LexError, WireError};

#[with_location]
#[derive(Debug, Snafu)]
pub enum AbiError {
    /// The ABI document itself is ill-formed: an undefined type reference,
    /// a duplicate definition, a recursive alias, a frame-depth overrun.
    #[snafu(display("schema error at {path}: {message}"))]
    Schema { path: Path, message: String },

    /// The JSON value tree doesn't match the shape the resolved type
    /// requires: wrong container kind, missing field, malformed variant tag.
    #[snafu(display("shape error at {path}: {message}"))]
    JsonShape { path: Path, message: String },

    /// A scalar's textual representation could not be lexed into its
    /// primitive type (bad hex, bad decimal, bad date).
    #[snafu(display("lex error at {path}: {source}"))]
    Lex { path: Path, source: LexError },

    /// The binary cursor ran out of bytes, or carried an invalid tag
    /// (bool discriminant, variant index) for the type being decoded.
    #[snafu(display("wire error at {path}: {source}"))]
    Wire { path: Path, source: WireError },
}

impl AbiError {
    pub fn path(&self) -> &Path {
        match self {
            AbiError::Schema { path, .. }
            | AbiError::JsonShape { path, .. }
            | AbiError::Lex { path, .. }
            | AbiError::Wire { path, .. } => path,
        }
    }
}
