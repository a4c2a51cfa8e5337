use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemEnum};

mod error;

use error::add_location_to_error_enum;

/// Attribute macro adding a `location: snafu::Location` field to every variant of an
/// error enum, and appending `" (at: {location})"` to every `#[snafu(display(...))]`
/// string on those variants.
///
/// A no-op unless the `detailed-error` feature is enabled, so that release builds
/// don't pay for capturing file/line information on every error construction.
#[proc_macro_attribute]
pub fn with_location(_attr: TokenStream, item: TokenStream) -> TokenStream {
    if cfg!(feature = "detailed-error") {
        let error_enum = parse_macro_input!(item as ItemEnum);
        add_location_to_error_enum(error_enum).into()
    }
    else {
        item
    }
}
