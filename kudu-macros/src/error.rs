use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::visit_mut::{self, VisitMut};
use syn::{
    parenthesized, Attribute, Fields, FieldsNamed, ItemEnum, LitStr, Meta, Variant, Field,
};

fn location_as_fields_named() -> FieldsNamed {
    syn::parse_str("{ #[snafu(implicit)] location: snafu::Location }").unwrap()
}

pub fn location_field() -> Field {
    let fs: FieldsNamed = location_as_fields_named();
    fs.named[0].clone()
}

// -----------------------------------------------------------------------------
//     Visitor adding a `location` field to every variant of an error enum
// -----------------------------------------------------------------------------

struct AddLocationField;

impl VisitMut for AddLocationField {
    fn visit_variant_mut(&mut self, node: &mut Variant) {
        match &mut node.fields {
            Fields::Named(ref mut fields) => {
                fields.named.push(location_field());
            },
            Fields::Unit => {
                node.fields = Fields::Named(location_as_fields_named());
            },
            Fields::Unnamed(_) => {
                panic!("variant '{}' uses unnamed fields, `with_location` only supports \
                        unit or named-field variants", node.ident);
            },
        }

        visit_mut::visit_variant_mut(self, node);
    }
}

// -----------------------------------------------------------------------------
//     Visitor for adding the location an error was constructed to the display
//     string associated with a given variant
// -----------------------------------------------------------------------------

struct AddLocationToDisplay;

impl VisitMut for AddLocationToDisplay {
    fn visit_attribute_mut(&mut self, node: &mut Attribute) {
        if node.path().is_ident("snafu") {
            let mut disp_str: Option<String> = None;

            let _ = node.parse_nested_meta(|meta| {
                if meta.path.is_ident("display") {
                    let content;
                    parenthesized!(content in meta.input);
                    let lit: LitStr = content.parse()?;
                    disp_str = Some(lit.value());
                    Ok(())
                }
                else {
                    Ok(())
                }
            });

            if let Some(disp) = disp_str {
                let new_disp = format!(r#"{disp} (at: {{location}})"#);
                let new_display_attr = format!(r##"display(r#"{new_disp}"#)"##);

                if let Meta::List(ref mut snafu_display) = node.meta {
                    let new_tokens: TokenStream2 = new_display_attr.parse().unwrap();
                    snafu_display.tokens = new_tokens;
                }
            }
        }

        visit_mut::visit_attribute_mut(self, node);
    }
}

pub fn add_location_to_error_enum(mut error_enum: ItemEnum) -> TokenStream2 {
    AddLocationField.visit_item_enum_mut(&mut error_enum);
    AddLocationToDisplay.visit_item_enum_mut(&mut error_enum);

    quote! { #error_enum }
}
