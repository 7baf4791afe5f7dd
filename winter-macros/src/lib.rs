//! Derive macros for the `winter` crate. Use them through the re-exports in
//! `winter` rather than depending on this crate directly.

mod bind_object;

use proc_macro::TokenStream;
use proc_macro_crate::crate_name;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::bind_object::impl_bind_object_for_struct;

/// Implements `winter::form::BindObject` for a struct with named fields.
///
/// Every field is bound from the raw field `prefix.field_name` with its
/// `ScalarValue` implementation. Field options, given in a `#[bind(...)]`
/// attribute:
///
/// * `required`: a missing value is an error,
/// * `email` or `numeric`: the raw value is checked against the constraint,
/// * `rename = "name"`: the raw field has another name,
/// * `nested`: the field is itself a `BindObject`, bound from
///   `prefix.field_name.*`,
/// * `skip`: the field is not bound and gets its `Default` value.
#[proc_macro_derive(BindObject, attributes(bind))]
pub fn derive_bind_object(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let token_stream = impl_bind_object_for_struct(&ast);
    token_stream.into()
}

pub(crate) fn winter_ident() -> proc_macro2::TokenStream {
    let winter_crate = crate_name("winter").expect("winter is not present in `Cargo.toml`");
    match winter_crate {
        proc_macro_crate::FoundCrate::Itself => {
            quote! { ::winter }
        }
        proc_macro_crate::FoundCrate::Name(name) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            quote! { ::#ident }
        }
    }
}
