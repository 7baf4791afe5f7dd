use darling::util::Flag;
use darling::{Error, FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;

use crate::winter_ident;

pub(super) fn impl_bind_object_for_struct(ast: &syn::DeriveInput) -> TokenStream {
    let opts = match BindObjectOpts::from_derive_input(ast) {
        Ok(val) => val,
        Err(err) => {
            return err.write_errors();
        }
    };
    let winter = winter_ident();

    let mut errors = Error::accumulator();
    let initializers: Vec<_> = opts
        .fields()
        .into_iter()
        .filter_map(|field| errors.handle(field.initializer(&winter)))
        .collect();
    if let Err(err) = errors.finish() {
        return err.write_errors();
    }

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics #winter::form::BindObject for #name #ty_generics #where_clause {
            fn bind_object(binder: &mut #winter::form::ObjectBinder<'_>) -> Self {
                Self {
                    #( #initializers, )*
                }
            }
        }
    }
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct BindObjectOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<darling::util::Ignored, Field>,
}

impl BindObjectOpts {
    fn fields(&self) -> Vec<&Field> {
        self.data
            .as_ref()
            .take_struct()
            .expect("Only structs are supported")
            .fields
    }
}

#[derive(Debug, Clone, FromField)]
#[darling(attributes(bind))]
struct Field {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    required: Flag,
    email: Flag,
    numeric: Flag,
    nested: Flag,
    skip: Flag,
    rename: Option<String>,
}

impl Field {
    fn initializer(&self, winter: &TokenStream) -> darling::Result<TokenStream> {
        let ident = self
            .ident
            .as_ref()
            .expect("named struct fields have an identifier");
        let ty = &self.ty;
        let name = self
            .rename
            .clone()
            .unwrap_or_else(|| ident.unraw().to_string());
        let constrained =
            self.required.is_present() || self.email.is_present() || self.numeric.is_present();

        if self.skip.is_present() {
            if constrained || self.nested.is_present() || self.rename.is_some() {
                return Err(Error::custom("`skip` cannot be combined with other options")
                    .with_span(ident));
            }
            return Ok(quote! { #ident: ::core::default::Default::default() });
        }

        if self.nested.is_present() {
            if constrained {
                return Err(Error::custom(
                    "`nested` fields cannot be `required`, `email` or `numeric`",
                )
                .with_span(ident));
            }
            return Ok(quote! { #ident: binder.nested::<#ty>(#name) });
        }

        if self.email.is_present() && self.numeric.is_present() {
            return Err(
                Error::custom("`email` and `numeric` cannot be used together").with_span(ident)
            );
        }

        let mut spec = quote! { #winter::form::FieldSpec::new(#name) };
        if self.required.is_present() {
            spec = quote! { #spec.required() };
        }
        if self.email.is_present() {
            spec = quote! { #spec.email() };
        }
        if self.numeric.is_present() {
            spec = quote! { #spec.numeric() };
        }

        Ok(quote! { #ident: binder.field::<#ty>(#spec) })
    }
}
