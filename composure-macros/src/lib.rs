//! Procedural macros for composure

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit name override for logging
    #[darling(default)]
    rename: Option<String>,
}

/// Derive the `Action` trait for an enum.
///
/// Generates `name()` returning the variant identifier, used for tracing
/// and test assertions. Override per variant with
/// `#[action(rename = "...")]`:
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     Increment,
///     #[action(rename = "Row")]
///     Todo(u64, TodoAction),
/// }
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let variants = match opts.data {
        darling::ast::Data::Enum(variants) => variants,
        darling::ast::Data::Struct(_) => {
            unreachable!("darling(supports(enum_any)) rejects non-enums")
        }
    };

    let body = if variants.is_empty() {
        quote! { match *self {} }
    } else {
        let arms = variants.iter().map(|variant| {
            let ident = &variant.ident;
            let label = variant
                .rename
                .clone()
                .unwrap_or_else(|| ident.to_string());
            let pattern = match variant.fields.style {
                darling::ast::Style::Unit => quote! { #name::#ident },
                darling::ast::Style::Tuple => quote! { #name::#ident(..) },
                darling::ast::Style::Struct => quote! { #name::#ident { .. } },
            };
            quote! { #pattern => #label }
        });
        quote! {
            match self {
                #(#arms,)*
            }
        }
    };

    let expanded = quote! {
        impl composure::Action for #name {
            fn name(&self) -> &'static str {
                #body
            }
        }
    };
    expanded.into()
}
