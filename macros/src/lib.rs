//! Derive macros for the Composable State framework
//!
//! This crate provides procedural macros to reduce boilerplate when declaring
//! action enums.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates helpers for action enums (requests/outcomes)
//!
//! # Example
//!
//! ```ignore
//! use composable_state_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[request]
//!     LoadRequested,
//!
//!     #[outcome]
//!     LoadFailed { reason: String },
//! }
//!
//! // Generated methods:
//! assert!(TodoAction::LoadRequested.is_request());
//! assert!(TodoAction::LoadFailed { reason: "x".into() }.is_outcome());
//! assert_eq!(TodoAction::LoadRequested.name(), "LoadRequested");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_request()` - Returns true if this variant expresses an intent
/// - `is_outcome()` - Returns true if this variant reports how async work settled
/// - `name()` - Returns the variant name, for logging and metrics labels
///
/// # Attributes
///
/// - `#[request]` - Mark a variant as a request
/// - `#[outcome]` - Mark a variant as an outcome
///
/// Unmarked variants are neither.
///
/// # Errors
///
/// This macro produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[request]` and `#[outcome]` attributes
#[proc_macro_derive(Action, attributes(request, outcome))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut request_arms = Vec::new();
    let mut outcome_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_request = has_attribute(&variant.attrs, "request");
        let is_outcome = has_attribute(&variant.attrs, "outcome");

        if is_request && is_outcome {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[request] and #[outcome]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = variant_pattern(variant);
        let variant_name = variant.ident.to_string();

        if is_request {
            request_arms.push(quote! { #pattern => true, });
        }
        if is_outcome {
            outcome_arms.push(quote! { #pattern => true, });
        }
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a request
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_request(&self) -> bool {
                match self {
                    #(#request_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an outcome
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_outcome(&self) -> bool {
                match self {
                    #(#outcome_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name of this action
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Pattern matching `variant` regardless of its field shape
fn variant_pattern(variant: &Variant) -> proc_macro2::TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
