//! VaultEnum derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{parse_enum, EnumArgs};

/// Generate the FromRaw implementation for a unit enum
pub fn derive_enum(input: DeriveInput) -> TokenStream {
    match parse_enum(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: EnumArgs) -> TokenStream {
    let enum_name = &args.ident;
    let target = enum_name.to_string();

    let variants = match &args.data {
        darling::ast::Data::Enum(variants) => variants.as_slice(),
        _ => &[],
    };

    // Exact match on the variant name, like a case-sensitive enum parse
    let arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let text = v.text();
        quote! { #text => Ok(Self::#ident), }
    });

    quote! {
        impl ::vault_core::FromRaw for #enum_name {
            fn from_raw(
                raw: ::vault_core::sdk::RawValue,
                _scope: &::vault_core::VaultContext,
            ) -> ::std::result::Result<Self, ::vault_core::CoercionError> {
                match raw {
                    ::vault_core::sdk::RawValue::Text(text) => match text.trim() {
                        "" => Err(::vault_core::CoercionError::Empty { target: #target }),
                        #(#arms)*
                        other => Err(::vault_core::CoercionError::UnknownVariant {
                            target: #target,
                            value: other.to_string(),
                        }),
                    },
                    ::vault_core::sdk::RawValue::Null => {
                        Err(::vault_core::CoercionError::Empty { target: #target })
                    }
                    other => Err(::vault_core::CoercionError::Unsupported {
                        target: #target,
                        found: other.kind_name(),
                    }),
                }
            }
        }
    }
}
