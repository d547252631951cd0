//! VaultEntity derive macro implementation

use std::collections::HashSet;

use darling::util::Override;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident};

use crate::parse::{deferred_inner_type, parse_entity, EntityArgs, EntityFieldArgs, MarkerKind};

const FLAG_DEFERRED: u8 = 0x01;
const FLAG_INCLUDE: u8 = 0x02;
const FLAG_EXCLUDE: u8 = 0x04;

/// Generate the Entity implementation
pub fn derive_entity(input: DeriveInput) -> TokenStream {
    match parse_entity(&input) {
        Ok(args) => match validate(&args) {
            Ok(()) => generate_impl(args),
            Err(e) => e.to_compile_error(),
        },
        Err(e) => e.write_errors(),
    }
}

fn fields(args: &EntityArgs) -> &[EntityFieldArgs] {
    match &args.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        _ => &[],
    }
}

fn validate(args: &EntityArgs) -> syn::Result<()> {
    if !args.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &args.ident,
            "VaultEntity cannot be derived for generic structs",
        ));
    }

    if args.entity.is_some() && args.media_entity.is_some() {
        return Err(syn::Error::new_spanned(
            &args.ident,
            "use either `entity` or `media_entity`, not both",
        ));
    }

    let fields = fields(args);

    if fields.iter().filter(|f| f.base).count() > 1 {
        return Err(syn::Error::new_spanned(
            &args.ident,
            "only one field may be marked `base`",
        ));
    }

    if fields.iter().filter(|f| f.node).count() > 1 {
        return Err(syn::Error::new_spanned(
            &args.ident,
            "only one field may be marked `node`",
        ));
    }

    let mut seen = HashSet::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let roles = [field.base, field.node, field.skip]
            .iter()
            .filter(|r| **r)
            .count();
        if roles > 1 {
            return Err(syn::Error::new_spanned(
                ident,
                "`base`, `node` and `skip` are mutually exclusive",
            ));
        }

        if !field.is_property()
            && (field.include || field.exclude || field.alias.is_some() || field.interface.is_some())
        {
            return Err(syn::Error::new_spanned(
                ident,
                "mapping markers are only valid on property fields",
            ));
        }

        if field.is_property() && !seen.insert(field.property_name()) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("duplicate property name `{}`", field.property_name()),
            ));
        }
    }

    Ok(())
}

fn generate_impl(args: EntityArgs) -> TokenStream {
    let struct_name = &args.ident;
    let type_name = args.type_name();
    let fields = fields(&args);

    let properties: Vec<_> = fields.iter().filter(|f| f.is_property()).collect();
    let base = fields.iter().find(|f| f.base);

    let decls = properties.iter().map(|f| generate_decl(f));
    let property_count = properties.len();
    let marker = generate_marker(&args);

    let base_info = match base {
        Some(field) => {
            let ty = &field.ty;
            quote! {
                Some(<#ty as ::vault_core::Entity>::type_info
                    as fn() -> &'static ::vault_core::schema::TypeInfo)
            }
        }
        None => quote! { None },
    };

    let constructor = generate_constructor(fields);
    let assign = generate_assign(&properties, base);
    let bind = generate_bind(&properties, base);

    quote! {
        impl ::vault_core::Entity for #struct_name {
            fn type_info() -> &'static ::vault_core::schema::TypeInfo {
                static PROPERTIES: [::vault_core::schema::PropertyDecl; #property_count] = [
                    #(#decls),*
                ];

                static INFO: ::vault_core::schema::TypeInfo = ::vault_core::schema::TypeInfo {
                    name: #type_name,
                    marker: #marker,
                    properties: &PROPERTIES,
                    base: #base_info,
                };

                &INFO
            }

            #constructor
            #assign
            #bind
        }
    }
}

fn generate_marker(args: &EntityArgs) -> TokenStream {
    let Some((kind, opts)) = args.marker() else {
        return quote! { None };
    };

    let (auto_map, alias) = match opts {
        Override::Inherit => (false, None),
        Override::Explicit(opts) => (opts.auto_map, opts.alias.clone()),
    };

    let ctor = match kind {
        MarkerKind::Content => quote! { content },
        MarkerKind::Media => quote! { media },
    };

    let with_alias = alias.map(|alias| quote! { .with_alias(#alias) });

    quote! {
        Some(::vault_core::schema::EntityMarker::#ctor(#auto_map) #with_alias)
    }
}

fn generate_decl(field: &EntityFieldArgs) -> TokenStream {
    let member = field.member_name();
    let alias = field.source_alias();

    let mut bits = 0u8;
    if field.is_deferred() {
        bits |= FLAG_DEFERRED;
    }
    if field.include {
        bits |= FLAG_INCLUDE;
    }
    if field.exclude {
        bits |= FLAG_EXCLUDE;
    }

    let qualified = field.interface.as_ref().map(|_| {
        let name = field.property_name();
        quote! { .as_interface_member(#name) }
    });

    quote! {
        ::vault_core::schema::PropertyDecl::new(#member)
            .with_flags(::vault_core::schema::PropertyFlags::from_bits_retain(#bits))
            .with_alias(#alias)
            #qualified
    }
}

fn generate_constructor(fields: &[EntityFieldArgs]) -> TokenStream {
    let inits = fields.iter().filter_map(|f| {
        let ident = f.ident.as_ref()?;
        let ty = &f.ty;
        let init = if f.base {
            quote! { <#ty as ::vault_core::Entity>::construct(node)? }
        } else if f.node {
            quote! { ::std::convert::From::from(::std::clone::Clone::clone(node)) }
        } else {
            quote! { ::std::default::Default::default() }
        };
        Some(quote! { #ident: #init })
    });

    quote! {
        fn construct(node: &::vault_core::sdk::ContentNode) -> ::vault_core::VaultResult<Self> {
            Ok(Self {
                #(#inits),*
            })
        }
    }
}

fn base_ident(base: Option<&EntityFieldArgs>) -> Option<&Ident> {
    base.and_then(|f| f.ident.as_ref())
}

fn generate_assign(properties: &[&EntityFieldArgs], base: Option<&EntityFieldArgs>) -> TokenStream {
    let arms = properties.iter().filter_map(|f| {
        let ident = f.ident.as_ref()?;
        let name = f.property_name();
        let ty = &f.ty;
        if f.is_deferred() {
            // Deferred cells are bound, never assigned
            Some(quote! { #name => Ok(false), })
        } else {
            Some(quote! {
                #name => {
                    self.#ident = <#ty as ::vault_core::FromRaw>::from_raw(raw, scope)?;
                    Ok(true)
                }
            })
        }
    });

    let fallback = match base_ident(base) {
        Some(base) => quote! { _ => ::vault_core::Entity::assign(&mut self.#base, property, raw, scope), },
        None => quote! { _ => Ok(false), },
    };

    quote! {
        #[allow(unused_variables)]
        fn assign(
            &mut self,
            property: &str,
            raw: ::vault_core::sdk::RawValue,
            scope: &::vault_core::VaultContext,
        ) -> ::std::result::Result<bool, ::vault_core::CoercionError> {
            match property {
                #(#arms)*
                #fallback
            }
        }
    }
}

fn generate_bind(properties: &[&EntityFieldArgs], base: Option<&EntityFieldArgs>) -> TokenStream {
    let arms = properties.iter().filter(|f| f.is_deferred()).filter_map(|f| {
        let ident = f.ident.as_ref()?;
        let name = f.property_name();
        let inner = deferred_inner_type(&f.ty);
        Some(quote! {
            #name => {
                ::vault_core::Deferred::<#inner>::bind(&mut self.#ident, source);
                true
            }
        })
    });

    let fallback = match base_ident(base) {
        Some(base) => {
            quote! { _ => ::vault_core::Entity::bind_deferred(&mut self.#base, property, source), }
        }
        None => quote! { _ => false, },
    };

    quote! {
        #[allow(unused_variables)]
        fn bind_deferred(&mut self, property: &str, source: ::vault_core::DeferredSource) -> bool {
            match property {
                #(#arms)*
                #fallback
            }
        }
    }
}
