//! Content Vault Proc Macros
//!
//! This crate provides proc macros for the content-vault mapping core:
//!
//! - `#[derive(VaultEntity)]` - Compile mapping attributes into entity metadata
//! - `#[derive(VaultEnum)]` - Convert host text values into enum variants
//!
//! # VaultEntity Example
//!
//! ```ignore
//! use vault_core::{Deferred, VaultEntity};
//!
//! #[derive(Default, VaultEntity)]
//! #[vault(entity(auto_map, alias = "textPage"))]
//! pub struct TextPageViewModel {
//!     pub introduction: String,
//!     pub body: String,
//!
//!     // Fetched from the host on first read
//!     pub button_text: Deferred<String>,
//!
//!     #[vault(exclude)]
//!     pub ignore: String,
//! }
//! ```
//!
//! # Attributes
//!
//! ## Struct Attributes (VaultEntity)
//!
//! - `#[vault(entity)]` - Entity marker, auto-map disabled.
//! - `#[vault(entity(auto_map, alias = "docType"))]` - Entity marker with options.
//! - `#[vault(media_entity(...))]` - Media entity marker, same options.
//! - `#[vault(name = "TypeName")]` - Override the recorded type name.
//!
//! A struct without a marker still derives metadata, so it can serve as the
//! base of an entity.
//!
//! ## Field Attributes (VaultEntity)
//!
//! - `#[vault(include)]` - Always map this property.
//! - `#[vault(exclude)]` - Never map this property (wins over `include`).
//! - `#[vault(alias = "hostAlias")]` - Alias used when fetching the value.
//! - `#[vault(rename = "name")]` - Property name (defaults to the field name).
//! - `#[vault(interface = "Trait")]` - Explicit interface member, recorded as `Trait::name`.
//! - `#[vault(base)]` - Embedded ancestor; its properties are inherited.
//! - `#[vault(node)]` - Receives the source node handle on construction.
//! - `#[vault(skip)]` - Not a mapping property.
//!
//! Fields typed `Deferred<T>` are deferred properties.

mod entity;
mod enum_value;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for mapped entity types
///
/// Generates an `Entity` implementation: a static `TypeInfo` record built
/// from the `#[vault(...)]` attributes, a constructor, a property setter
/// that coerces raw host values, and deferred-cell binding.
///
/// # Example
///
/// ```ignore
/// use vault_core::VaultEntity;
///
/// #[derive(Default, VaultEntity)]
/// pub struct SeoBase {
///     #[vault(include)]
///     pub meta_title: String,
/// }
///
/// #[derive(Default, VaultEntity)]
/// #[vault(entity(auto_map))]
/// pub struct HomePageViewModel {
///     #[vault(base)]
///     pub seo: SeoBase,
///     pub heading: String,
/// }
/// ```
///
/// # Generated Code
///
/// - `Entity::type_info()` returning a `'static` metadata record
/// - `Entity::construct()` filling `base` and `node` fields, defaulting the rest
/// - `Entity::assign()` for non-deferred properties, delegating to `base`
/// - `Entity::bind_deferred()` for `Deferred<T>` properties, delegating to `base`
#[proc_macro_derive(VaultEntity, attributes(vault))]
pub fn derive_vault_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::derive_entity(input).into()
}

/// Derive macro for enums read from host text values
///
/// The text must equal a variant name exactly, or the `rename` given with
/// `#[vault(rename = "...")]`. Only unit variants are supported.
///
/// # Example
///
/// ```ignore
/// use vault_core::VaultEnum;
///
/// #[derive(Debug, Default, VaultEnum)]
/// pub enum Alignment {
///     #[default]
///     Left,
///     Right,
///     #[vault(rename = "centre")]
///     Center,
/// }
/// ```
#[proc_macro_derive(VaultEnum, attributes(vault))]
pub fn derive_vault_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    enum_value::derive_enum(input).into()
}
