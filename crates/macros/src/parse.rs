//! Attribute parsing for the VaultEntity and VaultEnum derive macros

use darling::util::Override;
use darling::{FromDeriveInput, FromField, FromMeta, FromVariant};
use syn::{DeriveInput, GenericArgument, Generics, Ident, PathArguments, Type};

/// Options inside `#[vault(entity(...))]` / `#[vault(media_entity(...))]`
#[derive(Debug, Default, FromMeta)]
pub struct EntityOpts {
    /// Map every property that is not excluded
    #[darling(default)]
    pub auto_map: bool,

    /// Explicit source content type alias
    #[darling(default)]
    pub alias: Option<String>,
}

/// Which marker a struct carries
pub enum MarkerKind {
    Content,
    Media,
}

/// Parsed #[vault(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(vault), supports(struct_named))]
pub struct EntityArgs {
    /// Struct identifier
    pub ident: Ident,

    /// Struct generics (must be empty)
    pub generics: Generics,

    /// Struct fields
    pub data: darling::ast::Data<(), EntityFieldArgs>,

    /// Content entity marker
    #[darling(default)]
    pub entity: Option<Override<EntityOpts>>,

    /// Media entity marker
    #[darling(default)]
    pub media_entity: Option<Override<EntityOpts>>,

    /// Type name override (defaults to the struct name)
    #[darling(default)]
    pub name: Option<String>,
}

impl EntityArgs {
    /// The declared marker, if any
    pub fn marker(&self) -> Option<(MarkerKind, &Override<EntityOpts>)> {
        match (&self.entity, &self.media_entity) {
            (Some(opts), None) => Some((MarkerKind::Content, opts)),
            (None, Some(opts)) => Some((MarkerKind::Media, opts)),
            _ => None,
        }
    }

    /// Type name recorded in metadata
    pub fn type_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parsed #[vault(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(vault))]
pub struct EntityFieldArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Explicit include marker
    #[darling(default)]
    pub include: bool,

    /// Explicit exclude marker
    #[darling(default)]
    pub exclude: bool,

    /// Embedded ancestor entity
    #[darling(default)]
    pub base: bool,

    /// Receives the source node handle
    #[darling(default)]
    pub node: bool,

    /// Not a mapping property at all
    #[darling(default)]
    pub skip: bool,

    /// Host alias override
    #[darling(default)]
    pub alias: Option<String>,

    /// Property name override
    #[darling(default)]
    pub rename: Option<String>,

    /// Interface the property is an explicit member of
    #[darling(default)]
    pub interface: Option<String>,
}

impl EntityFieldArgs {
    /// Check if this field is a mapping property
    pub fn is_property(&self) -> bool {
        !(self.base || self.node || self.skip)
    }

    /// Check if this field is a `Deferred<T>` cell
    pub fn is_deferred(&self) -> bool {
        is_deferred_type(&self.ty)
    }

    /// Bare member name (rename or the field identifier)
    pub fn member_name(&self) -> String {
        match (&self.rename, &self.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => {
                let name = ident.to_string();
                name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
            }
            (None, None) => String::new(),
        }
    }

    /// Property name as exposed on the type
    pub fn property_name(&self) -> String {
        match &self.interface {
            Some(interface) => format!("{}::{}", interface, self.member_name()),
            None => self.member_name(),
        }
    }

    /// Alias passed to the host
    pub fn source_alias(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.member_name())
    }
}

/// Check if a type is `Deferred<T>`
fn is_deferred_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Deferred"
                && matches!(segment.arguments, PathArguments::AngleBracketed(_));
        }
    }
    false
}

/// Extract `T` from `Deferred<T>`, otherwise return the type as-is
pub fn deferred_inner_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Deferred" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }
    ty
}

/// Parsed #[vault(...)] attributes on an enum
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(vault), supports(enum_unit))]
pub struct EnumArgs {
    /// Enum identifier
    pub ident: Ident,

    /// Variants
    pub data: darling::ast::Data<EnumVariantArgs, ()>,
}

/// Parsed #[vault(...)] attributes on an enum variant
#[derive(Debug, FromVariant)]
#[darling(attributes(vault))]
pub struct EnumVariantArgs {
    /// Variant identifier
    pub ident: Ident,

    /// Text matched instead of the variant name
    #[darling(default)]
    pub rename: Option<String>,
}

impl EnumVariantArgs {
    /// Text that selects this variant
    pub fn text(&self) -> String {
        self.rename.clone().unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parse a DeriveInput into EntityArgs
pub fn parse_entity(input: &DeriveInput) -> darling::Result<EntityArgs> {
    EntityArgs::from_derive_input(input)
}

/// Parse a DeriveInput into EnumArgs
pub fn parse_enum(input: &DeriveInput) -> darling::Result<EnumArgs> {
    EnumArgs::from_derive_input(input)
}
