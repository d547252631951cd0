//! Mapping metadata records
//!
//! These are the compiled form of the `#[vault(...)]` attributes. The derive
//! macro emits one `static` [`TypeInfo`] per entity type, so metadata is
//! read without any run-time attribute scanning.

use bitflags::bitflags;
use vault_sdk::NodeKind;

bitflags! {
    /// Per-property mapping markers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// Value is resolved on first read instead of at construction
        const DEFERRED = 0x01;
        /// Explicit include marker (`#[vault(include)]`)
        const INCLUDE = 0x02;
        /// Explicit exclude marker (`#[vault(exclude)]`)
        const EXCLUDE = 0x04;
    }
}

/// Entity marker declared on a type (`#[vault(entity)]` / `#[vault(media_entity)]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMarker {
    /// Which store the entity is fetched from
    pub kind: NodeKind,
    /// Map every property not explicitly excluded
    pub auto_map: bool,
    /// Explicit source content type alias
    pub alias: Option<&'static str>,
}

impl EntityMarker {
    /// Content entity marker
    pub const fn content(auto_map: bool) -> Self {
        Self {
            kind: NodeKind::Content,
            auto_map,
            alias: None,
        }
    }

    /// Media entity marker
    pub const fn media(auto_map: bool) -> Self {
        Self {
            kind: NodeKind::Media,
            auto_map,
            alias: None,
        }
    }

    /// Set the explicit source alias
    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }
}

/// A property declared directly on one type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDecl {
    /// Identifier as exposed on the type; `Trait::member` for interface members
    pub name: &'static str,
    /// Bare member name
    pub member: &'static str,
    /// Alias passed to the host when fetching the value
    pub alias: &'static str,
    /// Mapping markers
    pub flags: PropertyFlags,
}

impl PropertyDecl {
    /// Plain property, alias equal to its name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            member: name,
            alias: name,
            flags: PropertyFlags::empty(),
        }
    }

    /// Add markers
    pub const fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// Override the source alias
    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = alias;
        self
    }

    /// Record as an explicit interface member under `qualified` name
    pub const fn as_interface_member(mut self, qualified: &'static str) -> Self {
        self.name = qualified;
        self
    }

    pub const fn is_deferred(&self) -> bool {
        self.flags.contains(PropertyFlags::DEFERRED)
    }

    pub const fn is_included(&self) -> bool {
        self.flags.contains(PropertyFlags::INCLUDE)
    }

    pub const fn is_excluded(&self) -> bool {
        self.flags.contains(PropertyFlags::EXCLUDE)
    }
}

/// Metadata for one type in an inheritance chain
#[derive(Debug)]
pub struct TypeInfo {
    /// Type name (e.g. "HomePageViewModel")
    pub name: &'static str,
    /// Marker declared on this type itself, not inherited
    pub marker: Option<EntityMarker>,
    /// Properties declared on this type itself
    pub properties: &'static [PropertyDecl],
    /// Embedded ancestor type
    pub base: Option<fn() -> &'static TypeInfo>,
}

impl TypeInfo {
    /// The direct ancestor, if any
    pub fn base(&self) -> Option<&'static TypeInfo> {
        self.base.map(|base| base())
    }

    /// Walk the chain from this type up to the root
    pub fn chain(&'static self) -> impl Iterator<Item = &'static TypeInfo> {
        std::iter::successors(Some(self), |info| info.base())
    }

    /// Nearest entity marker at or above this type
    pub fn effective_marker(&'static self) -> Option<&'static EntityMarker> {
        self.chain().find_map(|info| info.marker.as_ref())
    }

    /// Check if this type is an entity, directly or by inheritance
    pub fn is_entity(&'static self) -> bool {
        self.effective_marker().is_some()
    }

    /// Check if the effective marker is a media marker
    pub fn is_media(&'static self) -> bool {
        self.effective_marker()
            .map(|marker| marker.kind == NodeKind::Media)
            .unwrap_or(false)
    }

    /// Depth of the chain including this type
    pub fn depth(&'static self) -> usize {
        self.chain().count()
    }
}
