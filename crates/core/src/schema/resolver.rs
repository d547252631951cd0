//! Property resolution
//!
//! Computes which properties of an entity type receive data from the host,
//! applying the inheritance and override rules of the attribute model.
//! Results are cached per type for the life of the process.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::{debug, trace};

use super::types::{PropertyDecl, PropertyFlags, TypeInfo};
use super::Entity;

/// Global resolution cache: address of the type's `TypeInfo` -> resolved set
static RESOLVED: LazyLock<DashMap<usize, Arc<ResolvedPropertySet>>> = LazyLock::new(DashMap::new);

/// A mapping-eligible property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Identifier as exposed on the type (qualified for interface members)
    pub name: &'static str,
    /// Bare member name
    pub member: &'static str,
    /// Alias used when asking the host for the value
    pub alias: &'static str,
    /// Type that declared the winning declaration
    pub declaring_type: &'static str,
    /// Markers carried by the winning declaration
    pub flags: PropertyFlags,
}

impl PropertyDescriptor {
    fn from_decl(decl: &PropertyDecl, declaring_type: &'static str) -> Self {
        Self {
            name: decl.name,
            member: decl.member,
            alias: decl.alias,
            declaring_type,
            flags: decl.flags,
        }
    }

    /// Check if the value is resolved on first read
    pub fn is_deferred(&self) -> bool {
        self.flags.contains(PropertyFlags::DEFERRED)
    }

    /// Check for the explicit include marker
    pub fn is_included(&self) -> bool {
        self.flags.contains(PropertyFlags::INCLUDE)
    }

    /// Check for the explicit exclude marker
    pub fn is_excluded(&self) -> bool {
        self.flags.contains(PropertyFlags::EXCLUDE)
    }
}

/// The de-duplicated set of properties a type maps
///
/// Names are unique. Iteration order is by name, so it is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPropertySet {
    properties: BTreeMap<&'static str, PropertyDescriptor>,
}

impl ResolvedPropertySet {
    /// Number of mapped properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True when the type maps nothing
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Check if a property is mapped
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterate all descriptors
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values()
    }

    /// Iterate property names
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.keys().copied()
    }

    /// Descriptors filled at construction time
    pub fn eager(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.iter().filter(|p| !p.is_deferred())
    }

    /// Descriptors resolved on first read
    pub fn deferred(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.iter().filter(|p| p.is_deferred())
    }

    /// True when any property is deferred (selects the lazy factory)
    pub fn has_deferred(&self) -> bool {
        self.iter().any(PropertyDescriptor::is_deferred)
    }
}

/// Resolve the mapped properties of an entity type (cached)
pub fn resolve_properties<T: Entity>() -> Arc<ResolvedPropertySet> {
    resolve(T::type_info())
}

/// Resolve the mapped properties described by `info` (cached)
pub fn resolve(info: &'static TypeInfo) -> Arc<ResolvedPropertySet> {
    let key = info as *const TypeInfo as usize;
    if let Some(entry) = RESOLVED.get(&key) {
        trace!("Resolution cache hit for {}", info.name);
        return Arc::clone(entry.value());
    }

    let resolved = Arc::new(resolve_uncached(info));
    debug!(
        "Resolved {} mapped properties for {} ({} deferred)",
        resolved.len(),
        info.name,
        resolved.deferred().count()
    );

    // A concurrent resolver may have won; both computed the same set
    Arc::clone(RESOLVED.entry(key).or_insert(resolved).value())
}

/// Resolve without consulting the cache
///
/// The auto-map flag comes from the nearest marker at or above `info` and
/// applies to every level of the chain, so an auto-map entity surfaces
/// unmarked base properties even when the base's own marker disables
/// auto-map. Exclude beats include, include beats auto-map. Levels are
/// processed root first so a derived redeclaration fully replaces the
/// ancestor's descriptor, including removing it when the redeclaration is
/// ineligible.
pub fn resolve_uncached(info: &'static TypeInfo) -> ResolvedPropertySet {
    // No marker anywhere in the chain: not an entity, nothing mapped
    let Some(auto_map) = info.effective_marker().map(|marker| marker.auto_map) else {
        return ResolvedPropertySet::default();
    };

    let chain: Vec<&'static TypeInfo> = info.chain().collect();
    let mut properties = BTreeMap::new();

    for level in chain.iter().rev() {
        for decl in level.properties {
            if is_eligible(decl, auto_map) {
                properties.insert(decl.name, PropertyDescriptor::from_decl(decl, level.name));
            } else {
                properties.remove(decl.name);
            }
        }
    }

    ResolvedPropertySet { properties }
}

fn is_eligible(decl: &PropertyDecl, auto_map: bool) -> bool {
    if decl.is_excluded() {
        false
    } else if decl.is_included() {
        true
    } else {
        auto_map
    }
}

/// Clear the resolution cache
pub fn clear_cache() {
    RESOLVED.clear();
    debug!("Property resolution cache cleared");
}

/// Get the number of cached resolutions
pub fn cache_size() -> usize {
    RESOLVED.len()
}
