//! Entity Schema - Mapping metadata and property resolution
//!
//! This module holds the compiled attribute model and the resolver that
//! decides which properties of an entity type receive data from the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 #[derive(VaultEntity)]                      │
//! │   #[vault(entity(auto_map))] / #[vault(include|exclude)]    │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │ emits
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  static TypeInfo { marker, properties, base: fn() -> ... }  │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  resolver::resolve(info) -> Arc<ResolvedPropertySet>        │
//! │    - walks the base chain, applies per-level auto-map       │
//! │    - caches results in DashMap                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use vault_core::schema::resolve_properties;
//!
//! let properties = resolve_properties::<TextPageViewModel>();
//! for property in properties.eager() {
//!     println!("{} <- {}", property.name, property.alias);
//! }
//! ```

pub mod resolver;
pub mod types;

use vault_sdk::{ContentNode, RawValue};

use crate::context::VaultContext;
use crate::deferred::DeferredSource;
use crate::error::{CoercionError, VaultResult};

// Re-export primary types
pub use resolver::{
    cache_size, clear_cache, resolve, resolve_properties, resolve_uncached, PropertyDescriptor,
    ResolvedPropertySet,
};
pub use types::{EntityMarker, PropertyDecl, PropertyFlags, TypeInfo};

/// Trait for types that content nodes are mapped onto
///
/// This trait is implemented by the `#[derive(VaultEntity)]` macro. Manual
/// implementations are possible but must keep `assign` and `bind_deferred`
/// consistent with the names in `type_info()`.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Metadata declared on this type
    fn type_info() -> &'static TypeInfo;

    /// Build a bare instance for `node`
    ///
    /// Types with a `#[vault(node)]` field receive the handle; all other
    /// fields start at their defaults.
    fn construct(node: &ContentNode) -> VaultResult<Self>;

    /// Coerce `raw` into the non-deferred property `property`
    ///
    /// Returns `Ok(false)` if no such non-deferred property exists.
    fn assign(
        &mut self,
        property: &str,
        raw: RawValue,
        scope: &VaultContext,
    ) -> Result<bool, CoercionError>;

    /// Wire the deferred property `property` to load from `source`
    ///
    /// Returns `false` if no such deferred property exists.
    fn bind_deferred(&mut self, property: &str, source: DeferredSource) -> bool;
}
