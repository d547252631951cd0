//! Deferred construction
//!
//! Non-deferred properties are filled at construction exactly as the
//! direct strategy does. Each `Deferred<T>` field is bound to a source that
//! calls the accessor on first read. The source holds the accessor and a
//! weak handle to the scope, so an instance outliving its scope reads
//! defaults rather than keeping the scope alive.

use std::sync::Arc;

use tracing::{debug, trace};
use vault_sdk::ContentNode;

use super::{fill_eager, Accessor, InstanceFactory};
use crate::context::VaultContext;
use crate::deferred::DeferredSource;
use crate::error::VaultResult;
use crate::schema::{resolve_properties, Entity};

/// Constructs an instance whose deferred properties load on first read
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyFactory;

impl InstanceFactory for LazyFactory {
    fn create<T: Entity>(
        &self,
        node: &ContentNode,
        accessor: &Accessor,
        scope: &VaultContext,
    ) -> VaultResult<T> {
        let properties = resolve_properties::<T>();
        let mut instance = T::construct(node)?;

        fill_eager(&mut instance, &properties, accessor, scope);

        for property in properties.deferred() {
            let accessor = Arc::clone(accessor);
            let alias = property.alias;
            let source = DeferredSource::new(
                property.name,
                move || accessor(alias, true),
                scope.downgrade(),
            );

            if !instance.bind_deferred(property.name, source) {
                debug!(
                    "{} has no deferred property {}",
                    T::type_info().name,
                    property.name
                );
            }
        }

        trace!(
            "Lazy-filled {} from node {} ({} deferred)",
            T::type_info().name,
            node.id,
            properties.deferred().count()
        );
        Ok(instance)
    }
}
