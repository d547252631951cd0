//! Eager construction

use tracing::trace;
use vault_sdk::ContentNode;

use super::{fill_eager, Accessor, InstanceFactory};
use crate::context::VaultContext;
use crate::error::VaultResult;
use crate::schema::{resolve_properties, Entity};

/// Constructs an instance and fills every resolved property immediately
///
/// Deferred properties, if any, are left unbound and read as their default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFactory;

impl InstanceFactory for DirectFactory {
    fn create<T: Entity>(
        &self,
        node: &ContentNode,
        accessor: &Accessor,
        scope: &VaultContext,
    ) -> VaultResult<T> {
        let properties = resolve_properties::<T>();
        let mut instance = T::construct(node)?;

        fill_eager(&mut instance, &properties, accessor, scope);

        trace!(
            "Direct-filled {} from node {} ({} properties)",
            T::type_info().name,
            node.id,
            properties.len()
        );
        Ok(instance)
    }
}
