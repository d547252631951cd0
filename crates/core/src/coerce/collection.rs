//! Eagerly loaded entity collections
//!
//! An [`ItemCollection<T>`] property holds the entities referenced by a
//! picker value: a delimiter-separated id list (`"1051,1052"`), a single id,
//! or a list raw value. Every id is mapped through the retrieval scope, so
//! the cache identity guarantees hold for collection members too. Ids that
//! do not resolve are skipped.

use std::ops::Deref;
use std::sync::Arc;

use tracing::warn;
use vault_sdk::{NodeId, RawValue};

use super::{split_delimited, FromRaw};
use crate::context::VaultContext;
use crate::error::CoercionError;
use crate::schema::Entity;

/// Entities loaded from a list of node ids
#[derive(Debug)]
pub struct ItemCollection<T> {
    items: Vec<Arc<T>>,
}

impl<T> Default for ItemCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Clone for ItemCollection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> ItemCollection<T> {
    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing was loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate loaded items
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }
}

impl<T: Entity> ItemCollection<T> {
    /// Load the items for `ids` through `scope`
    ///
    /// Media entity types are fetched from the media store, everything else
    /// from published content.
    pub fn from_ids<I>(ids: I, scope: &VaultContext) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let items = ids
            .into_iter()
            .filter_map(|id| match scope.item_by_id::<T>(id) {
                Ok(item) => item,
                Err(e) => {
                    warn!("Skipping collection item {}: {}", id, e);
                    None
                }
            })
            .collect();

        Self { items }
    }

    /// Load the items for a delimiter-separated id list
    pub fn parse(ids: &str, scope: &VaultContext) -> Self {
        let ids: Vec<NodeId> = split_delimited(ids, scope.config().delimiter())
            .filter_map(parse_id)
            .collect();
        Self::from_ids(ids, scope)
    }
}

fn parse_id(text: &str) -> Option<NodeId> {
    match text.parse::<NodeId>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("Skipping invalid node id {:?} in collection", text);
            None
        }
    }
}

fn raw_id(raw: RawValue) -> Option<NodeId> {
    match raw {
        RawValue::Int(id) => NodeId::try_from(id).ok(),
        RawValue::Text(text) => parse_id(text.trim()),
        other => {
            warn!("Skipping {} value in collection id list", other.kind_name());
            None
        }
    }
}

impl<T: Entity> FromRaw for ItemCollection<T> {
    fn from_raw(raw: RawValue, scope: &VaultContext) -> Result<Self, CoercionError> {
        match raw {
            RawValue::Null => Ok(Self::default()),
            RawValue::Text(text) => Ok(Self::parse(&text, scope)),
            RawValue::Int(_) => Ok(Self::from_ids(raw_id(raw), scope)),
            RawValue::List(items) => Ok(Self::from_ids(items.into_iter().filter_map(raw_id), scope)),
            other => Err(CoercionError::Unsupported {
                target: std::any::type_name::<Self>(),
                found: other.kind_name(),
            }),
        }
    }
}

impl<T> Deref for ItemCollection<T> {
    type Target = [Arc<T>];

    fn deref(&self) -> &[Arc<T>] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a ItemCollection<T> {
    type Item = &'a Arc<T>;
    type IntoIter = std::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for ItemCollection<T> {
    type Item = Arc<T>;
    type IntoIter = std::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
