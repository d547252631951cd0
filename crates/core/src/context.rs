//! Retrieval scope and lookup facade
//!
//! A [`VaultContext`] is one retrieval scope (typically one request). It
//! owns the host [`ContentSource`], the [`ItemCache`] that guarantees one
//! instance per node and type, and the [`VaultConfig`].
//!
//! # Example
//!
//! ```ignore
//! use vault_core::VaultContext;
//!
//! let vault = VaultContext::new(source);
//! if let Some(page) = vault.current::<TextPageViewModel>()? {
//!     println!("{}", page.introduction);
//! }
//! ```
//!
//! Lookup misses are not errors: they return `None` or skip the node, and
//! are logged at error level when `log_missing_items` is set.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Weak};

use tracing::{debug, error};
use vault_sdk::{ContentNode, ContentSource, NodeId};

use crate::cache::ItemCache;
use crate::coerce::split_delimited;
use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::factory::{create_instance, Accessor};
use crate::schema::Entity;

/// A retrieval scope over a content source
pub struct VaultContext {
    this: Weak<VaultContext>,
    source: Arc<dyn ContentSource>,
    cache: ItemCache,
    config: VaultConfig,
}

impl VaultContext {
    /// Create a scope with the default config
    pub fn new(source: Arc<dyn ContentSource>) -> Arc<Self> {
        Self::with_config(source, VaultConfig::default())
    }

    /// Create a scope with an explicit config
    pub fn with_config(source: Arc<dyn ContentSource>, config: VaultConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            source,
            cache: ItemCache::new(),
            config,
        })
    }

    /// Create a scope with the config stored at `path`
    ///
    /// A missing file is created with the defaults.
    pub fn from_config_file(source: Arc<dyn ContentSource>, path: &Path) -> VaultResult<Arc<Self>> {
        let config = VaultConfig::load(path)?;
        Ok(Self::with_config(source, config))
    }

    /// Scope settings
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Instances mapped in this scope
    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    /// The underlying host source
    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    /// Weak handle to this scope
    pub fn downgrade(&self) -> Weak<VaultContext> {
        self.this.clone()
    }

    // ========================================================================
    // Single items
    // ========================================================================

    /// Map the node being rendered in the current request
    pub fn current<T: Entity>(&self) -> VaultResult<Option<Arc<T>>> {
        match self.source.current() {
            Some(node) => self.item(&node).map(Some),
            None => {
                self.report_missing(format_args!(
                    "Could not retrieve current item as {}",
                    T::type_info().name
                ));
                Ok(None)
            }
        }
    }

    /// Map a content node by id
    pub fn content_by_id<T: Entity>(&self, id: NodeId) -> VaultResult<Option<Arc<T>>> {
        let node = self.source.content_by_id(id).filter(ContentNode::is_valid);
        match node {
            Some(node) => self.item(&node).map(Some),
            None => {
                self.report_missing(format_args!("Could not locate content item with id {}", id));
                Ok(None)
            }
        }
    }

    /// Map a media node by id
    pub fn media_by_id<T: Entity>(&self, id: NodeId) -> VaultResult<Option<Arc<T>>> {
        let node = self.source.media_by_id(id).filter(ContentNode::is_valid);
        match node {
            Some(node) => self.item(&node).map(Some),
            None => {
                self.report_missing(format_args!("Could not locate media item with id {}", id));
                Ok(None)
            }
        }
    }

    /// Map a node by id through the media or content path, depending on `T`
    pub fn item_by_id<T: Entity>(&self, id: NodeId) -> VaultResult<Option<Arc<T>>> {
        if self.is_media_request::<T>() {
            self.media_by_id(id)
        } else {
            self.content_by_id(id)
        }
    }

    /// Get the instance for `node` from the cache, building it on first use
    pub fn item<T: Entity>(&self, node: &ContentNode) -> VaultResult<Arc<T>> {
        self.cache.get_or_create(node.id, || {
            debug!("Mapping node {} as {}", node.id, T::type_info().name);
            create_instance::<T>(node, &self.accessor_for(node), self)
        })
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Map content nodes from a delimited id list, skipping missing ids
    pub fn content_by_csv<T: Entity>(&self, csv: &str) -> VaultResult<Vec<Arc<T>>> {
        let mut items = Vec::new();
        for part in split_delimited(csv, ",") {
            let Ok(id) = part.parse::<NodeId>() else {
                debug!("Skipping invalid id '{}' in list", part);
                continue;
            };
            if let Some(item) = self.content_by_id(id)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Map every content node whose type alias matches `T`
    pub fn by_document_type<T: Entity>(&self) -> VaultResult<Vec<Arc<T>>> {
        self.aliases_for_type::<T>()
            .iter()
            .flat_map(|alias| self.source.content_by_alias(alias))
            .map(|node| self.item(&node))
            .collect()
    }

    /// Map every media node whose type alias matches `T`
    pub fn by_media_type<T: Entity>(&self) -> VaultResult<Vec<Arc<T>>> {
        self.aliases_for_type::<T>()
            .iter()
            .flat_map(|alias| self.source.media_by_alias(alias))
            .map(|node| self.item(&node))
            .collect()
    }

    /// URLs of every content node whose type alias matches `T`
    pub fn urls_for_document_type<T: Entity>(&self) -> Vec<String> {
        self.aliases_for_type::<T>()
            .iter()
            .flat_map(|alias| self.source.content_by_alias(alias))
            .filter_map(|node| node.url)
            .collect()
    }

    /// Map the children of `parent` (or of the current node) that match `T`
    pub fn children<T: Entity>(&self, parent: Option<NodeId>) -> VaultResult<Vec<Arc<T>>> {
        let parent_node = match parent {
            Some(id) => self.source.content_by_id(id),
            None => self.source.current(),
        };

        let Some(parent_node) = parent_node else {
            self.report_missing(format_args!("Could not locate parent item {:?}", parent));
            return Ok(Vec::new());
        };

        let aliases = self.aliases_for_type::<T>();
        self.source
            .children(&parent_node)
            .into_iter()
            .filter(|child| aliases.contains(&child.type_alias))
            .map(|child| self.item(&child))
            .collect()
    }

    /// Map the results of an XPath query relative to the content root
    pub fn query_relative<T: Entity>(&self, query: &str) -> VaultResult<Vec<Arc<T>>> {
        self.source
            .content_at_xpath(query)
            .iter()
            .map(|node| self.item(node))
            .collect()
    }

    // ========================================================================
    // Type metadata
    // ========================================================================

    /// Host type aliases that `T` maps from
    ///
    /// The explicit alias of the nearest entity marker, else the type name
    /// with the configured suffix removed. Non-entities map from nothing.
    pub fn aliases_for_type<T: Entity>(&self) -> BTreeSet<String> {
        let info = T::type_info();
        let Some(marker) = info.effective_marker() else {
            return BTreeSet::new();
        };

        let alias = match marker.alias {
            Some(alias) if !alias.trim().is_empty() => alias.to_string(),
            _ => strip_suffix(info.name, &self.config.alias_suffix).to_string(),
        };
        BTreeSet::from([alias])
    }

    /// Check if `T` is fetched through the media path
    pub fn is_media_request<T: Entity>(&self) -> bool {
        T::type_info().is_media()
    }

    fn accessor_for(&self, node: &ContentNode) -> Accessor {
        let source = Arc::clone(&self.source);
        let node = node.clone();
        let recursion = node.kind.supports_recursion();
        Arc::new(move |alias: &str, recursive: bool| {
            source.property_value(&node, alias, recursive && recursion)
        })
    }

    fn report_missing(&self, message: std::fmt::Arguments<'_>) {
        if self.config.log_missing_items {
            error!("{}", message);
        }
    }
}

impl std::fmt::Debug for VaultContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultContext")
            .field("cached", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    match name.strip_suffix(suffix) {
        Some(stripped) if !suffix.is_empty() && !stripped.is_empty() => stripped,
        _ => name,
    }
}
