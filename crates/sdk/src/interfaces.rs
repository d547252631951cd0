//! Host content system interface
//!
//! The mapping core performs no I/O of its own. Everything it knows about
//! nodes comes through this trait, which the host implements over its
//! published-content cache, media service and query engine.

use crate::node::{ContentNode, NodeId};
use crate::value::RawValue;

/// Node acquisition and property access provided by the host
///
/// Lookups report absence with `None` or an empty `Vec`; implementations
/// should not panic on unknown ids.
pub trait ContentSource: Send + Sync {
    /// The node being rendered in the current request, if any
    fn current(&self) -> Option<ContentNode>;

    /// Fetch a published content node by id
    fn content_by_id(&self, id: NodeId) -> Option<ContentNode>;

    /// Fetch a media node by id
    fn media_by_id(&self, id: NodeId) -> Option<ContentNode>;

    /// All published content nodes of a content type alias
    fn content_by_alias(&self, alias: &str) -> Vec<ContentNode>;

    /// All media nodes of a media type alias
    fn media_by_alias(&self, alias: &str) -> Vec<ContentNode>;

    /// Direct children of a node
    fn children(&self, node: &ContentNode) -> Vec<ContentNode>;

    /// Evaluate an XPath query relative to the content root
    fn content_at_xpath(&self, query: &str) -> Vec<ContentNode>;

    /// Read one property value from a node
    ///
    /// With `recursive` set, a missing value is looked up on ancestor nodes.
    /// Media nodes ignore `recursive`.
    fn property_value(&self, node: &ContentNode, alias: &str, recursive: bool) -> RawValue;
}
