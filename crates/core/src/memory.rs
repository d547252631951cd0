//! In-memory content source
//!
//! A [`ContentSource`] backed by plain maps, for tests and demos. Every
//! property read is counted so callers can check how often the host was
//! asked for a value.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use vault_sdk::{ContentNode, ContentSource, NodeId, NodeKind, RawValue};

/// Content tree held in memory
#[derive(Default)]
pub struct MemoryContentSource {
    content: RwLock<HashMap<NodeId, ContentNode>>,
    media: RwLock<HashMap<NodeId, ContentNode>>,
    values: RwLock<HashMap<(NodeKind, NodeId, String), RawValue>>,
    reads: RwLock<HashMap<(NodeId, String), usize>>,
    queries: RwLock<HashMap<String, Vec<NodeId>>>,
    current: RwLock<Option<NodeId>>,
}

impl MemoryContentSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node (builder form)
    pub fn with_node(self, node: ContentNode) -> Self {
        self.insert_node(node);
        self
    }

    /// Set a property value (builder form)
    pub fn with_value(self, id: NodeId, alias: &str, value: impl Into<RawValue>) -> Self {
        self.set_value(id, alias, value);
        self
    }

    /// Set the current node (builder form)
    pub fn with_current(self, id: NodeId) -> Self {
        self.set_current(Some(id));
        self
    }

    /// Register canned results for an XPath query (builder form)
    pub fn with_query(self, query: &str, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.queries
            .write()
            .insert(query.to_string(), ids.into_iter().collect());
        self
    }

    /// Add or replace a node
    pub fn insert_node(&self, node: ContentNode) {
        let store = match node.kind {
            NodeKind::Content => &self.content,
            NodeKind::Media => &self.media,
        };
        store.write().insert(node.id, node);
    }

    /// Set a property value on a node
    ///
    /// The value is stored for whichever store holds `id`; content wins if
    /// both do.
    pub fn set_value(&self, id: NodeId, alias: &str, value: impl Into<RawValue>) {
        let kind = if self.content.read().contains_key(&id) || !self.media.read().contains_key(&id) {
            NodeKind::Content
        } else {
            NodeKind::Media
        };
        self.values
            .write()
            .insert((kind, id, alias.to_string()), value.into());
    }

    /// Change the current node
    pub fn set_current(&self, id: Option<NodeId>) {
        *self.current.write() = id;
    }

    /// How many times `alias` was read from node `id`
    pub fn read_count(&self, id: NodeId, alias: &str) -> usize {
        self.reads
            .read()
            .get(&(id, alias.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total property reads across all nodes
    pub fn total_reads(&self) -> usize {
        self.reads.read().values().sum()
    }

    fn own_value(&self, node: &ContentNode, alias: &str) -> Option<RawValue> {
        self.values
            .read()
            .get(&(node.kind, node.id, alias.to_string()))
            .cloned()
    }

    fn by_alias(store: &RwLock<HashMap<NodeId, ContentNode>>, alias: &str) -> Vec<ContentNode> {
        let mut nodes: Vec<_> = store
            .read()
            .values()
            .filter(|node| node.type_alias == alias)
            .cloned()
            .collect();
        nodes.sort_by_key(|node| node.id);
        nodes
    }
}

impl ContentSource for MemoryContentSource {
    fn current(&self) -> Option<ContentNode> {
        let id = (*self.current.read())?;
        self.content.read().get(&id).cloned()
    }

    fn content_by_id(&self, id: NodeId) -> Option<ContentNode> {
        self.content.read().get(&id).cloned()
    }

    fn media_by_id(&self, id: NodeId) -> Option<ContentNode> {
        self.media.read().get(&id).cloned()
    }

    fn content_by_alias(&self, alias: &str) -> Vec<ContentNode> {
        Self::by_alias(&self.content, alias)
    }

    fn media_by_alias(&self, alias: &str) -> Vec<ContentNode> {
        Self::by_alias(&self.media, alias)
    }

    fn children(&self, node: &ContentNode) -> Vec<ContentNode> {
        let store = match node.kind {
            NodeKind::Content => &self.content,
            NodeKind::Media => &self.media,
        };
        let mut children: Vec<_> = store
            .read()
            .values()
            .filter(|child| child.parent_id == Some(node.id))
            .cloned()
            .collect();
        children.sort_by_key(|child| child.id);
        children
    }

    fn content_at_xpath(&self, query: &str) -> Vec<ContentNode> {
        let Some(ids) = self.queries.read().get(query).cloned() else {
            return Vec::new();
        };
        let content = self.content.read();
        ids.iter().filter_map(|id| content.get(id).cloned()).collect()
    }

    fn property_value(&self, node: &ContentNode, alias: &str, recursive: bool) -> RawValue {
        *self
            .reads
            .write()
            .entry((node.id, alias.to_string()))
            .or_insert(0) += 1;

        if let Some(value) = self.own_value(node, alias).filter(|v| !v.is_empty()) {
            return value;
        }
        if !recursive || !node.kind.supports_recursion() {
            return RawValue::Null;
        }

        // Parent links are host data and may loop
        let mut visited = HashSet::from([node.id]);
        let mut parent_id = node.parent_id;
        while let Some(id) = parent_id {
            if !visited.insert(id) {
                break;
            }
            let Some(parent) = self.content_by_id(id) else {
                break;
            };
            if let Some(value) = self.own_value(&parent, alias).filter(|v| !v.is_empty()) {
                return value;
            }
            parent_id = parent.parent_id;
        }
        RawValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MemoryContentSource {
        MemoryContentSource::new()
            .with_node(ContentNode::content(1000, "home").with_name("Home"))
            .with_node(ContentNode::content(1001, "textPage").with_parent(1000))
            .with_node(ContentNode::content(1002, "textPage").with_parent(1000))
            .with_node(ContentNode::content(1003, "textPage").with_parent(1001))
            .with_node(ContentNode::media(2000, "image").with_url("/media/a.png"))
            .with_value(1000, "siteName", "Example")
            .with_value(1001, "title", "About")
            .with_value(2000, "alt", "A picture")
    }

    #[test]
    fn test_lookup_by_id_and_kind() {
        let source = tree();
        assert_eq!(source.content_by_id(1001).unwrap().type_alias, "textPage");
        assert!(source.content_by_id(2000).is_none());
        assert!(source.media_by_id(2000).unwrap().is_media());
    }

    #[test]
    fn test_children_and_alias() {
        let source = tree();
        let home = source.content_by_id(1000).unwrap();

        let ids: Vec<_> = source.children(&home).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1001, 1002]);

        assert_eq!(source.content_by_alias("textPage").len(), 3);
        assert_eq!(source.media_by_alias("image").len(), 1);
    }

    #[test]
    fn test_recursive_value_walks_ancestors() {
        let source = tree();
        let leaf = source.content_by_id(1003).unwrap();

        assert_eq!(source.property_value(&leaf, "siteName", true), RawValue::from("Example"));
        assert_eq!(source.property_value(&leaf, "siteName", false), RawValue::Null);
        assert_eq!(source.property_value(&leaf, "title", true), RawValue::from("About"));
    }

    #[test]
    fn test_recursive_value_stops_on_parent_loop() {
        let source = MemoryContentSource::new()
            .with_node(ContentNode::content(1, "page").with_parent(2))
            .with_node(ContentNode::content(2, "page").with_parent(1))
            .with_value(2, "title", "Looped");
        let node = source.content_by_id(1).unwrap();

        assert_eq!(source.property_value(&node, "title", true), RawValue::from("Looped"));
        assert_eq!(source.property_value(&node, "missing", true), RawValue::Null);
    }

    #[test]
    fn test_media_ignores_recursion() {
        let source = tree();
        let image = source.media_by_id(2000).unwrap();

        assert_eq!(source.property_value(&image, "alt", true), RawValue::from("A picture"));
        assert_eq!(source.property_value(&image, "siteName", true), RawValue::Null);
    }

    #[test]
    fn test_read_counting() {
        let source = tree();
        let page = source.content_by_id(1001).unwrap();

        source.property_value(&page, "title", true);
        source.property_value(&page, "title", true);
        source.property_value(&page, "missing", false);

        assert_eq!(source.read_count(1001, "title"), 2);
        assert_eq!(source.read_count(1001, "missing"), 1);
        assert_eq!(source.total_reads(), 3);
    }

    #[test]
    fn test_current_and_queries() {
        let source = tree().with_current(1002).with_query("//textPage", [1003, 1001, 9999]);

        assert_eq!(source.current().unwrap().id, 1002);
        let ids: Vec<_> = source.content_at_xpath("//textPage").iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1003, 1001]);
        assert!(source.content_at_xpath("//nothing").is_empty());
    }
}
