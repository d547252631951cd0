//! Content node handles
//!
//! A node is an item stored by the host system, either a document or a
//! media item, addressed by a numeric id.

/// Host node identifier
pub type NodeId = i32;

/// Which store a node lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Published document content
    #[default]
    Content,
    /// Media library item (images, files)
    Media,
}

impl NodeKind {
    /// Media nodes have no ancestor value inheritance
    pub const fn supports_recursion(self) -> bool {
        matches!(self, NodeKind::Content)
    }
}

/// Handle to a single content or media node
///
/// The handle is a cheap description of the node. Property values are
/// fetched separately through [`crate::ContentSource::property_value`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentNode {
    /// Node id (ids <= 0 are never valid)
    pub id: NodeId,
    /// Content type alias of the node (e.g. "homePage")
    pub type_alias: String,
    /// Node name as shown in the back office
    pub name: String,
    /// Public URL, if the node is routable
    pub url: Option<String>,
    /// Parent node id
    pub parent_id: Option<NodeId>,
    /// Content or media
    pub kind: NodeKind,
}

impl ContentNode {
    /// Create a content node handle
    pub fn content(id: NodeId, type_alias: impl Into<String>) -> Self {
        Self {
            id,
            type_alias: type_alias.into(),
            kind: NodeKind::Content,
            ..Default::default()
        }
    }

    /// Create a media node handle
    pub fn media(id: NodeId, type_alias: impl Into<String>) -> Self {
        Self {
            id,
            type_alias: type_alias.into(),
            kind: NodeKind::Media,
            ..Default::default()
        }
    }

    /// Set the node name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the public URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the parent node id
    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Check if the handle refers to a real node
    pub fn is_valid(&self) -> bool {
        self.id > 0
    }

    /// Check if this is a media node
    pub fn is_media(&self) -> bool {
        self.kind == NodeKind::Media
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_builders() {
        let node = ContentNode::content(1050, "homePage")
            .with_name("Home")
            .with_url("/")
            .with_parent(-1);

        assert_eq!(node.id, 1050);
        assert_eq!(node.type_alias, "homePage");
        assert_eq!(node.url.as_deref(), Some("/"));
        assert!(node.is_valid());
        assert!(!node.is_media());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!ContentNode::content(0, "x").is_valid());
        assert!(!ContentNode::media(-20, "Image").is_valid());
    }

    #[test]
    fn test_media_has_no_recursion() {
        assert!(NodeKind::Content.supports_recursion());
        assert!(!NodeKind::Media.supports_recursion());
    }
}
