//! Node tree: The input to one compositing pass.
//!
//! The reconciliation layer builds a fresh (or incrementally reused) tree for
//! every pass. Ownership is strictly parent to child; anything keyed per node
//! (geometry, squash results, committed static nodes) lives in side tables
//! indexed by [`NodeId`].

use crate::style::Style;
use std::sync::Arc;

/// Boxed error returned by transform callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stable node identity assigned by the reconciliation layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Id carried by text leaves, which are never looked up.
    pub const ANONYMOUS: Self = Self(u64::MAX);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Tree root; its geometry sizes the frame.
    Root,
    /// Flex container.
    Box,
    /// Text container; its subtree is squashed into one paint unit.
    Text,
    /// Text nested inside a `Text`, styled and transformed as a unit.
    VirtualText,
    /// Raw text content.
    TextLeaf(String),
}

/// A text transform callback attached to a node.
///
/// Invoked synchronously during compositing with the node's text and an
/// index. Must not mutate the tree. An error aborts the pass.
pub trait Transform: Send + Sync {
    /// Transform `text`.
    fn transform(&self, text: &str, index: usize) -> Result<String, BoxError>;
}

impl<F> Transform for F
where
    F: Fn(&str, usize) -> Result<String, BoxError> + Send + Sync,
{
    fn transform(&self, text: &str, index: usize) -> Result<String, BoxError> {
        self(text, index)
    }
}

/// One node of the render tree.
#[derive(Clone)]
pub struct Node {
    /// Identity used for geometry and cache lookups.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Paint-relevant style.
    pub style: Style,
    /// Children in document order.
    pub children: Vec<Node>,
    is_static: bool,
    transform: Option<Arc<dyn Transform>>,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            style: Style::default(),
            children: Vec::new(),
            is_static: false,
            transform: None,
        }
    }

    /// Create the root node.
    pub fn root(id: NodeId) -> Self {
        Self::new(id, NodeKind::Root)
    }

    /// Create a box.
    pub fn boxed(id: NodeId) -> Self {
        Self::new(id, NodeKind::Box)
    }

    /// Create a text container.
    pub fn text(id: NodeId) -> Self {
        Self::new(id, NodeKind::Text)
    }

    /// Create a nested text span.
    pub fn virtual_text(id: NodeId) -> Self {
        Self::new(id, NodeKind::VirtualText)
    }

    /// Create a text leaf.
    pub fn leaf(content: impl Into<String>) -> Self {
        Self::new(NodeId::ANONYMOUS, NodeKind::TextLeaf(content.into()))
    }

    /// A text container holding a single leaf.
    pub fn text_with(id: NodeId, content: impl Into<String>) -> Self {
        Self::text(id).child(Self::leaf(content))
    }

    /// Set the style (builder pattern).
    #[must_use]
    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Append a child (builder pattern).
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children (builder pattern).
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mark the node as static. Static content is painted once into the
    /// scrolled-off prefix of the frame and never revisited.
    #[must_use]
    pub const fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Attach a transform callback (builder pattern).
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str, usize) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Was this node created static?
    #[inline]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// The transform callback, if any.
    #[inline]
    pub fn transform(&self) -> Option<&dyn Transform> {
        self.transform.as_deref()
    }

    /// Is this a text container or span?
    #[inline]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::VirtualText)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("style", &self.style)
            .field("is_static", &self.is_static)
            .field("transform", &self.transform.is_some())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes_tree() {
        let tree = Node::root(NodeId(0))
            .child(Node::text_with(NodeId(1), "hi"))
            .child(Node::boxed(NodeId(2)).into_static());

        assert_eq!(tree.children.len(), 2);
        assert!(tree.children[0].is_text());
        assert_eq!(tree.children[0].children[0].kind, NodeKind::TextLeaf("hi".into()));
        assert!(tree.children[1].is_static());
        assert!(!tree.is_static());
    }

    #[test]
    fn test_transform_callback_invoked() {
        let node = Node::text(NodeId(1)).with_transform(|text: &str, index| {
            Ok(format!("{index}:{}", text.to_uppercase()))
        });
        let out = node.transform().unwrap().transform("abc", 3).unwrap();
        assert_eq!(out, "3:ABC");
    }
}
