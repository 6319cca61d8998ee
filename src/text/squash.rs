//! Squashing: flatten a text subtree into one string.
//!
//! Nested spans are serialized relative to their parent's paint, so the
//! result of a node never depends on where it sits in the tree. That keeps
//! one cache entry per node valid for both measuring and painting.

use super::ansi::{render_graphemes, styled_graphemes};
use super::cache::SquashCache;
use crate::error::{RenderError, Result};
use crate::node::{Node, NodeKind};
use crate::style::{Display, PaintSpec};
use std::sync::Arc;

/// Concatenate the text below `node` in document order.
///
/// Each nested text node is squashed first, then passed through its own
/// transform (with its index among its siblings), then wrapped in its own
/// style. Empty spans skip their transform. The transform of `node` itself
/// is not applied here. Returns an empty string when there is no text below
/// `node`.
///
/// # Errors
///
/// [`RenderError::Transform`] if any nested transform fails.
pub fn squash(node: &Node, cache: &mut SquashCache) -> Result<Arc<str>> {
    if let Some(hit) = cache.get(node.id) {
        return Ok(hit);
    }

    let mut out = String::new();
    for (index, child) in node.children.iter().enumerate() {
        if child.style.display == Display::None {
            continue;
        }
        match &child.kind {
            NodeKind::TextLeaf(content) => out.push_str(content),
            NodeKind::Text | NodeKind::VirtualText => {
                let mut text = squash(child, cache)?;
                if let Some(transform) = child.transform().filter(|_| !text.is_empty()) {
                    text = transform
                        .transform(&text, index)
                        .map_err(|source| RenderError::Transform { node: child.id, source })?
                        .into();
                }
                push_styled(&mut out, &text, PaintSpec::PLAIN.overlay(&child.style));
            }
            // Boxes cannot nest inside text.
            NodeKind::Root | NodeKind::Box => {}
        }
    }

    let squashed: Arc<str> = out.into();
    cache.insert(node.id, Arc::clone(&squashed));
    Ok(squashed)
}

/// Append `text` styled with `paint`, restoring the enclosing paint after.
fn push_styled(out: &mut String, text: &str, paint: PaintSpec) {
    if paint.is_plain() {
        out.push_str(text);
    } else {
        out.push_str(&render_graphemes(&styled_graphemes(text, paint)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Modifiers;
    use crate::node::{BoxError, NodeId};
    use crate::style::Style;

    #[test]
    fn test_squash_concatenates_in_order() {
        let node = Node::text(NodeId(1))
            .child(Node::leaf("Hello"))
            .child(Node::virtual_text(NodeId(2)).child(Node::leaf(", ")))
            .child(Node::leaf("world"));
        let mut cache = SquashCache::new();
        assert_eq!(&*squash(&node, &mut cache).unwrap(), "Hello, world");
    }

    #[test]
    fn test_squash_empty() {
        let mut cache = SquashCache::new();
        assert_eq!(&*squash(&Node::text(NodeId(1)), &mut cache).unwrap(), "");
    }

    #[test]
    fn test_transforms_compose_innermost_first() {
        let inner = Node::virtual_text(NodeId(3))
            .child(Node::leaf("x"))
            .with_transform(|text: &str, _| Ok(format!("[{text}]")));
        let outer = Node::virtual_text(NodeId(2))
            .child(inner)
            .with_transform(|text: &str, index| Ok(format!("{index}({text})")));
        let node = Node::text(NodeId(1)).child(Node::leaf("a")).child(outer);

        let mut cache = SquashCache::new();
        assert_eq!(&*squash(&node, &mut cache).unwrap(), "a1([x])");
    }

    #[test]
    fn test_nested_style_is_relative_to_parent() {
        let span = Node::virtual_text(NodeId(2))
            .styled(Style::new().color("red").modifiers(Modifiers::BOLD))
            .child(Node::leaf("hot"));
        let node = Node::text(NodeId(1)).child(span).child(Node::leaf("!"));

        let mut cache = SquashCache::new();
        assert_eq!(&*squash(&node, &mut cache).unwrap(), "\x1b[31m\x1b[1mhot\x1b[0m!");
    }

    #[test]
    fn test_empty_span_skips_transform() {
        let node = Node::text(NodeId(1))
            .child(Node::leaf("a"))
            .child(Node::virtual_text(NodeId(2)).with_transform(|text: &str, _| Ok(format!("> {text}"))));
        let mut cache = SquashCache::new();
        assert_eq!(&*squash(&node, &mut cache).unwrap(), "a");
    }

    #[test]
    fn test_hidden_spans_skipped() {
        let node = Node::text(NodeId(1))
            .child(Node::virtual_text(NodeId(2)).styled(Style::new().hidden()).child(Node::leaf("no")))
            .child(Node::leaf("yes"));
        let mut cache = SquashCache::new();
        assert_eq!(&*squash(&node, &mut cache).unwrap(), "yes");
    }

    #[test]
    fn test_cached_within_epoch() {
        let node = Node::text_with(NodeId(1), "once");
        let mut cache = SquashCache::new();
        let first = squash(&node, &mut cache).unwrap();
        let second = squash(&node, &mut cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.advance();
        let third = squash(&node, &mut cache).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
    }

    #[test]
    fn test_transform_error_names_node() {
        let node = Node::text(NodeId(1)).child(
            Node::virtual_text(NodeId(9))
                .child(Node::leaf("x"))
                .with_transform(|_: &str, _| Err::<String, BoxError>("boom".into())),
        );
        let mut cache = SquashCache::new();
        let err = squash(&node, &mut cache).unwrap_err();
        assert!(matches!(err, RenderError::Transform { node: NodeId(9), .. }));
    }
}
