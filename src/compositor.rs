//! Compositor: Paints a laid-out node tree into a [`Frame`].
//!
//! The walk is pre-order and geometry-driven. Parents paint before their
//! children, so a child's ink always sits on top of the parent's fill, and
//! later siblings overwrite earlier ones where they overlap.
//!
//! Static nodes are painted once, on their own canvas, the first pass they
//! are seen. Their rows are appended to the frame's static prefix and the
//! node id is remembered so the node is never painted again.

use crate::buffer::{Canvas, Cell, Frame, Line, Modifiers};
use crate::error::{RenderError, Result};
use crate::layout::{Geometry, LayoutOracle, Rect};
use crate::node::{Node, NodeId, NodeKind};
use crate::style::{inherited_background, resolve, BorderChars, Color, Display, Overflow, PaintSpec, Style};
use crate::text::ansi::{grapheme_width, render_graphemes, split_lines, styled_graphemes, StyledGrapheme};
use crate::text::TextCache;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Compositor state that outlives a pass: the static prefix painted so far.
#[derive(Debug, Default)]
pub struct Compositor {
    committed: FxHashSet<NodeId>,
    static_lines: Arc<Vec<Line>>,
}

/// The result of compositing one tree, not yet committed.
#[derive(Debug)]
pub struct Composition {
    /// The composited frame.
    pub frame: Frame,
    /// Static nodes painted for the first time in this frame.
    pub newly_static: Vec<NodeId>,
}

/// A static node found during the walk, waiting for its own canvas.
struct PendingStatic<'t> {
    node: &'t Node,
    x: u16,
    inherited_bg: Option<Color>,
}

impl Compositor {
    /// Create a compositor with an empty static prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in the committed static prefix.
    pub fn static_rows(&self) -> usize {
        self.static_lines.len()
    }

    /// Has the static node `id` been painted?
    pub fn is_committed(&self, id: NodeId) -> bool {
        self.committed.contains(&id)
    }

    /// Paint `tree` using the geometry from `oracle`.
    ///
    /// Compositor state is left untouched; pass the result to
    /// [`Compositor::commit`] once it has been written.
    ///
    /// # Errors
    ///
    /// [`RenderError::Transform`] if a transform callback fails.
    pub fn composite(&self, tree: &Node, oracle: &dyn LayoutOracle, text: &mut TextCache) -> Result<Composition> {
        let root = oracle.geometry(tree.id).unwrap_or_else(|| {
            warn!(node = %tree.id, "no geometry for root, compositing an empty frame");
            Geometry::default()
        });
        let (width, height) = root.size();
        let mut canvas = Canvas::new(width, height);
        let mut pending = Vec::new();

        if tree.style.display != Display::None {
            let mut painter = Painter { oracle, text, canvas: &mut canvas, pending: Some(&mut pending) };
            let clip = painter.canvas.bounds();
            painter.paint_at(tree, Rect::new(0, 0, width, height), clip, None)?;
        }

        let mut newly_static = Vec::new();
        let mut appended = Vec::new();
        for entry in pending {
            if self.committed.contains(&entry.node.id) {
                continue;
            }
            let Some(geometry) = oracle.geometry(entry.node.id) else {
                warn!(node = %entry.node.id, "no geometry for static node, deferring");
                continue;
            };
            let (_, node_height) = geometry.size();
            let rect = Rect::new(entry.x, 0, geometry.size().0, node_height);
            let mut static_canvas = Canvas::new(width.max(rect.right()), node_height);
            let clip = static_canvas.bounds();
            let mut painter = Painter { oracle, text, canvas: &mut static_canvas, pending: None };
            painter.paint_at(entry.node, rect, clip, entry.inherited_bg)?;
            appended.extend(static_canvas.to_lines());
            newly_static.push(entry.node.id);
        }

        let static_lines = if appended.is_empty() {
            Arc::clone(&self.static_lines)
        } else {
            let mut lines = Vec::with_capacity(self.static_lines.len() + appended.len());
            lines.extend_from_slice(&self.static_lines);
            lines.extend(appended);
            Arc::new(lines)
        };

        Ok(Composition {
            frame: Frame::new(static_lines, canvas.to_lines()),
            newly_static,
        })
    }

    /// Record a composition as painted and return its frame.
    pub fn commit(&mut self, composition: Composition) -> Frame {
        let Composition { frame, newly_static } = composition;
        if !newly_static.is_empty() {
            debug!(nodes = newly_static.len(), rows = frame.static_rows(), "static content committed");
        }
        self.committed.extend(newly_static);
        self.static_lines = Arc::clone(frame.static_handle());
        frame
    }
}

/// Walk state for one canvas.
struct Painter<'a, 't> {
    oracle: &'a dyn LayoutOracle,
    text: &'a mut TextCache,
    canvas: &'a mut Canvas,
    /// Where static nodes are collected; `None` while painting one.
    pending: Option<&'a mut Vec<PendingStatic<'t>>>,
}

impl<'t> Painter<'_, 't> {
    /// Paint a child of a node whose border box starts at `origin`.
    fn paint_child(&mut self, node: &'t Node, origin: (u16, u16), clip: Rect, inherited_bg: Option<Color>) -> Result<()> {
        if node.style.display == Display::None {
            return Ok(());
        }
        if !matches!(node.kind, NodeKind::Root | NodeKind::Box | NodeKind::Text) {
            return Ok(());
        }
        if node.is_static() {
            if let Some(pending) = self.pending.as_deref_mut() {
                let x = self.oracle.geometry(node.id).map_or(origin.0, |g| origin.0.saturating_add(g.offset().0));
                pending.push(PendingStatic { node, x, inherited_bg });
                return Ok(());
            }
        }
        let Some(geometry) = self.oracle.geometry(node.id) else {
            warn!(node = %node.id, "no geometry for visible node, skipping subtree");
            return Ok(());
        };
        let (dx, dy) = geometry.offset();
        let (width, height) = geometry.size();
        let rect = Rect::new(origin.0.saturating_add(dx), origin.1.saturating_add(dy), width, height);
        self.paint_at(node, rect, clip, inherited_bg)
    }

    /// Paint `node` with its border box at `rect`.
    fn paint_at(&mut self, node: &'t Node, rect: Rect, clip: Rect, inherited_bg: Option<Color>) -> Result<()> {
        let geometry = self.oracle.geometry(node.id).unwrap_or_default();
        let paint = resolve(&node.style, inherited_bg);
        let padding_box = rect.inset(geometry.border_insets());

        if node.kind == NodeKind::Text {
            let content = rect.inset(geometry.content_insets());
            return self.paint_text(node, content, clip, paint);
        }

        if let Some(bg) = node.style.background_color {
            self.canvas.fill_rect(padding_box, clip, Cell::blank(bg));
        }
        if let Some(border) = node.style.border_style {
            self.paint_border(&node.style, border.chars(), rect, clip, inherited_bg);
        }

        let child_clip = clip_children(&node.style, padding_box, clip);
        let child_bg = inherited_background(&node.style, inherited_bg);
        for child in &node.children {
            self.paint_child(child, (rect.x, rect.y), child_clip, child_bg)?;
        }
        Ok(())
    }

    /// Squash, shape and paint a text node into its content box.
    fn paint_text(&mut self, node: &Node, content: Rect, clip: Rect, paint: PaintSpec) -> Result<()> {
        if content.is_empty() {
            return Ok(());
        }
        let squashed = self.text.squash(node)?;
        let max_width = usize::from(content.width);
        let shaped = if self.text.measurements.measure(&squashed).width > max_width {
            self.text.measurements.shape(&squashed, max_width, node.style.text_wrap)
        } else {
            squashed
        };

        let transformed;
        let source: &str = match node.transform() {
            Some(transform) if !shaped.is_empty() => {
                let graphemes = styled_graphemes(&shaped, PaintSpec::PLAIN);
                let mut lines = Vec::new();
                for (index, line) in split_lines(&graphemes).enumerate() {
                    let line = transform
                        .transform(&render_graphemes(line), index)
                        .map_err(|source| RenderError::Transform { node: node.id, source })?;
                    lines.push(line);
                }
                transformed = lines.join("\n");
                &transformed
            }
            _ => &shaped,
        };

        let clip = clip.intersection(&content);
        let graphemes = styled_graphemes(source, paint);
        for (row, line) in split_lines(&graphemes).enumerate() {
            let Some(y) = u16::try_from(row).ok().and_then(|row| content.y.checked_add(row)) else {
                break;
            };
            if y >= content.bottom() {
                break;
            }
            self.paint_line(line, content.x, y, content.right(), clip);
        }
        Ok(())
    }

    fn paint_line(&mut self, line: &[StyledGrapheme<'_>], x: u16, y: u16, right: u16, clip: Rect) {
        let mut x = x;
        for g in line {
            if x >= right {
                break;
            }
            // At most 2, by construction of the width table.
            let width = u8::try_from(g.width).unwrap_or(2);
            if width == 0 {
                continue;
            }
            self.canvas.set_grapheme(x, y, g.grapheme, width, g.paint, clip);
            x = x.saturating_add(u16::from(width));
        }
    }

    /// Draw the border glyphs of a box. Edges that are turned off are
    /// skipped along with the corners they would own.
    fn paint_border(&mut self, style: &Style, chars: BorderChars, rect: Rect, clip: Rect, inherited_bg: Option<Color>) {
        if rect.intersection(&clip).is_empty() {
            return;
        }
        let edges = style.border_edges;
        let bg = inherited_bg.unwrap_or_default();
        let edge_paint = |color: Option<Color>, dim: bool| PaintSpec {
            fg: color.unwrap_or_default(),
            bg,
            modifiers: if dim { Modifiers::DIM } else { Modifiers::empty() },
        };

        let left_width = u16::from(edges.left);
        let right_width = u16::from(edges.right);
        let inner_width = rect.width.saturating_sub(left_width).saturating_sub(right_width);
        let last_row = rect.bottom().saturating_sub(1);
        let last_col = rect.right().saturating_sub(1);

        if edges.top {
            let paint = edge_paint(style.border_color.top, style.border_dim.top);
            self.paint_horizontal(rect.x, rect.y, edges.left.then_some(chars.top_left), chars.top, inner_width, edges.right.then_some(chars.top_right), paint, clip);
        }
        if edges.bottom && (rect.height > 1 || !edges.top) {
            let paint = edge_paint(style.border_color.bottom, style.border_dim.bottom);
            self.paint_horizontal(rect.x, last_row, edges.left.then_some(chars.bottom_left), chars.bottom, inner_width, edges.right.then_some(chars.bottom_right), paint, clip);
        }

        let first_inner = rect.y.saturating_add(u16::from(edges.top));
        let end_inner = rect.bottom().saturating_sub(u16::from(edges.bottom)).max(first_inner);
        if edges.left {
            let paint = edge_paint(style.border_color.left, style.border_dim.left);
            for y in first_inner..end_inner {
                self.put_char(rect.x, y, chars.left, paint, clip);
            }
        }
        if edges.right && (rect.width > 1 || !edges.left) {
            let paint = edge_paint(style.border_color.right, style.border_dim.right);
            for y in first_inner..end_inner {
                self.put_char(last_col, y, chars.right, paint, clip);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_horizontal(&mut self, x: u16, y: u16, start: Option<char>, fill: char, count: u16, end: Option<char>, paint: PaintSpec, clip: Rect) {
        let mut x = x;
        if let Some(corner) = start {
            self.put_char(x, y, corner, paint, clip);
            x = x.saturating_add(1);
        }
        for _ in 0..count {
            self.put_char(x, y, fill, paint, clip);
            x = x.saturating_add(1);
        }
        if let Some(corner) = end {
            self.put_char(x, y, corner, paint, clip);
        }
    }

    fn put_char(&mut self, x: u16, y: u16, ch: char, paint: PaintSpec, clip: Rect) {
        let mut buf = [0u8; 4];
        let glyph = ch.encode_utf8(&mut buf);
        let width = u8::try_from(grapheme_width(glyph)).unwrap_or(1);
        self.canvas.set_grapheme(x, y, glyph, width, paint, clip);
    }
}

/// Clip for the children of a box: its padding box on each hidden axis,
/// intersected with the enclosing clip.
fn clip_children(style: &Style, padding_box: Rect, clip: Rect) -> Rect {
    let mut bounds = clip;
    if style.overflow_x == Overflow::Hidden {
        bounds.x = padding_box.x;
        bounds.width = padding_box.width;
    }
    if style.overflow_y == Overflow::Hidden {
        bounds.y = padding_box.y;
        bounds.height = padding_box.height;
    }
    bounds.intersection(&clip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Edges, GeometryMap};
    use crate::node::BoxError;
    use crate::style::{BorderStyle, TextWrap};

    fn composite(tree: &Node, layout: &GeometryMap) -> Frame {
        let compositor = Compositor::new();
        compositor.composite(tree, layout, &mut TextCache::new()).unwrap().frame
    }

    #[test]
    fn test_wide_glyph_clipped_without_gap() {
        // A 2-wide box holding one wide emoji, followed by "|".
        let tree = Node::root(NodeId(0))
            .child(Node::boxed(NodeId(1)).child(Node::text_with(NodeId(2), "🦄")))
            .child(Node::text_with(NodeId(3), "|"));
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 10, 1))
            .with(NodeId(1), Geometry::new(0, 0, 2, 1))
            .with(NodeId(2), Geometry::new(0, 0, 2, 1))
            .with(NodeId(3), Geometry::new(2, 0, 1, 1));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["🦄|"]);
    }

    #[test]
    fn test_display_none_contributes_nothing() {
        let tree = Node::root(NodeId(0))
            .child(Node::boxed(NodeId(1)).styled(Style::new().hidden()).child(Node::text_with(NodeId(2), "Kitty!")))
            .child(Node::text_with(NodeId(3), "Doggo"));
        // The solver gives hidden nodes no geometry.
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 10, 1))
            .with(NodeId(3), Geometry::new(0, 0, 5, 1));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["Doggo"]);
    }

    #[test]
    fn test_gap_between_children() {
        let tree = Node::root(NodeId(0))
            .child(Node::text_with(NodeId(1), "A"))
            .child(Node::text_with(NodeId(2), "B"));
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 3, 1))
            .with(NodeId(1), Geometry::new(0, 0, 1, 1))
            .with(NodeId(2), Geometry::new(2, 0, 1, 1));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["A B"]);
    }

    #[test]
    fn test_background_fills_inside_border() {
        let tree = Node::root(NodeId(0)).child(
            Node::boxed(NodeId(1))
                .styled(Style::new().background("blue").border(BorderStyle::Single))
                .child(Node::text_with(NodeId(2), "hi")),
        );
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 6, 3))
            .with(NodeId(1), Geometry::new(0, 0, 6, 3).with_border(Edges::all(1)))
            .with(NodeId(2), Geometry::new(1, 1, 2, 1));
        let frame = composite(&tree, &layout);
        assert_eq!(frame.plain_lines(), vec!["┌────┐", "│hi  │", "└────┘"]);

        let middle = &frame.dynamic_lines()[1];
        let blue = Color::Indexed(4);
        // Border glyphs keep the inherited background; the interior is blue
        // and the text inherits it.
        assert_eq!(middle.segments()[0].paint.bg, Color::Default);
        assert_eq!(middle.segments()[1].text, "hi  ");
        assert_eq!(middle.segments()[1].paint.bg, blue);
    }

    #[test]
    fn test_border_edges_toggle() {
        let tree = Node::root(NodeId(0)).child(
            Node::boxed(NodeId(1))
                .styled(Style::new().border(BorderStyle::Round).border_edges(Edges::new(true, false, true, false))),
        );
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 3, 2))
            .with(NodeId(1), Geometry::new(0, 0, 3, 2).with_border(Edges::new(1, 0, 1, 0)));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["───", "───"]);
    }

    #[test]
    fn test_overflow_hidden_clips_children() {
        let tree = Node::root(NodeId(0)).child(
            Node::boxed(NodeId(1))
                .styled(Style::new().overflow_hidden())
                .child(Node::text_with(NodeId(2), "abcdef").styled(Style::new().wrap(TextWrap::None))),
        );
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 10, 2))
            .with(NodeId(1), Geometry::new(1, 0, 3, 1))
            .with(NodeId(2), Geometry::new(-2, 0, 6, 1));
        // The child sits at x = 1 after clamping; the box clips it to 3 cells.
        assert_eq!(composite(&tree, &layout).plain_lines(), vec![" abc", ""]);
    }

    #[test]
    fn test_text_wraps_to_content_width() {
        let tree = Node::root(NodeId(0)).child(Node::text_with(NodeId(1), "hello world"));
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 5, 3))
            .with(NodeId(1), Geometry::new(0, 0, 5, 3));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["hello", "", "world"]);
    }

    #[test]
    fn test_text_transform_runs_per_line() {
        let tree = Node::root(NodeId(0)).child(
            Node::text_with(NodeId(1), "a\nb").with_transform(|line: &str, index| Ok(format!("{index}{line}"))),
        );
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 4, 2))
            .with(NodeId(1), Geometry::new(0, 0, 4, 2));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["0a", "1b"]);
    }

    #[test]
    fn test_empty_text_skips_transform() {
        let tree = Node::root(NodeId(0))
            .child(Node::text(NodeId(1)).with_transform(|line: &str, _| Ok(format!("> {line}"))));
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 4, 1))
            .with(NodeId(1), Geometry::new(0, 0, 4, 1));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec![""]);
    }

    #[test]
    fn test_border_far_below_canvas_is_clipped() {
        let tree = Node::root(NodeId(0))
            .child(Node::boxed(NodeId(1)).styled(Style::new().border(BorderStyle::Single)))
            .child(Node::text_with(NodeId(2), "ok"));
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 4, 2))
            .with(NodeId(1), Geometry::new(0, 70_000, 4, 2).with_border(Edges::all(1)))
            .with(NodeId(2), Geometry::new(0, 0, 2, 1));
        assert_eq!(composite(&tree, &layout).plain_lines(), vec!["ok", ""]);
    }

    #[test]
    fn test_transform_error_aborts() {
        let tree = Node::root(NodeId(0)).child(
            Node::text_with(NodeId(1), "x").with_transform(|_: &str, _| Err::<String, BoxError>("nope".into())),
        );
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 4, 1))
            .with(NodeId(1), Geometry::new(0, 0, 4, 1));
        let err = Compositor::new().composite(&tree, &layout, &mut TextCache::new()).unwrap_err();
        assert!(matches!(err, RenderError::Transform { node: NodeId(1), .. }));
    }

    #[test]
    fn test_static_nodes_painted_once() {
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 10, 1))
            .with(NodeId(1), Geometry::new(0, 0, 10, 1))
            .with(NodeId(2), Geometry::new(0, 0, 10, 1))
            .with(NodeId(9), Geometry::new(0, 0, 10, 1));
        let mut compositor = Compositor::new();
        let mut text = TextCache::new();

        let first = Node::root(NodeId(0))
            .child(Node::text_with(NodeId(1), "line 1").into_static())
            .child(Node::text_with(NodeId(9), "working"));
        let frame = compositor.commit(compositor.composite(&first, &layout, &mut text).unwrap());
        assert_eq!(frame.plain_lines(), vec!["line 1", "working"]);
        assert_eq!(frame.static_rows(), 1);

        // The same static node with new content is not repainted.
        text.advance_epoch();
        let second = Node::root(NodeId(0))
            .child(Node::text_with(NodeId(1), "CHANGED").into_static())
            .child(Node::text_with(NodeId(2), "line 2").into_static())
            .child(Node::text_with(NodeId(9), "done"));
        let frame = compositor.commit(compositor.composite(&second, &layout, &mut text).unwrap());
        assert_eq!(frame.plain_lines(), vec!["line 1", "line 2", "done"]);
        assert_eq!(frame.static_rows(), 2);
        assert!(compositor.is_committed(NodeId(2)));
    }

    #[test]
    fn test_uncommitted_composition_leaves_state() {
        let layout = GeometryMap::new()
            .with(NodeId(0), Geometry::new(0, 0, 4, 0))
            .with(NodeId(1), Geometry::new(0, 0, 4, 1));
        let tree = Node::root(NodeId(0)).child(Node::text_with(NodeId(1), "log").into_static());
        let compositor = Compositor::new();
        let composition = compositor.composite(&tree, &layout, &mut TextCache::new()).unwrap();
        assert_eq!(composition.frame.static_rows(), 1);
        assert_eq!(compositor.static_rows(), 0);
        assert!(!compositor.is_committed(NodeId(1)));
    }
}
