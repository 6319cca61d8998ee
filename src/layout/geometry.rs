//! Geometry handed over by the layout solver.

use crate::node::NodeId;
use rustc_hash::FxHashMap;

/// A value per box edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Edges<T> {
    /// Top edge.
    pub top: T,
    /// Right edge.
    pub right: T,
    /// Bottom edge.
    pub bottom: T,
    /// Left edge.
    pub left: T,
}

impl<T: Copy> Edges<T> {
    /// Create edges in CSS order (top, right, bottom, left).
    pub const fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self { top, right, bottom, left }
    }

    /// The same value on every edge.
    pub const fn all(value: T) -> Self {
        Self::new(value, value, value, value)
    }

    /// Apply `f` to each edge.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Edges<U> {
        Edges {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }
}

/// Resolved geometry of one node, in terminal cells.
///
/// `x`/`y` are relative to the parent's top-left corner. Values arrive as
/// signed integers; negatives are clamped to zero when read.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Geometry {
    /// Left offset from the parent.
    pub x: i32,
    /// Top offset from the parent.
    pub y: i32,
    /// Border-box width.
    pub width: i32,
    /// Border-box height.
    pub height: i32,
    /// Padding per edge.
    pub padding: Edges<i32>,
    /// Border thickness per edge.
    pub border: Edges<i32>,
}

/// Clamp a solver value into the cell range.
#[inline]
fn cells(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

impl Geometry {
    /// Geometry at an offset with a size and no padding or border.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            padding: Edges::all(0),
            border: Edges::all(0),
        }
    }

    /// Set the padding (builder pattern).
    #[must_use]
    pub const fn with_padding(mut self, padding: Edges<i32>) -> Self {
        self.padding = padding;
        self
    }

    /// Set the border thickness (builder pattern).
    #[must_use]
    pub const fn with_border(mut self, border: Edges<i32>) -> Self {
        self.border = border;
        self
    }

    /// Clamped offset from the parent.
    pub fn offset(&self) -> (u16, u16) {
        (cells(self.x), cells(self.y))
    }

    /// Clamped size.
    pub fn size(&self) -> (u16, u16) {
        (cells(self.width), cells(self.height))
    }

    /// Clamped border thickness.
    pub fn border_insets(&self) -> Edges<u16> {
        self.border.map(cells)
    }

    /// Clamped border plus padding, the distance to the content box.
    pub fn content_insets(&self) -> Edges<u16> {
        let border = self.border_insets();
        let padding = self.padding.map(cells);
        Edges::new(
            border.top.saturating_add(padding.top),
            border.right.saturating_add(padding.right),
            border.bottom.saturating_add(padding.bottom),
            border.left.saturating_add(padding.left),
        )
    }
}

/// Read-only access to the solver's output for the current pass.
pub trait LayoutOracle {
    /// Geometry of a node, or `None` if the solver did not place it.
    fn geometry(&self, id: NodeId) -> Option<Geometry>;
}

impl<F> LayoutOracle for F
where
    F: Fn(NodeId) -> Option<Geometry>,
{
    fn geometry(&self, id: NodeId) -> Option<Geometry> {
        self(id)
    }
}

/// A side table of solved geometry, keyed by node id.
#[derive(Clone, Debug, Default)]
pub struct GeometryMap {
    entries: FxHashMap<NodeId, Geometry>,
}

impl GeometryMap {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the geometry of a node.
    pub fn insert(&mut self, id: NodeId, geometry: Geometry) -> &mut Self {
        self.entries.insert(id, geometry);
        self
    }

    /// Record the geometry of a node (builder pattern).
    #[must_use]
    pub fn with(mut self, id: NodeId, geometry: Geometry) -> Self {
        self.entries.insert(id, geometry);
        self
    }

    /// Number of placed nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LayoutOracle for GeometryMap {
    fn geometry(&self, id: NodeId) -> Option<Geometry> {
        self.entries.get(&id).copied()
    }
}
