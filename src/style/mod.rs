//! Style module: Node styles, colors, borders and paint resolution.
//!
//! This module contains:
//! - [`Style`]: The paint-relevant subset of a node's style. Flex properties
//!   belong to the layout oracle and never reach this crate.
//! - [`Color`]: Terminal colors and spec parsing
//! - [`BorderStyle`]: Named border glyph table
//! - [`PaintSpec`] and [`resolve`]: Final per-node paint after inheritance

mod border;
mod color;
mod resolve;

pub use border::{BorderChars, BorderStyle};
pub use color::{colorize, Color, ColorTarget, Rgb};
pub use resolve::{resolve, PaintSpec};
pub(crate) use resolve::inherited_background;

use crate::buffer::Modifiers;
use crate::layout::Edges;

/// Whether a node takes part in layout and paint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Display {
    /// Laid out and painted.
    #[default]
    Flex,
    /// Skipped together with its subtree.
    None,
}

/// Overflow handling on one axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Overflow {
    /// Descendants may paint outside the box.
    #[default]
    Visible,
    /// Descendants are clipped to the box minus its border.
    Hidden,
}

/// How text wider than its box is shaped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TextWrap {
    /// Leave lines alone; the content rectangle clips them.
    None,
    /// Hard-wrap at word boundaries, breaking words longer than the width.
    #[default]
    Wrap,
    /// Keep the start, replace the tail with an ellipsis.
    TruncateEnd,
    /// Keep both ends, ellipsis in the middle.
    TruncateMiddle,
    /// Keep the end, replace the head with an ellipsis.
    TruncateStart,
}

/// Paint-relevant style of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Style {
    /// `display`.
    pub display: Display,
    /// Horizontal overflow.
    pub overflow_x: Overflow,
    /// Vertical overflow.
    pub overflow_y: Overflow,
    /// Shaping mode for text nodes.
    pub text_wrap: TextWrap,
    /// Foreground color.
    pub color: Option<Color>,
    /// Background color. Propagates to descendants.
    pub background_color: Option<Color>,
    /// Bold, italic, underline, strikethrough, inverse, dim.
    pub modifiers: Modifiers,
    /// Border glyph set, if the box draws a border.
    pub border_style: Option<BorderStyle>,
    /// Which border edges are drawn.
    pub border_edges: Edges<bool>,
    /// Per-edge border color.
    pub border_color: Edges<Option<Color>>,
    /// Per-edge dim flag for the border.
    pub border_dim: Edges<bool>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            display: Display::Flex,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            text_wrap: TextWrap::Wrap,
            color: None,
            background_color: None,
            modifiers: Modifiers::empty(),
            border_style: None,
            border_edges: Edges::all(true),
            border_color: Edges::all(None),
            border_dim: Edges::all(false),
        }
    }
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide the node (`display: none`).
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.display = Display::None;
        self
    }

    /// Set the foreground from a color spec. Malformed specs are ignored.
    #[must_use]
    pub fn color(mut self, spec: &str) -> Self {
        self.color = Color::parse_or_warn(spec);
        self
    }

    /// Set the background from a color spec. Malformed specs are ignored.
    #[must_use]
    pub fn background(mut self, spec: &str) -> Self {
        self.background_color = Color::parse_or_warn(spec);
        self
    }

    /// Add text modifiers.
    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Set the text shaping mode.
    #[must_use]
    pub const fn wrap(mut self, mode: TextWrap) -> Self {
        self.text_wrap = mode;
        self
    }

    /// Clip descendants on both axes.
    #[must_use]
    pub const fn overflow_hidden(mut self) -> Self {
        self.overflow_x = Overflow::Hidden;
        self.overflow_y = Overflow::Hidden;
        self
    }

    /// Draw a border with the given style on every edge.
    #[must_use]
    pub const fn border(mut self, style: BorderStyle) -> Self {
        self.border_style = Some(style);
        self
    }

    /// Set which border edges are drawn.
    #[must_use]
    pub const fn border_edges(mut self, edges: Edges<bool>) -> Self {
        self.border_edges = edges;
        self
    }

    /// Color every border edge from a spec.
    #[must_use]
    pub fn border_color(mut self, spec: &str) -> Self {
        self.border_color = Edges::all(Color::parse_or_warn(spec));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_border_edges_on() {
        let style = Style::new().border(BorderStyle::Single);
        assert!(style.border_edges.top && style.border_edges.left);
    }

    #[test]
    fn test_malformed_color_is_ignored() {
        let style = Style::new().color("rgb(1,2)").background("blue");
        assert_eq!(style.color, None);
        assert_eq!(style.background_color, Some(Color::Indexed(4)));
    }
}
