//! Style resolution: merge a node's style with what it inherits.

use super::{Color, Style};
use crate::buffer::Modifiers;

/// Final paint for a run of cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct PaintSpec {
    /// Glyph color.
    pub fg: Color,
    /// Cell background.
    pub bg: Color,
    /// Attribute flags.
    pub modifiers: Modifiers,
}

impl PaintSpec {
    /// Terminal defaults, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        modifiers: Modifiers::empty(),
    };

    /// Does this paint emit no SGR at all?
    #[inline]
    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }

    /// Layer a nested style on top of this paint. Unset fields pass through.
    #[must_use]
    pub fn overlay(self, style: &Style) -> Self {
        Self {
            fg: style.color.unwrap_or(self.fg),
            bg: style.background_color.unwrap_or(self.bg),
            modifiers: self.modifiers | style.modifiers,
        }
    }
}

/// Resolve a node's paint given the background inherited from its ancestors.
///
/// The background falls back to the inherited one; foreground and
/// attributes never inherit across boxes. Absent fields resolve to plain.
pub fn resolve(style: &Style, inherited_background: Option<Color>) -> PaintSpec {
    PaintSpec {
        fg: style.color.unwrap_or_default(),
        bg: style
            .background_color
            .or(inherited_background)
            .unwrap_or_default(),
        modifiers: style.modifiers,
    }
}

/// Background handed to a node's children.
#[inline]
pub(crate) fn inherited_background(style: &Style, inherited: Option<Color>) -> Option<Color> {
    style.background_color.or(inherited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain() {
        assert!(resolve(&Style::new(), None).is_plain());
    }

    #[test]
    fn test_background_inherits_until_overridden() {
        let blue = Some(Color::Indexed(4));
        let own = Style::new().background("red");

        assert_eq!(resolve(&Style::new(), blue).bg, Color::Indexed(4));
        assert_eq!(resolve(&own, blue).bg, Color::Indexed(1));
        assert_eq!(inherited_background(&own, blue), Some(Color::Indexed(1)));
        assert_eq!(inherited_background(&Style::new(), blue), blue);
    }

    #[test]
    fn test_overlay_merges_modifiers() {
        let base = PaintSpec { modifiers: Modifiers::BOLD, ..PaintSpec::PLAIN };
        let nested = Style::new().color("green").modifiers(Modifiers::ITALIC);
        let merged = base.overlay(&nested);
        assert_eq!(merged.fg, Color::Indexed(2));
        assert_eq!(merged.modifiers, Modifiers::BOLD | Modifiers::ITALIC);
    }
}
