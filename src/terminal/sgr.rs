//! SGR emission: Select Graphic Rendition sequences for styled text.
//!
//! Line and run text handed to the writer is self-contained: it opens the
//! attributes it needs and closes with a reset, so a write never leaks
//! styling into cells it does not cover.

use crate::buffer::Modifiers;
use crate::style::{Color, PaintSpec};
use std::fmt::Write;

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

/// Append a foreground color sequence.
pub fn push_fg(out: &mut String, color: Color) {
    let _ = match color {
        Color::Default => write!(out, "\x1b[39m"),
        Color::Indexed(n @ 0..=7) => write!(out, "\x1b[{}m", 30 + u16::from(n)),
        Color::Indexed(n @ 8..=15) => write!(out, "\x1b[{}m", 90 + u16::from(n - 8)),
        Color::Indexed(n) => write!(out, "\x1b[38;5;{n}m"),
        Color::Rgb(c) => write!(out, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b),
    };
}

/// Append a background color sequence.
pub fn push_bg(out: &mut String, color: Color) {
    let _ = match color {
        Color::Default => write!(out, "\x1b[49m"),
        Color::Indexed(n @ 0..=7) => write!(out, "\x1b[{}m", 40 + u16::from(n)),
        Color::Indexed(n @ 8..=15) => write!(out, "\x1b[{}m", 100 + u16::from(n - 8)),
        Color::Indexed(n) => write!(out, "\x1b[48;5;{n}m"),
        Color::Rgb(c) => write!(out, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b),
    };
}

/// Append SGR sequences enabling each modifier in the set.
pub fn push_modifiers(out: &mut String, modifiers: Modifiers) {
    const CODES: [(Modifiers, &str); 8] = [
        (Modifiers::BOLD, "\x1b[1m"),
        (Modifiers::DIM, "\x1b[2m"),
        (Modifiers::ITALIC, "\x1b[3m"),
        (Modifiers::UNDERLINE, "\x1b[4m"),
        (Modifiers::BLINK, "\x1b[5m"),
        (Modifiers::REVERSED, "\x1b[7m"),
        (Modifiers::HIDDEN, "\x1b[8m"),
        (Modifiers::STRIKETHROUGH, "\x1b[9m"),
    ];
    for (flag, code) in CODES {
        if modifiers.contains(flag) {
            out.push_str(code);
        }
    }
}

/// Tracks the attributes in effect while serializing one run of text.
///
/// Starts from the terminal default; [`SgrState::finish`] returns there.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrState {
    current: PaintSpec,
}

impl SgrState {
    /// Create a state at terminal defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the minimal sequences that switch from the current paint to `next`.
    ///
    /// Removing a modifier has no portable single-attribute off code, so it
    /// resets everything and re-applies the rest.
    pub fn transition(&mut self, out: &mut String, next: PaintSpec) {
        if self.current == next {
            return;
        }
        let removed = self.current.modifiers.difference(next.modifiers);
        if !removed.is_empty() {
            out.push_str(RESET);
            self.current = PaintSpec::default();
        }
        if self.current.fg != next.fg {
            push_fg(out, next.fg);
        }
        if self.current.bg != next.bg {
            push_bg(out, next.bg);
        }
        push_modifiers(out, next.modifiers.difference(self.current.modifiers));
        self.current = next;
    }

    /// Return to terminal defaults, emitting a reset only if needed.
    pub fn finish(&mut self, out: &mut String) {
        if !self.current.is_plain() {
            out.push_str(RESET);
            self.current = PaintSpec::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgb;

    #[test]
    fn test_color_forms() {
        let mut out = String::new();
        push_fg(&mut out, Color::Indexed(1));
        push_fg(&mut out, Color::Indexed(9));
        push_fg(&mut out, Color::Indexed(208));
        push_bg(&mut out, Color::Rgb(Rgb::new(1, 2, 3)));
        push_bg(&mut out, Color::Default);
        assert_eq!(out, "\x1b[31m\x1b[91m\x1b[38;5;208m\x1b[48;2;1;2;3m\x1b[49m");
    }

    #[test]
    fn test_transition_plain_is_silent() {
        let mut out = String::new();
        let mut state = SgrState::new();
        state.transition(&mut out, PaintSpec::default());
        state.finish(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_transition_removing_modifier_resets() {
        let mut out = String::new();
        let mut state = SgrState::new();
        let bold_red = PaintSpec {
            fg: Color::Indexed(1),
            modifiers: Modifiers::BOLD,
            ..PaintSpec::default()
        };
        state.transition(&mut out, bold_red);
        assert_eq!(out, "\x1b[31m\x1b[1m");

        out.clear();
        state.transition(&mut out, PaintSpec { modifiers: Modifiers::empty(), ..bold_red });
        assert_eq!(out, "\x1b[0m\x1b[31m");

        out.clear();
        state.finish(&mut out);
        assert_eq!(out, RESET);
    }
}
