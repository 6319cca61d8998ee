//! Cell: The atomic unit of the virtual grid.
//!
//! # Memory Layout
//!
//! The `Cell` struct stays at 16 bytes, four cells per cache line:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Cell Layout (16 bytes)                                      │
//! ├─────────────┬─────────────┬───────────┬───────────┬─────┬────┤
//! │  grapheme   │  len + width│    fg     │    bg     │ mod │flag│
//! │  [u8; 4]    │  u8 + u8    │  Color    │  Color    │ u8  │ u8 │
//! │  4 bytes    │  2 bytes    │  4 bytes  │  4 bytes  │ 1b  │ 1b │
//! └─────────────┴─────────────┴───────────┴───────────┴─────┴────┘
//! ```
//!
//! Graphemes longer than four UTF-8 bytes (ZWJ emoji, flags) spill into the
//! owning canvas' overflow table.

use crate::style::{Color, PaintSpec};
use bitflags::bitflags;

bitflags! {
    /// Text style modifiers.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use flexframe::Modifiers;
    /// let style = Modifiers::BOLD | Modifiers::ITALIC;
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
        /// Blinking text
        const BLINK = 0b0001_0000;
        /// Reversed colors (inverse)
        const REVERSED = 0b0010_0000;
        /// Hidden/invisible text
        const HIDDEN = 0b0100_0000;
        /// Strikethrough text
        const STRIKETHROUGH = 0b1000_0000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

bitflags! {
    /// Cell-level flags for special states.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// Grapheme overflows inline storage; check the canvas overflow table
        const OVERFLOW = 0b0000_0001;
        /// This cell is the right half of a wide character
        const WIDE_CONTINUATION = 0b0000_0010;
    }
}

impl std::fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A single grid cell.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Inline grapheme storage (UTF-8 bytes).
    /// For overflowed graphemes, this contains a u32 index.
    grapheme: [u8; 4],
    /// Byte length of the inline grapheme (0 if overflowed).
    grapheme_len: u8,
    /// Display width (0=continuation, 1=normal, 2=wide).
    display_width: u8,
    fg: Color,
    bg: Color,
    modifiers: Modifiers,
    flags: CellFlags,
}

const _: () = assert!(
    std::mem::size_of::<Cell>() == 16,
    "Cell must be exactly 16 bytes for cache efficiency"
);

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// An empty cell (space with default colors).
    pub const EMPTY: Self = Self {
        grapheme: [b' ', 0, 0, 0],
        grapheme_len: 1,
        display_width: 1,
        fg: Color::Default,
        bg: Color::Default,
        modifiers: Modifiers::empty(),
        flags: CellFlags::empty(),
    };

    /// A blank cell carrying only a background.
    #[inline]
    pub const fn blank(bg: Color) -> Self {
        Self { bg, ..Self::EMPTY }
    }

    /// Create a cell from a grapheme that fits inline.
    ///
    /// Returns `None` when the grapheme needs overflow storage.
    #[inline]
    pub fn from_grapheme(s: &str, width: u8) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > 4 {
            return None;
        }
        let mut grapheme = [0u8; 4];
        grapheme[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            grapheme,
            // at most 4
            grapheme_len: bytes.len() as u8,
            display_width: width,
            ..Self::EMPTY
        })
    }

    /// Create an overflow cell with an index to external storage.
    #[inline]
    pub const fn overflow(index: u32, display_width: u8) -> Self {
        Self {
            grapheme: index.to_le_bytes(),
            grapheme_len: 0,
            display_width,
            flags: CellFlags::OVERFLOW,
            ..Self::EMPTY
        }
    }

    /// Create the right half of a wide character.
    #[inline]
    pub const fn wide_continuation() -> Self {
        Self {
            grapheme: [0; 4],
            grapheme_len: 0,
            display_width: 0,
            flags: CellFlags::WIDE_CONTINUATION,
            ..Self::EMPTY
        }
    }

    /// Get the grapheme as a string slice.
    ///
    /// Returns `None` for overflow cells; look those up in the canvas.
    #[inline]
    pub fn grapheme(&self) -> Option<&str> {
        if self.flags.contains(CellFlags::OVERFLOW) {
            return None;
        }
        std::str::from_utf8(&self.grapheme[..self.grapheme_len as usize]).ok()
    }

    /// Get the overflow index if this is an overflow cell.
    #[inline]
    pub const fn overflow_index(&self) -> Option<u32> {
        if self.flags.contains(CellFlags::OVERFLOW) {
            Some(u32::from_le_bytes(self.grapheme))
        } else {
            None
        }
    }

    /// Check if the grapheme lives in the overflow table.
    #[inline]
    pub const fn is_overflow(&self) -> bool {
        self.flags.contains(CellFlags::OVERFLOW)
    }

    /// Check if this is a wide-character continuation.
    #[inline]
    pub const fn is_wide_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    /// Get the display width (0, 1, or 2).
    #[inline]
    pub const fn display_width(&self) -> u8 {
        self.display_width
    }

    /// Get the paint of this cell.
    #[inline]
    pub const fn paint(&self) -> PaintSpec {
        PaintSpec { fg: self.fg, bg: self.bg, modifiers: self.modifiers }
    }

    /// Set the paint (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_paint(mut self, paint: PaintSpec) -> Self {
        self.fg = paint.fg;
        self.bg = paint.bg;
        self.modifiers = paint.modifiers;
        self
    }

    /// Is this a space with no styling? Trailing cells like this are trimmed.
    #[inline]
    pub fn is_blank(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let grapheme = self.grapheme().unwrap_or("<overflow>");
        f.debug_struct("Cell")
            .field("grapheme", &grapheme)
            .field("width", &self.display_width)
            .field("fg", &self.fg)
            .field("bg", &self.bg)
            .field("modifiers", &self.modifiers)
            .field("flags", &self.flags)
            .finish()
    }
}
