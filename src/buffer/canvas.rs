//! Canvas: The grid a compositing pass paints into.
//!
//! The canvas uses contiguous memory allocation for cache efficiency.
//! Cells are stored in row-major order. Once painting is done the grid is
//! folded into [`Line`]s and dropped.

use super::cell::Cell;
use super::frame::{Line, StyledSegment};
use crate::layout::Rect;
use crate::style::PaintSpec;
use std::collections::HashMap;

/// A grid of cells for one compositing pass.
///
/// Access is in row-major order: `index = y * width + x`.
///
/// # Overflow Storage
///
/// Complex graphemes (> 4 bytes) are stored in a separate `HashMap`.
/// The cell contains an index into this overflow storage when the
/// `OVERFLOW` flag is set.
#[derive(Clone)]
pub struct Canvas {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    width: u16,
    height: u16,
    /// Overflow storage for complex graphemes.
    overflow: HashMap<u32, String>,
    /// Next overflow index to assign.
    next_overflow_index: u32,
}

impl Canvas {
    /// Create a canvas with every cell empty. Zero dimensions are allowed.
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            cells: vec![Cell::EMPTY; size],
            width,
            height,
            overflow: HashMap::new(),
            next_overflow_index: 0,
        }
    }

    /// The whole canvas as a rectangle at the origin.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Convert (x, y) coordinates to a linear index.
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(usize::from(y) * usize::from(self.width) + usize::from(x))
        } else {
            None
        }
    }

    /// Get a reference to a cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Get the grapheme at (x, y), including overflow lookup.
    ///
    /// Returns `None` if out of bounds or if it's a continuation cell.
    pub fn get_grapheme(&self, x: u16, y: u16) -> Option<&str> {
        let cell = self.get(x, y)?;
        self.grapheme_of(cell)
    }

    fn grapheme_of<'a>(&'a self, cell: &'a Cell) -> Option<&'a str> {
        if cell.is_wide_continuation() {
            return None;
        }
        match cell.overflow_index() {
            Some(index) => self.overflow.get(&index).map(String::as_str),
            None => cell.grapheme(),
        }
    }

    /// Paint a grapheme at (x, y) if it fits entirely inside `clip`.
    ///
    /// A wide grapheme that would straddle the clip's right edge is dropped.
    /// Overwriting either half of an existing wide grapheme blanks the other
    /// half. Returns the width written, or 0 if nothing was painted.
    pub fn set_grapheme(&mut self, x: u16, y: u16, grapheme: &str, width: u8, paint: PaintSpec, clip: Rect) -> u8 {
        if width == 0 {
            return 0;
        }
        let clip = clip.intersection(&self.bounds());
        let last = x.saturating_add(u16::from(width) - 1);
        if !clip.contains(x, y) || !clip.contains(last, y) {
            return 0;
        }

        self.break_wide_neighbors(x, last, y);

        let cell = Cell::from_grapheme(grapheme, width).unwrap_or_else(|| {
            let index = self.next_overflow_index;
            self.next_overflow_index += 1;
            self.overflow.insert(index, grapheme.to_owned());
            Cell::overflow(index, width)
        });
        self.put(x, y, cell.with_paint(paint));

        if width == 2 {
            self.put(x + 1, y, Cell::wide_continuation().with_paint(paint));
        }
        width
    }

    /// Fill the part of `rect` inside `clip` with `cell`.
    pub fn fill_rect(&mut self, rect: Rect, clip: Rect, cell: Cell) {
        let area = rect.intersection(&clip).intersection(&self.bounds());
        if area.is_empty() {
            return;
        }
        for y in area.y..area.bottom() {
            self.break_wide_neighbors(area.x, area.right() - 1, y);
            for x in area.x..area.right() {
                self.put(x, y, cell);
            }
        }
    }

    /// Blank wide graphemes that extend past either end of `[first, last]`.
    fn break_wide_neighbors(&mut self, first: u16, last: u16, y: u16) {
        if self.get(first, y).is_some_and(Cell::is_wide_continuation) && first > 0 {
            self.blank_keep_background(first - 1, y);
        }
        if self.get(last, y).is_some_and(|cell| cell.display_width() == 2) {
            self.blank_keep_background(last + 1, y);
        }
    }

    fn blank_keep_background(&mut self, x: u16, y: u16) {
        if let Some(index) = self.index_of(x, y) {
            let bg = self.cells[index].paint().bg;
            self.cells[index] = Cell::blank(bg);
        }
    }

    #[inline]
    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(index) = self.index_of(x, y) {
            self.cells[index] = cell;
        }
    }

    /// Get an iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(usize::from(self.width.max(1)))
    }

    /// Fold the grid into lines of styled segments.
    ///
    /// Every row becomes one line; trailing unstyled blanks are dropped.
    pub fn to_lines(&self) -> Vec<Line> {
        if self.width == 0 {
            return vec![Line::default(); usize::from(self.height)];
        }
        self.rows().map(|row| self.row_to_line(row)).collect()
    }

    fn row_to_line(&self, row: &[Cell]) -> Line {
        let end = row.iter().rposition(|cell| !cell.is_blank()).map_or(0, |i| i + 1);
        let mut segments: Vec<StyledSegment> = Vec::new();
        // Continuations always follow their head, which already covers them.
        for cell in row[..end].iter().filter(|cell| !cell.is_wide_continuation()) {
            let grapheme = self.grapheme_of(cell).unwrap_or(" ");
            let paint = cell.paint();
            match segments.last_mut() {
                Some(last) if last.paint == paint => last.text.push_str(grapheme),
                _ => segments.push(StyledSegment::new(grapheme, paint)),
            }
        }
        Line::from_segments(segments)
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("overflow_count", &self.overflow.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn plain(canvas: &Canvas) -> Vec<String> {
        canvas.to_lines().iter().map(Line::plain).collect()
    }

    #[test]
    fn test_canvas_zero_sized() {
        let canvas = Canvas::new(0, 2);
        assert_eq!(canvas.to_lines().len(), 2);
        assert!(Canvas::new(4, 0).to_lines().is_empty());
    }

    #[test]
    fn test_set_grapheme_wide() {
        let mut canvas = Canvas::new(4, 1);
        let bounds = canvas.bounds();
        assert_eq!(canvas.set_grapheme(0, 0, "日", 2, PaintSpec::PLAIN, bounds), 2);
        assert_eq!(canvas.get_grapheme(0, 0), Some("日"));
        assert!(canvas.get(1, 0).unwrap().is_wide_continuation());
        assert_eq!(canvas.get_grapheme(1, 0), None);
    }

    #[test]
    fn test_wide_grapheme_straddling_clip_is_dropped() {
        let mut canvas = Canvas::new(4, 1);
        let clip = Rect::new(0, 0, 3, 1);
        assert_eq!(canvas.set_grapheme(2, 0, "日", 2, PaintSpec::PLAIN, clip), 0);
        assert_eq!(canvas.set_grapheme(3, 0, "a", 1, PaintSpec::PLAIN, clip), 0);
        assert_eq!(plain(&canvas), vec![""]);
    }

    #[test]
    fn test_overwriting_half_of_wide_blanks_other_half() {
        let mut canvas = Canvas::new(4, 1);
        let bounds = canvas.bounds();
        canvas.set_grapheme(0, 0, "日", 2, PaintSpec::PLAIN, bounds);
        canvas.set_grapheme(1, 0, "x", 1, PaintSpec::PLAIN, bounds);
        assert_eq!(plain(&canvas), vec![" x"]);

        canvas.set_grapheme(2, 0, "本", 2, PaintSpec::PLAIN, bounds);
        canvas.set_grapheme(2, 0, "y", 1, PaintSpec::PLAIN, bounds);
        assert_eq!(plain(&canvas), vec![" xy"]);
    }

    #[test]
    fn test_overflow_grapheme() {
        let mut canvas = Canvas::new(4, 1);
        let bounds = canvas.bounds();
        let family = "👨‍👩‍👧";
        canvas.set_grapheme(0, 0, family, 2, PaintSpec::PLAIN, bounds);
        assert!(canvas.get(0, 0).unwrap().is_overflow());
        assert_eq!(canvas.get_grapheme(0, 0), Some(family));
        assert_eq!(plain(&canvas), vec![family.to_owned()]);
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut canvas = Canvas::new(5, 3);
        let blue = Cell::blank(Color::Indexed(4));
        canvas.fill_rect(Rect::new(1, 0, 10, 2), Rect::new(0, 1, 5, 2), blue);
        assert_eq!(canvas.get(1, 0), Some(&Cell::EMPTY));
        assert_eq!(canvas.get(1, 1), Some(&blue));
        assert_eq!(canvas.get(4, 1), Some(&blue));
        assert_eq!(canvas.get(0, 1), Some(&Cell::EMPTY));
        assert_eq!(canvas.get(1, 2), Some(&Cell::EMPTY));
    }

    #[test]
    fn test_to_lines_merges_and_trims() {
        let mut canvas = Canvas::new(6, 1);
        let bounds = canvas.bounds();
        let red = PaintSpec { fg: Color::Indexed(1), ..PaintSpec::PLAIN };
        canvas.set_grapheme(0, 0, "a", 1, red, bounds);
        canvas.set_grapheme(1, 0, "b", 1, red, bounds);
        canvas.set_grapheme(2, 0, "c", 1, PaintSpec::PLAIN, bounds);

        let lines = canvas.to_lines();
        assert_eq!(lines[0].segments().len(), 2);
        assert_eq!(lines[0].segments()[0].text, "ab");
        assert_eq!(lines[0].width(), 3);
    }

    #[test]
    fn test_to_lines_keeps_styled_trailing_blanks() {
        let mut canvas = Canvas::new(3, 1);
        canvas.fill_rect(Rect::new(0, 0, 3, 1), canvas.bounds(), Cell::blank(Color::Indexed(4)));
        assert_eq!(plain(&canvas), vec!["   "]);
    }
}
