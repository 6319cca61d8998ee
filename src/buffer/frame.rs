//! Frames: The composited output of one pass.

use crate::style::PaintSpec;
use crate::terminal::sgr::SgrState;
use crate::text::ansi::grapheme_width;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// A run of graphemes sharing one paint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StyledSegment {
    /// The text, free of escape sequences.
    pub text: String,
    /// Paint applied to every grapheme of the run.
    pub paint: PaintSpec,
}

impl StyledSegment {
    /// Create a segment.
    pub fn new(text: impl Into<String>, paint: PaintSpec) -> Self {
        Self { text: text.into(), paint }
    }

    /// Width of the run in cells.
    pub fn width(&self) -> usize {
        self.text.graphemes(true).map(grapheme_width).sum()
    }
}

/// One display row.
///
/// Adjacent segments never share a paint, so two lines compare equal exactly
/// when they look the same.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Line {
    segments: Vec<StyledSegment>,
}

impl Line {
    /// Build a line, merging adjacent segments with equal paint and dropping
    /// empty ones.
    pub fn from_segments(segments: impl IntoIterator<Item = StyledSegment>) -> Self {
        let mut merged: Vec<StyledSegment> = Vec::new();
        for segment in segments {
            if segment.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.paint == segment.paint => last.text.push_str(&segment.text),
                _ => merged.push(segment),
            }
        }
        Self { segments: merged }
    }

    /// An unstyled line.
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// An unstyled line from text.
    pub fn from_text(text: &str) -> Self {
        Self::from_segments([StyledSegment::new(text, PaintSpec::PLAIN)])
    }

    /// The segments in column order.
    #[inline]
    pub fn segments(&self) -> &[StyledSegment] {
        &self.segments
    }

    /// Does the line have no content?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.segments.iter().map(StyledSegment::width).sum()
    }

    /// Serialize with SGR sequences, ending at terminal defaults.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.segments.iter().map(|s| s.text.len()).sum());
        let mut state = SgrState::new();
        for segment in &self.segments {
            state.transition(&mut out, segment.paint);
            out.push_str(&segment.text);
        }
        state.finish(&mut out);
        out
    }

    /// Per-cell view used for run alignment. Wide graphemes occupy their
    /// head slot followed by a [`Slot::Continuation`].
    pub(crate) fn slots(&self) -> Vec<Slot<'_>> {
        let mut slots = Vec::with_capacity(self.segments.len() * 8);
        for segment in &self.segments {
            for grapheme in segment.text.graphemes(true) {
                let width = grapheme_width(grapheme);
                if width == 0 {
                    continue;
                }
                slots.push(Slot::Glyph { grapheme, width, paint: segment.paint });
                if width == 2 {
                    slots.push(Slot::Continuation);
                }
            }
        }
        slots
    }
}

/// One cell of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot<'a> {
    /// Head of a glyph.
    Glyph {
        grapheme: &'a str,
        width: usize,
        paint: PaintSpec,
    },
    /// Right half of a wide glyph.
    Continuation,
}

impl Slot<'_> {
    /// What an erased cell looks like.
    pub(crate) const BLANK: Self = Slot::Glyph { grapheme: " ", width: 1, paint: PaintSpec::PLAIN };
}

/// The full virtual screen of one pass.
///
/// Rows `[0, static_rows)` are the static prefix: written once and never
/// revisited. The prefix is shared between frames and only grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    static_lines: Arc<Vec<Line>>,
    lines: Vec<Line>,
}

impl Frame {
    /// Create a frame from a static prefix and the dynamic rows below it.
    pub fn new(static_lines: Arc<Vec<Line>>, lines: Vec<Line>) -> Self {
        Self { static_lines, lines }
    }

    /// A frame with no static prefix.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self::new(Arc::default(), lines)
    }

    /// An unstyled frame with no static prefix, one row per string.
    pub fn from_text<S: AsRef<str>>(rows: &[S]) -> Self {
        Self::from_lines(rows.iter().map(|row| Line::from_text(row.as_ref())).collect())
    }

    /// Total number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.static_lines.len() + self.lines.len()
    }

    /// Number of static rows.
    #[inline]
    pub fn static_rows(&self) -> usize {
        self.static_lines.len()
    }

    /// The static prefix.
    #[inline]
    pub fn static_lines(&self) -> &[Line] {
        &self.static_lines
    }

    /// Shared handle to the static prefix.
    pub(crate) fn static_handle(&self) -> &Arc<Vec<Line>> {
        &self.static_lines
    }

    /// The rows below the static prefix.
    #[inline]
    pub fn dynamic_lines(&self) -> &[Line] {
        &self.lines
    }

    /// Row `row`, counting from the top of the static prefix.
    pub fn line(&self, row: usize) -> Option<&Line> {
        match row.checked_sub(self.static_lines.len()) {
            None => self.static_lines.get(row),
            Some(dynamic) => self.lines.get(dynamic),
        }
    }

    /// All rows, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.static_lines.iter().chain(self.lines.iter())
    }

    /// All rows as plain text, one string per row.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines().map(Line::plain).collect()
    }
}
