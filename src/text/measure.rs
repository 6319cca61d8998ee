//! Text measuring and shaping.
//!
//! Everything here is a pure function of its inputs; [`MeasurementCache`]
//! memoizes them per render target.
//!
//! [`MeasurementCache`]: super::MeasurementCache

use super::ansi::{line_width, render_graphemes, split_lines, styled_graphemes, StyledGrapheme};
use crate::style::{PaintSpec, TextWrap};

/// Marker inserted where truncated content was removed.
pub const ELLIPSIS: &str = "…";

/// Measured extent of a string in cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Size {
    /// Widest line.
    pub width: usize,
    /// Number of lines.
    pub height: usize,
}

/// Measure a string: widest visible line and line count.
///
/// The empty string measures `0x0`; any other string has at least one line.
pub fn measure(text: &str) -> Size {
    if text.is_empty() {
        return Size::default();
    }
    let (width, height) = text
        .split('\n')
        .fold((0, 0), |(width, height), line| (width.max(line_width(line)), height + 1));
    Size { width, height }
}

/// Shape `text` to `max_width` cells according to `mode`.
///
/// Text that already fits is returned as is. Otherwise each line is shaped
/// independently and styling escapes are preserved: every produced line is
/// self-contained, reopening the paint that was active where it starts.
pub fn wrap_or_truncate(text: &str, max_width: usize, mode: TextWrap) -> String {
    if matches!(mode, TextWrap::None) || measure(text).width <= max_width {
        return text.to_owned();
    }
    let graphemes = styled_graphemes(text, PaintSpec::PLAIN);
    let mut shaped = Vec::new();
    for line in split_lines(&graphemes) {
        let width: usize = line.iter().map(|g| g.width).sum();
        if width <= max_width {
            shaped.push(render_graphemes(line));
            continue;
        }
        match mode {
            TextWrap::Wrap => {
                shaped.extend(wrap_line(line, max_width).iter().map(|row| render_graphemes(row)));
            }
            TextWrap::None => shaped.push(render_graphemes(line)),
            TextWrap::TruncateEnd | TextWrap::TruncateMiddle | TextWrap::TruncateStart => {
                shaped.push(truncate_line(line, max_width, mode));
            }
        }
    }
    shaped.join("\n")
}

/// Word-aware hard wrap. Spaces are kept, so the rows concatenate back to
/// the input; words longer than the width are broken at the width.
fn wrap_line<'a>(graphemes: &[StyledGrapheme<'a>], width: usize) -> Vec<Vec<StyledGrapheme<'a>>> {
    let width = width.max(1);
    let mut rows: Vec<Vec<StyledGrapheme<'a>>> = vec![Vec::new()];
    let mut row_width = 0;
    let mut start = 0;

    while start <= graphemes.len() {
        let end = graphemes[start..]
            .iter()
            .position(|g| g.grapheme == " ")
            .map_or(graphemes.len(), |offset| start + offset);
        let word = &graphemes[start..end];

        if start > 0 {
            if row_width >= width {
                rows.push(Vec::new());
                row_width = 0;
            }
            push(&mut rows, graphemes[start - 1]);
            row_width += 1;
        }

        let word_width: usize = word.iter().map(|g| g.width).sum();
        if word_width > width {
            // Start the word on a fresh row if that saves a break.
            let remaining = width - row_width.min(width);
            let breaks_here = 1 + word_width.saturating_sub(remaining + 1) / width;
            let breaks_next = (word_width - 1) / width;
            if breaks_next < breaks_here {
                rows.push(Vec::new());
                row_width = 0;
            }
            for g in word {
                if row_width + g.width > width && row_width > 0 {
                    rows.push(Vec::new());
                    row_width = 0;
                }
                push(&mut rows, *g);
                row_width += g.width;
            }
        } else {
            if row_width + word_width > width && row_width > 0 && word_width > 0 {
                rows.push(Vec::new());
                row_width = 0;
            }
            for g in word {
                push(&mut rows, *g);
            }
            row_width += word_width;
        }
        start = end + 1;
    }
    rows
}

fn push<'a>(rows: &mut [Vec<StyledGrapheme<'a>>], g: StyledGrapheme<'a>) {
    if let Some(row) = rows.last_mut() {
        row.push(g);
    }
}

/// Cut a line to `width` cells with an ellipsis at the given edge.
fn truncate_line(graphemes: &[StyledGrapheme<'_>], width: usize, mode: TextWrap) -> String {
    if width == 0 {
        return String::new();
    }
    let ellipsis = StyledGrapheme { grapheme: ELLIPSIS, width: 1, paint: PaintSpec::PLAIN };
    let mut out: Vec<StyledGrapheme<'_>> = Vec::with_capacity(width + 1);
    match mode {
        TextWrap::TruncateStart => {
            out.push(ellipsis);
            out.extend(take_suffix(graphemes, width - 1));
        }
        TextWrap::TruncateMiddle => {
            let half = width / 2;
            out.extend(take_prefix(graphemes, half));
            out.push(ellipsis);
            out.extend(take_suffix(graphemes, width - half - 1));
        }
        _ => {
            out.extend(take_prefix(graphemes, width - 1));
            out.push(ellipsis);
        }
    }
    render_graphemes(&out)
}

/// Longest prefix fitting in `width` cells. A wide glyph that would
/// straddle the limit is left out.
fn take_prefix<'a>(graphemes: &[StyledGrapheme<'a>], width: usize) -> Vec<StyledGrapheme<'a>> {
    let mut used = 0;
    graphemes
        .iter()
        .take_while(|g| {
            used += g.width;
            used <= width
        })
        .copied()
        .collect()
}

/// Longest suffix fitting in `width` cells.
fn take_suffix<'a>(graphemes: &[StyledGrapheme<'a>], width: usize) -> Vec<StyledGrapheme<'a>> {
    let mut used = 0;
    let mut suffix: Vec<_> = graphemes
        .iter()
        .rev()
        .take_while(|g| {
            used += g.width;
            used <= width
        })
        .copied()
        .collect();
    suffix.reverse();
    suffix
}
