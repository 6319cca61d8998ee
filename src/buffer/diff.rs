//! Diffing Engine: Turn two frames into terminal update operations.
//!
//! This module implements the core anti-flicker logic:
//! 1. Skip the static prefix the terminal already shows
//! 2. Compare each remaining row of the previous and next frame
//! 3. Emit whole-line rewrites or minimal cell runs for rows that differ
//! 4. Erase rows the next frame no longer has, bottom-up
//!
//! Operations come out ordered top to bottom. Identical frames produce no
//! operations at all.

use super::frame::{Frame, Line, Slot};
use crate::terminal::sgr::SgrState;

/// One terminal-mutating instruction. Rows count from the top of the frame,
/// static prefix included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffOp {
    /// Park the cursor at a row and column.
    MoveCursor {
        /// Target row.
        row: usize,
        /// Target column.
        col: usize,
    },
    /// Write a whole rendered line starting at column 0.
    WriteLine {
        /// Target row.
        row: usize,
        /// Self-contained rendered text.
        text: String,
    },
    /// Clear a whole row.
    EraseLine {
        /// Target row.
        row: usize,
    },
    /// Write rendered text starting at a column.
    WriteRun {
        /// Target row.
        row: usize,
        /// First column overwritten.
        col: usize,
        /// Self-contained rendered text.
        text: String,
    },
}

impl DiffOp {
    /// The row this operation touches.
    pub const fn row(&self) -> usize {
        match self {
            Self::MoveCursor { row, .. }
            | Self::WriteLine { row, .. }
            | Self::EraseLine { row }
            | Self::WriteRun { row, .. } => *row,
        }
    }
}

/// How changed rows are rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DiffStrategy {
    /// Erase and rewrite every changed row.
    #[default]
    Line,
    /// Rewrite only the cell ranges that changed.
    Run,
}

impl std::fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Line => "line",
            Self::Run => "run",
        })
    }
}

/// Operations that turn a terminal showing `previous` into one showing `next`.
///
/// The static prefix of `previous` is assumed to be on screen and is never
/// compared. Rows that became static in `next` are treated like any other
/// row the first time they appear. When anything changed, the list ends
/// with a [`DiffOp::MoveCursor`] parking the cursor below the frame.
pub fn diff(previous: &Frame, next: &Frame, strategy: DiffStrategy) -> Vec<DiffOp> {
    let mut ops = Vec::new();
    let frozen = previous.static_rows();

    for row in frozen..next.rows() {
        let Some(new) = next.line(row) else { break };
        match previous.line(row) {
            None => ops.push(DiffOp::WriteLine { row, text: new.render() }),
            Some(old) if old == new => {}
            Some(old) => match strategy {
                DiffStrategy::Line => {
                    ops.push(DiffOp::EraseLine { row });
                    if !new.is_empty() {
                        ops.push(DiffOp::WriteLine { row, text: new.render() });
                    }
                }
                DiffStrategy::Run => push_runs(&mut ops, row, old, new),
            },
        }
    }

    // Rows the next frame dropped.
    for row in (next.rows().max(frozen)..previous.rows()).rev() {
        ops.push(DiffOp::EraseLine { row });
    }

    if !ops.is_empty() {
        ops.push(DiffOp::MoveCursor { row: next.rows(), col: 0 });
    }
    ops
}

/// Operations that draw `frame` from scratch below its static prefix.
///
/// Rows `[0, written_static)` are assumed to be on screen already.
pub fn full_rewrite(frame: &Frame, written_static: usize) -> Vec<DiffOp> {
    let mut ops: Vec<DiffOp> = frame
        .lines()
        .enumerate()
        .skip(written_static)
        .map(|(row, line)| DiffOp::WriteLine { row, text: line.render() })
        .collect();
    ops.push(DiffOp::MoveCursor { row: frame.rows(), col: 0 });
    ops
}

/// Operations that redraw every dynamic row of `next` if anything changed.
///
/// Used when incremental diffing is off. The static prefix of `previous`
/// is still left alone.
pub fn redraw(previous: &Frame, next: &Frame) -> Vec<DiffOp> {
    if previous.rows() == next.rows() && previous.lines().eq(next.lines()) {
        return Vec::new();
    }
    let frozen = previous.static_rows();
    let mut ops = Vec::new();
    for (row, line) in next.lines().enumerate().skip(frozen) {
        if row < previous.rows() {
            ops.push(DiffOp::EraseLine { row });
        }
        if !line.is_empty() {
            ops.push(DiffOp::WriteLine { row, text: line.render() });
        }
    }
    for row in (next.rows().max(frozen)..previous.rows()).rev() {
        ops.push(DiffOp::EraseLine { row });
    }
    ops.push(DiffOp::MoveCursor { row: next.rows(), col: 0 });
    ops
}

/// Emit one [`DiffOp::WriteRun`] per maximal range of differing cells.
fn push_runs(ops: &mut Vec<DiffOp>, row: usize, old: &Line, new: &Line) {
    if new.is_empty() {
        ops.push(DiffOp::EraseLine { row });
        return;
    }
    let mut old_slots = old.slots();
    let mut new_slots = new.slots();
    // Cells past the end of a line read as erased.
    let width = old_slots.len().max(new_slots.len());
    old_slots.resize(width, Slot::BLANK);
    new_slots.resize(width, Slot::BLANK);

    let mut col = 0;
    while col < width {
        if old_slots[col] == new_slots[col] {
            col += 1;
            continue;
        }
        let mut start = col;
        let mut end = col + 1;
        while end < width && old_slots[end] != new_slots[end] {
            end += 1;
        }
        // Never split a wide glyph on either side.
        while start > 0 && (is_continuation(&old_slots[start]) || is_continuation(&new_slots[start])) {
            start -= 1;
        }
        while end < width && (is_continuation(&old_slots[end]) || is_continuation(&new_slots[end])) {
            end += 1;
        }
        ops.push(DiffOp::WriteRun { row, col: start, text: render_slots(&new_slots[start..end]) });
        col = end;
    }
}

#[inline]
fn is_continuation(slot: &Slot<'_>) -> bool {
    matches!(slot, Slot::Continuation)
}

fn render_slots(slots: &[Slot<'_>]) -> String {
    let mut out = String::with_capacity(slots.len());
    let mut state = SgrState::new();
    for slot in slots {
        if let Slot::Glyph { grapheme, paint, .. } = slot {
            state.transition(&mut out, *paint);
            out.push_str(grapheme);
        }
    }
    state.finish(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StyledSegment;
    use crate::style::{Color, PaintSpec};
    use std::sync::Arc;

    #[test]
    fn test_diff_identical_frames() {
        let frame = Frame::from_text(&["hello", "", "world"]);
        assert!(diff(&frame, &frame, DiffStrategy::Line).is_empty());
        assert!(diff(&frame, &frame, DiffStrategy::Run).is_empty());
    }

    #[test]
    fn test_line_strategy_rewrites_changed_rows() {
        let a = Frame::from_text(&["one", "two"]);
        let b = Frame::from_text(&["one", "TWO"]);
        assert_eq!(
            diff(&a, &b, DiffStrategy::Line),
            vec![
                DiffOp::EraseLine { row: 1 },
                DiffOp::WriteLine { row: 1, text: "TWO".into() },
                DiffOp::MoveCursor { row: 2, col: 0 },
            ]
        );
    }

    #[test]
    fn test_appended_rows_written_without_erase() {
        let a = Frame::from_text(&["a"]);
        let b = Frame::from_text(&["a", "b"]);
        assert_eq!(
            diff(&a, &b, DiffStrategy::Line),
            vec![DiffOp::WriteLine { row: 1, text: "b".into() }, DiffOp::MoveCursor { row: 2, col: 0 }]
        );
    }

    #[test]
    fn test_removed_rows_erased_bottom_up() {
        let a = Frame::from_text(&["a", "b", "c"]);
        let b = Frame::from_text(&["a"]);
        assert_eq!(
            diff(&a, &b, DiffStrategy::Run),
            vec![
                DiffOp::EraseLine { row: 2 },
                DiffOp::EraseLine { row: 1 },
                DiffOp::MoveCursor { row: 1, col: 0 },
            ]
        );
    }

    #[test]
    fn test_run_strategy_writes_only_changed_cells() {
        let a = Frame::from_text(&["hello world"]);
        let b = Frame::from_text(&["hallo worle"]);
        let ops = diff(&a, &b, DiffStrategy::Run);
        assert_eq!(
            ops,
            vec![
                DiffOp::WriteRun { row: 0, col: 1, text: "a".into() },
                DiffOp::WriteRun { row: 0, col: 10, text: "e".into() },
                DiffOp::MoveCursor { row: 1, col: 0 },
            ]
        );
    }

    #[test]
    fn test_run_strategy_blanks_shortened_tail() {
        let a = Frame::from_text(&["abcdef"]);
        let b = Frame::from_text(&["abc"]);
        let ops = diff(&a, &b, DiffStrategy::Run);
        assert_eq!(ops[0], DiffOp::WriteRun { row: 0, col: 3, text: "   ".into() });
    }

    #[test]
    fn test_run_strategy_keeps_wide_glyphs_whole() {
        let a = Frame::from_text(&["日本"]);
        let b = Frame::from_text(&["日x "]);
        let ops = diff(&a, &b, DiffStrategy::Run);
        assert_eq!(ops[0], DiffOp::WriteRun { row: 0, col: 2, text: "x ".into() });

        let c = Frame::from_text(&["a日"]);
        let d = Frame::from_text(&["ab日"]);
        let ops = diff(&c, &d, DiffStrategy::Run);
        assert_eq!(ops[0], DiffOp::WriteRun { row: 0, col: 1, text: "b日".into() });
    }

    #[test]
    fn test_run_strategy_tracks_style_changes() {
        let red = PaintSpec { fg: Color::Indexed(1), ..PaintSpec::PLAIN };
        let a = Frame::from_text(&["ok"]);
        let b = Frame::from_lines(vec![Line::from_segments([StyledSegment::new("ok", red)])]);
        let ops = diff(&a, &b, DiffStrategy::Run);
        assert_eq!(ops[0], DiffOp::WriteRun { row: 0, col: 0, text: "\x1b[31mok\x1b[0m".into() });
    }

    #[test]
    fn test_static_prefix_never_compared() {
        let log = Arc::new(vec![Line::from_text("log 1")]);
        let a = Frame::new(Arc::clone(&log), vec![Line::from_text("spinner -")]);
        // A frame claiming different static content must not rewrite it.
        let b = Frame::new(Arc::new(vec![Line::from_text("LOG 1")]), vec![Line::from_text("spinner -")]);
        assert!(diff(&a, &b, DiffStrategy::Line).is_empty());
    }

    #[test]
    fn test_newly_static_rows_written_once() {
        let a = Frame::from_text(&["spinner"]);
        let b = Frame::new(Arc::new(vec![Line::from_text("done")]), vec![Line::from_text("spinner")]);
        assert_eq!(
            diff(&a, &b, DiffStrategy::Line),
            vec![
                DiffOp::EraseLine { row: 0 },
                DiffOp::WriteLine { row: 0, text: "done".into() },
                DiffOp::WriteLine { row: 1, text: "spinner".into() },
                DiffOp::MoveCursor { row: 2, col: 0 },
            ]
        );
        assert!(diff(&b, &b, DiffStrategy::Line).is_empty());
    }

    #[test]
    fn test_redraw_rewrites_unchanged_rows_too() {
        let a = Frame::from_text(&["same", "old"]);
        let b = Frame::from_text(&["same", "new"]);
        assert!(redraw(&a, &a).is_empty());
        assert_eq!(
            redraw(&a, &b),
            vec![
                DiffOp::EraseLine { row: 0 },
                DiffOp::WriteLine { row: 0, text: "same".into() },
                DiffOp::EraseLine { row: 1 },
                DiffOp::WriteLine { row: 1, text: "new".into() },
                DiffOp::MoveCursor { row: 2, col: 0 },
            ]
        );
    }

    #[test]
    fn test_full_rewrite_skips_written_static() {
        let frame = Frame::new(Arc::new(vec![Line::from_text("old")]), vec![Line::from_text("live")]);
        assert_eq!(
            full_rewrite(&frame, 1),
            vec![DiffOp::WriteLine { row: 1, text: "live".into() }, DiffOp::MoveCursor { row: 2, col: 0 }]
        );
    }
}
