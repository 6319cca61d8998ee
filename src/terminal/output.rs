//! `TerminalWriter`: Serializes diff operations into one buffered write.
//!
//! The writer draws inline, below whatever the shell printed before mount.
//! It never addresses absolute screen positions: frame row 0 is wherever
//! the cursor stood when the first pass began, and every move is relative
//! to the row the cursor is parked on.

use crate::buffer::DiffOp;
use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

/// Cursor bookkeeping relative to frame row 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CursorModel {
    /// Row the cursor is on.
    row: usize,
    /// Lowest row the terminal has allocated for the frame. Moving past it
    /// needs newlines, which scroll; cursor-down would stop at the screen edge.
    bottom: usize,
}

/// Buffered writer for terminal update operations.
///
/// All output is accumulated here, then flushed in a single `write()`
/// to prevent terminal flickering. Queued operations move a staged cursor;
/// it becomes the terminal's cursor only once the flush succeeds.
pub struct TerminalWriter<W: Write> {
    out: W,
    data: Vec<u8>,
    /// Where the cursor will be once `data` is written.
    cursor: CursorModel,
    /// Where the cursor is after the last successful flush.
    flushed: CursorModel,
}

/// Clamp a row distance into a cursor-motion argument.
#[inline]
fn steps(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

impl<W: Write> TerminalWriter<W> {
    /// Create a writer with the cursor on frame row 0.
    pub fn new(out: W) -> Self {
        Self {
            out,
            data: Vec::with_capacity(4096),
            cursor: CursorModel::default(),
            flushed: CursorModel::default(),
        }
    }

    /// Row the cursor is parked on, relative to frame row 0.
    #[inline]
    pub const fn cursor_row(&self) -> usize {
        self.cursor.row
    }

    /// How many rows above the cursor `row` is. Zero when at or below it.
    #[inline]
    pub const fn distance_up(&self, row: usize) -> usize {
        self.cursor.row.saturating_sub(row)
    }

    /// Number of bytes queued but not yet flushed.
    #[inline]
    pub fn pending(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to the underlying sink.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Get a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Queue a cursor hide.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.data, cursor::Hide)
    }

    /// Queue a cursor show.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.data, cursor::Show)
    }

    /// Queue the escape sequences for `ops`, in order.
    pub fn apply(&mut self, ops: &[DiffOp]) -> io::Result<()> {
        for op in ops {
            match op {
                DiffOp::MoveCursor { row, col } => self.move_to(*row, *col)?,
                DiffOp::WriteLine { row, text } => {
                    self.move_to(*row, 0)?;
                    self.data.extend_from_slice(text.as_bytes());
                }
                DiffOp::EraseLine { row } => {
                    self.move_to(*row, 0)?;
                    queue!(self.data, Clear(ClearType::CurrentLine))?;
                }
                DiffOp::WriteRun { row, col, text } => {
                    self.move_to(*row, *col)?;
                    self.data.extend_from_slice(text.as_bytes());
                }
            }
        }
        Ok(())
    }

    /// Move to `row`, `col` of the frame.
    fn move_to(&mut self, row: usize, col: usize) -> io::Result<()> {
        let current = self.cursor.row;
        if row < current {
            queue!(self.data, cursor::MoveUp(steps(current - row)))?;
        } else if row > current {
            let reachable = row.min(self.cursor.bottom);
            if reachable > current {
                queue!(self.data, cursor::MoveDown(steps(reachable - current)))?;
            }
            for _ in reachable.max(current)..row {
                self.data.extend_from_slice(b"\r\n");
            }
        }
        queue!(self.data, cursor::MoveToColumn(steps(col)))?;
        self.cursor.row = row;
        self.cursor.bottom = self.cursor.bottom.max(row);
        Ok(())
    }

    /// Queue an erase of frame rows `row..`, leaving the cursor on `row`.
    pub fn erase_from(&mut self, row: usize) -> io::Result<()> {
        self.move_to(row, 0)?;
        queue!(self.data, Clear(ClearType::FromCursorDown))?;
        self.cursor.bottom = row;
        Ok(())
    }

    /// Queue a clear of the screen and scrollback, making the top-left
    /// corner frame row 0.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        queue!(
            self.data,
            Clear(ClearType::All),
            Clear(ClearType::Purge),
            cursor::MoveTo(0, 0)
        )?;
        self.cursor = CursorModel::default();
        Ok(())
    }

    /// Drop queued output and return the cursor to where the last flush
    /// left it.
    pub fn discard(&mut self) {
        self.data.clear();
        self.cursor = self.flushed;
    }

    /// Flush to the sink in a single write. Returns the bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails. The queued output is
    /// discarded and the cursor rolls back, as if nothing had been queued.
    pub fn flush(&mut self) -> io::Result<usize> {
        let written = self.data.len();
        if written == 0 {
            self.flushed = self.cursor;
            return Ok(0);
        }
        match self.out.write_all(&self.data).and_then(|()| self.out.flush()) {
            Ok(()) => {
                self.data.clear();
                self.flushed = self.cursor;
                Ok(written)
            }
            Err(err) => {
                self.discard();
                Err(err)
            }
        }
    }
}

impl<W: Write> std::fmt::Debug for TerminalWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalWriter")
            .field("cursor_row", &self.cursor.row)
            .field("bottom", &self.cursor.bottom)
            .field("pending", &self.data.len())
            .finish()
    }
}
