//! Renderer: One render target and its pass lifecycle.
//!
//! A pass composites the tree, diffs it against the previous frame and
//! writes the result in a single flush. The new frame only becomes
//! "previous" once all of that succeeded; a failed pass leaves the
//! renderer exactly as it was.

use crate::buffer::{diff, full_rewrite, redraw, DiffOp, Frame};
use crate::compositor::Compositor;
use crate::config::RendererConfig;
use crate::error::{RenderError, Result};
use crate::layout::LayoutOracle;
use crate::node::Node;
use crate::terminal::TerminalWriter;
use crate::text::{Size, TextCache};
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Render statistics for debugging/profiling.
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    /// Passes committed.
    pub passes: u64,
    /// Total bytes written to the sink.
    pub bytes_written: u64,
    /// Total diff operations emitted.
    pub ops_emitted: u64,
    /// Passes that fell back to a full clear-and-redraw.
    pub full_redraws: u64,
    /// Last pass duration in microseconds.
    pub last_pass_us: u64,
    /// Smoothed pass duration in microseconds.
    pub avg_pass_us: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mount {
    /// Nothing written yet.
    Pending,
    Mounted,
    Unmounted,
}

/// An inline render target writing to `W`.
pub struct Renderer<W: Write> {
    config: RendererConfig,
    compositor: Compositor,
    text: TextCache,
    previous: Frame,
    writer: TerminalWriter<W>,
    stats: RenderStats,
    mount: Mount,
}

impl Renderer<Stdout> {
    /// Render to standard output.
    ///
    /// The viewport height is read from the terminal when the config does
    /// not set one.
    pub fn stdout(mut config: RendererConfig) -> Self {
        if config.viewport_rows.is_none() {
            match crossterm::terminal::size() {
                Ok((_, rows)) => config.viewport_rows = Some(rows),
                Err(err) => debug!(%err, "terminal size unavailable, viewport unbounded"),
            }
        }
        Self::new(io::stdout(), config)
    }
}

impl<W: Write> Renderer<W> {
    /// Create a renderer writing to `out`. Nothing is written until the
    /// first pass commits.
    pub fn new(out: W, config: RendererConfig) -> Self {
        Self {
            config,
            compositor: Compositor::new(),
            text: TextCache::new(),
            previous: Frame::default(),
            writer: TerminalWriter::new(out),
            stats: RenderStats::default(),
            mount: Mount::Pending,
        }
    }

    /// The configuration this renderer was built with.
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The last committed frame.
    pub const fn frame(&self) -> &Frame {
        &self.previous
    }

    /// Accumulated statistics.
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// The text caches, for inspection.
    pub const fn text_cache(&self) -> &TextCache {
        &self.text
    }

    /// Has [`Renderer::unmount`] run?
    pub fn is_unmounted(&self) -> bool {
        self.mount == Mount::Unmounted
    }

    /// Get a reference to the output sink.
    pub const fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Get a mutable reference to the output sink.
    pub fn get_mut(&mut self) -> &mut W {
        self.writer.get_mut()
    }

    /// Start a pass. Squash results from earlier passes expire here.
    ///
    /// # Errors
    ///
    /// [`RenderError::Unmounted`] after [`Renderer::unmount`].
    pub fn begin_pass(&mut self) -> Result<Pass<'_, W>> {
        if self.mount == Mount::Unmounted {
            return Err(RenderError::Unmounted);
        }
        let epoch = self.text.advance_epoch();
        Ok(Pass { renderer: self, epoch, started: Instant::now() })
    }

    /// Run a whole pass for `tree`.
    pub fn render(&mut self, tree: &Node, oracle: &dyn LayoutOracle) -> Result<()> {
        self.begin_pass()?.commit(tree, oracle)
    }

    /// Erase the dynamic rows from the terminal. The static prefix stays,
    /// and the next pass writes the dynamic rows from scratch.
    pub fn clear(&mut self) -> Result<()> {
        if self.mount != Mount::Mounted {
            return Ok(());
        }
        let static_rows = self.previous.static_rows();
        self.writer.erase_from(static_rows)?;
        let bytes = self.writer.flush()?;
        self.stats.bytes_written += bytes as u64;
        self.previous = Frame::new(Arc::clone(self.previous.static_handle()), Vec::new());
        Ok(())
    }

    /// Park the cursor below the output and show it. Later passes fail
    /// with [`RenderError::Unmounted`].
    pub fn unmount(&mut self) -> Result<()> {
        if self.mount == Mount::Unmounted {
            return Ok(());
        }
        let was_mounted = self.mount == Mount::Mounted;
        self.mount = Mount::Unmounted;
        if was_mounted {
            self.writer.apply(&[DiffOp::MoveCursor { row: self.previous.rows(), col: 0 }])?;
            if self.config.hide_cursor {
                self.writer.show_cursor()?;
            }
            let bytes = self.writer.flush()?;
            self.stats.bytes_written += bytes as u64;
        }
        debug!(rows = self.previous.rows(), "renderer unmounted");
        Ok(())
    }

    /// Operations taking the terminal from the previous frame to `next`,
    /// and whether the screen has to be cleared first.
    fn plan(&self, next: &Frame) -> (Vec<DiffOp>, bool) {
        let incremental = self.config.incremental;
        let ops = if incremental.enabled {
            diff(&self.previous, next, incremental.strategy)
        } else {
            redraw(&self.previous, next)
        };

        let Some(viewport) = self.config.viewport_rows else {
            return (ops, false);
        };
        let viewport = usize::from(viewport);
        // Rows scrolled out of the viewport cannot be reached with cursor-up.
        if !ops.iter().any(|op| self.writer.distance_up(op.row()) >= viewport) {
            return (ops, false);
        }
        warn!(
            rows = next.rows(),
            viewport,
            cursor_row = self.writer.cursor_row(),
            "output exceeds the viewport, clearing and redrawing"
        );
        (full_rewrite(next, 0), true)
    }

    /// Queue the frame's cursor policy and `ops`, then flush. On error
    /// nothing is left queued and the writer's cursor is where it was.
    fn write(&mut self, ops: &[DiffOp], clear_screen: bool) -> io::Result<usize> {
        let result = self.queue(ops, clear_screen).and_then(|()| self.writer.flush());
        if result.is_err() {
            self.writer.discard();
        }
        result
    }

    fn queue(&mut self, ops: &[DiffOp], clear_screen: bool) -> io::Result<()> {
        let first = self.mount == Mount::Pending;
        let bracket = !self.config.hide_cursor && !ops.is_empty();
        if (first && self.config.hide_cursor) || bracket {
            self.writer.hide_cursor()?;
        }
        if clear_screen {
            self.writer.clear_screen()?;
        }
        self.writer.apply(ops)?;
        if bracket {
            self.writer.show_cursor()?;
        }
        Ok(())
    }
}

impl<W: Write> Drop for Renderer<W> {
    fn drop(&mut self) {
        // Best effort: leave the cursor visible below the output
        let _ = self.unmount();
    }
}

impl<W: Write> std::fmt::Debug for Renderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("mount", &self.mount)
            .field("rows", &self.previous.rows())
            .field("static_rows", &self.previous.static_rows())
            .field("writer", &self.writer)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// One render pass in progress.
///
/// Measurement during the layout solve goes through the pass so every
/// lookup shares its epoch. Dropping the pass without committing leaves
/// the renderer untouched apart from warmed caches.
pub struct Pass<'r, W: Write> {
    renderer: &'r mut Renderer<W>,
    epoch: u64,
    started: Instant,
}

impl<W: Write> Pass<'_, W> {
    /// Epoch of this pass.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Measurement hook for the layout solver.
    ///
    /// See [`TextCache::measure_text_node`].
    pub fn measure_text_node(&mut self, node: &Node, max_width: usize) -> Result<Size> {
        self.renderer.text.measure_text_node(node, max_width)
    }

    /// Composite `tree`, write the difference and make it the previous frame.
    ///
    /// # Errors
    ///
    /// A transform failure or a sink error. Either way the previous frame,
    /// the static prefix and the committed static nodes are unchanged.
    pub fn commit(self, tree: &Node, oracle: &dyn LayoutOracle) -> Result<()> {
        let renderer = self.renderer;
        let composition = renderer.compositor.composite(tree, oracle, &mut renderer.text)?;

        let (ops, clear_screen) = renderer.plan(&composition.frame);
        let bytes = renderer.write(&ops, clear_screen)?;

        let frame = renderer.compositor.commit(composition);
        renderer.mount = Mount::Mounted;

        let elapsed = u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
        let stats = &mut renderer.stats;
        stats.passes += 1;
        stats.full_redraws += u64::from(clear_screen);
        stats.bytes_written += bytes as u64;
        stats.ops_emitted += ops.len() as u64;
        stats.last_pass_us = elapsed;
        // Smoothed average
        stats.avg_pass_us = if stats.avg_pass_us == 0 {
            elapsed
        } else {
            (stats.avg_pass_us * 15 + elapsed) / 16
        };

        debug!(
            epoch = self.epoch,
            rows = frame.rows(),
            static_rows = frame.static_rows(),
            ops = ops.len(),
            bytes,
            strategy = %renderer.config.incremental.strategy,
            "pass committed"
        );
        renderer.previous = frame;
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for Pass<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass").field("epoch", &self.epoch).finish_non_exhaustive()
    }
}
